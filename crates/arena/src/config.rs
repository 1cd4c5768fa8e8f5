//! Arena configuration

use serde::{Deserialize, Serialize};
use shape_engine::config::{Config, ConfigError, EngineConfig};
use shape_engine::events::{KeyAction, KeyCode, KeyEvent};

/// Placement and look of one square actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Edge length in pixels
    pub size: f32,
    /// Center of the square at spawn
    pub spawn: [f32; 3],
    /// Texture file; the placeholder is used when missing or unreadable
    pub texture: Option<String>,
    /// Degrees the sprite is turned about its center on Z; the collider is not turned
    #[serde(default)]
    pub sprite_rotation: f32,
}

/// One scripted key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedKey {
    /// Frame the event is delivered on, starting at 1
    pub frame: u64,
    /// Key
    pub key: KeyCode,
    /// Transition
    pub action: KeyAction,
}

impl ScriptedKey {
    /// The event to queue
    pub fn event(&self) -> KeyEvent {
        KeyEvent {
            key: self.key,
            action: self.action,
        }
    }

    /// Scaled game time at which the event is due
    ///
    /// Frames are counted at their nominal length. The event is due half a
    /// frame before its frame ends, so accumulated float error and small
    /// jitter still deliver it on that frame.
    pub fn delivery_time(&self, frame_ms: f32, time_scale: f32) -> f64 {
        (self.frame as f64 - 0.5) * f64::from(frame_ms) * f64::from(time_scale)
    }
}

/// Arena settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Engine settings
    pub engine: EngineConfig,
    /// Player square
    pub player: ActorConfig,
    /// Enemy square
    pub enemy: ActorConfig,
    /// Player speed in pixels per scaled time unit
    pub player_speed: f32,
    /// Multiplier from milliseconds to game time units
    pub time_scale: f32,
    /// Frames to simulate
    pub frame_count: u64,
    /// Nominal frame length in milliseconds
    pub frame_ms: f32,
    /// Maximum random deviation from `frame_ms`
    pub frame_jitter_ms: f32,
    /// Seed for the frame jitter
    pub seed: u64,
    /// Key feed replayed during the run
    pub script: Vec<ScriptedKey>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            player: ActorConfig {
                size: 100.0,
                spawn: [360.0, 100.0, 0.0],
                texture: Some("assets/Player.png".to_string()),
                sprite_rotation: 180.0,
            },
            enemy: ActorConfig {
                size: 90.0,
                spawn: [600.0, 100.0, 0.0],
                texture: Some("assets/Enemy_Basic.png".to_string()),
                sprite_rotation: 0.0,
            },
            player_speed: 10.0,
            time_scale: 0.1,
            frame_count: 60,
            frame_ms: 16.0,
            frame_jitter_ms: 0.0,
            seed: 7,
            script: vec![
                ScriptedKey {
                    frame: 1,
                    key: KeyCode::D,
                    action: KeyAction::Press,
                },
                ScriptedKey {
                    frame: 20,
                    key: KeyCode::D,
                    action: KeyAction::Release,
                },
                ScriptedKey {
                    frame: 40,
                    key: KeyCode::A,
                    action: KeyAction::Press,
                },
                ScriptedKey {
                    frame: 50,
                    key: KeyCode::A,
                    action: KeyAction::Release,
                },
            ],
        }
    }
}

impl Config for ArenaConfig {}

impl ArenaConfig {
    /// Check engine settings and gameplay ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        for (name, actor) in [("player", &self.player), ("enemy", &self.enemy)] {
            if !(actor.size.is_finite() && actor.size > 0.0) {
                return Err(ConfigError::Invalid(format!("{} size must be positive, got {}", name, actor.size)));
            }
            if !actor.sprite_rotation.is_finite() {
                return Err(ConfigError::Invalid(format!("{} sprite rotation must be finite", name)));
            }
            if actor.spawn.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::Invalid(format!("{} spawn must be finite", name)));
            }
        }
        if !(self.player_speed.is_finite() && self.player_speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "player speed must be non-negative, got {}",
                self.player_speed
            )));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ConfigError::Invalid(format!("time scale must be positive, got {}", self.time_scale)));
        }
        if !(self.frame_ms > 0.0 && self.frame_jitter_ms >= 0.0 && self.frame_jitter_ms < self.frame_ms) {
            return Err(ConfigError::Invalid(format!(
                "frame length {} ms with jitter {} ms leaves no positive frame time",
                self.frame_ms, self.frame_jitter_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ArenaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.player_speed, 10.0);
        assert_eq!(config.time_scale, 0.1);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let mut config = ArenaConfig::default();
        config.enemy.size = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ArenaConfig::default();
        config.frame_jitter_ms = 20.0;
        assert!(config.validate().is_err());

        let mut config = ArenaConfig::default();
        config.engine.canvas_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delivery_time_falls_inside_frame() {
        let key = ScriptedKey {
            frame: 3,
            key: KeyCode::D,
            action: KeyAction::Press,
        };
        // frames of 1.6 scaled units: frame 3 spans (3.2, 4.8]
        let due = key.delivery_time(16.0, 0.1);
        assert!(due > 3.2 && due < 4.8, "due at {}", due);
    }

    #[test]
    fn test_script_survives_save_and_load() {
        let config = ArenaConfig::default();
        for ext in ["toml", "ron"] {
            let path = std::env::temp_dir().join(format!("arena_{}.{}", std::process::id(), ext));
            config.save_to_file(&path).unwrap();
            let loaded = ArenaConfig::load_from_file(&path).unwrap();
            std::fs::remove_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }
}
