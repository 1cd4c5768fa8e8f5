//! # Arena
//!
//! Headless run of a small arena: a textured player square moves left and
//! right from a scripted key feed, and an enemy square disappears the first
//! time the player touches it. Rendering goes to a recording backend.
//!
//! ```text
//! arena [config.toml | config.ron]
//! ```
//!
//! Without an argument `arena.toml` is used when present, defaults otherwise.

mod config;
mod game;

use log::info;
use shape_engine::config::{Config, ConfigError};
use shape_engine::foundation::logging;
use shape_engine::render::HeadlessBackend;
use shape_engine::EngineError;
use thiserror::Error;

use crate::config::ArenaConfig;

/// Default configuration file
const DEFAULT_CONFIG_PATH: &str = "arena.toml";

/// Arena-level errors
#[derive(Error, Debug)]
pub enum ArenaError {
    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Engine error propagated to the game
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene was not in the expected shape
    #[error("Setup error: {0}")]
    Setup(String),
}

fn main() -> Result<(), ArenaError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ArenaConfig::load_or_default(&path)?;
    config.validate()?;

    logging::init_with_level(&config.engine.log_level);
    info!("Starting arena: {} frames, canvas {}x{}",
        config.frame_count, config.engine.canvas_width, config.engine.canvas_height);

    let mut backend = HeadlessBackend::new();
    let summary = game::run(&config, &mut backend)?;

    match summary.enemy_removed_on {
        Some(frame) => info!("Enemy removed on frame {}", frame),
        None => info!("Enemy survived"),
    }
    info!(
        "Finished {} frames, {} draw calls, {} backend commands, player at ({:.1}, {:.1})",
        summary.frames,
        summary.draw_calls,
        backend.commands().len(),
        summary.player_position.x,
        summary.player_position.y
    );
    Ok(())
}
