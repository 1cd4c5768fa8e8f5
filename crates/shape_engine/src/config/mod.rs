//! Configuration system
//!
//! Any `serde` type with a `Default` can implement [`Config`] and gain
//! TOML/RON loading and saving, picked by file extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::render::{OrthoCamera, ShaderBindings};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of its allowed range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Shader input names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderNames {
    /// Model matrix uniform
    pub model_matrix_uniform: String,
    /// Vertex position attribute
    pub position_attribute: String,
    /// Vertex color attribute
    pub color_attribute: String,
    /// Texture coordinate attribute
    pub tex_coord_attribute: String,
    /// Camera view matrix uniform
    pub view_matrix_uniform: String,
    /// Camera projection matrix uniform
    pub projection_matrix_uniform: String,
}

impl Default for ShaderNames {
    fn default() -> Self {
        Self {
            model_matrix_uniform: "uModelMatrix".to_string(),
            position_attribute: "aVertexPosition".to_string(),
            color_attribute: "aVertexColor".to_string(),
            tex_coord_attribute: "aTexCoord".to_string(),
            view_matrix_uniform: "uViewMatrix".to_string(),
            projection_matrix_uniform: "uProjectionMatrix".to_string(),
        }
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
    /// Clear color, RGBA in `[0, 1]`
    pub background_color: [f32; 4],
    /// Depth buffer clear value
    pub clear_depth: f32,
    /// Shader input names
    pub shader: ShaderNames,
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: 720,
            canvas_height: 960,
            background_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
            shader: ShaderNames::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Check ranges and non-empty names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.background_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(format!(
                "background color components must lie in [0, 1], got {:?}",
                self.background_color
            )));
        }
        if !(0.0..=1.0).contains(&self.clear_depth) {
            return Err(ConfigError::Invalid(format!(
                "clear depth must lie in [0, 1], got {}",
                self.clear_depth
            )));
        }
        let names = [
            &self.shader.model_matrix_uniform,
            &self.shader.position_attribute,
            &self.shader.color_attribute,
            &self.shader.tex_coord_attribute,
            &self.shader.view_matrix_uniform,
            &self.shader.projection_matrix_uniform,
        ];
        if names.iter().any(|n| n.is_empty()) {
            return Err(ConfigError::Invalid("shader names must not be empty".to_string()));
        }
        Ok(())
    }

    /// Names used by [`RenderableShape::render`](crate::render::RenderableShape::render)
    pub fn shader_bindings(&self) -> ShaderBindings {
        ShaderBindings {
            model_matrix: self.shader.model_matrix_uniform.clone(),
            vertex_position: self.shader.position_attribute.clone(),
            vertex_color: self.shader.color_attribute.clone(),
        }
    }

    /// Orthographic camera spanning the canvas in pixels
    pub fn camera(&self) -> OrthoCamera {
        OrthoCamera::for_canvas(self.canvas_width, self.canvas_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("shape_engine_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (720, 960));
        assert_eq!(config.background_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.clear_depth, 1.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.shader_bindings(), ShaderBindings::default());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = EngineConfig::default();
        config.canvas_width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.background_color[1] = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.shader.position_attribute.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("canvas_width = 320\n[shader]\ncolor_attribute = \"aColor\"\n").unwrap();
        assert_eq!(config.canvas_width, 320);
        assert_eq!(config.canvas_height, 960);
        assert_eq!(config.shader.color_attribute, "aColor");
        assert_eq!(config.shader.position_attribute, "aVertexPosition");
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let mut config = EngineConfig::default();
        config.canvas_width = 640;
        config.log_level = "debug".to_string();

        for name in ["engine.toml", "engine.ron"] {
            let path = temp_path(name);
            config.save_to_file(&path).unwrap();
            let loaded = EngineConfig::load_from_file(&path).unwrap();
            std::fs::remove_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::load_from_file("engine.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = EngineConfig::load_or_default(temp_path("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
