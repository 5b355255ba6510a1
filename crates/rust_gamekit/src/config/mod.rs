//! Configuration system
//!
//! Settings are plain serde structs loaded from TOML or RON, chosen by the
//! file extension.

pub use serde::{Serialize, Deserialize};

use crate::render::font::HEIGHT_TO_LOAD;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load from file, falling back to defaults when the file is missing
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Config {} not found, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
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
}

/// Window creation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Client area width in pixels
    pub width: u32,
    /// Client area height in pixels
    pub height: u32,
    /// Wait for vertical sync on buffer swap
    pub vsync: bool,
    /// Allow the user to resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "rust_gamekit".to_string(),
            width: 1280,
            height: 960,
            vsync: true,
            resizable: true,
        }
    }
}

/// Font loading settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// TrueType file to load at start-up, if any
    pub path: Option<String>,
    /// Reference pixel height glyphs are rasterized at
    pub height_to_load: f32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            path: None,
            height_to_load: HEIGHT_TO_LOAD,
        }
    }
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Open an output device; when false every sound is silent
    pub enabled: bool,
    /// Gain applied to newly created sounds
    pub default_gain: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_gain: 1.0,
        }
    }
}

/// Top-level settings for an application built on this crate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    /// Resource domain; assets live under `assets/<domain>/`
    pub domain: String,
    /// Window settings
    pub window: WindowConfig,
    /// Font settings
    pub font: FontSettings,
    /// Audio settings
    pub audio: AudioConfig,
}

impl Config for KitConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("rust_gamekit_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("config.toml");
        let mut config = KitConfig::default();
        config.domain = "demo".to_string();
        config.window.width = 640;
        config.font.path = Some("fonts/mono.ttf".to_string());

        config.save_to_file(&path).unwrap();
        let loaded = KitConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_partial_uses_defaults() {
        let parsed: KitConfig = ron::from_str("(domain: \"x\", audio: (enabled: false))").unwrap();

        assert_eq!(parsed.domain, "x");
        assert!(!parsed.audio.enabled);
        assert_eq!(parsed.window, WindowConfig::default());
        assert_eq!(parsed.font.height_to_load, HEIGHT_TO_LOAD);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = KitConfig::load_from_file("settings.ini");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = KitConfig::load_or_default(&temp_path("does_not_exist.toml")).unwrap();
        assert_eq!(config, KitConfig::default());
    }
}
