//! Runtime configuration, stored as JSON.
//!
//! Every field has a default, so a file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub panel: PanelConfig,
    pub window: WindowConfig,
    pub feed: FeedConfig,
    pub clock: ClockConfig,
    pub scene: SceneConfig,
    /// 0 disables the frame cap
    pub max_fps: u32,
    pub control_socket: PathBuf,
}

/// The LED matrix itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub width: u32,
    pub height: u32,
    /// Quarter turns, 0..=3
    pub rotation: u8,
    pub brightness: u8,
}

/// Desktop preview window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Screen pixels per panel pixel
    pub scale: u32,
    pub vsync: bool,
}

/// MQTT broker the weather observations arrive on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Local time offset from UTC
    pub utc_offset_secs: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub icon_size: u32,
    pub subpixel_bits: u32,
    pub thumbnail_scale: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelConfig::default(),
            window: WindowConfig::default(),
            feed: FeedConfig::default(),
            clock: ClockConfig::default(),
            scene: SceneConfig::default(),
            max_fps: 45,
            control_socket: PathBuf::from("/tmp/skyframe.sock"),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            rotation: 0,
            brightness: 255,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            scale: 10,
            vsync: true,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            topic: "skyframe/weather".to_string(),
            client_id: "skyframe".to_string(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_secs: 10 * 3600,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            icon_size: 32,
            subpixel_bits: 7,
            thumbnail_scale: 4,
        }
    }
}

impl Config {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("skyframe-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!((config.panel.width, config.panel.height), (64, 64));
        assert_eq!(config.panel.brightness, 255);
        assert_eq!(config.feed.port, 1883);
        assert_eq!(config.clock.utc_offset_secs, 36000);
        assert_eq!(config.scene.subpixel_bits, 7);
        assert_eq!(config.max_fps, 45);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"panel": {"rotation": 1}, "feed": {"host": "broker.lan"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.panel.rotation, 1);
        assert_eq!(config.panel.width, 64);
        assert_eq!(config.feed.host, "broker.lan");
        assert_eq!(config.feed.topic, "skyframe/weather");
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        let mut config = Config::default();
        config.panel.brightness = 40;
        config.clock.utc_offset_secs = -18000;
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_errors() {
        let missing = temp_path("missing");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = temp_path("broken");
        fs::write(&broken, "{ not json").unwrap();
        let result = Config::load(&broken);
        let _ = fs::remove_file(&broken);
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }
}
