//! Viewer configuration (window, controls, timing). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use sim::RigSettings;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Persistent viewer settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Radians of camera rotation per pixel of pointer motion.
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f32,
    /// Free-fly speed in units per second.
    #[serde(default = "default_movement_speed")]
    pub movement_speed: f32,
    #[serde(default = "default_fast_multiplier")]
    pub fast_multiplier: f32,
    #[serde(default = "default_slow_multiplier")]
    pub slow_multiplier: f32,
    /// Simulation rate for deterministic fixed stepping. `None` runs one
    /// variable step per rendered frame.
    #[serde(default)]
    pub fixed_step_hz: Option<f64>,
    /// Seed for exhaust particle randomness. `None` seeds from entropy.
    #[serde(default)]
    pub exhaust_seed: Option<u64>,
    #[serde(default)]
    pub start_split_screen: bool,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_mouse_sensitivity() -> f32 {
    0.01
}
fn default_movement_speed() -> f32 {
    5.0
}
fn default_fast_multiplier() -> f32 {
    2.0
}
fn default_slow_multiplier() -> f32 {
    0.5
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            mouse_sensitivity: default_mouse_sensitivity(),
            movement_speed: default_movement_speed(),
            fast_multiplier: default_fast_multiplier(),
            slow_multiplier: default_slow_multiplier(),
            fixed_step_hz: None,
            exhaust_seed: None,
            start_split_screen: false,
        }
    }
}

impl ViewerConfig {
    /// Load config from `config.ron`. A missing file gives the defaults; an
    /// unreadable or invalid one is logged and also gives the defaults.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data)
    }

    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(data)?)
    }

    pub fn rig_settings(&self) -> RigSettings {
        RigSettings {
            movement_speed: self.movement_speed,
            fast_multiplier: self.fast_multiplier,
            slow_multiplier: self.slow_multiplier,
            mouse_sensitivity: self.mouse_sensitivity,
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_struct_gives_defaults() {
        let config = ViewerConfig::from_ron("()").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.rig_settings(), RigSettings::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = ViewerConfig::from_ron(
            "(vsync: false, movement_speed: 12.5, fixed_step_hz: Some(120.0), exhaust_seed: Some(9))",
        )
        .unwrap();
        assert!(!config.vsync);
        assert_eq!(config.movement_speed, 12.5);
        assert_eq!(config.fixed_step_hz, Some(120.0));
        assert_eq!(config.exhaust_seed, Some(9));
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.mouse_sensitivity, 0.01);
    }

    #[test]
    fn invalid_config_is_a_parse_error() {
        let err = ViewerConfig::from_ron("(window_width: \"wide\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ViewerConfig::load_from(Path::new("/nonexistent/lander/config.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn round_trips_through_ron() {
        let config = ViewerConfig {
            start_split_screen: true,
            ..Default::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(ViewerConfig::from_ron(&text).unwrap(), config);
    }
}
