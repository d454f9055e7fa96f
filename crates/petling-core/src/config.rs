//! TOML-based application configuration.
//!
//! Stores user preferences: the pet profile and notification settings for
//! the presentation/audio layer. Engine and gate thresholds are deliberately
//! not configurable.
//!
//! Configuration is stored at `~/.config/petling/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::storage::data_dir;

/// Pet profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetConfig {
    #[serde(default = "default_pet_name")]
    pub name: String,
}

/// Notification configuration, consumed by the audio/UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/petling/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pet: PetConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_pet_name() -> String {
    "Pip".into()
}
fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    50
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            name: default_pet_name(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pet: PetConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing (and returning) the default when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as a string by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "pet.name" => Some(self.pet.name.clone()),
            "notifications.enabled" => Some(self.notifications.enabled.to_string()),
            "notifications.volume" => Some(self.notifications.volume.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dotted key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "pet.name" => self.pet.name = value.to_string(),
            "notifications.enabled" => {
                self.notifications.enabled =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as bool"),
                    })?;
            }
            "notifications.volume" => {
                self.notifications.volume =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as number"),
                    })?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pet.name, "Pip");
        assert_eq!(parsed.notifications.volume, 50);
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn get_supports_dotted_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("pet.name").as_deref(), Some("Pip"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("notifications.missing").is_none());
    }

    #[test]
    fn empty_toml_fills_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.pet.name, "Pip");
        assert_eq!(parsed.notifications.volume, 50);
    }

    #[test]
    fn partial_toml_fills_missing_fields() {
        let parsed: Config = toml::from_str("[pet]\nname = \"Nori\"\n").unwrap();
        assert_eq!(parsed.pet.name, "Nori");
        assert_eq!(parsed.notifications.volume, 50);
    }
}
