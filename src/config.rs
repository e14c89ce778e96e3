use std::{
    fs::File,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{WindTunnelError, measurement::AngleUpperBound, measurement::TICK_INTERVAL_MS};

const CONFIG_DIR_NAME: &str = "windtunnel";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 480.,
            height: 760.,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub tick_interval_ms: u64,
    pub angle_upper_bound: AngleUpperBound,
    /// Mark accounts verified as soon as a verification email is sent
    pub auto_verify: bool,
    /// JSON Lines file the local identity provider reads and appends accounts to
    pub accounts_file: Option<PathBuf>,
    pub window_size: WindowSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            angle_upper_bound: AngleUpperBound::default(),
            auto_verify: false,
            accounts_file: None,
            window_size: WindowSize::default(),
        }
    }
}

/// Values given on the command line for one session. They are layered on top of
/// the file config and never written back to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub accounts_file: Option<PathBuf>,
    pub auto_verify: bool,
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the config from the user's config directory. Missing or unreadable
    /// files yield `None`.
    pub fn from_local_file() -> Option<Self> {
        let config_path = Self::default_path()?;
        match Self::from_path(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {:?}: {}", config_path, e);
                None
            }
        }
    }

    /// Load the config an application session starts from, along with whether it
    /// may be saved back on exit. A file that exists but cannot be read is left
    /// untouched, so the session runs on defaults without overwriting it.
    pub fn load_for_session(config_path: &Path) -> (Self, bool) {
        match Self::from_path(config_path) {
            Ok(config) => (config.unwrap_or_default(), true),
            Err(e) => {
                warn!(
                    "Ignoring config file {:?}, it will not be overwritten: {}",
                    config_path, e
                );
                (Self::default(), false)
            }
        }
    }

    /// This config with the command line values applied.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut config = self.clone();
        if let Some(accounts_file) = &overrides.accounts_file {
            config.accounts_file = Some(accounts_file.clone());
        }
        config.auto_verify |= overrides.auto_verify;
        config
    }

    pub fn from_path(config_path: &Path) -> Result<Option<Self>, WindTunnelError> {
        if !config_path.exists() {
            debug!("No config file at {:?}", config_path);
            return Ok(None);
        }
        let file =
            File::open(config_path).map_err(|e| WindTunnelError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(file)
            .map_err(|e| WindTunnelError::ConfigSerializeError { source: e })?;
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<(), WindTunnelError> {
        let config_path = Self::default_path().ok_or(WindTunnelError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), WindTunnelError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| WindTunnelError::ConfigIOError { source: e })?;
        }

        let file =
            File::create(config_path).map_err(|e| WindTunnelError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| WindTunnelError::ConfigSerializeError { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = AppConfig {
            tick_interval_ms: 50,
            angle_upper_bound: AngleUpperBound::Degrees(20),
            auto_verify: true,
            accounts_file: Some(temp_dir.path().join("accounts.jsonl")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::from_path(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{\"auto_verify\": true}").unwrap();

        let loaded = AppConfig::from_path(&path).unwrap().unwrap();
        assert!(loaded.auto_verify);
        assert_eq!(loaded.tick_interval_ms, TICK_INTERVAL_MS);
        assert_eq!(loaded.angle_upper_bound, AngleUpperBound::ProfileMaxSpeed);
    }

    #[test]
    fn test_overrides_are_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        let file_config = AppConfig {
            tick_interval_ms: 250,
            ..Default::default()
        };
        file_config.save_to(&path).unwrap();

        let (saved, writable) = AppConfig::load_for_session(&path);
        assert!(writable);
        let overrides = ConfigOverrides {
            accounts_file: Some(temp_dir.path().join("session.jsonl")),
            auto_verify: true,
        };
        let effective = saved.with_overrides(&overrides);
        assert_eq!(effective.accounts_file, overrides.accounts_file);
        assert!(effective.auto_verify);
        assert_eq!(effective.tick_interval_ms, 250);

        // what the app writes back on exit
        saved.save_to(&path).unwrap();
        assert_eq!(AppConfig::from_path(&path).unwrap(), Some(file_config));
    }

    #[test]
    fn test_overrides_keep_file_values_when_absent() {
        let file_config = AppConfig {
            auto_verify: true,
            accounts_file: Some(PathBuf::from("accounts.jsonl")),
            ..Default::default()
        };
        assert_eq!(
            file_config.with_overrides(&ConfigOverrides::default()),
            file_config
        );
    }

    #[test]
    fn test_session_load_protects_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let (config, writable) = AppConfig::load_for_session(&path);
        assert_eq!(config, AppConfig::default());
        assert!(writable);

        std::fs::write(&path, "{ broken").unwrap();
        let (config, writable) = AppConfig::load_for_session(&path);
        assert_eq!(config, AppConfig::default());
        assert!(!writable);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        assert!(AppConfig::from_path(&path).unwrap().is_none());

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppConfig::from_path(&path),
            Err(WindTunnelError::ConfigSerializeError { .. })
        ));
    }
}
