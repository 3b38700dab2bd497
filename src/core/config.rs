use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::alerts::store::DEFAULT_MAX_ALERTS;
use super::error::ConfigError;
use super::sensors::wargaming::DEFAULT_MAX_ROUNDS;
use super::timeline::DEFAULT_TIMELINE_CAPACITY;

pub const SETTINGS_FILE: &str = "settings.json";
/// Environment variable pointing at the directory holding `settings.json`.
pub const CONFIG_DIR_ENV: &str = "SHAHEEN_CONFIG_DIR";

/// Dashboard settings. Every field falls back to its default when missing
/// from the settings file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub max_alerts: usize,
    pub toast_duration_secs: u64,
    /// Cadence of the hyperspectral/illuminance demo triggers
    pub producer_interval_secs: u64,
    pub stats_interval_secs: u64,
    pub audio_interval_secs: u64,
    pub wargame_round_millis: u64,
    pub wargame_max_rounds: u32,
    pub timeline_capacity: usize,
    /// 0 runs until Ctrl-C
    pub run_seconds: u64,
    pub autostart_wargame: bool,
    /// Fixed seed for reproducible demo runs
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_alerts: DEFAULT_MAX_ALERTS,
            toast_duration_secs: 5,
            producer_interval_secs: 5,
            stats_interval_secs: 3,
            audio_interval_secs: 2,
            wargame_round_millis: 500,
            wargame_max_rounds: DEFAULT_MAX_ROUNDS,
            timeline_capacity: DEFAULT_TIMELINE_CAPACITY,
            run_seconds: 0,
            autostart_wargame: true,
            rng_seed: None,
        }
    }
}

impl Settings {
    /// Clamp values that would stall timers or empty the stores.
    pub fn normalized(mut self) -> Self {
        self.max_alerts = self.max_alerts.max(1);
        self.toast_duration_secs = self.toast_duration_secs.max(1);
        self.producer_interval_secs = self.producer_interval_secs.max(1);
        self.stats_interval_secs = self.stats_interval_secs.max(1);
        self.audio_interval_secs = self.audio_interval_secs.max(1);
        self.wargame_round_millis = self.wargame_round_millis.max(1);
        self.wargame_max_rounds = self.wargame_max_rounds.max(1);
        self.timeline_capacity = self.timeline_capacity.max(1);
        self
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_duration_secs)
    }

    pub fn producer_interval(&self) -> Duration {
        Duration::from_secs(self.producer_interval_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn audio_interval(&self) -> Duration {
        Duration::from_secs(self.audio_interval_secs)
    }

    pub fn wargame_round_interval(&self) -> Duration {
        Duration::from_millis(self.wargame_round_millis)
    }

    pub fn run_time(&self) -> Option<Duration> {
        (self.run_seconds > 0).then(|| Duration::from_secs(self.run_seconds))
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_path: config_dir.join(SETTINGS_FILE),
        }
    }

    /// Use `$SHAHEEN_CONFIG_DIR`, falling back to the working directory.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable.
    pub fn load(&self) -> Settings {
        if !self.config_path.exists() {
            return Settings::default();
        }
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring {}: {}", self.config_path.display(), e);
                Settings::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<Settings, ConfigError> {
        let content = fs::read_to_string(&self.config_path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings.normalized())
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let default = manager.load();
        assert_eq!(default.max_alerts, 100);
        assert_eq!(default.toast_duration(), Duration::from_secs(5));

        let new_settings = Settings {
            max_alerts: 25,
            run_seconds: 30,
            rng_seed: Some(9),
            ..Settings::default()
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded, new_settings);
        assert_eq!(loaded.run_time(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(manager.path(), r#"{ "max_alerts": 0, "stats_interval_secs": 7 }"#).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.max_alerts, 1);
        assert_eq!(loaded.stats_interval_secs, 7);
        assert_eq!(loaded.audio_interval_secs, 2);
        assert_eq!(loaded.run_time(), None);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(manager.path(), "not json").unwrap();

        assert!(matches!(manager.try_load(), Err(ConfigError::Parse(_))));
        assert_eq!(manager.load(), Settings::default());
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("nested").join("config"));
        manager.save(&Settings::default()).unwrap();
        assert!(manager.path().exists());
    }
}
