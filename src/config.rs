// Configuration File Support
//
// This module provides configuration file parsing for the profile dashboard client.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory: ~/.config/profile-dashboard/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rate_limit::{QuotaPolicy, MAX_UPDATES, WINDOW_DAYS};

/// Longest accepted quota window (100 years)
const MAX_WINDOW_DAYS: u32 = 36_500;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Remote API configuration
    pub api: ApiConfig,

    /// Local state storage configuration
    pub storage: StorageConfig,

    /// Profile update quota
    pub quota: QuotaConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the user API
    pub base_url: String,

    /// Value of the `x-api-key` header
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Local state storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Whether state survives restarts; false keeps everything in memory
    pub persistent: bool,

    /// State file path (defaults to the XDG data directory)
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            path: None,
        }
    }
}

/// Profile update quota configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuotaConfig {
    /// Updates allowed per window
    pub max_updates: u32,

    /// Window length in days
    pub window_days: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_updates: MAX_UPDATES,
            window_days: WINDOW_DAYS,
        }
    }
}

impl QuotaConfig {
    /// Policy enforced by the tracker
    pub fn policy(&self) -> QuotaPolicy {
        QuotaPolicy::from_days(self.max_updates, self.window_days)
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// the resulting configuration is invalid.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?;
            tracing::info!("Loaded configuration from {:?}", path);
            config
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        let config = config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/profile-dashboard/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        match Self::project_dirs() {
            Some(dirs) => dirs.config_dir().join("config.toml"),
            None => Self::home_fallback(".config").join("config.toml"),
        }
    }

    /// Path of the persisted client state
    pub fn state_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return PathBuf::from(path);
        }
        match Self::project_dirs() {
            Some(dirs) => dirs.data_dir().join("state.json"),
            None => Self::home_fallback(".local/share").join("state.json"),
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "profile-dashboard", "profile-dashboard")
    }

    fn home_fallback(subdir: &str) -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(subdir).join("profile-dashboard")
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - PROFILE_DASHBOARD_LOG_LEVEL
    /// - PROFILE_DASHBOARD_LOG_FORMAT
    /// - PROFILE_DASHBOARD_API_URL
    /// - PROFILE_DASHBOARD_API_KEY
    /// - PROFILE_DASHBOARD_STATE_PATH
    /// - PROFILE_DASHBOARD_MAX_UPDATES
    /// - PROFILE_DASHBOARD_WINDOW_DAYS
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("PROFILE_DASHBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PROFILE_DASHBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(url) = std::env::var("PROFILE_DASHBOARD_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(key) = std::env::var("PROFILE_DASHBOARD_API_KEY") {
            self.api.api_key = Some(key);
        }

        if let Ok(path) = std::env::var("PROFILE_DASHBOARD_STATE_PATH") {
            self.storage.path = Some(path);
        }

        if let Ok(max) = std::env::var("PROFILE_DASHBOARD_MAX_UPDATES") {
            if let Ok(max) = max.parse::<u32>() {
                self.quota.max_updates = max;
            }
        }
        if let Ok(days) = std::env::var("PROFILE_DASHBOARD_WINDOW_DAYS") {
            if let Ok(days) = days.parse::<u32>() {
                if days > 0 {
                    self.quota.window_days = days;
                }
            }
        }

        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        let url = self.api.base_url.trim();
        if url.is_empty() {
            anyhow::bail!("API base URL must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("API base URL must start with http:// or https://: {}", url);
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("API timeout must be > 0");
        }

        if self.quota.window_days == 0 {
            anyhow::bail!("Quota window must be at least 1 day");
        }
        if self.quota.window_days > MAX_WINDOW_DAYS {
            anyhow::bail!(
                "Quota window must be at most {} days, got {}",
                MAX_WINDOW_DAYS,
                self.quota.window_days
            );
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.storage.persistent);
        assert_eq!(config.quota.max_updates, 2);
        assert_eq!(config.quota.window_days, 7);
        assert_eq!(config.quota.policy(), QuotaPolicy::default());
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:5000".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_window() {
        let mut config = Config::default();
        config.quota.window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_window_upper_bound() {
        let mut config = Config::default();
        config.quota.window_days = MAX_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.quota.window_days = 1_000_000_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://api.example.com"
api_key = "client-key"

[quota]
max_updates = 3
"#
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.api_key.as_deref(), Some("client-key"));
        assert_eq!(config.quota.max_updates, 3);
        assert_eq!(config.quota.window_days, 7);
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.quota, QuotaConfig::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_state_path_override() {
        let mut config = Config::default();
        config.storage.path = Some("/tmp/state.json".to_string());
        assert_eq!(config.state_path(), PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_log_level() {
        let config = Config::default();
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
