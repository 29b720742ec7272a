//! Configuration management for the script host.
//!
//! This module handles loading and validation of the host configuration
//! from a TOML file; command-line overrides are applied by the application.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default tick interval for serde deserialization
fn default_tick_interval() -> u64 {
    50 // 20 ticks per second
}

/// Scripts the host knows how to create.
pub const KNOWN_SCRIPTS: [&str; 4] = ["capture_the_flag", "advanced_pvp", "ruins", "random_events"];

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulated world settings
    pub server: ServerSettings,
    /// Script selection
    pub scripts: ScriptSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// World and tick settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Server tick interval in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Directory scripts keep their settings documents in
    pub data_dir: PathBuf,
    /// World seed reported to scripts
    #[serde(default)]
    pub world_seed: u32,
    /// Player names allowed to run admin commands
    #[serde(default)]
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSettings {
    /// Scripts to load, in load order
    pub enabled: Vec<String>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                tick_interval_ms: default_tick_interval(),
                data_dir: PathBuf::from("config"),
                world_seed: 0,
                admins: vec![],
            },
            scripts: ScriptSettings {
                enabled: vec!["capture_the_flag".to_string()],
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the specified path
    /// and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Whether `name` may run admin commands.
    pub fn is_admin(&self, name: &str) -> bool {
        self.server.admins.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.tick_interval_ms == 0 {
            return Err("Tick interval must be greater than zero".to_string());
        }

        if self.server.data_dir.as_os_str().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }

        let mut seen = Vec::new();
        for name in &self.scripts.enabled {
            if !KNOWN_SCRIPTS.contains(&name.as_str()) {
                return Err(format!(
                    "Unknown script: {}. Must be one of: {KNOWN_SCRIPTS:?}",
                    name
                ));
            }
            if seen.contains(&name) {
                return Err(format!("Script {} is enabled twice", name));
            }
            seen.push(name);
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.server.tick_interval_ms, 50);
        assert_eq!(config.server.data_dir, PathBuf::from("config"));
        assert!(config.server.admins.is_empty());
        assert_eq!(config.scripts.enabled, vec!["capture_the_flag".to_string()]);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.tick_interval_ms = 0;
        assert!(config.validate().is_err());
        config.server.tick_interval_ms = 100;

        config.scripts.enabled.push("teleporter".to_string());
        assert!(config.validate().unwrap_err().contains("teleporter"));
        config.scripts.enabled = vec!["ruins".to_string(), "ruins".to_string()];
        assert!(config.validate().is_err());
        config.scripts.enabled = vec!["ruins".to_string()];

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_admin_names_ignore_case() {
        let mut config = AppConfig::default();
        config.server.admins = vec!["Bjoern".to_string()];
        assert!(config.is_admin("bjoern"));
        assert!(!config.is_admin("guest"));
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(config.server.tick_interval_ms, 50);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("[server]"));
        assert!(written.contains("[scripts]"));
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
data_dir = "data"
world_seed = 7
admins = ["admin"]

[scripts]
enabled = ["advanced_pvp", "random_events"]

[logging]
level = "debug"
json_format = true
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.server.tick_interval_ms, 50);
        assert_eq!(config.server.world_seed, 7);
        assert!(config.is_admin("admin"));
        assert_eq!(config.scripts.enabled.len(), 2);
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }
}
