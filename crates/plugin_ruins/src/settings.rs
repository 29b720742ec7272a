//! Persisted ruins settings.

use script_api::{DataError, DataStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const SETTINGS_NAME: &str = "ruins";

pub const SETTINGS_VERSION: u32 = 1;

pub const DEFAULT_MODEL_PATH: &str = "scripts/ruins/models";

pub const DEFAULT_CONFIG: &str = r#"# Ruins settings.
version = 1

# A ruin is spawned in a chunk if the chunk's noise value (0 to 127) is
# greater than this threshold. Higher values mean fewer ruins.
threshold = 0

# Directory holding the .cub ruin models
model_path = "scripts/ruins/models"
"#;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for '{key}': {reason}")]
    InvalidKey { key: &'static str, reason: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRuinsSettings {
    pub version: Option<u32>,
    pub threshold: Option<i64>,
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuinsSettings {
    pub version: u32,
    pub threshold: i64,
    pub model_path: PathBuf,
}

impl Default for RuinsSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            threshold: 0,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl RawRuinsSettings {
    pub fn migrate(self) -> Result<RuinsSettings, SettingsError> {
        let defaults = RuinsSettings::default();
        if let Some(version) = self.version {
            if version > SETTINGS_VERSION {
                return Err(SettingsError::InvalidKey {
                    key: "version",
                    reason: format!("unsupported version {version}"),
                });
            }
        }
        let model_path = self.model_path.unwrap_or(defaults.model_path);
        if model_path.as_os_str().is_empty() {
            return Err(SettingsError::InvalidKey {
                key: "model_path",
                reason: "path must not be empty".to_string(),
            });
        }
        Ok(RuinsSettings {
            version: SETTINGS_VERSION,
            threshold: self.threshold.unwrap_or(defaults.threshold),
            model_path,
        })
    }
}

impl RuinsSettings {
    pub fn load(store: &DataStore) -> Result<Self, SettingsError> {
        let raw: RawRuinsSettings = store.load_or_init(SETTINGS_NAME, DEFAULT_CONFIG)?;
        let outdated = raw.version != Some(SETTINGS_VERSION);
        let settings = raw.migrate()?;
        if outdated {
            info!("Migrating {} settings to version {}", SETTINGS_NAME, SETTINGS_VERSION);
            store.save(SETTINGS_NAME, &settings)?;
        }
        Ok(settings)
    }
}
