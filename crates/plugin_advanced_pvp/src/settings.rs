//! Persisted PVP settings.

use script_api::{DataError, DataStore, Relation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Data store name of the settings document.
pub const SETTINGS_NAME: &str = "advanced_pvp";

pub const SETTINGS_VERSION: u32 = 1;

pub const DEFAULT_CONFIG: &str = r#"# Advanced PVP settings.
version = 1

# Whether players can fight each other
pvp_enabled = true

# Broadcast a chat message when a player kills another player
notify_on_kill = false

# Whether players gain xp for killing other players
gain_xp = true

# How other players are displayed while pvp is enabled:
# friendlyplayer, friendly or hostile
pvp_display = "hostile"
"#;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for '{key}': {reason}")]
    InvalidKey { key: &'static str, reason: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// How players see each other while PVP is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PvpDisplay {
    /// Friendly and shown on the map.
    FriendlyPlayer,
    Friendly,
    Hostile,
}

impl PvpDisplay {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "friendlyplayer" => Some(Self::FriendlyPlayer),
            "friendly" => Some(Self::Friendly),
            "hostile" => Some(Self::Hostile),
            _ => None,
        }
    }

    /// Codes written by unversioned documents.
    fn from_legacy_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::FriendlyPlayer),
            1 => Some(Self::Hostile),
            2 => Some(Self::Friendly),
            _ => None,
        }
    }

    /// Relation between players while PVP is on.
    pub fn relation(self) -> Relation {
        match self {
            Self::FriendlyPlayer => Relation::Rival,
            Self::Friendly => Relation::FriendlyRival,
            Self::Hostile => Relation::Hostile,
        }
    }
}

impl fmt::Display for PvpDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FriendlyPlayer => "friendlyplayer",
            Self::Friendly => "friendly",
            Self::Hostile => "hostile",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawDisplay {
    Name(String),
    Code(i64),
}

/// Settings document as found on disk.
#[derive(Debug, Default, Deserialize)]
pub struct RawPvpSettings {
    pub version: Option<u32>,
    pub pvp_enabled: Option<bool>,
    pub notify_on_kill: Option<bool>,
    pub gain_xp: Option<bool>,
    pub pvp_display: Option<RawDisplay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvpSettings {
    pub version: u32,
    pub pvp_enabled: bool,
    pub notify_on_kill: bool,
    pub gain_xp: bool,
    pub pvp_display: PvpDisplay,
}

impl Default for PvpSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            pvp_enabled: true,
            notify_on_kill: false,
            gain_xp: true,
            pvp_display: PvpDisplay::Hostile,
        }
    }
}

impl RawPvpSettings {
    pub fn migrate(self) -> Result<PvpSettings, SettingsError> {
        let defaults = PvpSettings::default();
        if let Some(version) = self.version {
            if version > SETTINGS_VERSION {
                return Err(SettingsError::InvalidKey {
                    key: "version",
                    reason: format!("unsupported version {version}"),
                });
            }
        }
        let pvp_display = match self.pvp_display {
            None => defaults.pvp_display,
            Some(RawDisplay::Name(name)) => {
                PvpDisplay::parse(&name).ok_or_else(|| SettingsError::InvalidKey {
                    key: "pvp_display",
                    reason: format!("unknown display mode '{name}'"),
                })?
            }
            Some(RawDisplay::Code(code)) => {
                PvpDisplay::from_legacy_code(code).ok_or_else(|| SettingsError::InvalidKey {
                    key: "pvp_display",
                    reason: format!("unknown display code {code}"),
                })?
            }
        };
        Ok(PvpSettings {
            version: SETTINGS_VERSION,
            pvp_enabled: self.pvp_enabled.unwrap_or(defaults.pvp_enabled),
            notify_on_kill: self.notify_on_kill.unwrap_or(defaults.notify_on_kill),
            gain_xp: self.gain_xp.unwrap_or(defaults.gain_xp),
            pvp_display,
        })
    }
}

impl PvpSettings {
    pub fn load(store: &DataStore) -> Result<Self, SettingsError> {
        let raw: RawPvpSettings = store.load_or_init(SETTINGS_NAME, DEFAULT_CONFIG)?;
        let outdated = raw.version != Some(SETTINGS_VERSION);
        let settings = raw.migrate()?;
        if outdated {
            info!("Migrating {} settings to version {}", SETTINGS_NAME, SETTINGS_VERSION);
            settings.save(store)?;
        }
        Ok(settings)
    }

    pub fn save(&self, store: &DataStore) -> Result<(), DataError> {
        store.save(SETTINGS_NAME, self)
    }

    /// The relation every player has to every other player.
    pub fn relation(&self) -> Relation {
        if self.pvp_enabled {
            self.pvp_display.relation()
        } else {
            Relation::FriendlyPlayer
        }
    }

    /// Experience for killing a player of `killed_level` at `killer_level`.
    pub fn kill_xp(killer_level: u32, killed_level: u32) -> u32 {
        let xp = 10.0 * killed_level as f64 / killer_level.max(1) as f64;
        (xp.floor() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PvpSettings, SettingsError> {
        let raw: RawPvpSettings = toml::from_str(text).unwrap();
        raw.migrate()
    }

    #[test]
    fn test_default_document() {
        assert_eq!(parse(DEFAULT_CONFIG).unwrap(), PvpSettings::default());
        assert_eq!(parse("").unwrap(), PvpSettings::default());
    }

    #[test]
    fn test_legacy_display_codes() {
        assert_eq!(parse("pvp_display = 0").unwrap().pvp_display, PvpDisplay::FriendlyPlayer);
        assert_eq!(parse("pvp_display = 2").unwrap().pvp_display, PvpDisplay::Friendly);
        let err = parse("pvp_display = 7").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidKey { key: "pvp_display", .. }));
        let err = parse("pvp_display = \"sideways\"").unwrap_err();
        assert!(err.to_string().contains("pvp_display"));
    }

    #[test]
    fn test_relation() {
        let mut settings = PvpSettings::default();
        assert_eq!(settings.relation(), Relation::Hostile);
        settings.pvp_display = PvpDisplay::FriendlyPlayer;
        assert_eq!(settings.relation(), Relation::Rival);
        settings.pvp_display = PvpDisplay::Friendly;
        assert_eq!(settings.relation(), Relation::FriendlyRival);
        settings.pvp_enabled = false;
        assert_eq!(settings.relation(), Relation::FriendlyPlayer);
    }

    #[test]
    fn test_kill_xp() {
        assert_eq!(PvpSettings::kill_xp(10, 10), 10);
        assert_eq!(PvpSettings::kill_xp(10, 25), 25);
        assert_eq!(PvpSettings::kill_xp(50, 1), 1);
        assert_eq!(PvpSettings::kill_xp(3, 1), 3);
    }

    #[test]
    fn test_load_rewrites_unversioned_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        std::fs::write(store.path_for(SETTINGS_NAME), "pvp_enabled = false\npvp_display = 2\n").unwrap();
        let settings = PvpSettings::load(&store).unwrap();
        assert!(!settings.pvp_enabled);
        let on_disk = std::fs::read_to_string(store.path_for(SETTINGS_NAME)).unwrap();
        assert!(on_disk.contains("version = 1"));
        assert!(on_disk.contains("pvp_display = \"friendly\""));
    }
}
