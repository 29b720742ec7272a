//! Persisted capture the flag settings.
//!
//! The document is read into [`RawCtfSettings`], where every key is
//! optional, and turned into [`CtfSettings`] by a single [`migrate`] pass
//! that fills defaults, converts the legacy flat pole keys and validates
//! values.
//!
//! [`migrate`]: RawCtfSettings::migrate

use script_api::{DataError, DataStore, Relation, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Data store name of the settings document.
pub const SETTINGS_NAME: &str = "capture_the_flag";

/// Current settings document version.
pub const SETTINGS_VERSION: u32 = 1;

/// Written to disk when no settings document exists yet.
pub const DEFAULT_CONFIG: &str = r#"# Capture the flag settings.
version = 1

# Relation between matches. Possible values are:
# 10: friendly players
# 11: friendly
# 12: friendly, named
# 13: players, but can damage each other
# 14: hostile
# 15: friendly, but can damage each other
relation_between_matches = 10

# Whether or not the speed cap is enabled
speed_cap = true

# Whether players gain xp for kills
xp_on_kill = false

# The amount of xp a player gains when killing another player with the same
# level. Only used if xp_on_kill is true.
xp_on_same_level = 25.0

# Whether players gain xp for winning a match
xp_on_win = true

# Whether loot for winners is enabled
loot = true

# Flag pole positions. Set them in game with /setflagpoler and /setflagpoleb.
[red_pole]
x = 0.0
y = 0.0
z = 0.0

[blue_pole]
x = 0.0
y = 0.0
z = 0.0
"#;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for '{key}': {reason}")]
    InvalidKey { key: &'static str, reason: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Settings document as found on disk.
#[derive(Debug, Default, Deserialize)]
pub struct RawCtfSettings {
    pub version: Option<u32>,
    pub relation_between_matches: Option<i64>,
    pub speed_cap: Option<bool>,
    pub xp_on_kill: Option<bool>,
    pub xp_on_same_level: Option<f64>,
    pub xp_on_win: Option<bool>,
    pub loot: Option<bool>,
    pub red_pole: Option<Vec3>,
    pub blue_pole: Option<Vec3>,
    // Unversioned documents.
    pub looting_enabled: Option<bool>,
    pub flag_pole_red_x: Option<f64>,
    pub flag_pole_red_y: Option<f64>,
    pub flag_pole_red_z: Option<f64>,
    pub flag_pole_blue_x: Option<f64>,
    pub flag_pole_blue_y: Option<f64>,
    pub flag_pole_blue_z: Option<f64>,
}

/// Validated settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtfSettings {
    pub version: u32,
    pub relation_between_matches: Relation,
    pub speed_cap: bool,
    pub xp_on_kill: bool,
    pub xp_on_same_level: f64,
    pub xp_on_win: bool,
    pub loot: bool,
    pub red_pole: Vec3,
    pub blue_pole: Vec3,
}

impl Default for CtfSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            relation_between_matches: Relation::FriendlyPlayer,
            speed_cap: true,
            xp_on_kill: false,
            xp_on_same_level: 25.0,
            xp_on_win: true,
            loot: true,
            red_pole: Vec3::ZERO,
            blue_pole: Vec3::ZERO,
        }
    }
}

fn legacy_pole(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Option<Vec3> {
    if x.is_none() && y.is_none() && z.is_none() {
        return None;
    }
    Some(Vec3::new(x.unwrap_or(0.0), y.unwrap_or(0.0), z.unwrap_or(0.0)))
}

fn finite_pole(key: &'static str, pole: Vec3) -> Result<Vec3, SettingsError> {
    if pole.x.is_finite() && pole.y.is_finite() && pole.z.is_finite() {
        Ok(pole)
    } else {
        Err(SettingsError::InvalidKey { key, reason: "coordinates must be finite".to_string() })
    }
}

impl RawCtfSettings {
    /// Upgrades the document to the current version and validates it.
    pub fn migrate(self) -> Result<CtfSettings, SettingsError> {
        let defaults = CtfSettings::default();

        if let Some(version) = self.version {
            if version > SETTINGS_VERSION {
                return Err(SettingsError::InvalidKey {
                    key: "version",
                    reason: format!("unsupported version {version}"),
                });
            }
        }

        let relation_between_matches = match self.relation_between_matches {
            None => defaults.relation_between_matches,
            Some(code) => u8::try_from(code)
                .ok()
                .and_then(|code| Relation::try_from(code).ok())
                .ok_or_else(|| SettingsError::InvalidKey {
                    key: "relation_between_matches",
                    reason: format!("{code} is not a relation between 10 and 15"),
                })?,
        };

        let xp_on_same_level = self.xp_on_same_level.unwrap_or(defaults.xp_on_same_level);
        if !xp_on_same_level.is_finite() || xp_on_same_level < 0.0 {
            return Err(SettingsError::InvalidKey {
                key: "xp_on_same_level",
                reason: format!("{xp_on_same_level} is not a non-negative number"),
            });
        }

        let red_pole = self
            .red_pole
            .or_else(|| legacy_pole(self.flag_pole_red_x, self.flag_pole_red_y, self.flag_pole_red_z))
            .unwrap_or(defaults.red_pole);
        let blue_pole = self
            .blue_pole
            .or_else(|| legacy_pole(self.flag_pole_blue_x, self.flag_pole_blue_y, self.flag_pole_blue_z))
            .unwrap_or(defaults.blue_pole);

        Ok(CtfSettings {
            version: SETTINGS_VERSION,
            relation_between_matches,
            speed_cap: self.speed_cap.unwrap_or(defaults.speed_cap),
            xp_on_kill: self.xp_on_kill.unwrap_or(defaults.xp_on_kill),
            xp_on_same_level,
            xp_on_win: self.xp_on_win.unwrap_or(defaults.xp_on_win),
            loot: self.loot.or(self.looting_enabled).unwrap_or(defaults.loot),
            red_pole: finite_pole("red_pole", red_pole)?,
            blue_pole: finite_pole("blue_pole", blue_pole)?,
        })
    }
}

impl CtfSettings {
    /// Loads the settings, writing the default document first if there is
    /// none. Documents from older versions are rewritten in the current
    /// format.
    pub fn load(store: &DataStore) -> Result<Self, SettingsError> {
        let raw: RawCtfSettings = store.load_or_init(SETTINGS_NAME, DEFAULT_CONFIG)?;
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

    /// Experience for killing a player of `killed_level` at `killer_level`.
    pub fn kill_xp(&self, killer_level: u32, killed_level: u32) -> u32 {
        let ratio = killed_level as f64 / killer_level.max(1) as f64;
        ((self.xp_on_same_level * ratio).floor() as u32).max(1)
    }

    /// Experience every winner receives at the end of a match.
    pub fn win_xp(&self) -> u32 {
        ((self.xp_on_same_level * 2.0).floor() as u32).max(1)
    }
}
