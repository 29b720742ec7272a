//! Persistent script data.
//!
//! Each script owns one TOML document under the store's root directory,
//! addressed by a short name (`capture_the_flag` is stored as
//! `<root>/capture_the_flag.toml`). Writes go through a temporary file that
//! is renamed over the target, so readers never observe a half-written
//! document.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while reading or writing script data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not encode data for {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: toml::ser::Error,
    },
}

/// File-backed key/value documents for scripts.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document stored under `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.toml"))
    }

    /// Whether a document named `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Loads the document stored under `name`, or `None` if there is none.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, DataError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        let value = toml::from_str(&content).map_err(|source| DataError::Decode { path, source })?;
        Ok(Some(value))
    }

    /// Loads the document stored under `name`.
    ///
    /// If the document does not exist yet, `template` is written verbatim
    /// first, so the bundled defaults (comments included) end up on disk for
    /// operators to edit.
    pub fn load_or_init<T: DeserializeOwned>(&self, name: &str, template: &str) -> Result<T, DataError> {
        if !self.exists(name) {
            self.write_atomic(&self.path_for(name), template)?;
            info!("Created default data file: {}", self.path_for(name).display());
        }
        let path = self.path_for(name);
        let content = fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| DataError::Decode { path, source })
    }

    /// Serializes `value` and replaces the document stored under `name`.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), DataError> {
        let content = toml::to_string_pretty(value).map_err(|source| DataError::Encode {
            name: name.to_string(),
            source,
        })?;
        self.write_atomic(&self.path_for(name), &content)?;
        debug!("Saved data file {}", name);
        Ok(())
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<(), DataError> {
        let io_err = |source| DataError::Io { path: path.to_path_buf(), source };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }
}
