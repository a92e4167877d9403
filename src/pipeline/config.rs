//! Persisted pipeline configuration.
//!
//! The configuration document holds the saved presets, the current
//! settings for each stage and the session values (last folders and save
//! size). It is stored as pretty-printed JSON.
//!
//! Loading is tolerant of a bad current selection: a missing or malformed
//! `current_*` entry is dropped with a warning, and the coordinator falls
//! back to the first preset of that type. A document that is not valid
//! JSON, or has the wrong shape, is an error.

use crate::core::error::{ConfigError, ConfigResult};
use crate::pipeline::settings::{FilmSettings, LensSettings, ProcessingSettings};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Read a whole document from disk.
pub(crate) fn read_document(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|error| ConfigError::Io {
        path: path.display().to_string(),
        error,
    })
}

/// Write a whole document to disk, creating the parent directory if needed.
pub(crate) fn write_document(path: &Path, contents: &str) -> ConfigResult<()> {
    let io_error = |error| ConfigError::Io {
        path: path.display().to_string(),
        error,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, contents).map_err(io_error)
}

/// Deserialize an optional value, dropping it with a warning if malformed.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match serde_json::from_value(value) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("Ignoring malformed current settings: {}", e);
            None
        }
    }))
}

/// The persisted configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicPrintConfig {
    /// Document format version
    pub version: String,
    /// Folder the last photo was opened from
    #[serde(default)]
    pub last_photo_folder: String,
    /// Folder the last print was saved to
    #[serde(default)]
    pub last_save_folder: String,
    /// Width of the last save, 0 for original size
    #[serde(default)]
    pub last_save_width: u32,
    /// Height of the last save, 0 for original size
    #[serde(default)]
    pub last_save_height: u32,
    /// Saved lens presets
    #[serde(default)]
    pub lenses: Vec<LensSettings>,
    /// Saved film presets
    #[serde(default)]
    pub films: Vec<FilmSettings>,
    /// Saved processing presets
    #[serde(default)]
    pub processes: Vec<ProcessingSettings>,
    /// Current lens settings
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_lens: Option<LensSettings>,
    /// Current film settings
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_film: Option<FilmSettings>,
    /// Current processing settings
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_processing: Option<ProcessingSettings>,
}

impl ClassicPrintConfig {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    /// Create an empty configuration.
    pub fn new() -> Self {
        Self {
            version: Self::VERSION.to_string(),
            last_photo_folder: String::new(),
            last_save_folder: String::new(),
            last_save_width: 0,
            last_save_height: 0,
            lenses: Vec::new(),
            films: Vec::new(),
            processes: Vec::new(),
            current_lens: None,
            current_film: None,
            current_processing: None,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.check_version()?;
        Ok(config)
    }

    fn check_version(&self) -> ConfigResult<()> {
        let major = Self::VERSION.split('.').next();
        if self.version.split('.').next() != major {
            return Err(ConfigError::InvalidDocument {
                reason: format!(
                    "unsupported configuration version {} (expected {})",
                    self.version,
                    Self::VERSION
                ),
            });
        }
        Ok(())
    }

    /// Load a configuration document from disk.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&read_document(path)?)?;
        info!(
            "Loaded configuration from {} ({} lenses, {} films, {} processes)",
            path.display(),
            config.lenses.len(),
            config.films.len(),
            config.processes.len()
        );
        Ok(config)
    }

    /// Save the configuration to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        write_document(path, &self.to_json()?)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Current lens, or the first saved lens.
    pub fn effective_lens(&self) -> Option<LensSettings> {
        self.current_lens.clone().or_else(|| self.lenses.first().cloned())
    }

    /// Current film, or the first saved film.
    pub fn effective_film(&self) -> Option<FilmSettings> {
        self.current_film.clone().or_else(|| self.films.first().cloned())
    }

    /// Current processing, or the first saved processing.
    pub fn effective_processing(&self) -> Option<ProcessingSettings> {
        self.current_processing
            .clone()
            .or_else(|| self.processes.first().cloned())
    }
}

impl Default for ClassicPrintConfig {
    fn default() -> Self {
        Self::new()
    }
}
