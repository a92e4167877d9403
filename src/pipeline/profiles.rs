//! Colour profiles: named 256-entry RGB lookup tables for colourisation.
//!
//! Profiles are stored as a JSON document where each channel is a comma
//! separated list of byte values:
//!
//! ```json
//! { "version": "1.0.0",
//!   "profiles": [ { "name": "Sepia", "red": "0, 1, ...", "green": "...", "blue": "..." } ] }
//! ```

use crate::core::error::{ConfigError, ConfigResult};
use crate::core::types::{pack_rgb, unpack_rgb, PackedRgb};
use crate::filters::builtin::identity_levels;
use crate::pipeline::config::{read_document, write_document};
use image::RgbaImage;
use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Entries in a colour profile.
pub const PROFILE_LEN: usize = 256;

/// One profile as written in the profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColourProfileEntry {
    /// Profile name
    pub name: String,
    /// Red channel bytes, comma separated
    pub red: String,
    /// Green channel bytes, comma separated
    pub green: String,
    /// Blue channel bytes, comma separated
    pub blue: String,
}

/// Serializable colour profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColourProfileDocument {
    /// Document format version
    #[serde(default = "ColourProfileDocument::default_version")]
    pub version: String,
    /// Profiles in table order
    #[serde(default)]
    pub profiles: Vec<ColourProfileEntry>,
}

impl ColourProfileDocument {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    fn default_version() -> String {
        Self::VERSION.to_string()
    }

    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            version: Self::default_version(),
            profiles: Vec::new(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ColourProfileDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a comma separated list of byte values.
///
/// Returns `None` if any entry is not an integer in `0..=255`.
pub fn parse_byte_list(list: &str) -> Option<Vec<u8>> {
    let trimmed = list.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    trimmed.split(',').map(|item| item.trim().parse::<u8>().ok()).collect()
}

/// Format bytes as a `", "` separated list.
pub fn format_byte_list(bytes: &[u8]) -> String {
    bytes.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(", ")
}

/// The neutral profile: entry `i` is `(i, i, i)`.
pub fn neutral_profile() -> Vec<PackedRgb> {
    identity_levels()
}

/// Named colour profiles in table order.
#[derive(Debug, Clone, Default)]
pub struct ColourProfileTable {
    profiles: IndexMap<String, Vec<PackedRgb>>,
}

impl ColourProfileTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a profile. The table must have exactly 256 entries.
    pub fn insert(&mut self, name: impl Into<String>, table: Vec<PackedRgb>) -> ConfigResult<()> {
        let name = name.into();
        if table.len() != PROFILE_LEN {
            return Err(ConfigError::InvalidDocument {
                reason: format!(
                    "colour profile '{}' has {} entries, expected {}",
                    name,
                    table.len(),
                    PROFILE_LEN
                ),
            });
        }
        self.profiles.insert(name, table);
        Ok(())
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Option<&[PackedRgb]> {
        self.profiles.get(name).map(|t| t.as_slice())
    }

    /// Look up a profile by name, falling back to the neutral grey ramp.
    pub fn profile_or_neutral(&self, name: &str) -> Vec<PackedRgb> {
        match self.get(name) {
            Some(table) => table.to_vec(),
            None => neutral_profile(),
        }
    }

    /// Name of the profile at `index`.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.profiles.get_index(index).map(|(name, _)| name.as_str())
    }

    /// Position of the named profile.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.profiles.get_index_of(name)
    }

    /// Profile names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|s| s.as_str())
    }

    /// Number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Build a table from a document, skipping malformed profiles.
    pub fn from_document(document: &ColourProfileDocument) -> Self {
        let mut table = Self::new();
        for entry in &document.profiles {
            let channels = (
                parse_byte_list(&entry.red),
                parse_byte_list(&entry.green),
                parse_byte_list(&entry.blue),
            );
            match channels {
                (Some(r), Some(g), Some(b))
                    if r.len() == PROFILE_LEN && g.len() == PROFILE_LEN && b.len() == PROFILE_LEN =>
                {
                    let levels = (0..PROFILE_LEN).map(|i| pack_rgb(r[i], g[i], b[i])).collect();
                    table.profiles.insert(entry.name.clone(), levels);
                }
                _ => warn!("Skipping colour profile '{}': each channel needs {} byte values", entry.name, PROFILE_LEN),
            }
        }
        table
    }

    /// Convert to a serializable document.
    pub fn to_document(&self) -> ColourProfileDocument {
        let profiles = self
            .profiles
            .iter()
            .map(|(name, levels)| {
                let (mut r, mut g, mut b) = (Vec::new(), Vec::new(), Vec::new());
                for rgb in levels {
                    let (red, green, blue) = unpack_rgb(*rgb);
                    r.push(red);
                    g.push(green);
                    b.push(blue);
                }
                ColourProfileEntry {
                    name: name.clone(),
                    red: format_byte_list(&r),
                    green: format_byte_list(&g),
                    blue: format_byte_list(&b),
                }
            })
            .collect();
        ColourProfileDocument {
            version: ColourProfileDocument::VERSION.to_string(),
            profiles,
        }
    }

    /// Build a table from a lookup image with one profile per three rows.
    ///
    /// Rows `3n`, `3n + 1` and `3n + 2` supply the red, green and blue
    /// curves of profile `n`, named `"Profile {n + 1}"`.
    pub fn from_lookup_image(image: &RgbaImage) -> ConfigResult<Self> {
        if (image.width() as usize) < PROFILE_LEN {
            return Err(ConfigError::InvalidDocument {
                reason: format!("lookup image is {} pixels wide, expected {}", image.width(), PROFILE_LEN),
            });
        }
        let mut table = Self::new();
        for profile in 0..image.height() / 3 {
            let row = profile * 3;
            let levels = (0..PROFILE_LEN as u32)
                .map(|x| {
                    pack_rgb(
                        image.get_pixel(x, row)[0],
                        image.get_pixel(x, row + 1)[1],
                        image.get_pixel(x, row + 2)[2],
                    )
                })
                .collect();
            table.profiles.insert(format!("Profile {}", profile + 1), levels);
        }
        Ok(table)
    }

    /// Load a profile document from disk.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let document = ColourProfileDocument::from_json(&read_document(path)?)?;
        let table = Self::from_document(&document);
        info!("Loaded {} colour profiles from {}", table.len(), path.display());
        Ok(table)
    }

    /// Save the table as a profile document.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        write_document(path.as_ref(), &self.to_document().to_json()?)
    }
}
