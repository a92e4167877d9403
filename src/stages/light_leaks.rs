//! Catalog of light leak overlay images.

use log::{debug, warn};
use rand::{Rng, RngCore};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognised as light leak images.
pub const LEAK_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Light leak images available in one directory.
#[derive(Debug, Clone, Default)]
pub struct LightLeakCatalog {
    directory: Option<PathBuf>,
    files: Vec<String>,
}

impl LightLeakCatalog {
    /// A catalog with no light leaks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// List the `.jpg` and `.png` files directly inside `directory`, sorted by name.
    ///
    /// An unreadable directory yields an empty catalog.
    pub fn scan(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let mut files: Vec<String> = WalkDir::new(&directory)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Cannot read light leak directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| LEAK_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
                    .unwrap_or(false)
            })
            .filter_map(|entry| entry.file_name().to_str().map(String::from))
            .collect();
        files.sort();
        debug!("Found {} light leaks in {}", files.len(), directory.display());

        Self {
            directory: Some(directory),
            files,
        }
    }

    /// The scanned directory.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Light leak file names, sorted.
    pub fn names(&self) -> &[String] {
        &self.files
    }

    /// Number of light leaks.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if there are no light leaks.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Full path of the named leak, if that file exists.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let path = self.directory.as_ref()?.join(name);
        path.is_file().then_some(path)
    }

    /// Pick a leak uniformly among the catalog plus one "no leak" outcome.
    pub fn pick(&self, rng: &mut dyn RngCore) -> Option<&str> {
        if self.files.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..=self.files.len());
        self.files.get(index).map(|s| s.as_str())
    }
}
