//! Named preset collections.

use crate::core::error::{PipelineError, PipelineResult};
use crate::pipeline::settings::Preset;
use indexmap::IndexMap;

/// Presets of one settings type, keyed by name.
///
/// Names are unique: adding a preset under an existing name drops the old
/// entry and appends the new one. Index order is insertion order.
#[derive(Debug, Clone)]
pub struct PresetCollection<T: Preset> {
    presets: IndexMap<String, T>,
}

impl<T: Preset> PresetCollection<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            presets: IndexMap::new(),
        }
    }

    /// Add a preset, replacing any preset with the same name.
    pub fn add(&mut self, preset: T) {
        let name = preset.name().to_string();
        self.presets.shift_remove(&name);
        self.presets.insert(name, preset);
    }

    /// Delete the named preset.
    pub fn delete(&mut self, name: &str) -> PipelineResult<T> {
        self.presets
            .shift_remove(name)
            .ok_or_else(|| PipelineError::PresetNotFound {
                kind: T::KIND,
                name: name.to_string(),
            })
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.presets.get(name)
    }

    /// Look up a preset by name, failing with `PresetNotFound`.
    pub fn require(&self, name: &str) -> PipelineResult<&T> {
        self.get(name).ok_or_else(|| PipelineError::PresetNotFound {
            kind: T::KIND,
            name: name.to_string(),
        })
    }

    /// Look up a preset by position.
    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.presets.get_index(index).map(|(_, preset)| preset)
    }

    /// The first preset, if any.
    pub fn first(&self) -> Option<&T> {
        self.get_by_index(0)
    }

    /// Check if a preset exists.
    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    /// Preset names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(|s| s.as_str())
    }

    /// Presets in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.presets.values()
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl<T: Preset> Default for PresetCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Preset> FromIterator<T> for PresetCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for preset in iter {
            collection.add(preset);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StageKind;
    use crate::pipeline::settings::FilmSettings;

    #[test]
    fn test_add_and_index() {
        let mut films = PresetCollection::new();
        films.add(FilmSettings::new("Warm").with_temperature(80.0));
        films.add(FilmSettings::new("Cold").with_temperature(10.0));

        assert_eq!(films.len(), 2);
        assert_eq!(films.get_by_index(0).map(|f| f.name.as_str()), Some("Warm"));
        assert_eq!(films.get_by_index(1).map(|f| f.name.as_str()), Some("Cold"));
        assert!(films.get_by_index(2).is_none());
    }

    #[test]
    fn test_add_overwrites_same_name() {
        let mut films = PresetCollection::new();
        films.add(FilmSettings::new("Warm").with_temperature(80.0));
        films.add(FilmSettings::new("Cold"));
        films.add(FilmSettings::new("Warm").with_temperature(60.0));

        assert_eq!(films.len(), 2);
        assert_eq!(films.get("Warm").map(|f| f.temperature_percent), Some(60.0));
        assert_eq!(films.names().collect::<Vec<_>>(), vec!["Cold", "Warm"]);
    }

    #[test]
    fn test_delete() {
        let mut films: PresetCollection<FilmSettings> =
            vec![FilmSettings::new("Warm"), FilmSettings::new("Cold")].into_iter().collect();

        assert!(films.delete("Warm").is_ok());
        assert!(!films.contains("Warm"));
        match films.delete("Warm") {
            Err(PipelineError::PresetNotFound { kind, name }) => {
                assert_eq!(kind, StageKind::Film);
                assert_eq!(name, "Warm");
            }
            other => panic!("expected PresetNotFound, got {:?}", other),
        }
        assert_eq!(films.len(), 1);
    }

    #[test]
    fn test_require() {
        let films: PresetCollection<FilmSettings> = vec![FilmSettings::new("Warm")].into_iter().collect();
        assert!(films.require("Warm").is_ok());
        assert!(films.require("Sepia").is_err());
        assert_eq!(films.first().map(|f| f.name.as_str()), Some("Warm"));
    }
}
