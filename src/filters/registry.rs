//! Filter registry for managing available filter types.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::{Filter, FilterMetadata};
use crate::filters::resources::Resources;
use indexmap::IndexMap;
use std::sync::Arc;

/// Factory function for creating filter instances.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// Registry entry containing metadata and factory.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: FilterFactory,
    /// Cached metadata (avoids creating instance just to get metadata).
    pub metadata: FilterMetadata,
}

/// Registry for all available filter types.
///
/// Maps a filter name to a constructor producing a fresh, default
/// configured instance. Filters are cheap values; the only shared state
/// is the [`Resources`] handed to filters that need a texture.
pub struct FilterRegistry {
    /// Filters indexed by their name.
    filters: IndexMap<String, RegistryEntry>,
    /// Resources captured by filter factories.
    resources: Arc<Resources>,
}

impl FilterRegistry {
    /// Create a new empty registry with no resources.
    pub fn new() -> Self {
        Self::empty_with(Resources::empty())
    }

    fn empty_with(resources: Resources) -> Self {
        Self {
            filters: IndexMap::new(),
            resources: Arc::new(resources),
        }
    }

    /// Create a registry pre-populated with built-in filters, using a
    /// generated noise texture.
    pub fn with_builtins() -> Self {
        Self::with_resources(Resources::generated())
    }

    /// Create a registry pre-populated with built-in filters that share
    /// the given resources.
    pub fn with_resources(resources: Resources) -> Self {
        let mut registry = Self::empty_with(resources);

        // Register built-in filters
        crate::filters::builtin::register_all(&mut registry);

        registry
    }

    /// Resources available to filter factories.
    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    /// Register a filter type, replacing any filter with the same name.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Filter> + Send + Sync + 'static,
    {
        // Create a temporary instance to get metadata
        let instance = factory();
        let metadata = instance.metadata();
        let name = metadata.name.clone();

        let entry = RegistryEntry {
            factory: Arc::new(factory),
            metadata,
        };

        self.filters.insert(name, entry);
    }

    /// Create a new instance of a filter by name.
    pub fn create(&self, name: &str) -> FilterResult<Box<dyn Filter>> {
        self.filters
            .get(name)
            .map(|e| (e.factory)())
            .ok_or_else(|| FilterError::UnknownFilter {
                name: name.to_string(),
            })
    }

    /// Get metadata for a filter without creating an instance.
    pub fn get_metadata(&self, name: &str) -> Option<&FilterMetadata> {
        self.filters.get(name).map(|e| &e.metadata)
    }

    /// Check if a filter is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Get all registered filter names, in registration order.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(|s| s.as_str())
    }

    /// Get all registered filters.
    pub fn filters(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Unregister a filter.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.filters.shift_remove(name).is_some()
    }

    /// Get the total number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::builtin::{ContrastFilter, NoiseFilter};

    #[test]
    fn test_register_and_create() {
        let mut registry = FilterRegistry::new();
        registry.register(|| Box::new(ContrastFilter::new()));

        assert!(registry.contains("Contrast"));
        let filter = registry.create("Contrast");
        assert!(filter.is_ok());
        assert_eq!(filter.map(|f| f.name()).ok(), Some("Contrast"));
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::with_builtins();
        match registry.create("Sharpen") {
            Err(FilterError::UnknownFilter { name }) => assert_eq!(name, "Sharpen"),
            other => panic!("expected UnknownFilter, got {:?}", other.map(|f| f.name())),
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = FilterRegistry::with_builtins();
        let names: Vec<&str> = registry.filter_names().collect();
        assert_eq!(
            names,
            vec!["Levels", "Contrast", "Noise", "Vignette", "Frame", "Blend", "ColourLookup"]
        );
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_metadata_lookup() {
        let registry = FilterRegistry::with_builtins();
        let metadata = registry.get_metadata("Vignette");
        assert!(metadata.is_some());
        assert_eq!(
            metadata.map(|m| m.description.as_str()),
            Some("Applies or fixes a vignette effect")
        );
        assert!(registry.get_metadata("Sharpen").is_none());
    }

    #[test]
    fn test_each_create_is_fresh() {
        let registry = FilterRegistry::with_builtins();
        let mut first = registry.create("Contrast").unwrap();
        first
            .set_option(ContrastFilter::PERCENT, 40.0.into())
            .unwrap();
        let second = registry.create("Contrast").unwrap();
        assert_eq!(second.option(ContrastFilter::PERCENT).as_float(), Some(0.0));
    }

    #[test]
    fn test_resources_shared_with_noise() {
        let registry = FilterRegistry::with_builtins();
        let noise = registry.create("Noise").unwrap();
        assert!(!noise.option(NoiseFilter::TEXTURE).is_none());

        let registry = FilterRegistry::with_resources(Resources::empty());
        let noise = registry.create("Noise").unwrap();
        assert!(noise.option(NoiseFilter::TEXTURE).is_none());
    }

    #[test]
    fn test_unregister() {
        let mut registry = FilterRegistry::with_builtins();
        assert!(registry.unregister("Blend"));
        assert!(!registry.contains("Blend"));
        assert!(!registry.unregister("Blend"));
        assert!(registry.create("Blend").is_err());
    }
}
