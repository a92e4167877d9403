//! The filter capability interface and its metadata.

use crate::core::error::{FilterError, FilterResult};
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use image::RgbaImage;
use std::fmt;

/// Kind of value an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// A percentage, normally 0 to 100.
    Percent,
    /// A whole number.
    Integer,
    /// An on/off switch.
    Boolean,
    /// A channel mask string such as `"rgb"`.
    ChannelMask,
    /// A 256-entry list of packed RGB values.
    RgbTable,
    /// A file path, or an already decoded image.
    ImageSource,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Percent => "percent",
            OptionKind::Integer => "integer",
            OptionKind::Boolean => "boolean",
            OptionKind::ChannelMask => "channel mask",
            OptionKind::RgbTable => "rgb table",
            OptionKind::ImageSource => "image",
        };
        f.write_str(name)
    }
}

/// Describes one option a filter understands.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    /// Key used with [`Filter::set_option`]
    pub key: OptionKey,
    /// Short label, e.g. "radius"
    pub name: String,
    /// Accepted value kind
    pub kind: OptionKind,
    /// Value a freshly constructed filter reports
    pub default_value: OptionValue,
    /// Human readable description
    pub description: String,
}

impl OptionDefinition {
    /// Create a new option definition.
    pub fn new(key: OptionKey, name: impl Into<String>, kind: OptionKind, default_value: OptionValue) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
            default_value,
            description: String::new(),
        }
    }

    /// A percentage option.
    pub fn percent(key: OptionKey, name: impl Into<String>, default: f64) -> Self {
        Self::new(key, name, OptionKind::Percent, OptionValue::Float(default))
    }

    /// The shared channel mask option.
    pub fn channels(default: &str) -> Self {
        Self::new(OptionKey::CHANNELS, "channels", OptionKind::ChannelMask, OptionValue::from(default))
            .with_description("Channels the transform applies to")
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Metadata describing a filter.
#[derive(Debug, Clone)]
pub struct FilterMetadata {
    /// Registry name (e.g., "Vignette")
    pub name: String,
    /// Detailed description
    pub description: String,
    /// Options understood by the filter
    pub options: Vec<OptionDefinition>,
    /// Whether `apply_with_progress` reports intermediate progress
    pub supports_progress: bool,
}

impl FilterMetadata {
    /// Create a new metadata builder.
    pub fn builder(name: impl Into<String>) -> FilterMetadataBuilder {
        FilterMetadataBuilder::new(name)
    }

    /// Look up an option definition by key.
    pub fn option(&self, key: OptionKey) -> Option<&OptionDefinition> {
        self.options.iter().find(|o| o.key == key)
    }

    /// Get all option names.
    pub fn option_names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }
}

/// Builder for [`FilterMetadata`].
pub struct FilterMetadataBuilder {
    name: String,
    description: String,
    options: Vec<OptionDefinition>,
    supports_progress: bool,
}

impl FilterMetadataBuilder {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            options: Vec::new(),
            supports_progress: false,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an option definition.
    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    /// Mark the filter as reporting progress.
    pub fn supports_progress(mut self) -> Self {
        self.supports_progress = true;
        self
    }

    /// Build the metadata.
    pub fn build(self) -> FilterMetadata {
        FilterMetadata {
            name: self.name,
            description: self.description,
            options: self.options,
            supports_progress: self.supports_progress,
        }
    }
}

/// A named pixel transform with a uniform option protocol.
///
/// # Contract
///
/// - `apply` is a pure function of the input image, the option state and
///   the clip rectangle. The input is never modified; a new image is returned.
/// - Pixels outside the clip rectangle pass through unchanged.
/// - `set_option` with a key the filter does not support is a no-op that
///   succeeds. A malformed value fails with [`FilterError::InvalidOption`]
///   and leaves the previous option state in place.
/// - `apply` only fails with [`FilterError::UnprocessableImage`], when a
///   secondary resource image is missing.
///
/// # Thread Safety
///
/// `Send + Sync` bounds let a configured filter be shared by workers.
pub trait Filter: Send + Sync {
    /// Get the metadata for this filter.
    fn metadata(&self) -> FilterMetadata;

    /// Registry name of the filter.
    fn name(&self) -> &'static str;

    /// One line description of what the filter does.
    fn description(&self) -> &'static str;

    /// Current value of an option, or [`OptionValue::None`] if unsupported.
    fn option(&self, key: OptionKey) -> OptionValue;

    /// Change an option.
    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()>;

    /// Whether the filter understands `key`.
    fn supports_option(&self, key: OptionKey) -> bool {
        self.metadata().option(key).is_some()
    }

    /// Transform `image`, restricted to `clip` when given.
    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage>;

    /// Like [`Filter::apply`], reporting row progress as 0 to 100.
    ///
    /// Filters that do not track progress simply apply.
    fn apply_with_progress(
        &self,
        image: &RgbaImage,
        clip: Option<ClipRect>,
        _progress: &mut dyn FnMut(u32),
    ) -> FilterResult<RgbaImage> {
        self.apply(image, clip)
    }

    /// Clone this filter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Filter>;
}

// Allow cloning Box<dyn Filter>
impl Clone for Box<dyn Filter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("name", &self.name()).finish()
    }
}

// ============================================================================
// Option Helpers
// ============================================================================

/// Read a numeric option value, rejecting anything else.
pub fn float_option(filter: &str, key: OptionKey, value: &OptionValue) -> FilterResult<f64> {
    value
        .as_float()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FilterError::invalid_option(filter, format!("option {} expects a number, got {}", key, value)))
}

/// Read a boolean option value, rejecting anything else.
pub fn bool_option(filter: &str, key: OptionKey, value: &OptionValue) -> FilterResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| FilterError::invalid_option(filter, format!("option {} expects a boolean, got {}", key, value)))
}
