//! Colour mapping through rows of a reference image.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::{float_option, Filter, FilterMetadata, OptionDefinition, OptionKind};
use crate::core::pixel::{clamp_channel, merge_channels};
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use crate::filters::builtin::{load_resource, map_clipped};
use crate::filters::registry::FilterRegistry;
use image::RgbaImage;
use std::sync::Arc;

/// Register the colour lookup filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(ColourLookupFilter::new()));
}

/// Maps colours through a lookup image holding one profile per three rows.
///
/// Profile `index` uses row `3 * index` for red, the next row for green and
/// the one after for blue; the column is the input channel value.
#[derive(Debug, Clone, Default)]
pub struct ColourLookupFilter {
    percent: f64,
    index: u32,
    path: Option<String>,
    lookup: Option<Arc<RgbaImage>>,
}

impl ColourLookupFilter {
    /// Registry name.
    pub const NAME: &'static str = "ColourLookup";
    /// Blend strength against the original, 0 to 100.
    pub const PERCENT: OptionKey = OptionKey::user(0);
    /// The lookup image, as a path to load or a decoded image.
    pub const FILE: OptionKey = OptionKey::user(1);
    /// Profile index within the lookup image.
    pub const INDEX: OptionKey = OptionKey::user(2);

    /// A filter with no lookup image at 0%.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for ColourLookupFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(OptionDefinition::percent(Self::PERCENT, "percent", 0.0))
            .option(
                OptionDefinition::new(Self::FILE, "file", OptionKind::ImageSource, OptionValue::None)
                    .with_description("Lookup image, 256 columns and three rows per profile"),
            )
            .option(OptionDefinition::new(Self::INDEX, "index", OptionKind::Integer, OptionValue::Integer(0)))
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Merge colours from a lookup table"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        match key {
            Self::PERCENT => OptionValue::Float(self.percent),
            Self::INDEX => OptionValue::Integer(self.index as i64),
            Self::FILE => match (&self.path, &self.lookup) {
                (Some(path), _) => OptionValue::String(path.clone()),
                (None, Some(img)) => OptionValue::Image(Arc::clone(img)),
                (None, None) => OptionValue::None,
            },
            _ => OptionValue::None,
        }
    }

    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()> {
        match key {
            Self::PERCENT => self.percent = float_option(Self::NAME, key, &value)?,
            Self::INDEX => {
                let index = value
                    .as_integer()
                    .filter(|i| (0..=u32::MAX as i64).contains(i))
                    .ok_or_else(|| {
                        FilterError::invalid_option(Self::NAME, format!("profile index must be a non-negative integer, got {}", value))
                    })?;
                self.index = index as u32;
            }
            Self::FILE => match value {
                OptionValue::String(path) => {
                    let img = load_resource(&path).map_err(|e| FilterError::unprocessable(Self::NAME, e))?;
                    self.lookup = Some(Arc::new(img));
                    self.path = Some(path);
                }
                OptionValue::Image(img) => {
                    self.lookup = Some(img);
                    self.path = None;
                }
                other => {
                    return Err(FilterError::invalid_option(
                        Self::NAME,
                        format!("lookup must be a path or an image, got {}", other),
                    ))
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        matches!(key, Self::PERCENT | Self::FILE | Self::INDEX)
    }

    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        let lookup = self
            .lookup
            .as_ref()
            .ok_or_else(|| FilterError::unprocessable(Self::NAME, "no lookup image loaded"))?;

        let first_row = self.index as u64 * 3;
        if lookup.width() < 256 || first_row + 3 > lookup.height() as u64 {
            return Err(FilterError::unprocessable(
                Self::NAME,
                format!(
                    "lookup image {}x{} has no profile {}",
                    lookup.width(),
                    lookup.height(),
                    self.index
                ),
            ));
        }
        let first_row = first_row as u32;
        let percent = self.percent as i32;

        Ok(map_clipped(image, clip, |_, _, pixel| {
            for channel in 0..3 {
                let original = pixel[channel];
                let mapped = lookup.get_pixel(original as u32, first_row + channel as u32)[channel];
                pixel[channel] = clamp_channel(merge_channels(mapped as i32, original as i32, percent, 100));
            }
        }))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
