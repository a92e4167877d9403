//! Table driven channel levels.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::{float_option, Filter, FilterMetadata, OptionDefinition, OptionKind};
use crate::core::pixel::{clamp_channel, merge_channels};
use crate::core::types::{pack_rgb, unpack_rgb, ChannelMask, ClipRect, OptionKey, OptionValue, PackedRgb};
use crate::filters::builtin::map_clipped;
use crate::filters::registry::FilterRegistry;
use image::RgbaImage;
use log::debug;

/// Register the levels filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(LevelsFilter::new()));
}

/// A 256-entry table mapping every value to itself.
pub fn identity_levels() -> Vec<PackedRgb> {
    (0..=255u8).map(|i| pack_rgb(i, i, i)).collect()
}

/// Maps each enabled channel through a 256-entry lookup table, then blends
/// the mapped pixel with the original by `percent`.
#[derive(Debug, Clone)]
pub struct LevelsFilter {
    table: Vec<PackedRgb>,
    channels: ChannelMask,
    percent: f64,
}

impl LevelsFilter {
    /// Registry name.
    pub const NAME: &'static str = "Levels";
    /// The lookup table, 256 packed RGB entries.
    pub const LEVELS: OptionKey = OptionKey::user(0);
    /// Blend strength against the original, 0 to 100.
    pub const PERCENT: OptionKey = OptionKey::user(1);

    /// Identity table on all channels at full strength.
    pub fn new() -> Self {
        Self {
            table: identity_levels(),
            channels: ChannelMask::RGB,
            percent: 100.0,
        }
    }

    fn lookup(&self, channel: usize, value: u8) -> u8 {
        let (r, g, b) = unpack_rgb(self.table[value as usize]);
        match channel {
            0 => r,
            1 => g,
            _ => b,
        }
    }
}

impl Default for LevelsFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LevelsFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(OptionDefinition::channels("rgb"))
            .option(
                OptionDefinition::new(Self::LEVELS, "levels", OptionKind::RgbTable, identity_levels().into())
                    .with_description("256 packed RGB entries"),
            )
            .option(
                OptionDefinition::percent(Self::PERCENT, "percent", 100.0)
                    .with_description("Strength of the mapped colour against the original"),
            )
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Adjust colour levels within an image"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        match key {
            OptionKey::CHANNELS => OptionValue::String(self.channels.to_string()),
            Self::LEVELS => OptionValue::RgbList(self.table.clone()),
            Self::PERCENT => OptionValue::Float(self.percent),
            _ => OptionValue::None,
        }
    }

    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()> {
        match key {
            OptionKey::CHANNELS => {
                let mask = value
                    .as_string()
                    .ok_or_else(|| FilterError::invalid_option(Self::NAME, "channel mask must be a string"))?;
                self.channels = ChannelMask::parse(mask).map_err(|e| FilterError::invalid_option(Self::NAME, e))?;
            }
            Self::LEVELS => {
                let table = value
                    .as_rgb_list()
                    .ok_or_else(|| FilterError::invalid_option(Self::NAME, "levels must be a list of packed RGB values"))?;
                if table.len() != 256 {
                    return Err(FilterError::invalid_option(
                        Self::NAME,
                        format!("levels table has {} entries, expected 256", table.len()),
                    ));
                }
                self.table = table.to_vec();
            }
            Self::PERCENT => self.percent = float_option(Self::NAME, key, &value)?,
            _ => debug!("{} ignores option {}", Self::NAME, key),
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        matches!(key, OptionKey::CHANNELS | Self::LEVELS | Self::PERCENT)
    }

    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        let percent = self.percent as i32;
        Ok(map_clipped(image, clip, |_, _, pixel| {
            for channel in 0..3 {
                let original = pixel[channel];
                let mapped = if self.channels.includes(channel) {
                    self.lookup(channel, original)
                } else {
                    original
                };
                pixel[channel] = clamp_channel(merge_channels(mapped as i32, original as i32, percent, 100));
            }
        }))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
