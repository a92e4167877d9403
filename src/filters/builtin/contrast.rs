//! S-curve contrast.

use crate::core::error::FilterResult;
use crate::core::filter::{float_option, Filter, FilterMetadata, OptionDefinition};
use crate::core::pixel::{clamp_channel, merge_channels, scale};
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use crate::filters::builtin::map_clipped;
use crate::filters::registry::FilterRegistry;
use image::RgbaImage;

/// Register the contrast filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(ContrastFilter::new()));
}

/// Push a channel value along the contrast S-curve.
///
/// Shadows are multiplied down and highlights screened up around a
/// midtone anchor of `scale(v, 0, 255, 64, 192)`.
pub(crate) fn contrast_curve(v: i32) -> i32 {
    let anchor = scale(v, 0, 255, 64, 192);
    if v < 128 {
        2 * anchor * v / 255
    } else {
        255 - (2 * (255 - anchor) * (255 - v) / 255)
    }
}

/// Increases contrast by blending each channel toward its S-curve value.
#[derive(Debug, Clone, Default)]
pub struct ContrastFilter {
    percent: f64,
}

impl ContrastFilter {
    /// Registry name.
    pub const NAME: &'static str = "Contrast";
    /// Curve strength, 0 to 100.
    pub const PERCENT: OptionKey = OptionKey::user(0);

    /// A filter with no effect until `PERCENT` is raised.
    pub fn new() -> Self {
        Self { percent: 0.0 }
    }
}

impl Filter for ContrastFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(OptionDefinition::percent(Self::PERCENT, "percent", 0.0))
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Modify image contrast"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        match key {
            Self::PERCENT => OptionValue::Float(self.percent),
            _ => OptionValue::None,
        }
    }

    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()> {
        if key == Self::PERCENT {
            self.percent = float_option(Self::NAME, key, &value)?;
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        key == Self::PERCENT
    }

    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        let percent = self.percent as i32;
        Ok(map_clipped(image, clip, |_, _, pixel| {
            for channel in 0..3 {
                let v = pixel[channel] as i32;
                pixel[channel] = clamp_channel(merge_channels(contrast_curve(v), v, percent, 100));
            }
        }))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
