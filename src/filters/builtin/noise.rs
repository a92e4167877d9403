//! Film grain from a tiled noise texture.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::{float_option, Filter, FilterMetadata, OptionDefinition, OptionKind};
use crate::core::pixel::{clamp_channel, merge_channels};
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use crate::filters::builtin::{load_resource, map_clipped};
use crate::filters::registry::FilterRegistry;
use image::RgbaImage;
use std::sync::Arc;

/// Register the noise filter with the registry's noise texture.
pub fn register(registry: &mut FilterRegistry) {
    let texture = registry.resources().noise_texture().cloned();
    registry.register(move || Box::new(NoiseFilter::with_texture(texture.clone())));
}

/// Soft light blend of `original` with a noise value.
pub(crate) fn soft_light(original: i32, noise: i32) -> i32 {
    if original < 128 {
        2 * original * noise / 255
    } else {
        255 - 2 * (255 - original) * (255 - noise) / 255
    }
}

/// Tiles a noise texture over the image and soft-light blends it in.
///
/// The texture repeats on both axes independently. `percent` pulls each
/// noise sample from mid grey (no effect) toward its full value.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    percent: f64,
    texture: Option<Arc<RgbaImage>>,
}

impl NoiseFilter {
    /// Registry name.
    pub const NAME: &'static str = "Noise";
    /// Grain strength, 0 to 100.
    pub const PERCENT: OptionKey = OptionKey::user(0);
    /// The noise texture, as an image or a path to load.
    pub const TEXTURE: OptionKey = OptionKey::user(1);

    /// A filter with no texture; it cannot apply until one is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter sharing an already decoded texture.
    pub fn with_texture(texture: Option<Arc<RgbaImage>>) -> Self {
        Self { percent: 0.0, texture }
    }
}

impl Filter for NoiseFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(OptionDefinition::percent(Self::PERCENT, "percent", 0.0))
            .option(
                OptionDefinition::new(Self::TEXTURE, "texture", OptionKind::ImageSource, OptionValue::None)
                    .with_description("Grain texture tiled over the image"),
            )
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Add noise to an image"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        match key {
            Self::PERCENT => OptionValue::Float(self.percent),
            Self::TEXTURE => self
                .texture
                .as_ref()
                .map(|t| OptionValue::Image(Arc::clone(t)))
                .unwrap_or(OptionValue::None),
            _ => OptionValue::None,
        }
    }

    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()> {
        match key {
            Self::PERCENT => self.percent = float_option(Self::NAME, key, &value)?,
            Self::TEXTURE => {
                self.texture = Some(match value {
                    OptionValue::Image(img) => img,
                    OptionValue::String(path) => {
                        Arc::new(load_resource(&path).map_err(|e| FilterError::unprocessable(Self::NAME, e))?)
                    }
                    other => {
                        return Err(FilterError::invalid_option(
                            Self::NAME,
                            format!("texture must be an image or a path, got {}", other),
                        ))
                    }
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        matches!(key, Self::PERCENT | Self::TEXTURE)
    }

    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        let texture = self
            .texture
            .as_ref()
            .filter(|t| t.width() > 0 && t.height() > 0)
            .ok_or_else(|| FilterError::unprocessable(Self::NAME, "no noise texture loaded"))?;
        let (tw, th) = texture.dimensions();
        let percent = self.percent as i32;

        Ok(map_clipped(image, clip, |x, y, pixel| {
            let sample = texture.get_pixel(x % tw, y % th);
            for channel in 0..3 {
                let noise = clamp_channel(merge_channels(sample[channel] as i32, 128, percent, 100)) as i32;
                pixel[channel] = clamp_channel(soft_light(pixel[channel] as i32, noise));
            }
        }))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker_texture() -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }))
    }

    #[test]
    fn test_missing_texture_is_unprocessable() {
        let filter = NoiseFilter::new();
        let img = RgbaImage::new(4, 4);
        assert!(matches!(
            filter.apply(&img, None),
            Err(FilterError::UnprocessableImage { .. })
        ));
    }

    #[test]
    fn test_zero_percent_is_neutral_grey() {
        // Grey 128 noise: soft_light(v, 128) is v for v < 128, and within one
        // of v above because of truncation.
        let filter = NoiseFilter::with_texture(Some(checker_texture()));
        let img = RgbaImage::from_pixel(3, 3, Rgba([40, 100, 127, 10]));
        let out = filter.apply(&img, None).unwrap();
        assert_eq!(out.get_pixel(1, 1), &Rgba([40, 100, 127, 10]));
    }

    #[test]
    fn test_texture_tiles_by_modulo() {
        let mut filter = NoiseFilter::with_texture(Some(checker_texture()));
        filter.set_option(NoiseFilter::PERCENT, 100.0.into()).unwrap();
        let img = RgbaImage::from_pixel(5, 5, Rgba([200, 200, 200, 255]));
        let out = filter.apply(&img, None).unwrap();

        // White noise screens to 255, black noise: 255 - 2*55*255/255 = 145
        assert_eq!(out.get_pixel(0, 0)[0], 255);
        assert_eq!(out.get_pixel(1, 0)[0], 145);
        assert_eq!(out.get_pixel(2, 0)[0], 255);
        assert_eq!(out.get_pixel(3, 2)[0], 145);
        assert_eq!(out.get_pixel(4, 4)[0], 255);
    }

    #[test]
    fn test_texture_option() {
        let mut filter = NoiseFilter::new();
        assert!(filter.option(NoiseFilter::TEXTURE).is_none());
        filter
            .set_option(NoiseFilter::TEXTURE, OptionValue::Image(checker_texture()))
            .unwrap();
        assert!(filter.option(NoiseFilter::TEXTURE).as_image().is_some());

        let result = filter.set_option(NoiseFilter::TEXTURE, true.into());
        assert!(matches!(result, Err(FilterError::InvalidOption { .. })));
        let result = filter.set_option(NoiseFilter::TEXTURE, "/nonexistent/noise.png".into());
        assert!(matches!(result, Err(FilterError::UnprocessableImage { .. })));
        // Prior texture kept
        assert!(filter.option(NoiseFilter::TEXTURE).as_image().is_some());
    }
}
