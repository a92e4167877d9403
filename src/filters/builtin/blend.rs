//! Screen blend with a secondary image.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::{Filter, FilterMetadata, OptionDefinition, OptionKind};
use crate::core::pixel::clamp_channel;
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use crate::filters::builtin::{load_resource, map_clipped};
use crate::filters::registry::FilterRegistry;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;
use std::sync::Arc;

/// Register the blend filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(BlendFilter::new()));
}

/// Screen two channel values: `a + b - a*b/255`, truncated.
pub(crate) fn screen(a: u8, b: u8) -> u8 {
    let (a, b) = (a as f64, b as f64);
    clamp_channel((a + b - b * a / 255.0) as i32)
}

/// Screens a secondary image, stretched to the target size, over the image.
#[derive(Debug, Clone, Default)]
pub struct BlendFilter {
    path: Option<String>,
    overlay: Option<Arc<RgbaImage>>,
}

impl BlendFilter {
    /// Registry name.
    pub const NAME: &'static str = "Blend";
    /// The image to blend, as a path to load or a decoded image.
    pub const IMAGE: OptionKey = OptionKey::user(0);

    /// A filter with no overlay; it cannot apply until one is set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for BlendFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(
                OptionDefinition::new(Self::IMAGE, "image", OptionKind::ImageSource, OptionValue::None)
                    .with_description("Image screened over the input, e.g. a light leak"),
            )
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Blend an image on disk with the current image"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        if key != Self::IMAGE {
            return OptionValue::None;
        }
        match (&self.path, &self.overlay) {
            (Some(path), _) => OptionValue::String(path.clone()),
            (None, Some(img)) => OptionValue::Image(Arc::clone(img)),
            (None, None) => OptionValue::None,
        }
    }

    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()> {
        if key != Self::IMAGE {
            return Ok(());
        }
        match value {
            OptionValue::String(path) => {
                let img = load_resource(&path).map_err(|e| FilterError::unprocessable(Self::NAME, e))?;
                debug!("{} loaded {} ({}x{})", Self::NAME, path, img.width(), img.height());
                self.overlay = Some(Arc::new(img));
                self.path = Some(path);
            }
            OptionValue::Image(img) => {
                self.overlay = Some(img);
                self.path = None;
            }
            other => {
                return Err(FilterError::invalid_option(
                    Self::NAME,
                    format!("blend image must be a path or an image, got {}", other),
                ))
            }
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        key == Self::IMAGE
    }

    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        let overlay = self
            .overlay
            .as_ref()
            .ok_or_else(|| FilterError::unprocessable(Self::NAME, "no blend image loaded"))?;
        let (width, height) = image.dimensions();

        let resized;
        let overlay: &RgbaImage = if overlay.dimensions() == (width, height) {
            overlay
        } else {
            resized = imageops::resize(overlay.as_ref(), width, height, FilterType::Triangle);
            &resized
        };

        Ok(map_clipped(image, clip, |x, y, pixel| {
            let other = overlay.get_pixel(x, y);
            for channel in 0..3 {
                pixel[channel] = screen(pixel[channel], other[channel]);
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

    #[test]
    fn test_screen() {
        assert_eq!(screen(0, 0), 0);
        assert_eq!(screen(255, 17), 255);
        assert_eq!(screen(0, 90), 90);
        // 100 + 100 - 39.2 = 160.8
        assert_eq!(screen(100, 100), 160);
    }

    #[test]
    fn test_blend_without_image_is_unprocessable() {
        let filter = BlendFilter::new();
        let img = RgbaImage::new(2, 2);
        assert!(matches!(
            filter.apply(&img, None),
            Err(FilterError::UnprocessableImage { .. })
        ));
    }

    #[test]
    fn test_overlay_is_stretched_to_target() {
        let mut filter = BlendFilter::new();
        let overlay = RgbaImage::from_pixel(3, 7, Rgba([100, 0, 255, 255]));
        filter.set_option(BlendFilter::IMAGE, overlay.into()).unwrap();

        let img = RgbaImage::from_pixel(20, 10, Rgba([100, 50, 0, 128]));
        let out = filter.apply(&img, None).unwrap();
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.get_pixel(19, 9), &Rgba([160, 50, 255, 128]));
    }

    #[test]
    fn test_unloadable_path_keeps_previous_image() {
        let mut filter = BlendFilter::new();
        filter
            .set_option(BlendFilter::IMAGE, RgbaImage::new(1, 1).into())
            .unwrap();
        let result = filter.set_option(BlendFilter::IMAGE, "/nonexistent/leak.png".into());
        assert!(matches!(result, Err(FilterError::UnprocessableImage { .. })));
        assert!(filter.option(BlendFilter::IMAGE).as_image().is_some());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leak.png");
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])).save(&path).unwrap();

        let mut filter = BlendFilter::new();
        let path = path.to_string_lossy().to_string();
        filter.set_option(BlendFilter::IMAGE, path.clone().into()).unwrap();
        assert_eq!(filter.option(BlendFilter::IMAGE).as_string(), Some(path.as_str()));

        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let out = filter.apply(&img, None).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }
}
