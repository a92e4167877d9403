//! Retro paper border.

use crate::core::error::{FilterError, FilterResult};
use crate::core::filter::{float_option, Filter, FilterMetadata, OptionDefinition, OptionKind};
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use crate::filters::builtin::noise::NoiseFilter;
use crate::filters::registry::FilterRegistry;
use image::{imageops, Rgba, RgbaImage};
use std::sync::Arc;

/// Register the frame filter with the registry's noise texture.
pub fn register(registry: &mut FilterRegistry) {
    let texture = registry.resources().noise_texture().cloned();
    registry.register(move || Box::new(FrameFilter::with_texture(texture.clone())));
}

/// Paper colour of the border.
pub const FRAME_BACKGROUND: Rgba<u8> = Rgba([229, 217, 203, 255]);

/// Grain strength applied to the border.
pub const FRAME_NOISE_PERCENT: f64 = 60.0;

/// Places the image on a larger grainy paper canvas.
///
/// The border on every side is `size` percent of the image width. The
/// clip rectangle is ignored since the output is a new canvas.
#[derive(Debug, Clone)]
pub struct FrameFilter {
    size: f64,
    texture: Option<Arc<RgbaImage>>,
}

impl FrameFilter {
    /// Registry name.
    pub const NAME: &'static str = "Frame";
    /// Border width, percent of the image width.
    pub const SIZE: OptionKey = OptionKey::user(0);
    /// Grain texture for the border.
    pub const TEXTURE: OptionKey = OptionKey::user(1);

    /// A 5% frame with no texture.
    pub fn new() -> Self {
        Self::with_texture(None)
    }

    /// A 5% frame sharing an already decoded noise texture.
    pub fn with_texture(texture: Option<Arc<RgbaImage>>) -> Self {
        Self { size: 5.0, texture }
    }

    /// Border width in pixels for an image `width` pixels wide.
    pub fn border_width(&self, width: u32) -> u32 {
        (width as f64 * self.size / 100.0).floor().max(0.0) as u32
    }
}

/// Canvas size for `border` on each side, if it fits in an image buffer.
fn framed_dimensions(width: u32, height: u32, border: u32) -> Option<(u32, u32)> {
    let edges = border.checked_mul(2)?;
    let canvas = (width.checked_add(edges)?, height.checked_add(edges)?);
    let bytes = u64::from(canvas.0).checked_mul(u64::from(canvas.1))?.checked_mul(4)?;
    usize::try_from(bytes).ok()?;
    Some(canvas)
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for FrameFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(OptionDefinition::percent(Self::SIZE, "size", 5.0))
            .option(OptionDefinition::new(
                Self::TEXTURE,
                "texture",
                OptionKind::ImageSource,
                OptionValue::None,
            ))
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Add a retro style frame to an image"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        match key {
            Self::SIZE => OptionValue::Float(self.size),
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
            Self::SIZE => self.size = float_option(Self::NAME, key, &value)?,
            Self::TEXTURE => {
                // Reuse the noise filter's texture loading and validation
                let mut noise = NoiseFilter::new();
                noise.set_option(NoiseFilter::TEXTURE, value).map_err(|e| match e {
                    FilterError::InvalidOption { reason, .. } => FilterError::invalid_option(Self::NAME, reason),
                    FilterError::UnprocessableImage { reason, .. } => FilterError::unprocessable(Self::NAME, reason),
                    other => other,
                })?;
                self.texture = noise.option(NoiseFilter::TEXTURE).as_image().cloned();
            }
            _ => {}
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        matches!(key, Self::SIZE | Self::TEXTURE)
    }

    fn apply(&self, image: &RgbaImage, _clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        let (width, height) = image.dimensions();
        let border = self.border_width(width);
        let (canvas_width, canvas_height) = framed_dimensions(width, height, border).ok_or_else(|| {
            FilterError::unprocessable(
                Self::NAME,
                format!("a {}px border on a {}x{} image is too large", border, width, height),
            )
        })?;

        let canvas = RgbaImage::from_pixel(canvas_width, canvas_height, FRAME_BACKGROUND);

        let mut noise = NoiseFilter::with_texture(self.texture.clone());
        noise.set_option(NoiseFilter::PERCENT, FRAME_NOISE_PERCENT.into())?;
        let mut canvas = noise.apply(&canvas, None)?;

        imageops::overlay(&mut canvas, image, border as i64, border as i64);
        Ok(canvas)
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::resources::generate_noise_texture;

    fn framed(size: f64) -> FrameFilter {
        let mut filter = FrameFilter::with_texture(Some(Arc::new(generate_noise_texture(32, 1))));
        filter.set_option(FrameFilter::SIZE, size.into()).unwrap();
        filter
    }

    #[test]
    fn test_output_dimensions() {
        let img = RgbaImage::from_pixel(100, 100, Rgba([10, 20, 30, 255]));
        let out = framed(10.0).apply(&img, None).unwrap();
        assert_eq!(out.dimensions(), (120, 120));

        // Border follows the width only, and floors
        let img = RgbaImage::from_pixel(33, 10, Rgba([10, 20, 30, 255]));
        let out = framed(10.0).apply(&img, None).unwrap();
        assert_eq!(out.dimensions(), (39, 16));
    }

    #[test]
    fn test_oversized_border_is_unprocessable() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 255]));
        assert!(matches!(
            framed(1.0e12).apply(&img, None),
            Err(FilterError::UnprocessableImage { .. })
        ));
        assert_eq!(framed_dimensions(10, 10, u32::MAX / 2 + 1), None);
        assert_eq!(framed_dimensions(10, 20, 3), Some((16, 26)));
    }

    #[test]
    fn test_image_is_centred() {
        let img = RgbaImage::from_pixel(50, 40, Rgba([10, 20, 30, 255]));
        let out = framed(10.0).apply(&img, None).unwrap();
        assert_eq!(out.get_pixel(5, 5), &Rgba([10, 20, 30, 255]));
        assert_eq!(out.get_pixel(54, 44), &Rgba([10, 20, 30, 255]));
        assert_ne!(out.get_pixel(4, 4), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_transparent_image_shows_paper() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 0]));
        let out = framed(0.0).apply(&img, None).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        // Paper is grainy but stays close to its base tone
        let p = out.get_pixel(10, 10);
        assert!(p[0] > 150 && p[3] == 255);
    }

    #[test]
    fn test_missing_texture_is_unprocessable() {
        let filter = FrameFilter::new();
        let img = RgbaImage::new(10, 10);
        assert!(matches!(
            filter.apply(&img, None),
            Err(FilterError::UnprocessableImage { .. })
        ));
    }
}
