//! Lens vignetting with centre dodge and optional edge defocus.

use crate::core::error::FilterResult;
use crate::core::filter::{bool_option, float_option, Filter, FilterMetadata, OptionDefinition, OptionKind};
use crate::core::pixel::{clamp_channel, convolve, merge_channels, scale};
use crate::core::types::{ClipRect, OptionKey, OptionValue};
use crate::filters::registry::FilterRegistry;
use image::RgbaImage;

/// Register the vignette filter.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(VignetteFilter::new()));
}

const BLUR_KERNEL: [i32; 9] = [1, 2, 1, 2, 2, 2, 1, 2, 1];
const BLUR_DIVISOR: i32 = 14;

/// Per image constants of a vignette pass.
#[derive(Debug, Clone, Copy)]
struct Geometry {
    centre_x: i32,
    centre_y: i32,
    /// Half the image diagonal, at least 1.
    diagonal: i32,
    radius: i32,
    amount: i32,
    dodge: i32,
}

impl Geometry {
    fn distance(&self, x: u32, y: u32) -> i32 {
        let dx = (x as i32 - self.centre_x) as f64;
        let dy = (y as i32 - self.centre_y) as f64;
        (dx * dx + dy * dy).sqrt() as i32
    }

    /// Shade one channel at distance `dist` from the centre.
    ///
    /// `blurred` is the defocused channel value for pixels past the radius.
    fn shade(&self, colour: i32, blurred: Option<i32>, dist: i32) -> i32 {
        let Geometry {
            diagonal,
            radius,
            amount,
            dodge,
            ..
        } = *self;
        let outside = dist > radius;
        let mut colour = colour;

        if let (true, Some(cnv)) = (outside, blurred) {
            colour = scale(dist, radius, diagonal, colour, cnv);
        }

        if outside {
            let max_darken = amount / 3;
            colour -= scale(dist, radius, diagonal, 0, max_darken).clamp(0, max_darken.max(0));
        }

        let bright = (2 * colour).clamp(0, 255);
        let contrast = (2 * colour - 255).clamp(0, 255);
        let vignette_distance = scale(dist, radius, diagonal, 0, 100);
        let vignette_distance_sq = vignette_distance * vignette_distance / 100;

        if outside {
            colour = merge_channels(contrast, colour, scale(vignette_distance_sq, 0, 100, 0, amount), 100);
        } else if radius > 0 {
            let falloff = (radius - dist) * (radius - dist) / diagonal;
            colour = merge_channels(bright, colour, scale(falloff, 0, radius, 0, dodge), 100);
        } else {
            colour = bright;
        }

        colour
    }
}

/// Darkens the image edges and dodges the centre like an old lens.
///
/// `radius` is a percentage of half the image diagonal. Inside it pixels
/// are brightened by up to `dodge` percent, outside they are pushed down
/// a contrast curve by up to `amount` percent. With `blur` set, pixels
/// outside the radius are progressively mixed with a 3x3 blur of the input.
#[derive(Debug, Clone)]
pub struct VignetteFilter {
    radius: f64,
    amount: f64,
    dodge: f64,
    blur: bool,
}

impl VignetteFilter {
    /// Registry name.
    pub const NAME: &'static str = "Vignette";
    /// Radius of the unaffected centre, percent of half the diagonal.
    pub const RADIUS: OptionKey = OptionKey::user(0);
    /// Edge darkening strength, 0 to 100.
    pub const AMOUNT: OptionKey = OptionKey::user(1);
    /// Centre brightening strength, 0 to 100.
    pub const DODGE: OptionKey = OptionKey::user(2);
    /// Defocus the edges.
    pub const BLUR: OptionKey = OptionKey::user(3);

    /// Radius 30, amount 80, dodge 50, no blur.
    pub fn new() -> Self {
        Self {
            radius: 30.0,
            amount: 80.0,
            dodge: 50.0,
            blur: false,
        }
    }

    fn geometry(&self, width: u32, height: u32) -> Geometry {
        let half_diagonal = ((width as f64).hypot(height as f64) as i32 / 2).max(1);
        Geometry {
            centre_x: (width / 2) as i32,
            centre_y: (height / 2) as i32,
            diagonal: half_diagonal,
            radius: scale(self.radius as i32, 0, 100, 0, half_diagonal),
            amount: self.amount as i32,
            dodge: self.dodge as i32,
        }
    }
}

impl Default for VignetteFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for VignetteFilter {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder(Self::NAME)
            .description(self.description())
            .option(OptionDefinition::percent(Self::RADIUS, "radius", 30.0))
            .option(OptionDefinition::percent(Self::AMOUNT, "amount", 80.0))
            .option(OptionDefinition::percent(Self::DODGE, "dodge", 50.0))
            .option(
                OptionDefinition::new(Self::BLUR, "blur", OptionKind::Boolean, false.into())
                    .with_description("Defocus pixels outside the radius"),
            )
            .supports_progress()
            .build()
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Applies or fixes a vignette effect"
    }

    fn option(&self, key: OptionKey) -> OptionValue {
        match key {
            Self::RADIUS => OptionValue::Float(self.radius),
            Self::AMOUNT => OptionValue::Float(self.amount),
            Self::DODGE => OptionValue::Float(self.dodge),
            Self::BLUR => OptionValue::Boolean(self.blur),
            _ => OptionValue::None,
        }
    }

    fn set_option(&mut self, key: OptionKey, value: OptionValue) -> FilterResult<()> {
        match key {
            Self::RADIUS => self.radius = float_option(Self::NAME, key, &value)?,
            Self::AMOUNT => self.amount = float_option(Self::NAME, key, &value)?,
            Self::DODGE => self.dodge = float_option(Self::NAME, key, &value)?,
            Self::BLUR => self.blur = bool_option(Self::NAME, key, &value)?,
            _ => {}
        }
        Ok(())
    }

    fn supports_option(&self, key: OptionKey) -> bool {
        matches!(key, Self::RADIUS | Self::AMOUNT | Self::DODGE | Self::BLUR)
    }

    fn apply(&self, image: &RgbaImage, clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
        self.apply_with_progress(image, clip, &mut |_| {})
    }

    fn apply_with_progress(
        &self,
        image: &RgbaImage,
        clip: Option<ClipRect>,
        progress: &mut dyn FnMut(u32),
    ) -> FilterResult<RgbaImage> {
        let (width, height) = image.dimensions();
        let rect = ClipRect::resolve(clip, width, height);
        let geometry = self.geometry(width, height);
        let mut result = image.clone();
        let mut reported = None;

        for y in rect.top..rect.bottom {
            let percent = (y as u64 * 100 / rect.bottom as u64) as u32;
            if reported != Some(percent) {
                reported = Some(percent);
                progress(percent);
            }

            for x in rect.left..rect.right {
                let dist = geometry.distance(x, y);
                let blurred = if self.blur && dist > geometry.radius {
                    Some(convolve(image, x, y, &BLUR_KERNEL, 3, 3, BLUR_DIVISOR, 0))
                } else {
                    None
                };

                let pixel = result.get_pixel_mut(x, y);
                for channel in 0..3 {
                    let cnv = blurred.map(|b| b[channel] as i32);
                    pixel[channel] = clamp_channel(geometry.shade(pixel[channel] as i32, cnv, dist));
                }
            }
        }

        Ok(result)
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn photo() -> RgbaImage {
        RgbaImage::from_fn(40, 30, |x, y| {
            Rgba([(x * 6) as u8, (y * 8) as u8, ((x + y) * 3) as u8, 255])
        })
    }

    fn vignette(radius: f64, amount: f64, dodge: f64, blur: bool) -> VignetteFilter {
        let mut filter = VignetteFilter::new();
        filter.set_option(VignetteFilter::RADIUS, radius.into()).unwrap();
        filter.set_option(VignetteFilter::AMOUNT, amount.into()).unwrap();
        filter.set_option(VignetteFilter::DODGE, dodge.into()).unwrap();
        filter.set_option(VignetteFilter::BLUR, blur.into()).unwrap();
        filter
    }

    #[test]
    fn test_defaults() {
        let filter = VignetteFilter::new();
        assert_eq!(filter.option(VignetteFilter::RADIUS).as_float(), Some(30.0));
        assert_eq!(filter.option(VignetteFilter::AMOUNT).as_float(), Some(80.0));
        assert_eq!(filter.option(VignetteFilter::DODGE).as_float(), Some(50.0));
        assert_eq!(filter.option(VignetteFilter::BLUR).as_bool(), Some(false));
    }

    #[test]
    fn test_full_radius_without_strength_is_identity() {
        let filter = vignette(100.0, 0.0, 0.0, false);
        let img = photo();
        assert_eq!(filter.apply(&img, None).unwrap(), img);
    }

    #[test]
    fn test_edges_darken_centre_brightens() {
        let filter = vignette(30.0, 100.0, 100.0, false);
        let img = RgbaImage::from_pixel(64, 64, Rgba([100, 100, 100, 255]));
        let out = filter.apply(&img, None).unwrap();

        assert!(out.get_pixel(32, 32)[0] > 100);
        assert!(out.get_pixel(0, 0)[0] < 100);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_blur_only_touches_outer_zone() {
        let mut img = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 255]));
        for y in (0..32).step_by(2) {
            for x in 0..32 {
                img.put_pixel(x, y, Rgba([200, 200, 200, 255]));
            }
        }
        let sharp = vignette(50.0, 0.0, 0.0, false).apply(&img, None).unwrap();
        let soft = vignette(50.0, 0.0, 0.0, true).apply(&img, None).unwrap();

        assert_eq!(sharp.get_pixel(16, 16), soft.get_pixel(16, 16));
        assert_ne!(sharp.get_pixel(0, 1), soft.get_pixel(0, 1));
    }

    #[test]
    fn test_progress_is_monotonic() {
        let filter = VignetteFilter::new();
        let img = photo();
        let mut seen = Vec::new();
        filter
            .apply_with_progress(&img, None, &mut |p| seen.push(p))
            .unwrap();

        assert_eq!(seen.first(), Some(&0));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen.iter().all(|p| *p < 100));
        assert_eq!(seen.len(), 30);
    }

    #[test]
    fn test_tiny_image() {
        let filter = VignetteFilter::new();
        let img = RgbaImage::from_pixel(1, 1, Rgba([50, 60, 70, 255]));
        assert!(filter.apply(&img, None).is_ok());
        let empty = RgbaImage::new(0, 0);
        assert_eq!(filter.apply(&empty, None).unwrap().dimensions(), (0, 0));
    }
}
