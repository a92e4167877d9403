//! Built-in filter implementations.
//!
//! This module contains the filters the print stages are built from.

mod levels;
mod contrast;
mod noise;
mod vignette;
mod frame;
mod blend;
mod colour_lookup;

use crate::core::types::ClipRect;
use crate::filters::registry::FilterRegistry;
use image::{Rgba, RgbaImage};

/// Register all built-in filters.
pub fn register_all(registry: &mut FilterRegistry) {
    levels::register(registry);
    contrast::register(registry);
    noise::register(registry);
    vignette::register(registry);
    frame::register(registry);
    blend::register(registry);
    colour_lookup::register(registry);
}

// Re-export for direct access
pub use levels::{identity_levels, LevelsFilter};
pub use contrast::ContrastFilter;
pub use noise::NoiseFilter;
pub use vignette::VignetteFilter;
pub use frame::FrameFilter;
pub use blend::BlendFilter;
pub use colour_lookup::ColourLookupFilter;

/// Copy `image` and run `f` over every pixel inside the clip rectangle.
pub(crate) fn map_clipped<F>(image: &RgbaImage, clip: Option<ClipRect>, mut f: F) -> RgbaImage
where
    F: FnMut(u32, u32, &mut Rgba<u8>),
{
    let mut result = image.clone();
    let rect = ClipRect::resolve(clip, image.width(), image.height());
    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            f(x, y, result.get_pixel_mut(x, y));
        }
    }
    result
}

/// Load an image file as RGBA for use as a secondary resource.
pub(crate) fn load_resource(path: &str) -> Result<RgbaImage, String> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| format!("failed to load '{}': {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_clipped_leaves_outside_untouched() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let out = map_clipped(&img, Some(ClipRect::new(1, 1, 3, 3)), |_, _, p| {
            p[0] = 99;
        });
        assert_eq!(out.get_pixel(0, 0)[0], 10);
        assert_eq!(out.get_pixel(1, 1)[0], 99);
        assert_eq!(out.get_pixel(2, 2)[0], 99);
        assert_eq!(out.get_pixel(3, 3)[0], 10);
        // Input is not modified
        assert_eq!(img.get_pixel(1, 1)[0], 10);
    }

    #[test]
    fn test_load_resource_missing() {
        let err = load_resource("/nonexistent/leak.jpg");
        assert!(err.is_err());
    }
}
