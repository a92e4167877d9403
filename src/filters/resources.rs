//! Decoded resource images shared by filter instances.
//!
//! Resources are loaded once, wrapped in `Arc` and handed to every filter
//! the registry constructs. Filters never modify them.

use image::{Rgba, RgbaImage};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;

/// Edge length of the generated noise texture.
pub const GENERATED_NOISE_SIZE: u32 = 256;

const GENERATED_NOISE_SEED: u64 = 0x5eed_f11e;

/// Resource images used by the built-in filters.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    noise_texture: Option<Arc<RgbaImage>>,
}

impl Resources {
    /// Resources with nothing loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resources with a deterministic generated noise texture.
    pub fn generated() -> Self {
        Self::empty().with_noise_texture(generate_noise_texture(GENERATED_NOISE_SIZE, GENERATED_NOISE_SEED))
    }

    /// Load the noise texture from an image file.
    pub fn from_noise_file(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let texture = image::open(path)?.to_rgba8();
        debug!(
            "Loaded noise texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        Ok(Self::empty().with_noise_texture(texture))
    }

    /// Replace the noise texture.
    pub fn with_noise_texture(mut self, texture: impl Into<Arc<RgbaImage>>) -> Self {
        self.noise_texture = Some(texture.into());
        self
    }

    /// The noise texture, if one is loaded.
    pub fn noise_texture(&self) -> Option<&Arc<RgbaImage>> {
        self.noise_texture.as_ref()
    }
}

/// Generate a square monochrome grain texture centred on mid grey.
pub fn generate_noise_texture(size: u32, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut texture = RgbaImage::new(size, size);
    for pixel in texture.pixels_mut() {
        let v: u8 = rng.gen_range(64..=192);
        *pixel = Rgba([v, v, v, 255]);
    }
    texture
}
