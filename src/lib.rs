//! # ClassicPrint - Vintage Photo Prints
//!
//! ClassicPrint turns a digital photo into something that looks like an old
//! print. The photo flows through three stages, each built from small
//! pixel filters looked up by name in a registry:
//!
//! - **Lens**: vignetting, centre dodge and optional edge defocus
//! - **Film**: colour temperature shift and grain
//! - **Processing**: contrast, colourisation, an optional light leak and a paper frame
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use classicprint::prelude::*;
//!
//! # fn main() -> classicprint::core::error::Result<()> {
//! // Starter presets, with the first of each type current
//! let mut pipeline = ClassicPrint::with_defaults();
//! pipeline.set_current_film("Tungsten")?;
//! pipeline.update_current_processing(|p| p.with_contrast(60.0))?;
//!
//! let photo = classicprint::io::load_photo("beach.jpg")?;
//! let print = pipeline.process_with_progress(&photo, 1024, 768, &mut |percent| {
//!     println!("{}%", percent);
//! })?;
//! classicprint::io::save_print(&print, "beach_print.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: error types, option values, pixel utilities and the [`Filter`](core::filter::Filter) trait
//! - [`filters`]: the filter registry and built-in filters
//! - [`stages`]: the Lens, Film and Processing stages
//! - [`pipeline`]: settings, presets, colour profiles, progress and the [`ClassicPrint`](pipeline::ClassicPrint) coordinator
//! - [`io`]: decoding photos and encoding prints
//!
//! ## Custom Filters
//!
//! Implement [`Filter`](core::filter::Filter) and register a factory:
//!
//! ```rust
//! use classicprint::prelude::*;
//! use image::RgbaImage;
//!
//! #[derive(Clone)]
//! struct Invert;
//!
//! impl Filter for Invert {
//!     fn metadata(&self) -> FilterMetadata {
//!         FilterMetadata::builder("Invert").description(self.description()).build()
//!     }
//!     fn name(&self) -> &'static str {
//!         "Invert"
//!     }
//!     fn description(&self) -> &'static str {
//!         "Invert every colour channel"
//!     }
//!     fn option(&self, _key: OptionKey) -> OptionValue {
//!         OptionValue::None
//!     }
//!     fn set_option(&mut self, _key: OptionKey, _value: OptionValue) -> FilterResult<()> {
//!         Ok(())
//!     }
//!     fn apply(&self, image: &RgbaImage, _clip: Option<ClipRect>) -> FilterResult<RgbaImage> {
//!         let mut out = image.clone();
//!         for pixel in out.pixels_mut() {
//!             for channel in 0..3 {
//!                 pixel[channel] = 255 - pixel[channel];
//!             }
//!         }
//!         Ok(out)
//!     }
//!     fn clone_box(&self) -> Box<dyn Filter> {
//!         Box::new(self.clone())
//!     }
//! }
//!
//! let mut registry = FilterRegistry::with_builtins();
//! registry.register(|| Box::new(Invert));
//! assert!(registry.contains("Invert"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod filters;
pub mod io;
pub mod pipeline;
pub mod stages;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust
/// use classicprint::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{pack_rgb, unpack_rgb, ChannelMask, ClipRect, OptionKey, OptionValue, PackedRgb};

    // Filter trait and descriptors
    pub use crate::core::filter::{Filter, FilterMetadata, OptionDefinition, OptionKind};

    // Errors
    pub use crate::core::error::{
        ClassicPrintError, ConfigError, FilterError, FilterResult, PipelineError, PipelineResult, StageError,
        StageKind,
    };

    // Filters
    pub use crate::filters::registry::{FilterFactory, FilterRegistry, RegistryEntry};
    pub use crate::filters::resources::Resources;
    pub use crate::filters::builtin::{
        BlendFilter, ColourLookupFilter, ContrastFilter, FrameFilter, LevelsFilter, NoiseFilter, VignetteFilter,
    };

    // Stages
    pub use crate::stages::{LightLeakCatalog, Stage, StageContext};

    // Pipeline
    pub use crate::pipeline::{
        ClassicPrint, ClassicPrintConfig, ColourProfileTable, FilmSettings, LensSettings, LightLeak,
        PresetCollection, ProcessingSettings, SettingsEvent,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
