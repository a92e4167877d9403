//! Core types and traits for the ClassicPrint pipeline.
//!
//! This module contains the foundations every filter and stage builds on:
//! - Option keys, option values, channel masks and clip rectangles
//! - Integer pixel arithmetic (rescale, channel merge, convolution)
//! - The filter trait and its metadata
//! - Error types

pub mod types;
pub mod pixel;
pub mod filter;
pub mod error;

// Re-export commonly used types
pub use types::{ChannelMask, ClipRect, OptionKey, OptionValue, PackedRgb, pack_rgb, unpack_rgb};
pub use filter::{Filter, FilterMetadata, OptionDefinition, OptionKind};
pub use error::{ClassicPrintError, ConfigError, FilterError, PipelineError, StageError, StageKind};
