//! Error types for ClassicPrint.
//!
//! Uses thiserror for structured errors with context. Each layer of the
//! pipeline has its own error enum so callers can tell a rejected option
//! apart from a missing preset or a stage that could not run:
//! - [`FilterError`] for registry lookups, option protocol and apply failures
//! - [`StageError`] for a Lens, Film or Processing stage that aborted
//! - [`PipelineError`] for coordinator level failures
//! - [`ConfigError`] for persisted configuration and colour profile documents

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The three fixed stages of the print pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    /// Lens vignetting and defocus.
    Lens,
    /// Film colour temperature and grain.
    Film,
    /// Darkroom contrast, colourisation, light leak and frame.
    Processing,
}

impl StageKind {
    /// All stages in pipeline order.
    pub fn all() -> &'static [StageKind] {
        &[StageKind::Lens, StageKind::Film, StageKind::Processing]
    }

    /// Human readable stage name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StageKind::Lens => "Lens",
            StageKind::Film => "Film",
            StageKind::Processing => "Processing",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Top-level error type for ClassicPrint.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum ClassicPrintError {
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by filters and the filter registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter '{name}'")]
    UnknownFilter { name: String },

    #[error("Invalid option for {filter}: {reason}")]
    InvalidOption { filter: String, reason: String },

    #[error("{filter} cannot process image: {reason}")]
    UnprocessableImage { filter: String, reason: String },
}

/// Errors raised while running a single stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: StageKind,
        #[source]
        source: FilterError,
    },
}

/// Errors raised by the pipeline coordinator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("No current {missing} settings configured")]
    NoConfiguration { missing: StageKind },

    #[error("{kind} preset '{name}' not found")]
    PresetNotFound { kind: StageKind, name: String },

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Errors reading or writing configuration documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}: {error}")]
    Io {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Malformed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl FilterError {
    /// Build an [`FilterError::InvalidOption`] for the named filter.
    pub fn invalid_option(filter: &str, reason: impl Into<String>) -> Self {
        FilterError::InvalidOption {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }

    /// Build an [`FilterError::UnprocessableImage`] for the named filter.
    pub fn unprocessable(filter: &str, reason: impl Into<String>) -> Self {
        FilterError::UnprocessableImage {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if the caller can carry on with its prior state.
    ///
    /// A rejected option leaves the filter unchanged, and a missing
    /// secondary resource leaves the input image as the fallback.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FilterError::UnknownFilter { .. })
    }
}

impl StageError {
    /// The stage that failed.
    pub fn stage(&self) -> StageKind {
        match self {
            StageError::StageFailed { stage, .. } => *stage,
        }
    }
}

impl PipelineError {
    /// The stage this error relates to, if any.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            PipelineError::NoConfiguration { missing } => Some(*missing),
            PipelineError::PresetNotFound { kind, .. } => Some(*kind),
            PipelineError::Stage(e) => Some(e.stage()),
        }
    }
}

/// Result type alias for ClassicPrint operations.
pub type Result<T> = std::result::Result<T, ClassicPrintError>;

/// Result type alias for filter operations.
pub type FilterResult<T> = std::result::Result<T, FilterError>;

/// Result type alias for stage operations.
pub type StageResult<T> = std::result::Result<T, StageError>;

/// Result type alias for coordinator operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Result type alias for configuration documents.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
