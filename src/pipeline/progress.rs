//! Progress aggregation across the three stages.
//!
//! Each stage reports its own 0 to 100. The coordinator maps those onto a
//! single 0 to 100 with fixed weights reflecting the relative stage cost:
//!
//! | stage      | overall                  |
//! |------------|--------------------------|
//! | Lens       | `local / 8`              |
//! | Film       | `local / 8 + 100 / 8`    |
//! | Processing | `local / 2 + 50`         |

use crate::core::error::StageKind;

/// Map a stage-local percentage onto the overall 0 to 100 scale.
pub fn overall_progress(stage: StageKind, local: u32) -> u32 {
    let local = local.min(100);
    match stage {
        StageKind::Lens => local / 8,
        StageKind::Film => local / 8 + 100 / 8,
        StageKind::Processing => local / 2 + 50,
    }
}

/// Forwards aggregated progress to a callback.
///
/// Values are only forwarded when the aggregated percentage changes, and
/// never go backwards within a run.
pub struct ProgressAggregator<'a> {
    callback: &'a mut dyn FnMut(u32),
    last: Option<u32>,
}

impl<'a> ProgressAggregator<'a> {
    /// Create an aggregator writing to `callback`.
    pub fn new(callback: &'a mut dyn FnMut(u32)) -> Self {
        Self { callback, last: None }
    }

    /// Report the start of a run (0%).
    pub fn start(&mut self) {
        self.emit(0);
    }

    /// Report stage-local progress.
    pub fn stage(&mut self, stage: StageKind, local: u32) {
        self.emit(overall_progress(stage, local));
    }

    /// Report the end of a successful run (100%).
    pub fn complete(&mut self) {
        self.emit(100);
    }

    /// The last value forwarded, if any.
    pub fn last(&self) -> Option<u32> {
        self.last
    }

    fn emit(&mut self, percent: u32) {
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            (self.callback)(percent);
        }
    }
}
