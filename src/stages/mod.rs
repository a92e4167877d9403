//! The three print stages: Lens, Film and Processing.
//!
//! A stage turns its settings into filter options, runs its filters from
//! the registry in a fixed order, and reports stage-local progress from 0
//! to 100. Stages never decide their share of the overall progress; the
//! coordinator does that.
//!
//! Option values come from the stage's own settings, so a filter rejecting
//! one is logged and the filter runs with its previous value. Failing to
//! construct or apply a required filter fails the stage.

pub mod lens;
pub mod film;
pub mod processing;
pub mod light_leaks;

pub use light_leaks::LightLeakCatalog;

use crate::core::error::{StageError, StageKind, StageResult};
use crate::core::filter::Filter;
use crate::core::types::{OptionKey, OptionValue};
use crate::filters::registry::FilterRegistry;
use crate::pipeline::profiles::ColourProfileTable;
use image::RgbaImage;
use log::{debug, warn};
use rand::RngCore;
use std::time::Instant;

/// Everything a stage needs besides its settings.
pub struct StageContext<'a> {
    /// Source of filter instances
    pub registry: &'a FilterRegistry,
    /// Colour profiles for colourisation
    pub colour_profiles: &'a ColourProfileTable,
    /// Light leak overlays
    pub light_leaks: &'a LightLeakCatalog,
    /// Randomness for light leak selection
    pub rng: &'a mut dyn RngCore,
}

/// A fixed-order group of filters driven by one settings object.
pub trait Stage {
    /// Which stage this is.
    fn kind(&self) -> StageKind;

    /// Run the stage over `image`, reporting stage-local progress.
    ///
    /// On failure `image` holds the output of the filters that completed.
    fn process(
        &self,
        ctx: &mut StageContext<'_>,
        image: &mut RgbaImage,
        progress: &mut dyn FnMut(u32),
    ) -> StageResult<()>;
}

/// Build a configured filter from the registry.
pub(crate) fn configured_filter(
    stage: StageKind,
    registry: &FilterRegistry,
    name: &str,
    options: Vec<(OptionKey, OptionValue)>,
) -> StageResult<Box<dyn Filter>> {
    let mut filter = registry
        .create(name)
        .map_err(|source| StageError::StageFailed { stage, source })?;
    for (key, value) in options {
        if let Err(e) = filter.set_option(key, value) {
            warn!("{} stage: {}; keeping the previous value", stage, e);
        }
    }
    Ok(filter)
}

/// Apply a filter to `image` in place, forwarding its progress.
pub(crate) fn apply_filter(
    stage: StageKind,
    filter: &dyn Filter,
    image: &mut RgbaImage,
    progress: &mut dyn FnMut(u32),
) -> StageResult<()> {
    let started = Instant::now();
    let output = filter
        .apply_with_progress(image, None, progress)
        .map_err(|source| StageError::StageFailed { stage, source })?;
    debug!(
        "{} stage: {} took {} ms",
        stage,
        filter.name(),
        started.elapsed().as_millis()
    );
    *image = output;
    Ok(())
}

/// Build, configure and apply a filter in one step.
pub(crate) fn run_filter(
    stage: StageKind,
    registry: &FilterRegistry,
    name: &str,
    options: Vec<(OptionKey, OptionValue)>,
    image: &mut RgbaImage,
) -> StageResult<()> {
    let filter = configured_filter(stage, registry, name, options)?;
    apply_filter(stage, filter.as_ref(), image, &mut |_| {})
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Registry, profiles and catalog owned together for stage tests.
    pub struct Fixture {
        pub registry: FilterRegistry,
        pub colour_profiles: ColourProfileTable,
        pub light_leaks: LightLeakCatalog,
        pub rng: StdRng,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                registry: FilterRegistry::with_builtins(),
                colour_profiles: ColourProfileTable::new(),
                light_leaks: LightLeakCatalog::empty(),
                rng: StdRng::seed_from_u64(7),
            }
        }

        pub fn context(&mut self) -> StageContext<'_> {
            StageContext {
                registry: &self.registry,
                colour_profiles: &self.colour_profiles,
                light_leaks: &self.light_leaks,
                rng: &mut self.rng,
            }
        }
    }

    pub fn photo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 120, 255])
        })
    }

    /// Run a stage and return the progress values it reported.
    pub fn run(stage: &dyn Stage, fixture: &mut Fixture, image: &mut RgbaImage) -> StageResult<Vec<u32>> {
        let mut seen = Vec::new();
        let mut ctx = fixture.context();
        stage.process(&mut ctx, image, &mut |p| seen.push(p))?;
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FilterError;
    use crate::filters::builtin::ContrastFilter;

    #[test]
    fn test_unknown_filter_fails_stage() {
        let registry = FilterRegistry::new();
        let result = configured_filter(StageKind::Lens, &registry, "Vignette", vec![]);
        match result {
            Err(StageError::StageFailed { stage, source }) => {
                assert_eq!(stage, StageKind::Lens);
                assert!(matches!(source, FilterError::UnknownFilter { .. }));
            }
            Ok(_) => panic!("expected StageFailed"),
        }
    }

    #[test]
    fn test_rejected_option_keeps_previous_value() {
        let registry = FilterRegistry::with_builtins();
        let filter = configured_filter(
            StageKind::Processing,
            &registry,
            "Contrast",
            vec![
                (ContrastFilter::PERCENT, 25.0.into()),
                (ContrastFilter::PERCENT, "lots".into()),
            ],
        )
        .unwrap();
        assert_eq!(filter.option(ContrastFilter::PERCENT).as_float(), Some(25.0));
    }
}
