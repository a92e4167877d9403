//! Film stage: colour temperature shift and grain.

use crate::core::error::{StageKind, StageResult};
use crate::core::types::OptionKey;
use crate::filters::builtin::{LevelsFilter, NoiseFilter};
use crate::pipeline::settings::FilmSettings;
use crate::stages::{run_filter, Stage, StageContext};
use image::RgbaImage;

/// Channels the temperature table applies to.
const TEMPERATURE_CHANNELS: &str = "gb";

impl Stage for FilmSettings {
    fn kind(&self) -> StageKind {
        StageKind::Film
    }

    fn process(
        &self,
        ctx: &mut StageContext<'_>,
        image: &mut RgbaImage,
        progress: &mut dyn FnMut(u32),
    ) -> StageResult<()> {
        progress(0);

        run_filter(
            StageKind::Film,
            ctx.registry,
            LevelsFilter::NAME,
            vec![
                (OptionKey::CHANNELS, TEMPERATURE_CHANNELS.into()),
                (LevelsFilter::LEVELS, self.temperature_levels().into()),
            ],
            image,
        )?;
        progress(66);

        run_filter(
            StageKind::Film,
            ctx.registry,
            NoiseFilter::NAME,
            vec![(NoiseFilter::PERCENT, self.noise_percent.into())],
            image,
        )?;
        progress(100);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{FilterError, StageError};
    use crate::filters::registry::FilterRegistry;
    use crate::filters::resources::Resources;
    use crate::stages::test_support::{photo, run, Fixture};
    use image::Rgba;

    #[test]
    fn test_progress_sequence() {
        let mut fixture = Fixture::new();
        let mut image = photo(16, 16);

        let seen = run(&FilmSettings::new("Plain"), &mut fixture, &mut image).unwrap();
        assert_eq!(seen, vec![0, 66, 100]);
    }

    #[test]
    fn test_warm_film_shifts_green_and_blue() {
        let mut fixture = Fixture::new();
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        let film = FilmSettings::new("Warm").with_temperature(100.0);

        run(&film, &mut fixture, &mut image).unwrap();

        // Zero grain leaves the shifted colours as they are
        assert_eq!(image.get_pixel(1, 1).0, [100, 111, 68, 255]);
    }

    #[test]
    fn test_cold_film_shifts_the_other_way() {
        let mut fixture = Fixture::new();
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));

        run(&FilmSettings::new("Cold"), &mut fixture, &mut image).unwrap();
        // Mid grey grain is not quite neutral above 127
        assert_eq!(image.get_pixel(0, 0).0, [100, 89, 133, 255]);
    }

    #[test]
    fn test_missing_noise_texture_fails() {
        let mut fixture = Fixture::new();
        fixture.registry = FilterRegistry::with_resources(Resources::empty());
        let mut image = photo(8, 8);

        let err = run(&FilmSettings::new("Grainy"), &mut fixture, &mut image).unwrap_err();
        match err {
            StageError::StageFailed { stage, source } => {
                assert_eq!(stage, StageKind::Film);
                assert!(matches!(source, FilterError::UnprocessableImage { .. }));
            }
        }
    }
}
