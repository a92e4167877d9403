//! Processing stage: contrast, colourisation, light leak and frame.

use crate::core::error::{StageKind, StageResult};
use crate::core::types::{OptionKey, OptionValue};
use crate::filters::builtin::{BlendFilter, ContrastFilter, FrameFilter, LevelsFilter};
use crate::pipeline::settings::{LightLeak, ProcessingSettings};
use crate::stages::{run_filter, Stage, StageContext};
use image::RgbaImage;
use log::{debug, warn};
use std::path::PathBuf;

impl ProcessingSettings {
    /// Path of the light leak to screen over the print, if any.
    ///
    /// A random selection draws from `ctx.rng` every call, and may pick no leak.
    fn light_leak_path(&self, ctx: &mut StageContext<'_>) -> Option<PathBuf> {
        let name = match &self.light_leak {
            LightLeak::None => return None,
            LightLeak::Random => ctx.light_leaks.pick(&mut *ctx.rng)?.to_string(),
            LightLeak::File(name) => name.clone(),
        };
        let path = ctx.light_leaks.resolve(&name);
        if path.is_none() {
            warn!("Light leak '{}' not found; skipping", name);
        }
        path
    }

    /// Screen a light leak over `image`. Failures are logged and skipped.
    fn apply_light_leak(&self, ctx: &mut StageContext<'_>, image: &mut RgbaImage) {
        let Some(path) = self.light_leak_path(ctx) else {
            return;
        };
        debug!("Applying light leak {}", path.display());

        let result = ctx.registry.create(BlendFilter::NAME).and_then(|mut blend| {
            blend.set_option(BlendFilter::IMAGE, OptionValue::String(path.display().to_string()))?;
            blend.apply(image, None)
        });
        match result {
            Ok(output) => *image = output,
            Err(e) => warn!("Skipping light leak {}: {}", path.display(), e),
        }
    }
}

impl Stage for ProcessingSettings {
    fn kind(&self) -> StageKind {
        StageKind::Processing
    }

    fn process(
        &self,
        ctx: &mut StageContext<'_>,
        image: &mut RgbaImage,
        progress: &mut dyn FnMut(u32),
    ) -> StageResult<()> {
        progress(0);

        run_filter(
            StageKind::Processing,
            ctx.registry,
            ContrastFilter::NAME,
            vec![(ContrastFilter::PERCENT, self.contrast_percent.into())],
            image,
        )?;
        progress(25);

        let profile = ctx.colour_profiles.profile_or_neutral(&self.colourisation_profile);
        run_filter(
            StageKind::Processing,
            ctx.registry,
            LevelsFilter::NAME,
            vec![
                (OptionKey::CHANNELS, "rgb".into()),
                (LevelsFilter::LEVELS, profile.into()),
                (LevelsFilter::PERCENT, self.colourisation_percent.into()),
            ],
            image,
        )?;
        progress(50);

        self.apply_light_leak(ctx, image);
        progress(75);

        run_filter(
            StageKind::Processing,
            ctx.registry,
            FrameFilter::NAME,
            vec![(FrameFilter::SIZE, self.frame_size_percent.into())],
            image,
        )?;
        progress(100);

        Ok(())
    }
}
