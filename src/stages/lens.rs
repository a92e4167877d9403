//! Lens stage: vignetting and optional edge defocus.

use crate::core::error::{StageKind, StageResult};
use crate::filters::builtin::VignetteFilter;
use crate::pipeline::settings::LensSettings;
use crate::stages::{apply_filter, configured_filter, Stage, StageContext};
use image::RgbaImage;

impl Stage for LensSettings {
    fn kind(&self) -> StageKind {
        StageKind::Lens
    }

    fn process(
        &self,
        ctx: &mut StageContext<'_>,
        image: &mut RgbaImage,
        progress: &mut dyn FnMut(u32),
    ) -> StageResult<()> {
        progress(0);

        let vignette = configured_filter(
            StageKind::Lens,
            ctx.registry,
            VignetteFilter::NAME,
            vec![
                (VignetteFilter::RADIUS, self.radius_percent.into()),
                (VignetteFilter::AMOUNT, self.darkness_percent.into()),
                (VignetteFilter::DODGE, self.dodge_percent.into()),
                (VignetteFilter::BLUR, self.defocus.into()),
            ],
        )?;
        apply_filter(StageKind::Lens, vignette.as_ref(), image, progress)?;

        progress(100);
        Ok(())
    }
}
