//! The pipeline coordinator.
//!
//! [`ClassicPrint`] owns the filter registry, the saved presets, the
//! current settings for each stage and the resources the stages draw on.
//! A run resizes the photo, then feeds it through Lens, Film and
//! Processing in that order while aggregating progress.
//!
//! `process` takes `&self`: a run never changes the coordinator, so one
//! instance can serve several runs at once. Changing settings needs
//! `&mut self` and notifies subscribers with a [`SettingsEvent`].

use crate::core::error::{PipelineError, PipelineResult, StageKind};
use crate::core::types::PackedRgb;
use crate::filters::registry::FilterRegistry;
use crate::pipeline::config::ClassicPrintConfig;
use crate::pipeline::defaults;
use crate::pipeline::presets::PresetCollection;
use crate::pipeline::profiles::ColourProfileTable;
use crate::pipeline::progress::ProgressAggregator;
use crate::pipeline::settings::{FilmSettings, LensSettings, Preset, ProcessingSettings};
use crate::stages::{LightLeakCatalog, Stage, StageContext};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{debug, info};
use rand::RngCore;
use std::fmt;
use std::time::Instant;

/// A change to the coordinator's settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    /// The current settings of a stage were replaced.
    CurrentChanged(StageKind),
    /// A preset was added or overwritten.
    PresetAdded { kind: StageKind, name: String },
    /// A preset was deleted.
    PresetDeleted { kind: StageKind, name: String },
    /// Last used folders or save size changed.
    SessionChanged,
}

/// Observer notified of settings changes.
pub type SettingsObserver = Box<dyn Fn(&SettingsEvent) + Send + Sync>;

/// Values remembered between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Folder the last photo was opened from
    pub photo_folder: String,
    /// Folder the last print was saved to
    pub save_folder: String,
    /// Width of the last save, 0 for original size
    pub save_width: u32,
    /// Height of the last save, 0 for original size
    pub save_height: u32,
}

/// Largest size with the aspect ratio of `source` that fits in `target`.
///
/// An empty source has no aspect ratio and is returned unchanged.
pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_width, src_height) = source;
    let (target_width, target_height) = target;
    if src_width == 0 || src_height == 0 {
        return source;
    }

    let aspect = src_width as f64 / src_height as f64;
    let new_height = (target_width as f64 / aspect).round() as u32;
    if new_height <= target_height {
        (target_width, new_height.max(1))
    } else {
        let new_width = (target_height as f64 * aspect).round() as u32;
        (new_width.clamp(1, target_width), target_height)
    }
}

/// Copy `photo`, resized to fit `width` x `height` if both are positive.
fn working_copy(photo: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if width == 0 || height == 0 {
        return photo.clone();
    }
    let (fit_width, fit_height) = fit_dimensions(photo.dimensions(), (width, height));
    if (fit_width, fit_height) == photo.dimensions() {
        return photo.clone();
    }
    debug!(
        "Resizing {}x{} photo to {}x{}",
        photo.width(),
        photo.height(),
        fit_width,
        fit_height
    );
    imageops::resize(photo, fit_width, fit_height, FilterType::Lanczos3)
}

fn set_current<T: Preset>(presets: &PresetCollection<T>, current: &mut Option<T>, name: &str) -> PipelineResult<()> {
    *current = Some(presets.require(name)?.clone());
    Ok(())
}

fn update_current<T: Preset>(current: &mut Option<T>, update: impl FnOnce(T) -> T) -> PipelineResult<()> {
    let settings = current
        .take()
        .ok_or(PipelineError::NoConfiguration { missing: T::KIND })?;
    *current = Some(update(settings));
    Ok(())
}

fn save_current<T: Preset>(
    presets: &mut PresetCollection<T>,
    current: &Option<T>,
    name: &str,
) -> PipelineResult<()> {
    let mut preset = current
        .clone()
        .ok_or(PipelineError::NoConfiguration { missing: T::KIND })?;
    preset.set_name(name.to_string());
    presets.add(preset);
    Ok(())
}

/// The vintage print pipeline and its settings.
pub struct ClassicPrint {
    registry: FilterRegistry,
    lenses: PresetCollection<LensSettings>,
    films: PresetCollection<FilmSettings>,
    processes: PresetCollection<ProcessingSettings>,
    current_lens: Option<LensSettings>,
    current_film: Option<FilmSettings>,
    current_processing: Option<ProcessingSettings>,
    colour_profiles: ColourProfileTable,
    light_leaks: LightLeakCatalog,
    session: Session,
    observers: Vec<SettingsObserver>,
}

impl ClassicPrint {
    /// A pipeline with the built-in filters and no presets or current settings.
    pub fn new() -> Self {
        Self::with_registry(FilterRegistry::with_builtins())
    }

    /// A pipeline using `registry`, with no presets or current settings.
    pub fn with_registry(registry: FilterRegistry) -> Self {
        Self {
            registry,
            lenses: PresetCollection::new(),
            films: PresetCollection::new(),
            processes: PresetCollection::new(),
            current_lens: None,
            current_film: None,
            current_processing: None,
            colour_profiles: ColourProfileTable::new(),
            light_leaks: LightLeakCatalog::empty(),
            session: Session::default(),
            observers: Vec::new(),
        }
    }

    /// A pipeline with the built-in filters, starter presets and colour
    /// profiles. The first preset of each type is current.
    pub fn with_defaults() -> Self {
        Self::with_defaults_in(FilterRegistry::with_builtins())
    }

    /// Like [`ClassicPrint::with_defaults`], using `registry`.
    pub fn with_defaults_in(registry: FilterRegistry) -> Self {
        let mut pipeline = Self::with_registry(registry);
        pipeline.apply_config(defaults::config());
        pipeline.colour_profiles = defaults::colour_profiles();
        pipeline
    }

    /// The filter registry.
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    // ========================================================================
    // Processing
    // ========================================================================

    /// Render a print of `photo`.
    ///
    /// If both `width` and `height` are positive the photo is first resized
    /// to fit inside them, keeping its aspect ratio.
    pub fn process(&self, photo: &RgbaImage, width: u32, height: u32) -> PipelineResult<RgbaImage> {
        self.process_with_progress(photo, width, height, &mut |_| {})
    }

    /// Render a print, reporting overall progress from 0 to 100.
    pub fn process_with_progress(
        &self,
        photo: &RgbaImage,
        width: u32,
        height: u32,
        progress: &mut dyn FnMut(u32),
    ) -> PipelineResult<RgbaImage> {
        let mut rng = rand::thread_rng();
        self.process_with_rng(photo, width, height, &mut rng, progress)
    }

    /// Render a print using `rng` for random light leak selection.
    pub fn process_with_rng(
        &self,
        photo: &RgbaImage,
        width: u32,
        height: u32,
        rng: &mut dyn RngCore,
        progress: &mut dyn FnMut(u32),
    ) -> PipelineResult<RgbaImage> {
        let lens = self.current_lens.as_ref().ok_or(PipelineError::NoConfiguration {
            missing: StageKind::Lens,
        })?;
        let film = self.current_film.as_ref().ok_or(PipelineError::NoConfiguration {
            missing: StageKind::Film,
        })?;
        let processing = self
            .current_processing
            .as_ref()
            .ok_or(PipelineError::NoConfiguration {
                missing: StageKind::Processing,
            })?;

        let started = Instant::now();
        let mut image = working_copy(photo, width, height);
        let mut aggregator = ProgressAggregator::new(progress);
        aggregator.start();

        let mut ctx = StageContext {
            registry: &self.registry,
            colour_profiles: &self.colour_profiles,
            light_leaks: &self.light_leaks,
            rng,
        };
        let stages: [&dyn Stage; 3] = [lens, film, processing];
        for stage in stages {
            let kind = stage.kind();
            let stage_started = Instant::now();
            debug!("Starting {} stage", kind);
            stage.process(&mut ctx, &mut image, &mut |local| aggregator.stage(kind, local))?;
            debug!("{} stage took {} ms", kind, stage_started.elapsed().as_millis());
        }

        aggregator.complete();
        info!(
            "Rendered {}x{} print in {} ms",
            image.width(),
            image.height(),
            started.elapsed().as_millis()
        );
        Ok(image)
    }

    // ========================================================================
    // Current settings
    // ========================================================================

    /// Current lens settings.
    pub fn current_lens(&self) -> Option<&LensSettings> {
        self.current_lens.as_ref()
    }

    /// Current film settings.
    pub fn current_film(&self) -> Option<&FilmSettings> {
        self.current_film.as_ref()
    }

    /// Current processing settings.
    pub fn current_processing(&self) -> Option<&ProcessingSettings> {
        self.current_processing.as_ref()
    }

    /// Make a copy of the named lens preset current.
    pub fn set_current_lens(&mut self, name: &str) -> PipelineResult<()> {
        set_current(&self.lenses, &mut self.current_lens, name)?;
        self.notify(SettingsEvent::CurrentChanged(StageKind::Lens));
        Ok(())
    }

    /// Make a copy of the named film preset current.
    pub fn set_current_film(&mut self, name: &str) -> PipelineResult<()> {
        set_current(&self.films, &mut self.current_film, name)?;
        self.notify(SettingsEvent::CurrentChanged(StageKind::Film));
        Ok(())
    }

    /// Make a copy of the named processing preset current.
    pub fn set_current_processing(&mut self, name: &str) -> PipelineResult<()> {
        set_current(&self.processes, &mut self.current_processing, name)?;
        self.notify(SettingsEvent::CurrentChanged(StageKind::Processing));
        Ok(())
    }

    /// Replace the current lens settings.
    pub fn replace_current_lens(&mut self, settings: LensSettings) {
        self.current_lens = Some(settings);
        self.notify(SettingsEvent::CurrentChanged(StageKind::Lens));
    }

    /// Replace the current film settings.
    pub fn replace_current_film(&mut self, settings: FilmSettings) {
        self.current_film = Some(settings);
        self.notify(SettingsEvent::CurrentChanged(StageKind::Film));
    }

    /// Replace the current processing settings.
    pub fn replace_current_processing(&mut self, settings: ProcessingSettings) {
        self.current_processing = Some(settings);
        self.notify(SettingsEvent::CurrentChanged(StageKind::Processing));
    }

    /// Apply a pure setter to the current lens settings.
    ///
    /// ```
    /// use classicprint::prelude::*;
    ///
    /// let mut pipeline = ClassicPrint::with_defaults();
    /// pipeline.update_current_lens(|lens| lens.with_defocus(true)).unwrap();
    /// assert!(pipeline.current_lens().unwrap().defocus);
    /// ```
    pub fn update_current_lens(&mut self, update: impl FnOnce(LensSettings) -> LensSettings) -> PipelineResult<()> {
        update_current(&mut self.current_lens, update)?;
        self.notify(SettingsEvent::CurrentChanged(StageKind::Lens));
        Ok(())
    }

    /// Apply a pure setter to the current film settings.
    pub fn update_current_film(&mut self, update: impl FnOnce(FilmSettings) -> FilmSettings) -> PipelineResult<()> {
        update_current(&mut self.current_film, update)?;
        self.notify(SettingsEvent::CurrentChanged(StageKind::Film));
        Ok(())
    }

    /// Apply a pure setter to the current processing settings.
    pub fn update_current_processing(
        &mut self,
        update: impl FnOnce(ProcessingSettings) -> ProcessingSettings,
    ) -> PipelineResult<()> {
        update_current(&mut self.current_processing, update)?;
        self.notify(SettingsEvent::CurrentChanged(StageKind::Processing));
        Ok(())
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// Saved lens presets.
    pub fn lens_presets(&self) -> &PresetCollection<LensSettings> {
        &self.lenses
    }

    /// Saved film presets.
    pub fn film_presets(&self) -> &PresetCollection<FilmSettings> {
        &self.films
    }

    /// Saved processing presets.
    pub fn processing_presets(&self) -> &PresetCollection<ProcessingSettings> {
        &self.processes
    }

    /// Add a lens preset, replacing one with the same name.
    pub fn add_lens_preset(&mut self, preset: LensSettings) {
        let name = preset.name.clone();
        self.lenses.add(preset);
        self.notify(SettingsEvent::PresetAdded {
            kind: StageKind::Lens,
            name,
        });
    }

    /// Add a film preset, replacing one with the same name.
    pub fn add_film_preset(&mut self, preset: FilmSettings) {
        let name = preset.name.clone();
        self.films.add(preset);
        self.notify(SettingsEvent::PresetAdded {
            kind: StageKind::Film,
            name,
        });
    }

    /// Add a processing preset, replacing one with the same name.
    pub fn add_processing_preset(&mut self, preset: ProcessingSettings) {
        let name = preset.name.clone();
        self.processes.add(preset);
        self.notify(SettingsEvent::PresetAdded {
            kind: StageKind::Processing,
            name,
        });
    }

    /// Delete a lens preset. The current lens is not affected.
    pub fn delete_lens_preset(&mut self, name: &str) -> PipelineResult<LensSettings> {
        let removed = self.lenses.delete(name)?;
        self.notify(SettingsEvent::PresetDeleted {
            kind: StageKind::Lens,
            name: name.to_string(),
        });
        Ok(removed)
    }

    /// Delete a film preset. The current film is not affected.
    pub fn delete_film_preset(&mut self, name: &str) -> PipelineResult<FilmSettings> {
        let removed = self.films.delete(name)?;
        self.notify(SettingsEvent::PresetDeleted {
            kind: StageKind::Film,
            name: name.to_string(),
        });
        Ok(removed)
    }

    /// Delete a processing preset. The current processing is not affected.
    pub fn delete_processing_preset(&mut self, name: &str) -> PipelineResult<ProcessingSettings> {
        let removed = self.processes.delete(name)?;
        self.notify(SettingsEvent::PresetDeleted {
            kind: StageKind::Processing,
            name: name.to_string(),
        });
        Ok(removed)
    }

    /// Lens preset at `index`.
    pub fn lens_preset(&self, index: usize) -> Option<&LensSettings> {
        self.lenses.get_by_index(index)
    }

    /// Film preset at `index`.
    pub fn film_preset(&self, index: usize) -> Option<&FilmSettings> {
        self.films.get_by_index(index)
    }

    /// Processing preset at `index`.
    pub fn processing_preset(&self, index: usize) -> Option<&ProcessingSettings> {
        self.processes.get_by_index(index)
    }

    /// Save the current lens settings as a preset called `name`.
    pub fn save_current_lens(&mut self, name: &str) -> PipelineResult<()> {
        save_current(&mut self.lenses, &self.current_lens, name)?;
        self.notify(SettingsEvent::PresetAdded {
            kind: StageKind::Lens,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Save the current film settings as a preset called `name`.
    pub fn save_current_film(&mut self, name: &str) -> PipelineResult<()> {
        save_current(&mut self.films, &self.current_film, name)?;
        self.notify(SettingsEvent::PresetAdded {
            kind: StageKind::Film,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Save the current processing settings as a preset called `name`.
    pub fn save_current_processing(&mut self, name: &str) -> PipelineResult<()> {
        save_current(&mut self.processes, &self.current_processing, name)?;
        self.notify(SettingsEvent::PresetAdded {
            kind: StageKind::Processing,
            name: name.to_string(),
        });
        Ok(())
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// The named colour profile, or a neutral grey ramp if there is none.
    pub fn colour_profile(&self, name: &str) -> Vec<PackedRgb> {
        self.colour_profiles.profile_or_neutral(name)
    }

    /// Name of the colour profile at `index`.
    pub fn colour_profile_name(&self, index: usize) -> Option<&str> {
        self.colour_profiles.name_at(index)
    }

    /// All colour profiles.
    pub fn colour_profiles(&self) -> &ColourProfileTable {
        &self.colour_profiles
    }

    /// Replace the colour profiles.
    pub fn set_colour_profiles(&mut self, profiles: ColourProfileTable) {
        self.colour_profiles = profiles;
    }

    /// The light leak catalog.
    pub fn light_leaks(&self) -> &LightLeakCatalog {
        &self.light_leaks
    }

    /// Replace the light leak catalog.
    pub fn set_light_leaks(&mut self, catalog: LightLeakCatalog) {
        self.light_leaks = catalog;
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Values remembered between sessions.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Remember the folder a photo was opened from.
    pub fn set_photo_folder(&mut self, folder: impl Into<String>) {
        self.session.photo_folder = folder.into();
        self.notify(SettingsEvent::SessionChanged);
    }

    /// Remember the folder a print was saved to.
    pub fn set_save_folder(&mut self, folder: impl Into<String>) {
        self.session.save_folder = folder.into();
        self.notify(SettingsEvent::SessionChanged);
    }

    /// Remember the size of the last save.
    pub fn set_save_size(&mut self, width: u32, height: u32) {
        self.session.save_width = width;
        self.session.save_height = height;
        self.notify(SettingsEvent::SessionChanged);
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Call `observer` after every settings change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&SettingsEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self, event: SettingsEvent) {
        debug!("Settings changed: {:?}", event);
        for observer in &self.observers {
            observer(&event);
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Replace presets, current settings and session with `config`.
    ///
    /// A current setting missing from the document becomes the first preset
    /// of its type, or stays unset if there are none.
    pub fn apply_config(&mut self, config: ClassicPrintConfig) {
        self.current_lens = config.effective_lens();
        self.current_film = config.effective_film();
        self.current_processing = config.effective_processing();
        self.lenses = config.lenses.into_iter().collect();
        self.films = config.films.into_iter().collect();
        self.processes = config.processes.into_iter().collect();
        self.session = Session {
            photo_folder: config.last_photo_folder,
            save_folder: config.last_save_folder,
            save_width: config.last_save_width,
            save_height: config.last_save_height,
        };
        for kind in StageKind::all() {
            self.notify(SettingsEvent::CurrentChanged(*kind));
        }
        self.notify(SettingsEvent::SessionChanged);
    }

    /// Snapshot presets, current settings and session as a document.
    pub fn to_config(&self) -> ClassicPrintConfig {
        let mut config = ClassicPrintConfig::new();
        config.last_photo_folder = self.session.photo_folder.clone();
        config.last_save_folder = self.session.save_folder.clone();
        if self.session.save_width > 0 && self.session.save_height > 0 {
            config.last_save_width = self.session.save_width;
            config.last_save_height = self.session.save_height;
        }
        config.lenses = self.lenses.iter().cloned().collect();
        config.films = self.films.iter().cloned().collect();
        config.processes = self.processes.iter().cloned().collect();
        config.current_lens = self.current_lens.clone();
        config.current_film = self.current_film.clone();
        config.current_processing = self.current_processing.clone();
        config
    }
}

impl Default for ClassicPrint {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassicPrint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassicPrint")
            .field("filters", &self.registry.len())
            .field("lenses", &self.lenses.len())
            .field("films", &self.films.len())
            .field("processes", &self.processes.len())
            .field("current_lens", &self.current_lens.as_ref().map(|s| &s.name))
            .field("current_film", &self.current_film.as_ref().map(|s| &s.name))
            .field("current_processing", &self.current_processing.as_ref().map(|s| &s.name))
            .field("colour_profiles", &self.colour_profiles.len())
            .field("light_leaks", &self.light_leaks.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{FilterError, StageError};
    use crate::filters::resources::Resources;
    use crate::pipeline::settings::LightLeak;
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    fn photo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions((400, 200), (100, 100)), (100, 50));
        assert_eq!(fit_dimensions((200, 400), (100, 100)), (50, 100));
        assert_eq!(fit_dimensions((300, 200), (600, 400)), (600, 400));
        assert_eq!(fit_dimensions((1000, 1), (10, 10)), (10, 1));
        assert_eq!(fit_dimensions((0, 0), (100, 100)), (0, 0));
        assert_eq!(fit_dimensions((0, 40), (100, 100)), (0, 40));
    }

    #[test]
    fn test_empty_photo_is_not_resized() {
        let pipeline = ClassicPrint::with_defaults();

        let print = pipeline.process(&RgbaImage::new(0, 0), 100, 100).unwrap();
        assert_eq!(print.dimensions(), (0, 0));
    }

    #[test]
    fn test_missing_configuration() {
        let mut pipeline = ClassicPrint::new();
        let err = pipeline.process(&photo(8, 8), 0, 0).unwrap_err();
        assert_eq!(err, PipelineError::NoConfiguration { missing: StageKind::Lens });

        pipeline.replace_current_lens(LensSettings::new("Lens"));
        pipeline.replace_current_film(FilmSettings::new("Film"));
        let err = pipeline.process(&photo(8, 8), 0, 0).unwrap_err();
        assert_eq!(
            err,
            PipelineError::NoConfiguration {
                missing: StageKind::Processing
            }
        );
    }

    #[test]
    fn test_progress_is_monotonic_and_ends_at_100() {
        let pipeline = ClassicPrint::with_defaults();
        let mut seen = Vec::new();
        pipeline
            .process_with_progress(&photo(32, 24), 0, 0, &mut |p| seen.push(p))
            .unwrap();

        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_resize_then_frame() {
        let mut pipeline = ClassicPrint::with_defaults();
        pipeline.replace_current_processing(ProcessingSettings::new("Framed").with_frame_size(10.0));

        let print = pipeline.process(&photo(400, 200), 100, 100).unwrap();
        // 100x50 after resize, then a 10px border
        assert_eq!(print.dimensions(), (120, 70));

        let print = pipeline.process(&photo(40, 20), 0, 100).unwrap();
        assert_eq!(print.dimensions(), (48, 28));
    }

    #[test]
    fn test_unknown_preset_leaves_current_unchanged() {
        let mut pipeline = ClassicPrint::with_defaults();
        let lens = pipeline.current_lens().cloned();
        let film = pipeline.current_film().cloned();
        let processing = pipeline.current_processing().cloned();

        assert!(matches!(
            pipeline.set_current_lens("Nope"),
            Err(PipelineError::PresetNotFound { kind: StageKind::Lens, .. })
        ));
        assert!(pipeline.set_current_film("Nope").is_err());
        assert!(pipeline.set_current_processing("Nope").is_err());

        assert_eq!(pipeline.current_lens().cloned(), lens);
        assert_eq!(pipeline.current_film().cloned(), film);
        assert_eq!(pipeline.current_processing().cloned(), processing);
    }

    #[test]
    fn test_current_is_a_copy_of_the_preset() {
        let mut pipeline = ClassicPrint::new();
        pipeline.add_film_preset(FilmSettings::new("Warm").with_temperature(80.0));
        pipeline.set_current_film("Warm").unwrap();

        pipeline.update_current_film(|f| f.with_temperature(10.0)).unwrap();
        assert_eq!(pipeline.current_film().map(|f| f.temperature_percent), Some(10.0));
        assert_eq!(pipeline.film_preset(0).map(|f| f.temperature_percent), Some(80.0));
    }

    #[test]
    fn test_save_current_as_preset() {
        let mut pipeline = ClassicPrint::new();
        assert!(pipeline.save_current_lens("Mine").is_err());

        pipeline.replace_current_lens(LensSettings::new("Scratch").with_radius(45.0));
        pipeline.save_current_lens("Mine").unwrap();

        let saved = pipeline.lens_presets().get("Mine").unwrap();
        assert_eq!(saved.radius_percent, 45.0);
        assert_eq!(pipeline.current_lens().map(|l| l.name.as_str()), Some("Scratch"));
    }

    #[test]
    fn test_preset_crud() {
        let mut pipeline = ClassicPrint::new();
        pipeline.add_processing_preset(ProcessingSettings::new("A"));
        pipeline.add_processing_preset(ProcessingSettings::new("B"));
        assert_eq!(pipeline.processing_preset(1).map(|p| p.name.as_str()), Some("B"));

        assert!(pipeline.delete_processing_preset("A").is_ok());
        assert!(matches!(
            pipeline.delete_processing_preset("A"),
            Err(PipelineError::PresetNotFound { .. })
        ));
        assert_eq!(pipeline.processing_preset(0).map(|p| p.name.as_str()), Some("B"));
    }

    #[test]
    fn test_colour_profile_fallback() {
        let pipeline = ClassicPrint::with_defaults();
        let ramp = pipeline.colour_profile("nonexistent");
        assert_eq!(ramp.len(), 256);
        for (i, entry) in ramp.iter().enumerate() {
            assert_eq!(*entry, crate::core::types::pack_rgb(i as u8, i as u8, i as u8));
        }
        assert_eq!(pipeline.colour_profile_name(0), Some(defaults::SEPIA_PROFILE));
        assert_eq!(pipeline.colour_profile_name(5), None);
    }

    #[test]
    fn test_observers() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = ClassicPrint::with_defaults();
        let sink = Arc::clone(&events);
        pipeline.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        pipeline.set_current_lens("Clear").unwrap();
        let _ = pipeline.set_current_lens("Missing");
        pipeline.add_film_preset(FilmSettings::new("Mine"));
        pipeline.set_save_size(800, 600);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                SettingsEvent::CurrentChanged(StageKind::Lens),
                SettingsEvent::PresetAdded {
                    kind: StageKind::Film,
                    name: "Mine".to_string()
                },
                SettingsEvent::SessionChanged,
            ]
        );
    }

    #[test]
    fn test_stage_failure_is_reported() {
        let mut pipeline = ClassicPrint::with_registry(FilterRegistry::with_resources(Resources::empty()));
        pipeline.replace_current_lens(LensSettings::new("Lens").with_radius(100.0));
        pipeline.replace_current_film(FilmSettings::new("Film"));
        pipeline.replace_current_processing(ProcessingSettings::new("Processing"));

        let mut seen = Vec::new();
        let err = pipeline
            .process_with_progress(&photo(8, 8), 0, 0, &mut |p| seen.push(p))
            .unwrap_err();
        match err {
            PipelineError::Stage(StageError::StageFailed { stage, source }) => {
                assert_eq!(stage, StageKind::Film);
                assert!(matches!(source, FilterError::UnprocessableImage { .. }));
            }
            other => panic!("expected a film stage failure, got {:?}", other),
        }
        assert!(!seen.contains(&100));
    }

    #[test]
    fn test_seeded_runs_are_repeatable() {
        let mut pipeline = ClassicPrint::with_defaults();
        pipeline.update_current_processing(|p| p.with_light_leak(LightLeak::Random)).unwrap();
        let source = photo(24, 16);

        let first = pipeline
            .process_with_rng(&source, 0, 0, &mut StdRng::seed_from_u64(3), &mut |_| {})
            .unwrap();
        let second = pipeline
            .process_with_rng(&source, 0, 0, &mut StdRng::seed_from_u64(3), &mut |_| {})
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_round_trip() {
        let mut pipeline = ClassicPrint::with_defaults();
        pipeline.set_photo_folder("/photos");
        pipeline.set_save_size(1024, 768);
        pipeline.update_current_film(|f| f.with_noise(5.0)).unwrap();

        let config = pipeline.to_config();
        let mut restored = ClassicPrint::new();
        restored.apply_config(config);

        assert_eq!(restored.session(), pipeline.session());
        assert_eq!(restored.current_film(), pipeline.current_film());
        assert_eq!(restored.lens_presets().len(), pipeline.lens_presets().len());
    }

    #[test]
    fn test_config_falls_back_to_first_preset() {
        let mut config = ClassicPrintConfig::new();
        config.films.push(FilmSettings::new("First"));
        config.films.push(FilmSettings::new("Second"));

        let mut pipeline = ClassicPrint::new();
        pipeline.apply_config(config);
        assert_eq!(pipeline.current_film().map(|f| f.name.as_str()), Some("First"));
        assert!(pipeline.current_lens().is_none());
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ClassicPrint>();
    }
}
