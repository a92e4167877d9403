//! Built-in starter presets and colour profiles.
//!
//! Used when no configuration document is available, so a fresh pipeline
//! can render straight away.

use crate::core::types::pack_rgb;
use crate::pipeline::config::ClassicPrintConfig;
use crate::pipeline::profiles::ColourProfileTable;
use crate::pipeline::settings::{FilmSettings, LensSettings, LightLeak, ProcessingSettings};

/// Name of the built-in sepia colour profile.
pub const SEPIA_PROFILE: &str = "Sepia";

/// Starter lens presets. The first is the default current lens.
pub fn lenses() -> Vec<LensSettings> {
    vec![
        LensSettings::new("Standard")
            .with_radius(60.0)
            .with_darkness(40.0)
            .with_dodge(20.0),
        LensSettings::new("Clear").with_radius(100.0),
        LensSettings::new("Toy Camera")
            .with_radius(25.0)
            .with_darkness(85.0)
            .with_dodge(60.0)
            .with_defocus(true),
    ]
}

/// Starter film presets. The first is the default current film.
pub fn films() -> Vec<FilmSettings> {
    vec![
        FilmSettings::new("Daylight").with_temperature(55.0).with_noise(30.0),
        FilmSettings::new("Neutral").with_temperature(50.0),
        FilmSettings::new("Tungsten").with_temperature(20.0).with_noise(45.0),
        FilmSettings::new("Faded Warm").with_temperature(85.0).with_noise(60.0),
    ]
}

/// Starter processing presets. The first is the default current processing.
pub fn processes() -> Vec<ProcessingSettings> {
    vec![
        ProcessingSettings::new("Print").with_contrast(30.0),
        ProcessingSettings::new("Borderless").with_frame_size(0.0),
        ProcessingSettings::new("Aged")
            .with_contrast(50.0)
            .with_colourisation(SEPIA_PROFILE, 70.0)
            .with_frame_size(4.0),
        ProcessingSettings::new("Lucky Leak")
            .with_contrast(40.0)
            .with_light_leak(LightLeak::Random),
    ]
}

/// A configuration holding the starter presets.
///
/// No current settings are stored, so loading it makes the first preset of
/// each type current.
pub fn config() -> ClassicPrintConfig {
    let mut config = ClassicPrintConfig::new();
    config.lenses = lenses();
    config.films = films();
    config.processes = processes();
    config
}

/// Colour profiles available without a profile document.
pub fn colour_profiles() -> ColourProfileTable {
    let mut table = ColourProfileTable::new();
    let sepia = (0..256u32)
        .map(|i| {
            let r = (i * 240 / 255 + 15).min(255);
            let g = i * 215 / 255 + 10;
            let b = i * 170 / 255 + 5;
            pack_rgb(r as u8, g as u8, b as u8)
        })
        .collect();
    // Always 256 entries
    if let Err(e) = table.insert(SEPIA_PROFILE, sepia) {
        log::warn!("Built-in sepia profile rejected: {}", e);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::profiles::PROFILE_LEN;

    #[test]
    fn test_every_type_has_a_preset() {
        assert!(!lenses().is_empty());
        assert!(!films().is_empty());
        assert!(!processes().is_empty());
    }

    #[test]
    fn test_starter_config_has_no_current() {
        let config = config();
        assert!(config.current_lens.is_none());
        assert_eq!(config.effective_lens(), lenses().into_iter().next());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = processes().into_iter().map(|p| p.name).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_sepia_profile() {
        let profiles = colour_profiles();
        let sepia = profiles.get(SEPIA_PROFILE).unwrap();
        assert_eq!(sepia.len(), PROFILE_LEN);
        assert_eq!(sepia[255], pack_rgb(255, 225, 175));
    }

    #[test]
    fn test_referenced_profiles_exist() {
        let profiles = colour_profiles();
        for process in processes() {
            if !process.colourisation_profile.is_empty() {
                assert!(profiles.get(&process.colourisation_profile).is_some());
            }
        }
    }
}
