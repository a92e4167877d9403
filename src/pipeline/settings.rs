//! Stage settings: the values a preset stores and a stage consumes.
//!
//! Settings are plain values. Setters take `self` and return the updated
//! value, so the "current" settings held by [`crate::pipeline::ClassicPrint`]
//! are only ever replaced as a whole.

use crate::core::error::StageKind;
use crate::core::pixel::clamp_channel;
use crate::core::types::{pack_rgb, PackedRgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector value meaning "pick a light leak at random".
pub const RANDOM_LEAK: &str = "Random";

/// A settings type that can be stored as a named preset.
pub trait Preset: Clone + fmt::Debug + Send + Sync {
    /// The stage these settings configure.
    const KIND: StageKind;

    /// Preset name.
    fn name(&self) -> &str;

    /// Rename the preset.
    fn set_name(&mut self, name: String);
}

// ============================================================================
// Lens
// ============================================================================

/// Lens stage settings, all percentages in 0 to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensSettings {
    /// Preset name
    pub name: String,
    /// Radius of the unshaded centre
    pub radius_percent: f64,
    /// Edge darkening
    pub darkness_percent: f64,
    /// Centre brightening
    pub dodge_percent: f64,
    /// Soften the edges
    pub defocus: bool,
}

impl LensSettings {
    /// Neutral lens settings with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            radius_percent: 0.0,
            darkness_percent: 0.0,
            dodge_percent: 0.0,
            defocus: false,
        }
    }

    /// Set the vignette radius.
    pub fn with_radius(mut self, percent: f64) -> Self {
        self.radius_percent = percent;
        self
    }

    /// Set the edge darkening.
    pub fn with_darkness(mut self, percent: f64) -> Self {
        self.darkness_percent = percent;
        self
    }

    /// Set the centre dodge.
    pub fn with_dodge(mut self, percent: f64) -> Self {
        self.dodge_percent = percent;
        self
    }

    /// Enable or disable edge defocus.
    pub fn with_defocus(mut self, defocus: bool) -> Self {
        self.defocus = defocus;
        self
    }
}

impl Default for LensSettings {
    fn default() -> Self {
        Self::new("")
    }
}

impl Preset for LensSettings {
    const KIND: StageKind = StageKind::Lens;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

// ============================================================================
// Film
// ============================================================================

/// Film stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilmSettings {
    /// Preset name
    pub name: String,
    /// Colour temperature, 0 cold to 100 warm
    pub temperature_percent: f64,
    /// Grain strength
    pub noise_percent: f64,
}

impl FilmSettings {
    /// Neutral film settings with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temperature_percent: 0.0,
            noise_percent: 0.0,
        }
    }

    /// Set the colour temperature.
    pub fn with_temperature(mut self, percent: f64) -> Self {
        self.temperature_percent = percent;
        self
    }

    /// Set the grain strength.
    pub fn with_noise(mut self, percent: f64) -> Self {
        self.noise_percent = percent;
        self
    }

    /// Green channel shift, -11 at cold to +11 at warm.
    pub fn green_offset(&self) -> i32 {
        (22.0 * self.temperature_percent / 100.0 - 11.0) as i32
    }

    /// Blue channel shift, +32 at cold to -32 at warm.
    pub fn blue_offset(&self) -> i32 {
        (-(64.0 * self.temperature_percent / 100.0 - 32.0)) as i32
    }

    /// Levels table shifting green and blue by the temperature offsets.
    ///
    /// Red entries are zero; the table is meant for a `"gb"` mask.
    pub fn temperature_levels(&self) -> Vec<PackedRgb> {
        let green = self.green_offset();
        let blue = self.blue_offset();
        (0..256i32)
            .map(|i| pack_rgb(0, clamp_channel(i + green), clamp_channel(i + blue)))
            .collect()
    }
}

impl Default for FilmSettings {
    fn default() -> Self {
        Self::new("")
    }
}

impl Preset for FilmSettings {
    const KIND: StageKind = StageKind::Film;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

// ============================================================================
// Processing
// ============================================================================

/// Which light leak, if any, the processing stage screens over the print.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LightLeak {
    /// No light leak.
    #[default]
    None,
    /// A named file in the light leak catalog.
    File(String),
    /// A random pick among the catalog, or none.
    Random,
}

impl From<String> for LightLeak {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => LightLeak::None,
            RANDOM_LEAK => LightLeak::Random,
            _ => LightLeak::File(value),
        }
    }
}

impl From<&str> for LightLeak {
    fn from(value: &str) -> Self {
        LightLeak::from(value.to_string())
    }
}

impl From<LightLeak> for String {
    fn from(value: LightLeak) -> Self {
        match value {
            LightLeak::None => String::new(),
            LightLeak::File(name) => name,
            LightLeak::Random => RANDOM_LEAK.to_string(),
        }
    }
}

impl fmt::Display for LightLeak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightLeak::None => f.write_str("none"),
            LightLeak::File(name) => f.write_str(name),
            LightLeak::Random => f.write_str(RANDOM_LEAK),
        }
    }
}

/// Processing stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Preset name
    pub name: String,
    /// Contrast curve strength
    pub contrast_percent: f64,
    /// Colour profile strength
    pub colourisation_percent: f64,
    /// Name of the colour profile to apply
    pub colourisation_profile: String,
    /// Border width, percent of the image width
    pub frame_size_percent: f64,
    /// Light leak selection
    pub light_leak: LightLeak,
}

impl ProcessingSettings {
    /// Default processing settings (3% frame, nothing else) with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contrast_percent: 0.0,
            colourisation_percent: 0.0,
            colourisation_profile: String::new(),
            frame_size_percent: 3.0,
            light_leak: LightLeak::None,
        }
    }

    /// Set the contrast strength.
    pub fn with_contrast(mut self, percent: f64) -> Self {
        self.contrast_percent = percent;
        self
    }

    /// Set the colour profile and its strength.
    pub fn with_colourisation(mut self, profile: impl Into<String>, percent: f64) -> Self {
        self.colourisation_profile = profile.into();
        self.colourisation_percent = percent;
        self
    }

    /// Set the frame size.
    pub fn with_frame_size(mut self, percent: f64) -> Self {
        self.frame_size_percent = percent;
        self
    }

    /// Set the light leak selection.
    pub fn with_light_leak(mut self, leak: impl Into<LightLeak>) -> Self {
        self.light_leak = leak.into();
        self
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self::new("")
    }
}

impl Preset for ProcessingSettings {
    const KIND: StageKind = StageKind::Processing;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::unpack_rgb;

    #[test]
    fn test_pure_setters_do_not_alias() {
        let base = LensSettings::new("Toy");
        let tuned = base.clone().with_radius(40.0).with_defocus(true);
        assert_eq!(base.radius_percent, 0.0);
        assert!(!base.defocus);
        assert_eq!(tuned.radius_percent, 40.0);
        assert!(tuned.defocus);
    }

    #[test]
    fn test_temperature_offsets() {
        let cold = FilmSettings::new("cold");
        assert_eq!((cold.green_offset(), cold.blue_offset()), (-11, 32));

        let warm = FilmSettings::new("warm").with_temperature(100.0);
        assert_eq!((warm.green_offset(), warm.blue_offset()), (11, -32));

        // -5.5 and 16 truncate toward zero
        let cool = FilmSettings::new("cool").with_temperature(25.0);
        assert_eq!((cool.green_offset(), cool.blue_offset()), (-5, 16));
    }

    #[test]
    fn test_temperature_levels_clamped() {
        let table = FilmSettings::new("warm").with_temperature(100.0).temperature_levels();
        assert_eq!(table.len(), 256);
        assert_eq!(unpack_rgb(table[0]), (0, 11, 0));
        assert_eq!(unpack_rgb(table[250]), (0, 255, 218));
    }

    #[test]
    fn test_light_leak_strings() {
        assert_eq!(LightLeak::from(""), LightLeak::None);
        assert_eq!(LightLeak::from("Random"), LightLeak::Random);
        assert_eq!(LightLeak::from("leak1.jpg"), LightLeak::File("leak1.jpg".to_string()));
        assert_eq!(String::from(LightLeak::Random), "Random");
    }

    #[test]
    fn test_settings_json() {
        let settings = ProcessingSettings::new("Sepia")
            .with_contrast(30.0)
            .with_colourisation("Sepia", 80.0)
            .with_light_leak(LightLeak::Random);
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"light_leak\":\"Random\""));
        let back: ProcessingSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);

        // Missing fields take their defaults
        let partial: ProcessingSettings = serde_json::from_str(r#"{"name":"Plain"}"#).unwrap();
        assert_eq!(partial.frame_size_percent, 3.0);
        assert_eq!(partial.light_leak, LightLeak::None);
    }
}
