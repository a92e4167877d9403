//! Pipeline coordination: settings, presets, colour profiles, progress
//! and persisted configuration.

pub mod settings;
pub mod presets;
pub mod profiles;
pub mod progress;
pub mod classic_print;
pub mod config;
pub mod defaults;

pub use classic_print::{fit_dimensions, ClassicPrint, Session, SettingsEvent, SettingsObserver};
pub use config::ClassicPrintConfig;
pub use presets::PresetCollection;
pub use profiles::{ColourProfileDocument, ColourProfileEntry, ColourProfileTable};
pub use progress::{overall_progress, ProgressAggregator};
pub use settings::{FilmSettings, LensSettings, LightLeak, Preset, ProcessingSettings, RANDOM_LEAK};
