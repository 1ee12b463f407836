//! Configuration: the on-disk settings file and the resolved playback config.

pub mod iso_duration;
mod playback;
mod settings;

pub use playback::{resolve_sound_source, validate_source, PlaybackConfig};
pub use settings::{ConfigError, Settings, INITIAL_CONFIG};
