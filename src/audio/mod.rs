//! Audio playback: sound sources, decoding, the ALSA device line and the
//! chime player the scheduler drives.

pub mod alsa_handler;
pub mod builtin;
pub mod decoder;
pub mod duration;
pub mod error;
pub mod player;
pub mod resample;
pub mod sample_converter;
pub mod source;
pub mod volume;

pub use alsa_handler::{AlsaLine, AlsaLineProvider};
pub use decoder::ClipData;
pub use error::AudioError;
pub use player::{AudioPlayer, ChimePlayer, DeviceLine, LineFormat, LineProvider};
pub use source::AudioSource;
pub use volume::{GainControl, HasGainControl, SoftwareGain};

/// The player used on real hardware.
pub type AlsaChimePlayer = ChimePlayer<AlsaLineProvider>;
