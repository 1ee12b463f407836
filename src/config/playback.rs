use crate::audio::{decoder::SymphoniaDecoder, AudioError, AudioSource};
use crate::config::settings::{ConfigError, Settings};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "jiho::config::playback";

/// What the chime plays, resolved once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    sound_source: AudioSource,
    explicit_duration: Option<Duration>,
    volume: Option<f32>,
}

impl PlaybackConfig {
    pub fn new(
        sound_source: AudioSource,
        explicit_duration: Option<Duration>,
        volume: Option<f32>,
    ) -> Result<Self, ConfigError> {
        if explicit_duration == Some(Duration::ZERO) {
            return Err(ConfigError::ValidationError("Duration must be greater than zero".to_string()));
        }
        if volume.is_some_and(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationError("Volume must be a finite number".to_string()));
        }
        Ok(Self { sound_source, explicit_duration, volume })
    }

    /// Resolves the sound source named in `settings` (falling back to the
    /// bundled chime) and checks that it is playable.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let sound_source = resolve_sound_source(settings.sound_source.as_deref())?;
        Self::new(sound_source, settings.duration, settings.volume)
    }

    pub fn sound_source(&self) -> &AudioSource {
        &self.sound_source
    }

    pub fn explicit_duration(&self) -> Option<Duration> {
        self.explicit_duration
    }

    pub fn volume(&self) -> Option<f32> {
        self.volume
    }
}

/// Uses the configured file when it exists, the bundled chime otherwise,
/// then validates the chosen source.
pub fn resolve_sound_source(configured: Option<&Path>) -> Result<AudioSource, AudioError> {
    let source = match configured {
        Some(path) if path.is_file() => AudioSource::file(path),
        Some(path) => {
            warn!(
                target: LOG_TARGET,
                "Sound source {} does not exist, falling back to the bundled chime.", path.display()
            );
            AudioSource::bundled()?
        }
        None => {
            info!(target: LOG_TARGET, "No sound source configured, using the bundled chime.");
            AudioSource::bundled()?
        }
    };
    validate_source(&source)?;
    Ok(source)
}

/// Probes the source; anything that cannot be opened as audio is invalid.
pub fn validate_source(source: &AudioSource) -> Result<(), AudioError> {
    match SymphoniaDecoder::open(source) {
        Ok(decoder) => {
            debug!(
                target: LOG_TARGET,
                "Sound source {} is playable ({} Hz, {} channel(s)).",
                source, decoder.sample_rate(), decoder.channels()
            );
            Ok(())
        }
        Err(e) => Err(AudioError::InvalidAudioSource(format!("{}: {}", source, e))),
    }
}
