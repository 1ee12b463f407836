use std::error::Error;
use std::io;
use symphonia::core::errors::Error as SymphoniaError;

/// Error types for sound sources and the playback device.
#[derive(Debug)]
pub enum AudioError {
    /// The configured (or bundled) sound source is missing or unreadable.
    InvalidAudioSource(String),
    /// The audio data cannot be decoded.
    UnsupportedSource(String),
    /// The OS could not grant a playback line (busy, absent, misconfigured).
    DeviceUnavailable(String),
    /// Transient read error on the audio resource.
    IoFailure(io::Error),
    ResamplingError(String),
    /// Internal failure, e.g. the blocking playback task panicked.
    PlaybackError(String),
}

impl AudioError {
    /// Whether the scheduler may skip this chime and keep running.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AudioError::PlaybackError(_))
    }
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::InvalidAudioSource(s) => write!(f, "Invalid audio source: {}", s),
            AudioError::UnsupportedSource(s) => write!(f, "Unsupported audio source: {}", s),
            AudioError::DeviceUnavailable(s) => write!(f, "Audio device unavailable: {}", s),
            AudioError::IoFailure(e) => write!(f, "I/O error: {}", e),
            AudioError::ResamplingError(s) => write!(f, "Resampling error: {}", s),
            AudioError::PlaybackError(s) => write!(f, "Playback error: {}", s),
        }
    }
}

impl Error for AudioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AudioError::IoFailure(e) => Some(e),
            _ => None,
        }
    }
}

// --- From Implementations for AudioError ---

impl From<alsa::Error> for AudioError {
    fn from(e: alsa::Error) -> Self {
        AudioError::DeviceUnavailable(e.to_string())
    }
}

impl From<SymphoniaError> for AudioError {
    fn from(e: SymphoniaError) -> Self {
        match e {
            SymphoniaError::IoError(io_err) => AudioError::IoFailure(io_err),
            SymphoniaError::DecodeError(s) => AudioError::UnsupportedSource(format!("decode error: {}", s)),
            SymphoniaError::Unsupported(s) => AudioError::UnsupportedSource(format!("unsupported: {}", s)),
            SymphoniaError::LimitError(s) => AudioError::UnsupportedSource(format!("limit reached: {}", s)),
            other => AudioError::UnsupportedSource(other.to_string()),
        }
    }
}

impl From<io::Error> for AudioError {
    fn from(e: io::Error) -> Self {
        AudioError::IoFailure(e)
    }
}

impl From<tokio::task::JoinError> for AudioError {
    fn from(e: tokio::task::JoinError) -> Self {
        AudioError::PlaybackError(format!("playback task failed: {}", e))
    }
}
