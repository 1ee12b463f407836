use crate::audio::{builtin, error::AudioError};
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::probe::Hint;

/// Where the chime's sound data comes from. Never mutated; cheap to clone.
#[derive(Clone, Debug)]
pub enum AudioSource {
    /// A sound file on disk.
    File(PathBuf),
    /// The bundled default chime, WAV encoded in memory.
    Bundled(Arc<[u8]>),
}

impl AudioSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        AudioSource::File(path.into())
    }

    /// Builds the bundled default chime.
    pub fn bundled() -> Result<Self, AudioError> {
        Ok(AudioSource::Bundled(builtin::chime_wav()?.into()))
    }

    /// Opens a fresh stream over the sound data. The stream owns the file
    /// handle; dropping it releases the handle.
    pub fn open(&self) -> Result<(MediaSourceStream, Hint), AudioError> {
        let mut hint = Hint::new();
        let stream = match self {
            AudioSource::File(path) => {
                if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                    hint.with_extension(ext);
                }
                let file = File::open(path).map_err(|e| open_error(path, e))?;
                MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default())
            }
            AudioSource::Bundled(bytes) => {
                hint.with_extension("wav");
                MediaSourceStream::new(
                    Box::new(Cursor::new(Arc::clone(bytes))),
                    MediaSourceStreamOptions::default(),
                )
            }
        };
        Ok((stream, hint))
    }

    /// Returns the path for file sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            AudioSource::File(path) => Some(path),
            AudioSource::Bundled(_) => None,
        }
    }

    pub fn is_bundled(&self) -> bool {
        matches!(self, AudioSource::Bundled(_))
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSource::File(path) => write!(f, "{}", path.display()),
            AudioSource::Bundled(_) => write!(f, "<bundled chime>"),
        }
    }
}

fn open_error(path: &Path, e: io::Error) -> AudioError {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            AudioError::InvalidAudioSource(format!("{}: {}", path.display(), e))
        }
        _ => AudioError::IoFailure(e),
    }
}
