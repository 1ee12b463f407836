//! Integration tests for per-repetition duration resolution

use crate::test_utils::{write_sine_wav, RecordingPlayer};
use jiho::audio::{duration, AudioSource, ChimePlayer};
use jiho::config::PlaybackConfig;
use std::error::Error;
use std::time::Duration;
use tempfile::tempdir;

#[cfg(test)]
mod duration_integration_tests {
    use super::*;
    use crate::integration::audio_test::NullProvider;

    #[tokio::test]
    async fn test_measured_length_gets_safety_buffer() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("bell.wav");
        // 2.3 s at 44.1 kHz
        write_sine_wav(&path, 44_100, 101_430, 660.0)?;

        let config = PlaybackConfig::new(AudioSource::file(&path), None, None)?;
        let player = ChimePlayer::new(config.sound_source().clone(), NullProvider);

        assert_eq!(duration::resolve(&config, &player).await?, Duration::from_millis(2800));
        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_duration_skips_measurement() -> Result<(), Box<dyn Error>> {
        let config = PlaybackConfig::new(AudioSource::file("/nonexistent.wav"), Some(Duration::from_secs(4)), None)?;
        let player = RecordingPlayer::unmeasurable("never asked");

        assert_eq!(duration::resolve(&config, &player).await?, Duration::from_secs(4));
        Ok(())
    }

    #[tokio::test]
    async fn test_measurement_failure_propagates() -> Result<(), Box<dyn Error>> {
        let config = PlaybackConfig::new(AudioSource::file("/nonexistent.wav"), None, None)?;
        let player = RecordingPlayer::unmeasurable("broken header");

        assert!(duration::resolve(&config, &player).await.is_err());
        Ok(())
    }
}
