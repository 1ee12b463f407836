//! Integration tests for configuration management
//!
//! These tests take a config file on disk through to a playback config.

use crate::test_utils::write_sine_wav;
use jiho::config::{ConfigError, PlaybackConfig, Settings, INITIAL_CONFIG};
use std::error::Error;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// First run: the file is created empty and everything falls back to defaults.
    #[test]
    fn test_first_run_uses_bundled_chime() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("jiho").join("config.json");

        assert!(Settings::ensure_exists(&config_path)?);
        assert_eq!(fs::read_to_string(&config_path)?, INITIAL_CONFIG);

        let settings = Settings::load(&config_path)?;
        let config = PlaybackConfig::from_settings(&settings)?;
        assert!(config.sound_source().is_bundled());
        assert_eq!(config.explicit_duration(), None);
        assert_eq!(config.volume(), None);

        // A second start leaves the file alone
        assert!(!Settings::ensure_exists(&config_path)?);
        Ok(())
    }

    #[test]
    fn test_configured_file_is_used() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let sound = dir.path().join("gong.wav");
        write_sine_wav(&sound, 16_000, 16_000, 220.0)?;

        let config_path = dir.path().join("config.json");
        let json = format!(
            r#"{{"soundSource": {}, "duration": "PT2.5S", "volume": 0.75, "alsaDevice": "hw:1,0"}}"#,
            serde_json::to_string(&sound)?
        );
        fs::write(&config_path, json)?;

        let settings = Settings::load(&config_path)?;
        assert_eq!(settings.alsa_device, "hw:1,0");

        let config = PlaybackConfig::from_settings(&settings)?;
        assert_eq!(config.sound_source().path(), Some(sound.as_path()));
        assert_eq!(config.explicit_duration(), Some(Duration::from_millis(2500)));
        assert_eq!(config.volume(), Some(0.75));
        Ok(())
    }

    #[test]
    fn test_missing_configured_file_falls_back() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{"soundSource": "/no/such/chime.wav"}"#)?;

        let config = PlaybackConfig::from_settings(&Settings::load(&config_path)?)?;
        assert!(config.sound_source().is_bundled());
        Ok(())
    }

    #[test]
    fn test_unplayable_configured_file_aborts() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let sound = dir.path().join("readme.wav");
        fs::write(&sound, "plain text")?;

        let settings = Settings { sound_source: Some(sound), ..Settings::default() };
        let err = PlaybackConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::SourceError(_)), "got {:?}", err);
        Ok(())
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, "{ soundSource: ")?;

        assert!(matches!(Settings::load(&config_path), Err(ConfigError::ParseError(_))));
        Ok(())
    }
}
