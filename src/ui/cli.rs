//! Command-line interface implementation

use crate::config::Settings;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for jiho
#[derive(Parser, Debug)]
#[command(name = "jiho", author, version, about = "Strikes the hour on your speakers, like a striking clock", long_about = None)]
pub struct Args {
    /// Configuration file path (default: <config dir>/jiho/config.json, created on first run)
    #[arg(short = 'c', long = "config-file", env = "JIHO_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// ALSA device to use, overrides the configuration file
    #[arg(short = 'd', long, env = "JIHO_ALSA_DEVICE")]
    pub device: Option<String>,

    /// Playback volume from 0.0 to 1.0, overrides the configuration file
    #[arg(long, env = "JIHO_VOLUME")]
    pub volume: Option<f32>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", env = "JIHO_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Command-line values take precedence over the configuration file.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(device) = &self.device {
            settings.alsa_device = device.clone();
        }
        if let Some(volume) = self.volume {
            settings.volume = Some(volume);
        }
    }
}
