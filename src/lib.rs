//! jiho: an hourly chime that strikes the hour on an ALSA device

pub mod audio;
pub mod config;
pub mod scheduler;
pub mod ui;

use audio::{AlsaChimePlayer, AlsaLineProvider};
use config::PlaybackConfig;
use scheduler::{Scheduler, ShutdownWaiter, SystemClock};
use std::error::Error;
use tokio::sync::broadcast;

/// Runs the hourly chime on `alsa_device` until a shutdown signal arrives.
/// Fails early if the sound source cannot be measured.
pub async fn run(
    config: &PlaybackConfig,
    alsa_device: &str,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), Box<dyn Error>> {
    let player = AlsaChimePlayer::new(config.sound_source().clone(), AlsaLineProvider::new(alsa_device));
    let mut scheduler = Scheduler::new(config, player, SystemClock, ShutdownWaiter::new(shutdown_rx)).await?;
    scheduler.run().await?;
    Ok(())
}
