//! Per-repetition wait duration: explicit override, or measured clip length
//! plus a safety buffer.

use crate::audio::{error::AudioError, player::AudioPlayer};
use crate::config::PlaybackConfig;
use std::time::Duration;
use tracing::info;

const LOG_TARGET: &str = "jiho::audio::duration";

/// Added to a measured clip length so the next repetition's reset never cuts
/// the sound off.
pub const SAFETY_BUFFER: Duration = Duration::from_millis(500);

/// Resolves the duration to wait per repetition. Called once at startup.
pub async fn resolve<P: AudioPlayer + ?Sized>(config: &PlaybackConfig, player: &P) -> Result<Duration, AudioError> {
    if let Some(explicit) = config.explicit_duration() {
        info!(target: LOG_TARGET, "Using configured duration {:?} per repetition.", explicit);
        return Ok(explicit);
    }

    let clip_length = player.audio_duration().await?;
    let resolved = clip_length + SAFETY_BUFFER;
    info!(
        target: LOG_TARGET,
        "Measured clip length {:?}, using {:?} per repetition.", clip_length, resolved
    );
    Ok(resolved)
}
