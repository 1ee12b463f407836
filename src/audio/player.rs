use crate::audio::{
    decoder::{self, ClipData},
    error::AudioError,
    resample,
    source::AudioSource,
    volume::{self, HasGainControl},
};
use async_trait::async_trait;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info, instrument};

const LOG_TARGET: &str = "jiho::audio::player";

/// Playback capability the scheduler drives.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Plays the source `times` times, waiting `duration` after each start.
    /// `volume` is a linear fraction (0.0 to 1.0), `None` for the device default.
    async fn play(&mut self, times: u32, duration: Duration, volume: Option<f32>) -> Result<(), AudioError>;

    /// Natural length of the source. Leaves nothing open.
    async fn audio_duration(&self) -> Result<Duration, AudioError>;
}

/// Format requested when opening a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    pub sample_rate: u32,
    pub channels: usize,
}

/// An open output line. Implementations release the device when dropped.
pub trait DeviceLine: HasGainControl {
    /// Rate the device actually runs at.
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> usize;

    /// Resets the playback position to the start of the clip.
    fn rewind(&mut self) -> Result<(), AudioError>;

    /// Starts playing the clip from the current position.
    fn start(&mut self, clip: &ClipData) -> Result<(), AudioError>;
}

/// Opens device lines.
pub trait LineProvider: Send + Sync + 'static {
    type Line: DeviceLine;

    fn open(&self, format: LineFormat) -> Result<Self::Line, AudioError>;
}

/// Plays a sound source on lines from a [`LineProvider`]. A fresh line is
/// opened per `play` call and closed before it returns.
pub struct ChimePlayer<P: LineProvider> {
    source: AudioSource,
    provider: Arc<P>,
}

impl<P: LineProvider> ChimePlayer<P> {
    pub fn new(source: AudioSource, provider: P) -> Self {
        info!(target: LOG_TARGET, "Creating chime player for source: {}", source);
        ChimePlayer { source, provider: Arc::new(provider) }
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: LineProvider> AudioPlayer for ChimePlayer<P> {
    async fn play(&mut self, times: u32, duration: Duration, volume: Option<f32>) -> Result<(), AudioError> {
        let source = self.source.clone();
        let provider = Arc::clone(&self.provider);
        task::spawn_blocking(move || play_blocking(&source, provider.as_ref(), times, duration, volume)).await?
    }

    async fn audio_duration(&self) -> Result<Duration, AudioError> {
        let source = self.source.clone();
        task::spawn_blocking(move || decoder::measure_duration(&source)).await?
    }
}

/// Blocking body of [`AudioPlayer::play`]. The line lives only inside this
/// call, so it is closed on every return path.
#[instrument(skip(source, provider), fields(source = %source))]
pub fn play_blocking<P: LineProvider + ?Sized>(
    source: &AudioSource,
    provider: &P,
    times: u32,
    duration: Duration,
    volume: Option<f32>,
) -> Result<(), AudioError> {
    if times == 0 {
        debug!(target: LOG_TARGET, "Nothing to play (times = 0).");
        return Ok(());
    }

    let clip = decoder::decode_clip(source)?;
    let mut line = provider.open(LineFormat { sample_rate: clip.sample_rate, channels: clip.channels })?;

    if let Some(volume) = volume {
        volume::apply(&mut line, volume);
    }

    let clip = resample::resample_clip(&clip, line.sample_rate())?;

    for repetition in 1..=times {
        line.rewind()?;
        let started = Instant::now();
        line.start(&clip)?;
        debug!(target: LOG_TARGET, "Chime {}/{} started", repetition, times);
        thread::sleep(duration.saturating_sub(started.elapsed()));
    }

    info!(target: LOG_TARGET, "Played chime {} time(s).", times);
    Ok(())
}
