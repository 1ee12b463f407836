//! Integration tests for the hourly loop
//!
//! The scheduler runs against a scripted clock and waiter, so no test sleeps.

use crate::test_utils::{at, ManualClock, PlayCall, RecordingPlayer, ScriptedWaiter};
use async_trait::async_trait;
use jiho::audio::{AudioError, AudioPlayer, AudioSource};
use jiho::config::PlaybackConfig;
use jiho::scheduler::{Scheduler, SchedulerError, ShutdownWaiter, WaitOutcome, Waiter, POLL_TICK};
use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use WaitOutcome::{Cancelled, Elapsed};

/// Requests shutdown as soon as it starts playing, then takes
/// `times * duration` of (tokio) time to finish.
struct ShutdownMidPlay {
    shutdown_tx: broadcast::Sender<()>,
    plays: Arc<AtomicU32>,
}

#[async_trait]
impl AudioPlayer for ShutdownMidPlay {
    async fn play(&mut self, times: u32, duration: Duration, _volume: Option<f32>) -> Result<(), AudioError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
        tokio::time::sleep(duration * times).await;
        Ok(())
    }

    async fn audio_duration(&self) -> Result<Duration, AudioError> {
        Ok(Duration::from_secs(1))
    }
}

/// Records every requested span before handing it to the wrapped waiter.
struct SpanLog<W> {
    inner: W,
    spans: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl<W: Waiter> Waiter for SpanLog<W> {
    async fn wait(&mut self, span: Duration) -> WaitOutcome {
        self.spans.lock().unwrap().push(span);
        self.inner.wait(span).await
    }
}

fn config(explicit_duration: Option<Duration>, volume: Option<f32>) -> PlaybackConfig {
    PlaybackConfig::new(AudioSource::file("/sounds/chime.wav"), explicit_duration, volume)
        .expect("valid playback config")
}

#[cfg(test)]
mod scheduler_integration_tests {
    use super::*;

    /// A 2.3 s clip with no explicit duration strikes twice at 14:00, 2.8 s apart,
    /// then the loop moves on to the 15:00 boundary.
    #[tokio::test]
    async fn test_strikes_two_at_fourteen_hundred() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_millis(2300));
        let clock = ManualClock::new(vec![at(0, 13, 20, 0, 0), at(0, 14, 0, 0, 200)]);
        let waiter = ScriptedWaiter::new(vec![Elapsed, Elapsed, Elapsed, Cancelled]);

        let mut scheduler = Scheduler::new(&config(None, None), player.clone(), clock, waiter.clone()).await?;
        assert_eq!(scheduler.duration(), Duration::from_millis(2800));

        scheduler.run().await?;

        assert_eq!(
            player.calls(),
            vec![PlayCall { times: 2, duration: Duration::from_millis(2800), volume: None }]
        );
        assert_eq!(
            waiter.spans(),
            vec![
                POLL_TICK,
                Duration::from_secs(40 * 60),
                POLL_TICK,
                Duration::from_secs(3600) - Duration::from_millis(200),
            ]
        );
        Ok(())
    }

    /// A shutdown arriving while the hour is being struck lets the chime finish,
    /// then stops the loop at the next poll tick without waiting for another hour.
    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_play_stops_after_the_chime() -> Result<(), Box<dyn Error>> {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let plays = Arc::new(AtomicU32::new(0));
        let spans = Arc::new(Mutex::new(Vec::new()));

        let player = ShutdownMidPlay { shutdown_tx, plays: Arc::clone(&plays) };
        let clock = ManualClock::new(vec![at(0, 14, 59, 59, 0)]);
        let waiter = SpanLog { inner: ShutdownWaiter::new(shutdown_rx), spans: Arc::clone(&spans) };

        let mut scheduler = Scheduler::new(&config(Some(Duration::from_secs(2)), None), player, clock, waiter).await?;
        let started = tokio::time::Instant::now();
        scheduler.run().await?;

        assert_eq!(plays.load(Ordering::SeqCst), 1);
        // tick, 1 s to 15:00, then the tick that sees the shutdown
        assert_eq!(*spans.lock().unwrap(), vec![POLL_TICK, Duration::from_secs(1), POLL_TICK]);
        // three strikes of 2 s each ran to completion
        assert!(started.elapsed() >= Duration::from_secs(1 + 1 + 6));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_during_poll_tick_reads_no_clock() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_secs(1));
        let clock = ManualClock::new(vec![at(0, 9, 0, 0, 0)]);
        let waiter = ScriptedWaiter::new(vec![Cancelled]);

        let mut scheduler = Scheduler::new(&config(None, None), player.clone(), clock, waiter.clone()).await?;
        scheduler.run().await?;

        assert!(player.calls().is_empty());
        assert_eq!(waiter.spans(), vec![POLL_TICK]);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_before_boundary_plays_nothing() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_secs(1));
        let clock = ManualClock::new(vec![at(0, 9, 59, 30, 0)]);
        let waiter = ScriptedWaiter::new(vec![Elapsed, Cancelled]);

        let mut scheduler = Scheduler::new(&config(None, None), player.clone(), clock, waiter.clone()).await?;
        scheduler.run().await?;

        assert!(player.calls().is_empty());
        assert_eq!(waiter.spans(), vec![POLL_TICK, Duration::from_secs(30)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_midnight_and_noon_strike_twelve() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_secs(1));
        let clock = ManualClock::new(vec![at(2, 23, 45, 0, 0), at(2, 11, 10, 0, 0)]);
        let waiter = ScriptedWaiter::new(vec![Elapsed, Elapsed, Elapsed, Elapsed]);

        let mut scheduler = Scheduler::new(&config(None, None), player.clone(), clock, waiter).await?;
        scheduler.run().await?;

        let strikes: Vec<u32> = player.calls().iter().map(|c| c.times).collect();
        assert_eq!(strikes, vec![12, 12]);
        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_duration_and_volume_are_passed_through() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_secs(7));
        let clock = ManualClock::new(vec![at(0, 16, 30, 0, 0)]);
        let waiter = ScriptedWaiter::new(vec![Elapsed, Elapsed]);

        let playback = config(Some(Duration::from_secs(3)), Some(0.4));
        let mut scheduler = Scheduler::new(&playback, player.clone(), clock, waiter).await?;
        scheduler.run().await?;

        assert_eq!(player.duration_queries.load(Ordering::SeqCst), 0);
        assert_eq!(
            player.calls(),
            vec![PlayCall { times: 5, duration: Duration::from_secs(3), volume: Some(0.4) }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_recoverable_failure_skips_one_chime() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_secs(1));
        player.fail_next_play(AudioError::DeviceUnavailable("device busy".to_string()));
        let clock = ManualClock::new(vec![at(0, 0, 30, 0, 0), at(0, 1, 0, 0, 100)]);
        let waiter = ScriptedWaiter::new(vec![Elapsed, Elapsed, Elapsed, Elapsed]);

        let mut scheduler = Scheduler::new(&config(None, None), player.clone(), clock, waiter).await?;
        scheduler.run().await?;

        let strikes: Vec<u32> = player.calls().iter().map(|c| c.times).collect();
        assert_eq!(strikes, vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unusable_player_stops_the_loop() -> Result<(), Box<dyn Error>> {
        let player = RecordingPlayer::new(Duration::from_secs(1));
        player.fail_next_play(AudioError::PlaybackError("worker panicked".to_string()));
        let clock = ManualClock::new(vec![at(0, 5, 5, 0, 0)]);
        let waiter = ScriptedWaiter::new(vec![Elapsed, Elapsed, Elapsed, Elapsed]);

        let mut scheduler = Scheduler::new(&config(None, None), player.clone(), clock, waiter.clone()).await?;
        let result = scheduler.run().await;

        assert!(matches!(result, Err(SchedulerError::Playback(AudioError::PlaybackError(_)))));
        assert_eq!(player.calls().len(), 1);
        assert_eq!(waiter.spans().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unmeasurable_source_fails_construction() {
        let player = RecordingPlayer::unmeasurable("not audio");
        let clock = ManualClock::new(vec![at(0, 5, 5, 0, 0)]);
        let waiter = ScriptedWaiter::new(vec![]);

        let result = Scheduler::new(&config(None, None), player, clock, waiter).await;
        assert!(matches!(result, Err(AudioError::UnsupportedSource(_))));
    }
}
