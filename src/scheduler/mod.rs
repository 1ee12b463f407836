//! The hourly loop: wait for the top of the hour, then strike it.

mod clock;
mod waiter;

pub use clock::{Clock, SystemClock};
pub use waiter::{ShutdownWaiter, WaitOutcome, Waiter};

use crate::audio::{duration, AudioError, AudioPlayer};
use crate::config::PlaybackConfig;
use chrono::{DateTime, TimeDelta, TimeZone, Timelike};
use std::error::Error;
use std::fmt::{self, Display};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

const LOG_TARGET: &str = "jiho::scheduler";

/// Short wait at the top of every iteration; bounds how long a shutdown
/// request can go unnoticed between boundaries.
pub const POLL_TICK: Duration = Duration::from_secs(1);

/// Number of strikes for an hour of the day (0-23) on a 12-hour clock.
pub fn chime_count(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        times => times,
    }
}

/// Start of the hour following `now` (minute, second and sub-second zero).
/// An instant exactly on a boundary maps to the next one.
pub fn next_hour_boundary<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let into_hour = TimeDelta::minutes(now.minute() as i64)
        + TimeDelta::seconds(now.second() as i64)
        + TimeDelta::nanoseconds(now.nanosecond() as i64);
    now.clone() - into_hour + TimeDelta::hours(1)
}

/// A steady-state failure the loop cannot continue after.
#[derive(Debug)]
pub enum SchedulerError {
    Playback(AudioError),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Playback(e) => write!(f, "Chime playback failed permanently: {}", e),
        }
    }
}

impl Error for SchedulerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SchedulerError::Playback(e) => Some(e),
        }
    }
}

/// Owns the player for the life of the process and drives it once per hour.
pub struct Scheduler<P, C, W> {
    player: P,
    clock: C,
    waiter: W,
    duration: Duration,
    volume: Option<f32>,
    poll_tick: Duration,
}

impl<P, C, W> Scheduler<P, C, W>
where
    P: AudioPlayer,
    C: Clock,
    W: Waiter,
    <C::Tz as TimeZone>::Offset: Display,
{
    /// Resolves the per-repetition duration once; fails if the source cannot
    /// be measured.
    pub async fn new(config: &PlaybackConfig, player: P, clock: C, waiter: W) -> Result<Self, AudioError> {
        let duration = duration::resolve(config, &player).await?;
        Ok(Self {
            player,
            clock,
            waiter,
            duration,
            volume: config.volume(),
            poll_tick: POLL_TICK,
        })
    }

    pub fn with_poll_tick(mut self, poll_tick: Duration) -> Self {
        self.poll_tick = poll_tick;
        self
    }

    /// Duration waited after each strike.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Runs until cancelled. Returns `Ok` on cancellation; a failed chime is
    /// logged and skipped unless the player can no longer be used.
    #[instrument(skip(self), name = "chime_loop")]
    pub async fn run(&mut self) -> Result<(), SchedulerError> {
        info!(target: LOG_TARGET, "Hourly chime started ({:?} per repetition).", self.duration);

        loop {
            if self.waiter.wait(self.poll_tick).await == WaitOutcome::Cancelled {
                info!(target: LOG_TARGET, "Shutdown requested, stopping.");
                return Ok(());
            }

            let now = self.clock.now();
            let next_hour = next_hour_boundary(&now);
            let wait_span = (next_hour.clone() - now.clone()).to_std().unwrap_or(Duration::ZERO);
            let times = chime_count(next_hour.hour());

            info!(
                target: LOG_TARGET,
                "Current time: {}. Waiting {} seconds until {}", now, wait_span.as_secs(), next_hour
            );

            if self.waiter.wait(wait_span).await == WaitOutcome::Cancelled {
                info!(target: LOG_TARGET, "Shutdown requested before {}, no chime played.", next_hour);
                return Ok(());
            }

            info!(target: LOG_TARGET, "It's the hour. Playing sound {} time(s)...", times);
            match self.player.play(times, self.duration, self.volume).await {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    warn!(target: LOG_TARGET, "Skipping the {} chime: {}", next_hour, e);
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Chime player is unusable: {}", e);
                    return Err(SchedulerError::Playback(e));
                }
            }
        }
    }
}
