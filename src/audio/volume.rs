//! Linear volume to decibel gain conversion for device lines.

use tracing::{debug, warn};

const LOG_TARGET: &str = "jiho::audio::volume";

/// Linear volumes at or below this are treated as silence.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// A gain control exposed by a device line, in decibels.
pub trait GainControl {
    fn min_db(&self) -> f32;
    fn max_db(&self) -> f32;
    fn set_db(&mut self, db: f32);
}

/// Anything that may expose a gain control.
pub trait HasGainControl {
    fn gain_control(&mut self) -> Option<&mut dyn GainControl>;
}

/// Clamps a linear volume fraction to [0.0, 1.0]. NaN counts as silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

/// Converts a linear volume to decibels within `[min_db, max_db]`.
/// Near-silent volumes map straight to `min_db`, never to `-inf`.
pub fn linear_to_db(volume: f32, min_db: f32, max_db: f32) -> f32 {
    let clamped = clamp_volume(volume);
    let db = if clamped <= SILENCE_THRESHOLD {
        min_db
    } else {
        20.0 * clamped.log10()
    };
    db.max(min_db).min(max_db)
}

/// Applies a linear volume to the line's gain control. Lines without a gain
/// control keep the device default level.
pub fn apply<L: HasGainControl + ?Sized>(line: &mut L, volume: f32) {
    let Some(control) = line.gain_control() else {
        warn!(target: LOG_TARGET, "Volume control not supported for this audio line, using device default level.");
        return;
    };

    let clamped = clamp_volume(volume);
    let db = linear_to_db(clamped, control.min_db(), control.max_db());
    debug!(target: LOG_TARGET, "Setting volume. Linear: {} -> dB: {}", clamped, db);
    control.set_db(db);
}

/// Software gain stage, for lines whose hardware offers no usable control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftwareGain {
    min_db: f32,
    max_db: f32,
    db: f32,
}

impl SoftwareGain {
    pub const DEFAULT_MIN_DB: f32 = -80.0;
    pub const DEFAULT_MAX_DB: f32 = 6.0;

    pub fn new(min_db: f32, max_db: f32) -> Self {
        Self { min_db, max_db, db: 0.0_f32.max(min_db).min(max_db) }
    }

    pub fn db(&self) -> f32 {
        self.db
    }

    /// Linear factor to multiply samples with. The minimum setting mutes.
    pub fn factor(&self) -> f32 {
        if self.db <= self.min_db {
            0.0
        } else {
            10f32.powf(self.db / 20.0)
        }
    }
}

impl Default for SoftwareGain {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_DB, Self::DEFAULT_MAX_DB)
    }
}

impl GainControl for SoftwareGain {
    fn min_db(&self) -> f32 {
        self.min_db
    }

    fn max_db(&self) -> f32 {
        self.max_db
    }

    fn set_db(&mut self, db: f32) {
        self.db = db.max(self.min_db).min(self.max_db);
    }
}
