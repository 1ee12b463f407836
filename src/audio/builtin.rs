//! Bundled default chime, used when no usable sound file is configured.

use crate::audio::error::AudioError;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::io::Cursor;
use tracing::debug;

const LOG_TARGET: &str = "jiho::audio::builtin";

pub const CHIME_SAMPLE_RATE: u32 = 44_100;
pub const CHIME_LENGTH_MS: u32 = 1_200;

/// (frequency Hz, relative amplitude, decay rate per second)
const PARTIALS: [(f32, f32, f32); 3] = [(880.0, 0.6, 3.0), (1760.0, 0.25, 5.0), (2640.0, 0.15, 8.0)];

/// Synthesises the bell tone as mono f32 samples in [-1.0, 1.0].
pub fn chime_samples() -> Vec<f32> {
    let total_frames = (CHIME_SAMPLE_RATE as u64 * CHIME_LENGTH_MS as u64 / 1000) as usize;
    let fade_out_frames = (CHIME_SAMPLE_RATE / 50) as usize; // 20 ms

    (0..total_frames)
        .map(|i| {
            let t = i as f32 / CHIME_SAMPLE_RATE as f32;
            // Short attack so the first sample does not click
            let attack = (t / 0.005).min(1.0);
            let release = if i + fade_out_frames > total_frames {
                (total_frames - i) as f32 / fade_out_frames as f32
            } else {
                1.0
            };
            let tone: f32 = PARTIALS
                .iter()
                .map(|(freq, amp, decay)| amp * (-decay * t).exp() * (2.0 * PI * freq * t).sin())
                .sum();
            tone * attack * release
        })
        .collect()
}

/// Encodes the bundled chime as a 16-bit mono WAV file held in memory.
pub fn chime_wav() -> Result<Vec<u8>, AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: CHIME_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
        for sample in chime_samples() {
            let s16 = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            writer.write_sample(s16).map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }

    let bytes = cursor.into_inner();
    debug!(target: LOG_TARGET, "Encoded bundled chime ({} bytes)", bytes.len());
    Ok(bytes)
}

fn wav_error(e: hound::Error) -> AudioError {
    AudioError::InvalidAudioSource(format!("bundled chime could not be encoded: {}", e))
}
