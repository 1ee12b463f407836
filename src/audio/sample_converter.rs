use tracing::trace;

const LOG_TARGET: &str = "jiho::audio::sample_converter";

/// Converts interleaved f32 samples to interleaved S16, scaling by a linear gain.
pub fn f32_to_s16_with_gain(samples: &[f32], gain: f32) -> Vec<i16> {
    trace!(target: LOG_TARGET, "Converting {} samples to S16 (gain {:.4})", samples.len(), gain);
    samples
        .iter()
        .map(|s| (s * gain * 32767.0).clamp(-32768.0, 32767.0) as i16)
        .collect()
}

/// Splits interleaved samples into one Vec per channel.
pub fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    if channels == 0 {
        return Vec::new();
    }
    let frames = samples.len() / channels;
    let mut planes = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (ch, sample) in frame.iter().enumerate() {
            planes[ch].push(*sample);
        }
    }
    planes
}

/// Joins per-channel planes back into interleaved samples. Planes are cut to
/// the shortest one.
pub fn interleave(planes: &[Vec<f32>]) -> Vec<f32> {
    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            out.push(plane[frame]);
        }
    }
    out
}
