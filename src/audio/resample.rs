use crate::audio::{decoder::ClipData, error::AudioError, sample_converter};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use tracing::{debug, info};

const LOG_TARGET: &str = "jiho::audio::resample";
const CHUNK_SIZE: usize = 1024;

/// Resamples a whole clip to `target_rate`. Returns the clip unchanged when
/// the rates already match.
pub fn resample_clip(clip: &ClipData, target_rate: u32) -> Result<ClipData, AudioError> {
    if clip.sample_rate == target_rate || clip.frames() == 0 {
        return Ok(clip.clone());
    }
    if target_rate == 0 {
        return Err(AudioError::ResamplingError("target rate is zero".to_string()));
    }

    info!(
        target: LOG_TARGET,
        "Sample rate mismatch (clip: {}, device: {}). Resampling clip.", clip.sample_rate, target_rate
    );

    let ratio = target_rate as f64 / clip.sample_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, clip.channels)
        .map_err(|e| AudioError::ResamplingError(format!("Failed to create resampler: {}", e)))?;

    let planes = sample_converter::deinterleave(&clip.samples, clip.channels);
    let total_frames = planes.first().map_or(0, Vec::len);
    let mut output: Vec<Vec<f32>> = vec![Vec::new(); clip.channels];

    let mut append = |chunk: Vec<Vec<f32>>| {
        for (out, resampled) in output.iter_mut().zip(chunk) {
            out.extend_from_slice(&resampled);
        }
    };

    let mut position = 0;
    while position + CHUNK_SIZE <= total_frames {
        let chunk: Vec<&[f32]> = planes.iter().map(|p| &p[position..position + CHUNK_SIZE]).collect();
        append(resampler.process(&chunk, None).map_err(resample_error)?);
        position += CHUNK_SIZE;
    }
    if position < total_frames {
        let tail: Vec<&[f32]> = planes.iter().map(|p| &p[position..]).collect();
        append(resampler.process_partial(Some(tail.as_slice()), None).map_err(resample_error)?);
    }
    // Flush what is still in the sinc delay line
    append(resampler.process_partial::<&[f32]>(None, None).map_err(resample_error)?);

    let delay = resampler.output_delay();
    let expected_frames = (total_frames as f64 * ratio).round() as usize;
    for plane in output.iter_mut() {
        plane.drain(..delay.min(plane.len()));
        plane.truncate(expected_frames);
    }

    let resampled = ClipData {
        sample_rate: target_rate,
        channels: clip.channels,
        samples: sample_converter::interleave(&output),
    };
    debug!(
        target: LOG_TARGET,
        "Resampled {} frames -> {} frames", total_frames, resampled.frames()
    );
    Ok(resampled)
}

fn resample_error(e: rubato::ResampleError) -> AudioError {
    AudioError::ResamplingError(e.to_string())
}
