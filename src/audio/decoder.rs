use crate::audio::{error::AudioError, source::AudioSource};
use std::io;
use std::time::Duration;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::meta::MetadataOptions;
use tracing::{debug, trace, warn};

const LOG_TARGET: &str = "jiho::audio::decoder";

/// A fully decoded clip: interleaved f32 samples plus their format.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipData {
    pub sample_rate: u32,
    pub channels: usize,
    pub samples: Vec<f32>,
}

impl ClipData {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    pub fn duration(&self) -> Duration {
        frames_to_duration(self.frames() as u64, self.sample_rate)
    }
}

/// Converts a frame count at `sample_rate` to a duration, at microsecond precision.
pub fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    let micros = (frames as u128 * 1_000_000) / sample_rate as u128;
    Duration::from_micros(micros as u64)
}

/// Manages Symphonia format reading and decoding for one opened source.
/// Dropping it releases the underlying stream.
pub struct SymphoniaDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    n_frames: Option<u64>,
}

impl SymphoniaDecoder {
    /// Probes the source and sets up a decoder for its first playable track.
    pub fn open(source: &AudioSource) -> Result<Self, AudioError> {
        debug!(target: LOG_TARGET, "Probing audio source {}", source);
        let (mss, hint) = source.open()?;
        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::UnsupportedSource("no playable audio track found".to_string()))?
            .clone();

        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| AudioError::UnsupportedSource("missing sample rate".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count())
            .filter(|count| *count > 0)
            .ok_or_else(|| AudioError::UnsupportedSource("missing channel layout".to_string()))?;

        let decoder = symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        debug!(
            target: LOG_TARGET,
            "Found track: ID={}, Codec={:?}, rate={}, channels={}, frames={:?}",
            track.id, track.codec_params.codec, sample_rate, channels, track.codec_params.n_frames
        );

        Ok(Self {
            format_reader,
            decoder,
            track_id: track.id,
            sample_rate,
            channels,
            n_frames: track.codec_params.n_frames,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frame count reported by the container, if any.
    pub fn n_frames(&self) -> Option<u64> {
        self.n_frames
    }

    /// Feeds every decoded buffer of the track to `on_buffer` until end of stream.
    fn for_each_buffer<F>(&mut self, mut on_buffer: F) -> Result<(), AudioError>
    where
        F: FnMut(AudioBufferRef<'_>),
    {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    trace!(target: LOG_TARGET, "End of stream reached.");
                    return Ok(());
                }
                Err(SymphoniaError::ResetRequired) => {
                    // Chained streams are not supported; what we have is the clip.
                    debug!(target: LOG_TARGET, "Decoder reset required, treating as end of clip.");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => on_buffer(decoded),
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!(target: LOG_TARGET, "Skipping undecodable packet (ts={}): {}", packet.ts(), msg);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Decodes the remaining stream into an interleaved f32 clip. Consumes the decoder.
    pub fn decode_all(mut self) -> Result<ClipData, AudioError> {
        let mut samples: Vec<f32> = Vec::new();
        if let Some(frames) = self.n_frames {
            samples.reserve(frames as usize * self.channels);
        }

        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        self.for_each_buffer(|decoded| {
            if decoded.frames() == 0 {
                return;
            }
            let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, *decoded.spec()));
            if buf.capacity() < decoded.capacity() * decoded.spec().channels.count() {
                *buf = SampleBuffer::new(decoded.capacity() as u64, *decoded.spec());
            }
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        })?;

        let clip = ClipData { sample_rate: self.sample_rate, channels: self.channels, samples };
        debug!(target: LOG_TARGET, "Decoded clip: {} frames ({:?})", clip.frames(), clip.duration());
        Ok(clip)
    }

    /// Counts frames by decoding the whole stream. Used when the container
    /// does not report a frame count.
    pub fn count_frames(mut self) -> Result<u64, AudioError> {
        let mut frames: u64 = 0;
        self.for_each_buffer(|decoded| frames += decoded.frames() as u64)?;
        Ok(frames)
    }
}

/// Natural length of the source: `frameCount / frameRate`. Every handle
/// opened here is released before returning.
pub fn measure_duration(source: &AudioSource) -> Result<Duration, AudioError> {
    let decoder = SymphoniaDecoder::open(source)?;
    let sample_rate = decoder.sample_rate();
    let frames = match decoder.n_frames() {
        Some(frames) => frames,
        None => {
            debug!(target: LOG_TARGET, "Container reports no frame count, decoding to measure.");
            decoder.count_frames()?
        }
    };
    Ok(frames_to_duration(frames, sample_rate))
}

/// Opens the source once and decodes it completely.
pub fn decode_clip(source: &AudioSource) -> Result<ClipData, AudioError> {
    SymphoniaDecoder::open(source)?.decode_all()
}
