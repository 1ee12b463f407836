use crate::audio::decoder::ClipData;
use crate::audio::error::AudioError;
use crate::audio::player::{DeviceLine, LineFormat, LineProvider};
use crate::audio::sample_converter;
use crate::audio::volume::{GainControl, HasGainControl, SoftwareGain};
use alsa::nix::errno::Errno;
use alsa::pcm::{Access, Format, HwParams, State as PcmState, PCM};
use alsa::{Direction, ValueOr};
use std::ffi::CString;
use tracing::{debug, error, info, instrument, warn};

const LOG_TARGET: &str = "jiho::audio::alsa_handler";

/// Opens ALSA playback lines on a named device.
#[derive(Debug, Clone)]
pub struct AlsaLineProvider {
    device_name: String,
}

impl AlsaLineProvider {
    pub fn new(device_name: &str) -> Self {
        info!(target: LOG_TARGET, "Using ALSA device: {}", device_name);
        AlsaLineProvider { device_name: device_name.to_string() }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl LineProvider for AlsaLineProvider {
    type Line = AlsaLine;

    fn open(&self, format: LineFormat) -> Result<AlsaLine, AudioError> {
        AlsaLine::open(&self.device_name, format)
    }
}

/// An open ALSA PCM playback line. Closed when dropped.
pub struct AlsaLine {
    device_name: String,
    pcm: PCM,
    channels: usize,
    actual_rate: u32,
    gain: SoftwareGain,
}

impl AlsaLine {
    /// Opens the PCM device and negotiates interleaved S16 at the rate nearest
    /// to the requested one.
    #[instrument(skip(format), fields(rate = format.sample_rate, channels = format.channels))]
    pub fn open(device_name: &str, format: LineFormat) -> Result<Self, AudioError> {
        info!(
            target: LOG_TARGET,
            "Opening ALSA PCM device '{}' with rate={}, channels={}",
            device_name, format.sample_rate, format.channels
        );

        let device = CString::new(device_name)
            .map_err(|e| AudioError::DeviceUnavailable(format!("Invalid device name: {}", e)))?;

        let pcm = PCM::open(&device, Direction::Playback, false)?; // Blocking mode

        let actual_rate = {
            let hwp = HwParams::any(&pcm)?;
            hwp.set_access(Access::RWInterleaved)?;
            hwp.set_format(Format::s16())?;
            hwp.set_channels(format.channels as u32)?;

            if let Err(e) = hwp.set_rate_near(format.sample_rate, ValueOr::Nearest) {
                error!(target: LOG_TARGET, "Failed to set ALSA rate near {}: {}", format.sample_rate, e);
                return Err(AudioError::DeviceUnavailable(format!(
                    "Failed to set sample rate {}: {}",
                    format.sample_rate, e
                )));
            }
            let actual_rate = hwp.get_rate()?;
            if actual_rate != format.sample_rate {
                warn!(
                    target: LOG_TARGET,
                    "ALSA rate negotiation: requested={}, actual={}", format.sample_rate, actual_rate
                );
            }
            pcm.hw_params(&hwp)?;

            let swp = pcm.sw_params_current()?;
            let buffer_size = hwp.get_buffer_size()?;
            let period_size = hwp.get_period_size()?;
            swp.set_start_threshold(buffer_size - period_size)?;
            pcm.sw_params(&swp)?;
            debug!(target: LOG_TARGET, "ALSA parameters applied (buffer={}, period={}).", buffer_size, period_size);
            actual_rate
        };

        Ok(AlsaLine {
            device_name: device_name.to_string(),
            pcm,
            channels: format.channels,
            actual_rate,
            gain: SoftwareGain::default(),
        })
    }

    /// Writes interleaved S16 samples, blocking until all are queued.
    /// Underruns are recovered and the write retried.
    fn write_all(&self, buffer: &[i16]) -> Result<(), AudioError> {
        let io = self.pcm.io_i16()?;
        let mut offset = 0;
        while offset < buffer.len() {
            match io.writei(&buffer[offset..]) {
                Ok(frames_written) => offset += frames_written * self.channels,
                Err(e) if e.errno() == Errno::EPIPE => {
                    warn!(target: LOG_TARGET, "ALSA buffer underrun (EPIPE), recovering...");
                    self.pcm.recover(libc::EPIPE, false).map_err(|recover_err| {
                        error!(target: LOG_TARGET, "ALSA recovery failed: {}", recover_err);
                        AudioError::DeviceUnavailable(format!("ALSA recovery failed: {}", recover_err))
                    })?;
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "ALSA write error: {}", e);
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}

impl HasGainControl for AlsaLine {
    fn gain_control(&mut self) -> Option<&mut dyn GainControl> {
        Some(&mut self.gain)
    }
}

impl DeviceLine for AlsaLine {
    fn sample_rate(&self) -> u32 {
        self.actual_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn rewind(&mut self) -> Result<(), AudioError> {
        // Drop anything still queued, then get ready for a fresh start
        if self.pcm.state() != PcmState::Setup && self.pcm.state() != PcmState::Open {
            self.pcm.drop()?;
        }
        self.pcm.prepare()?;
        Ok(())
    }

    fn start(&mut self, clip: &ClipData) -> Result<(), AudioError> {
        let buffer = sample_converter::f32_to_s16_with_gain(&clip.samples, self.gain.factor());
        self.write_all(&buffer)?;
        // Clips shorter than the start threshold would otherwise sit in the buffer
        if self.pcm.state() == PcmState::Prepared {
            self.pcm.start()?;
        }
        Ok(())
    }
}

impl Drop for AlsaLine {
    fn drop(&mut self) {
        debug!(target: LOG_TARGET, "Closing ALSA PCM line on '{}' (state: {:?})...", self.device_name, self.pcm.state());
        if self.pcm.state() == PcmState::Running || self.pcm.state() == PcmState::Prepared {
            if let Err(e) = self.pcm.drop() {
                warn!(target: LOG_TARGET, "Error dropping ALSA buffer during close (ignored): {}", e);
            }
        }
        // PCM is dropped with the struct, closing the device
    }
}
