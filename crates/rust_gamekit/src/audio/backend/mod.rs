//! Audio backend implementations
//!
//! Platform-independent abstraction over audio playback libraries.

pub mod null_backend;
pub mod rodio_backend;

pub use null_backend::NullBackend;
pub use rodio_backend::RodioBackend;

use crate::audio::sound::{SourceParams, SourceState};
use crate::audio::wav::{WavInfo, WavResult};
use crate::audio::AudioResult;
use crate::config::AudioConfig;
use crate::foundation::math::Vec3f;

/// Handle to a source owned by an [`AudioBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle {
    /// Unique identifier for the source
    pub id: u32,
    /// Generation counter for handle validation
    pub generation: u32,
}

impl SoundHandle {
    /// Create a new sound handle
    pub fn new(id: u32, generation: u32) -> Self {
        Self { id, generation }
    }
}

/// Decoded interleaved samples ready for playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundBuffer {
    /// Interleaved channel count
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
    /// Interleaved samples
    pub samples: Vec<i16>,
}

impl SoundBuffer {
    /// Buffer over interleaved samples
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            channels,
            sample_rate,
            samples,
        }
    }

    /// Samples from a parsed WAV; fails for layouts that cannot be played
    pub fn from_wav(info: &WavInfo) -> WavResult<Self> {
        let format = info.sample_format()?;
        Ok(Self::new(format.channels(), info.sample_rate, info.to_pcm_i16()?))
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            n => self.samples.len() / usize::from(n),
        }
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f32 / self.sample_rate as f32
        }
    }
}

/// Audio backend trait for platform abstraction
///
/// Not `Send`: sources live on the thread that owns the window.
pub trait AudioBackend {
    /// Whether sound actually reaches an output device
    fn can_play(&self) -> bool;

    /// Register a buffer as a new source in the [`SourceState::Initial`] state
    fn create_source(&mut self, buffer: SoundBuffer) -> AudioResult<SoundHandle>;

    /// Start or resume; stopped and initial sources restart from the beginning
    fn play(&mut self, handle: SoundHandle) -> AudioResult<()>;

    /// Pause a playing source
    fn pause(&mut self, handle: SoundHandle) -> AudioResult<()>;

    /// Stop a source
    fn stop(&mut self, handle: SoundHandle) -> AudioResult<()>;

    /// Stop a source and return it to [`SourceState::Initial`]
    fn rewind(&mut self, handle: SoundHandle) -> AudioResult<()>;

    /// Current playback state
    fn state(&self, handle: SoundHandle) -> AudioResult<SourceState>;

    /// Current source parameters
    fn params(&self, handle: SoundHandle) -> AudioResult<SourceParams>;

    /// Replace the source parameters
    fn set_params(&mut self, handle: SoundHandle, params: SourceParams) -> AudioResult<()>;

    /// Move the listener used for distance attenuation
    fn set_listener_position(&mut self, position: Vec3f);

    /// Release a source
    fn delete(&mut self, handle: SoundHandle) -> AudioResult<()>;

    /// Update the backend (mark finished sources stopped, etc.)
    fn update(&mut self);

    /// Stop every source
    fn stop_all(&mut self);

    /// Number of live sources
    fn source_count(&self) -> usize;
}

/// Create the audio backend described by `config`
///
/// Falls back to a [`NullBackend`] when audio is disabled or no output
/// device can be opened.
pub fn create_backend(config: &AudioConfig) -> Box<dyn AudioBackend> {
    if !config.enabled {
        log::info!("Audio disabled; using null backend");
        return Box::new(NullBackend::new());
    }

    match RodioBackend::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            log::warn!("No audio output available ({}); sounds will be silent", e);
            Box::new(NullBackend::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wav(channels: u16, bits: u16, pcm: Vec<u8>) -> WavInfo {
        WavInfo {
            channels,
            sample_rate: 8000,
            avg_bytes_per_sec: 8000 * u32::from(channels * bits / 8),
            block_align: channels * bits / 8,
            bits_per_sample: bits,
            pcm,
        }
    }

    #[test]
    fn test_buffer_from_wav() {
        let buffer = SoundBuffer::from_wav(&wav(2, 16, vec![1, 0, 2, 0, 3, 0, 4, 0])).unwrap();

        assert_eq!(buffer.channels, 2);
        assert_eq!(buffer.samples, vec![1, 2, 3, 4]);
        assert_eq!(buffer.frames(), 2);
        assert_relative_eq!(buffer.duration_secs(), 2.0 / 8000.0);
    }

    #[test]
    fn test_buffer_from_unsupported_wav() {
        assert!(SoundBuffer::from_wav(&wav(4, 16, vec![0; 8])).is_err());
    }

    #[test]
    fn test_disabled_config_gives_silent_backend() {
        let config = AudioConfig {
            enabled: false,
            ..AudioConfig::default()
        };

        let backend = create_backend(&config);

        assert!(!backend.can_play());
        assert_eq!(backend.source_count(), 0);
    }
}
