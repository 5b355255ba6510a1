//! # Audio
//!
//! WAV and OGG decoding plus source playback behind [`backend::AudioBackend`].
//! [`backend::create_backend`] opens a rodio output when one exists and
//! falls back to a silent [`backend::NullBackend`] otherwise.

pub mod backend;
pub mod ogg;
pub mod sound;
pub mod wav;

pub use backend::{create_backend, AudioBackend, NullBackend, RodioBackend, SoundBuffer, SoundHandle};
pub use sound::{inverse_distance_clamped, Sound, SourceParams, SourceState};
pub use wav::{SampleFormat, WavError, WavInfo, WavParser, WavResult};

use thiserror::Error;

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Audio playback and decoding errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("Audio backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// A sink could not be created or fed
    #[error("Audio playback failed: {0}")]
    PlaybackFailed(String),

    /// The handle does not name a live source
    #[error("Invalid sound handle")]
    InvalidHandle,

    /// Compressed audio could not be decoded
    #[error("Audio decode failed: {0}")]
    Decode(String),

    /// A WAV file could not be parsed
    #[error(transparent)]
    Wav(#[from] WavError),
}
