//! Playable sounds and their source parameters

use crate::audio::backend::{AudioBackend, SoundBuffer, SoundHandle};
use crate::audio::AudioResult;
use crate::foundation::math::Vec3f;

/// Playback state of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    /// Created or rewound, never started
    #[default]
    Initial,
    /// Producing samples
    Playing,
    /// Holding its position
    Paused,
    /// Finished or stopped; the next play restarts from the beginning
    Stopped,
}

impl SourceState {
    /// State after a play request
    pub fn played(self) -> Self {
        SourceState::Playing
    }

    /// State after a pause request; only a playing source pauses
    pub fn paused(self) -> Self {
        match self {
            SourceState::Playing => SourceState::Paused,
            other => other,
        }
    }

    /// State after a stop request
    pub fn stopped(self) -> Self {
        SourceState::Stopped
    }

    /// State after a rewind request
    pub fn rewound(self) -> Self {
        SourceState::Initial
    }

    /// Whether the next play starts from the first sample
    pub fn restarts_on_play(self) -> bool {
        matches!(self, SourceState::Initial | SourceState::Stopped)
    }
}

/// Per-source playback parameters
///
/// Defaults match a freshly generated OpenAL source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceParams {
    /// Restart from the beginning when the end is reached
    pub looping: bool,
    /// Linear volume
    pub gain: f32,
    /// Playback speed factor
    pub pitch: f32,
    /// How fast gain falls off with distance
    pub rolloff_factor: f32,
    /// Distance at which gain is unattenuated
    pub reference_distance: f32,
    /// Distance beyond which gain stops falling
    pub max_distance: f32,
    /// Source position
    pub position: Vec3f,
    /// Source velocity; stored only
    pub velocity: Vec3f,
    /// Source direction; stored only
    pub direction: Vec3f,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            looping: false,
            gain: 1.0,
            pitch: 1.0,
            rolloff_factor: 1.0,
            reference_distance: 1.0,
            max_distance: f32::MAX,
            position: Vec3f::zeros(),
            velocity: Vec3f::zeros(),
            direction: Vec3f::zeros(),
        }
    }
}

impl SourceParams {
    /// Attenuation for a listener at `listener`
    pub fn distance_gain(&self, listener: Vec3f) -> f32 {
        inverse_distance_clamped(
            (self.position - listener).norm(),
            self.reference_distance,
            self.rolloff_factor,
            self.max_distance,
        )
    }

    /// Gain after distance attenuation, never negative
    pub fn effective_gain(&self, listener: Vec3f) -> f32 {
        (self.gain * self.distance_gain(listener)).max(0.0)
    }
}

/// Inverse distance clamped attenuation
///
/// `reference / (reference + rolloff * (clamp(d, reference, max) - reference))`,
/// with a degenerate denominator treated as no attenuation.
pub fn inverse_distance_clamped(distance: f32, reference: f32, rolloff: f32, max: f32) -> f32 {
    let clamped = distance.max(reference).min(max.max(reference));
    let denominator = reference + rolloff * (clamped - reference);
    if denominator <= f32::EPSILON {
        1.0
    } else {
        reference / denominator
    }
}

/// A sound loaded into an audio backend
///
/// A plain value handle; every operation goes through the backend that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sound {
    handle: SoundHandle,
}

impl Sound {
    /// Upload `buffer` and wrap the new source
    pub fn new(backend: &mut dyn AudioBackend, buffer: SoundBuffer) -> AudioResult<Self> {
        Ok(Self {
            handle: backend.create_source(buffer)?,
        })
    }

    /// Backend handle
    pub fn handle(&self) -> SoundHandle {
        self.handle
    }

    /// Start, restart or resume playback
    pub fn play(&self, backend: &mut dyn AudioBackend) -> AudioResult<()> {
        backend.play(self.handle)
    }

    /// Pause a playing sound
    pub fn pause(&self, backend: &mut dyn AudioBackend) -> AudioResult<()> {
        backend.pause(self.handle)
    }

    /// Stop playback
    pub fn stop(&self, backend: &mut dyn AudioBackend) -> AudioResult<()> {
        backend.stop(self.handle)
    }

    /// Stop and return to the initial state
    pub fn rewind(&self, backend: &mut dyn AudioBackend) -> AudioResult<()> {
        backend.rewind(self.handle)
    }

    /// Current playback state
    pub fn state(&self, backend: &dyn AudioBackend) -> AudioResult<SourceState> {
        backend.state(self.handle)
    }

    /// Whether the sound is playing; false for a dead handle
    pub fn is_playing(&self, backend: &dyn AudioBackend) -> bool {
        matches!(backend.state(self.handle), Ok(SourceState::Playing))
    }

    /// Current source parameters
    pub fn params(&self, backend: &dyn AudioBackend) -> AudioResult<SourceParams> {
        backend.params(self.handle)
    }

    /// Replace every source parameter
    pub fn set_params(&self, backend: &mut dyn AudioBackend, params: SourceParams) -> AudioResult<()> {
        backend.set_params(self.handle, params)
    }

    /// Read-modify-write of the source parameters
    pub fn update_params<F>(&self, backend: &mut dyn AudioBackend, f: F) -> AudioResult<()>
    where
        F: FnOnce(&mut SourceParams),
    {
        let mut params = backend.params(self.handle)?;
        f(&mut params);
        backend.set_params(self.handle, params)
    }

    /// Loop on the next start
    pub fn set_looping(&self, backend: &mut dyn AudioBackend, looping: bool) -> AudioResult<()> {
        self.update_params(backend, |p| p.looping = looping)
    }

    /// Set the linear volume
    pub fn set_gain(&self, backend: &mut dyn AudioBackend, gain: f32) -> AudioResult<()> {
        self.update_params(backend, |p| p.gain = gain)
    }

    /// Set the playback speed factor
    pub fn set_pitch(&self, backend: &mut dyn AudioBackend, pitch: f32) -> AudioResult<()> {
        self.update_params(backend, |p| p.pitch = pitch)
    }

    /// Move the source
    pub fn set_position(&self, backend: &mut dyn AudioBackend, position: Vec3f) -> AudioResult<()> {
        self.update_params(backend, |p| p.position = position)
    }

    /// Set the source velocity
    pub fn set_velocity(&self, backend: &mut dyn AudioBackend, velocity: Vec3f) -> AudioResult<()> {
        self.update_params(backend, |p| p.velocity = velocity)
    }

    /// Set the source direction
    pub fn set_direction(&self, backend: &mut dyn AudioBackend, direction: Vec3f) -> AudioResult<()> {
        self.update_params(backend, |p| p.direction = direction)
    }

    /// Release the source; the handle is invalid afterwards
    pub fn delete(self, backend: &mut dyn AudioBackend) -> AudioResult<()> {
        backend.delete(self.handle)
    }
}
