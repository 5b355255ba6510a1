//! Silent backend used when no output device exists

use std::collections::HashMap;

use super::{AudioBackend, SoundBuffer, SoundHandle};
use crate::audio::sound::{SourceParams, SourceState};
use crate::audio::{AudioError, AudioResult};
use crate::foundation::math::Vec3f;

#[derive(Debug)]
struct NullSource {
    frames: usize,
    params: SourceParams,
    state: SourceState,
}

/// Tracks source state without producing sound
///
/// Sources never finish on their own, so a playing source stays playing
/// until it is paused, stopped or rewound.
#[derive(Debug, Default)]
pub struct NullBackend {
    sources: HashMap<SoundHandle, NullSource>,
    next_id: u32,
    listener: Vec3f,
}

impl NullBackend {
    /// Backend with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame count of the buffer behind `handle`
    pub fn frames(&self, handle: SoundHandle) -> AudioResult<usize> {
        Ok(self.source(handle)?.frames)
    }

    /// Last listener position set
    pub fn listener_position(&self) -> Vec3f {
        self.listener
    }

    fn source(&self, handle: SoundHandle) -> AudioResult<&NullSource> {
        self.sources.get(&handle).ok_or(AudioError::InvalidHandle)
    }

    fn source_mut(&mut self, handle: SoundHandle) -> AudioResult<&mut NullSource> {
        self.sources.get_mut(&handle).ok_or(AudioError::InvalidHandle)
    }

    fn transition(
        &mut self,
        handle: SoundHandle,
        f: fn(SourceState) -> SourceState,
    ) -> AudioResult<()> {
        let source = self.source_mut(handle)?;
        source.state = f(source.state);
        Ok(())
    }
}

impl AudioBackend for NullBackend {
    fn can_play(&self) -> bool {
        false
    }

    fn create_source(&mut self, buffer: SoundBuffer) -> AudioResult<SoundHandle> {
        let handle = SoundHandle::new(self.next_id, 0);
        self.next_id = self.next_id.wrapping_add(1);
        self.sources.insert(
            handle,
            NullSource {
                frames: buffer.frames(),
                params: SourceParams::default(),
                state: SourceState::Initial,
            },
        );
        Ok(handle)
    }

    fn play(&mut self, handle: SoundHandle) -> AudioResult<()> {
        self.transition(handle, SourceState::played)
    }

    fn pause(&mut self, handle: SoundHandle) -> AudioResult<()> {
        self.transition(handle, SourceState::paused)
    }

    fn stop(&mut self, handle: SoundHandle) -> AudioResult<()> {
        self.transition(handle, SourceState::stopped)
    }

    fn rewind(&mut self, handle: SoundHandle) -> AudioResult<()> {
        self.transition(handle, SourceState::rewound)
    }

    fn state(&self, handle: SoundHandle) -> AudioResult<SourceState> {
        Ok(self.source(handle)?.state)
    }

    fn params(&self, handle: SoundHandle) -> AudioResult<SourceParams> {
        Ok(self.source(handle)?.params)
    }

    fn set_params(&mut self, handle: SoundHandle, params: SourceParams) -> AudioResult<()> {
        self.source_mut(handle)?.params = params;
        Ok(())
    }

    fn set_listener_position(&mut self, position: Vec3f) {
        self.listener = position;
    }

    fn delete(&mut self, handle: SoundHandle) -> AudioResult<()> {
        self.sources
            .remove(&handle)
            .map(|_| ())
            .ok_or(AudioError::InvalidHandle)
    }

    fn update(&mut self) {}

    fn stop_all(&mut self) {
        for source in self.sources.values_mut() {
            source.state = source.state.stopped();
        }
    }

    fn source_count(&self) -> usize {
        self.sources.len()
    }
}
