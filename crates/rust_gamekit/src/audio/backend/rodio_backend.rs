//! Rodio audio backend implementation
//!
//! Each source keeps its decoded buffer. Starting a source from the
//! beginning builds a fresh [`Sink`] and appends the buffer to it; pausing
//! and resuming reuse the live sink. Distance attenuation and pitch are
//! applied through the sink's volume and speed.
//!
//! # Example
//!
//! ```no_run
//! use rust_gamekit::audio::backend::{AudioBackend, RodioBackend, SoundBuffer};
//!
//! let mut backend = RodioBackend::new().unwrap();
//! let beep: Vec<i16> = (0..44100).map(|i| ((i % 100) as i16 - 50) * 200).collect();
//! let handle = backend.create_source(SoundBuffer::new(1, 44100, beep)).unwrap();
//!
//! backend.play(handle).unwrap();
//! backend.update(); // marks finished sources stopped
//! ```

use super::{AudioBackend, SoundBuffer, SoundHandle};
use crate::audio::sound::{SourceParams, SourceState};
use crate::audio::{AudioError, AudioResult};
use crate::foundation::math::Vec3f;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;

struct RodioSource {
    buffer: SoundBuffer,
    params: SourceParams,
    state: SourceState,
    /// Present while the source is playing or paused
    sink: Option<Sink>,
}

/// Rodio-based audio backend
pub struct RodioBackend {
    /// Audio output stream (must be kept alive)
    _output_stream: OutputStream,
    /// Output stream handle for creating sinks
    stream_handle: OutputStreamHandle,
    sources: HashMap<SoundHandle, RodioSource>,
    /// Next sound ID for handle generation
    next_id: u32,
    listener: Vec3f,
}

impl RodioBackend {
    /// Open the default output device
    ///
    /// # Errors
    /// - `BackendInitFailed` if no output device is available
    pub fn new() -> AudioResult<Self> {
        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            AudioError::BackendInitFailed(format!("Failed to create audio output: {}", e))
        })?;

        log::info!("Rodio audio backend initialized");
        Ok(Self {
            _output_stream: stream,
            stream_handle,
            sources: HashMap::new(),
            next_id: 0,
            listener: Vec3f::zeros(),
        })
    }

    /// Generate a new sound handle
    fn next_handle(&mut self) -> SoundHandle {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        SoundHandle::new(id, 0)
    }

    fn source(&self, handle: SoundHandle) -> AudioResult<&RodioSource> {
        self.sources.get(&handle).ok_or(AudioError::InvalidHandle)
    }

    fn source_mut(&mut self, handle: SoundHandle) -> AudioResult<&mut RodioSource> {
        self.sources.get_mut(&handle).ok_or(AudioError::InvalidHandle)
    }

    /// Build a sink holding the whole buffer, not yet started
    fn start_sink(
        stream_handle: &OutputStreamHandle,
        source: &RodioSource,
        listener: Vec3f,
    ) -> AudioResult<Sink> {
        let sink = Sink::try_new(stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(format!("Failed to create sink: {}", e)))?;
        sink.pause();

        let samples = SamplesBuffer::new(
            source.buffer.channels,
            source.buffer.sample_rate,
            source.buffer.samples.clone(),
        );
        if source.params.looping {
            sink.append(samples.repeat_infinite());
        } else {
            sink.append(samples);
        }

        apply_params(&sink, &source.params, listener);
        Ok(sink)
    }
}

fn apply_params(sink: &Sink, params: &SourceParams, listener: Vec3f) {
    sink.set_volume(params.effective_gain(listener));
    sink.set_speed(params.pitch.max(f32::EPSILON));
}

impl AudioBackend for RodioBackend {
    fn can_play(&self) -> bool {
        true
    }

    fn create_source(&mut self, buffer: SoundBuffer) -> AudioResult<SoundHandle> {
        if buffer.channels == 0 || buffer.sample_rate == 0 {
            return Err(AudioError::PlaybackFailed(format!(
                "cannot play {} channels at {} Hz",
                buffer.channels, buffer.sample_rate
            )));
        }

        let handle = self.next_handle();
        self.sources.insert(
            handle,
            RodioSource {
                buffer,
                params: SourceParams::default(),
                state: SourceState::Initial,
                sink: None,
            },
        );
        Ok(handle)
    }

    fn play(&mut self, handle: SoundHandle) -> AudioResult<()> {
        let listener = self.listener;
        let stream_handle = &self.stream_handle;
        let source = self
            .sources
            .get_mut(&handle)
            .ok_or(AudioError::InvalidHandle)?;

        if source.state.restarts_on_play() || source.sink.is_none() {
            if let Some(old) = source.sink.take() {
                old.stop();
            }
            source.sink = Some(Self::start_sink(stream_handle, source, listener)?);
        }
        if let Some(sink) = &source.sink {
            sink.play();
        }
        source.state = source.state.played();
        Ok(())
    }

    fn pause(&mut self, handle: SoundHandle) -> AudioResult<()> {
        let source = self.source_mut(handle)?;
        if let (SourceState::Playing, Some(sink)) = (source.state, &source.sink) {
            sink.pause();
        }
        source.state = source.state.paused();
        Ok(())
    }

    fn stop(&mut self, handle: SoundHandle) -> AudioResult<()> {
        let source = self.source_mut(handle)?;
        if let Some(sink) = source.sink.take() {
            sink.stop();
        }
        source.state = source.state.stopped();
        Ok(())
    }

    fn rewind(&mut self, handle: SoundHandle) -> AudioResult<()> {
        let source = self.source_mut(handle)?;
        if let Some(sink) = source.sink.take() {
            sink.stop();
        }
        source.state = source.state.rewound();
        Ok(())
    }

    fn state(&self, handle: SoundHandle) -> AudioResult<SourceState> {
        Ok(self.source(handle)?.state)
    }

    fn params(&self, handle: SoundHandle) -> AudioResult<SourceParams> {
        Ok(self.source(handle)?.params)
    }

    /// Looping changes take effect the next time the source restarts
    fn set_params(&mut self, handle: SoundHandle, params: SourceParams) -> AudioResult<()> {
        let listener = self.listener;
        let source = self.source_mut(handle)?;
        source.params = params;
        if let Some(sink) = &source.sink {
            apply_params(sink, &source.params, listener);
        }
        Ok(())
    }

    fn set_listener_position(&mut self, position: Vec3f) {
        self.listener = position;
        for source in self.sources.values() {
            if let Some(sink) = &source.sink {
                apply_params(sink, &source.params, position);
            }
        }
    }

    fn delete(&mut self, handle: SoundHandle) -> AudioResult<()> {
        let source = self
            .sources
            .remove(&handle)
            .ok_or(AudioError::InvalidHandle)?;
        if let Some(sink) = source.sink {
            sink.stop();
        }
        Ok(())
    }

    fn update(&mut self) {
        for source in self.sources.values_mut() {
            let finished = source.state == SourceState::Playing
                && source.sink.as_ref().map_or(true, Sink::empty);
            if finished {
                source.sink = None;
                source.state = source.state.stopped();
            }
        }
    }

    fn stop_all(&mut self) {
        for source in self.sources.values_mut() {
            if let Some(sink) = source.sink.take() {
                sink.stop();
            }
            source.state = source.state.stopped();
        }
    }

    fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.stop_all();
        log::info!("Rodio audio backend shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_buffer() -> SoundBuffer {
        SoundBuffer::new(1, 8000, vec![0; 80])
    }

    // Audio devices are often missing in CI; every test tolerates that.

    #[test]
    fn test_handle_generation() {
        if let Ok(mut backend) = RodioBackend::new() {
            let handle1 = backend.create_source(short_buffer()).unwrap();
            let handle2 = backend.create_source(short_buffer()).unwrap();

            assert_ne!(handle1.id, handle2.id);
            assert!(backend.can_play());
        }
    }

    #[test]
    fn test_state_tracking() {
        if let Ok(mut backend) = RodioBackend::new() {
            let handle = backend.create_source(short_buffer()).unwrap();
            assert_eq!(backend.state(handle).unwrap(), SourceState::Initial);

            backend.play(handle).unwrap();
            backend.pause(handle).unwrap();
            assert_eq!(backend.state(handle).unwrap(), SourceState::Paused);

            backend.rewind(handle).unwrap();
            assert_eq!(backend.state(handle).unwrap(), SourceState::Initial);

            backend.delete(handle).unwrap();
            assert!(matches!(backend.state(handle), Err(AudioError::InvalidHandle)));
        }
    }

    #[test]
    fn test_rejects_empty_layout() {
        if let Ok(mut backend) = RodioBackend::new() {
            let result = backend.create_source(SoundBuffer::new(0, 8000, vec![]));
            assert!(matches!(result, Err(AudioError::PlaybackFailed(_))));
        }
    }
}
