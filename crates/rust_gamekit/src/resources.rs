//! Per-domain resource context
//!
//! A [`ResourceManager`] owns the sounds and textures loaded for one asset
//! domain. Sounds live under `<root>/<domain>/sounds/` and textures under
//! `<root>/<domain>/textures/`, with `<root>` defaulting to `assets`.
//!
//! Sound ids are only unique within one manager: a new id is one more than
//! the largest id in use.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::backend::{AudioBackend, SoundBuffer};
use crate::audio::{ogg, AudioError, Sound, WavError, WavParser};
use crate::render::{GraphicsBackend, RenderError, Texture};

/// Identifier of a sound inside one [`ResourceManager`]
pub type SoundId = u32;

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Resource loading errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Asset file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV data was malformed or unsupported
    #[error(transparent)]
    Wav(#[from] WavError),

    /// Decoding or the audio backend failed
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Texture decoding or upload failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The file extension names no supported audio format
    #[error("Unsupported audio file: {0}")]
    UnsupportedAudio(String),

    /// No sound is stored under the id
    #[error("No sound with id {0}")]
    UnknownSound(SoundId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioKind {
    Wav,
    Ogg,
}

impl AudioKind {
    fn of(path: &str) -> ResourceResult<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("wav") => Ok(AudioKind::Wav),
            Some("ogg") => Ok(AudioKind::Ogg),
            _ => Err(ResourceError::UnsupportedAudio(path.to_string())),
        }
    }
}

/// Sounds and textures loaded for one asset domain
pub struct ResourceManager {
    domain: String,
    base_dir: PathBuf,
    audio: Box<dyn AudioBackend>,
    sounds: BTreeMap<SoundId, Sound>,
    textures: Vec<Texture>,
    default_gain: f32,
}

impl ResourceManager {
    /// Manager rooted at `assets/<domain>/`
    pub fn new(domain: &str, audio: Box<dyn AudioBackend>) -> Self {
        Self::with_root("assets", domain, audio)
    }

    /// Manager rooted at `<root>/<domain>/`
    pub fn with_root<P: AsRef<Path>>(root: P, domain: &str, audio: Box<dyn AudioBackend>) -> Self {
        Self {
            domain: domain.to_string(),
            base_dir: root.as_ref().join(domain),
            audio,
            sounds: BTreeMap::new(),
            textures: Vec::new(),
            default_gain: 1.0,
        }
    }

    /// Gain given to every sound loaded from now on
    pub fn set_default_gain(&mut self, gain: f32) {
        self.default_gain = gain;
    }

    /// Asset domain name
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Directory holding this domain's assets
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Full path of a sound file
    pub fn sound_path(&self, path: &str) -> PathBuf {
        self.base_dir.join("sounds").join(path)
    }

    /// Full path of a texture file
    pub fn texture_path(&self, path: &str) -> PathBuf {
        self.base_dir.join("textures").join(path)
    }

    /// Backend playing this manager's sounds
    pub fn audio(&self) -> &dyn AudioBackend {
        self.audio.as_ref()
    }

    /// Mutable audio backend
    pub fn audio_mut(&mut self) -> &mut dyn AudioBackend {
        self.audio.as_mut()
    }

    fn unique_sound_id(&self) -> SoundId {
        self.sounds.keys().next_back().map_or(1, |max| max + 1)
    }

    fn insert_sound(&mut self, id: Option<SoundId>, buffer: SoundBuffer) -> ResourceResult<SoundId> {
        let id = id.unwrap_or_else(|| self.unique_sound_id());
        let sound = Sound::new(self.audio.as_mut(), buffer)?;
        if (self.default_gain - 1.0).abs() > f32::EPSILON {
            if let Err(e) = sound.set_gain(self.audio.as_mut(), self.default_gain) {
                if let Err(delete_err) = sound.delete(self.audio.as_mut()) {
                    log::warn!("Failed to release sound source after gain error: {}", delete_err);
                }
                return Err(e.into());
            }
        }
        if let Some(previous) = self.sounds.insert(id, sound) {
            previous.delete(self.audio.as_mut())?;
        }
        Ok(id)
    }

    fn read_wav(&self, path: &str, mono: Option<bool>) -> ResourceResult<SoundBuffer> {
        let mut info = WavParser::load(self.sound_path(path))?;
        if let Some(use_left) = mono {
            info = info.convert_to_mono(use_left)?;
        }
        Ok(SoundBuffer::from_wav(&info)?)
    }

    fn read_ogg(&self, path: &str, mono: Option<bool>) -> ResourceResult<SoundBuffer> {
        let bytes = std::fs::read(self.sound_path(path))?;
        let buffer = match mono {
            Some(use_left) => ogg::decode_mono(bytes, use_left)?,
            None => ogg::decode(bytes)?,
        };
        log::info!("Loaded OGG {:?} into domain {}", path, self.domain);
        Ok(buffer)
    }

    /// Load a WAV file; `id` replaces any sound already stored under it
    pub fn load_wav(&mut self, path: &str, id: Option<SoundId>) -> ResourceResult<SoundId> {
        let buffer = self.read_wav(path, None)?;
        self.insert_sound(id, buffer)
    }

    /// Load one channel of a WAV file
    pub fn load_wav_mono(
        &mut self,
        path: &str,
        id: Option<SoundId>,
        use_left: bool,
    ) -> ResourceResult<SoundId> {
        let buffer = self.read_wav(path, Some(use_left))?;
        self.insert_sound(id, buffer)
    }

    /// Load an OGG Vorbis file
    pub fn load_ogg(&mut self, path: &str, id: Option<SoundId>) -> ResourceResult<SoundId> {
        let buffer = self.read_ogg(path, None)?;
        self.insert_sound(id, buffer)
    }

    /// Load one channel of an OGG Vorbis file
    pub fn load_ogg_mono(
        &mut self,
        path: &str,
        id: Option<SoundId>,
        use_left: bool,
    ) -> ResourceResult<SoundId> {
        let buffer = self.read_ogg(path, Some(use_left))?;
        self.insert_sound(id, buffer)
    }

    /// Load a sound, choosing the decoder by file extension
    pub fn load(&mut self, path: &str, id: Option<SoundId>) -> ResourceResult<SoundId> {
        match AudioKind::of(path)? {
            AudioKind::Wav => self.load_wav(path, id),
            AudioKind::Ogg => self.load_ogg(path, id),
        }
    }

    /// Load a sound forced down to one channel
    pub fn load_mono(
        &mut self,
        path: &str,
        id: Option<SoundId>,
        use_left: bool,
    ) -> ResourceResult<SoundId> {
        match AudioKind::of(path)? {
            AudioKind::Wav => self.load_wav_mono(path, id, use_left),
            AudioKind::Ogg => self.load_ogg_mono(path, id, use_left),
        }
    }

    /// Sound stored under `id`
    pub fn sound(&self, id: SoundId) -> Option<Sound> {
        self.sounds.get(&id).copied()
    }

    /// Number of loaded sounds
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    fn with_sound<F>(&mut self, id: SoundId, f: F) -> ResourceResult<()>
    where
        F: FnOnce(Sound, &mut dyn AudioBackend) -> Result<(), AudioError>,
    {
        let sound = self.sound(id).ok_or(ResourceError::UnknownSound(id))?;
        f(sound, self.audio.as_mut())?;
        Ok(())
    }

    /// Start or resume the sound stored under `id`
    pub fn play(&mut self, id: SoundId) -> ResourceResult<()> {
        self.with_sound(id, |sound, audio| sound.play(audio))
    }

    /// Pause the sound stored under `id`
    pub fn pause(&mut self, id: SoundId) -> ResourceResult<()> {
        self.with_sound(id, |sound, audio| sound.pause(audio))
    }

    /// Rewind the sound stored under `id` to its start
    pub fn rewind(&mut self, id: SoundId) -> ResourceResult<()> {
        self.with_sound(id, |sound, audio| sound.rewind(audio))
    }

    /// Stop the sound stored under `id`
    pub fn stop(&mut self, id: SoundId) -> ResourceResult<()> {
        self.with_sound(id, |sound, audio| sound.stop(audio))
    }

    /// Advance audio bookkeeping; call once per frame
    pub fn update(&mut self) {
        self.audio.update();
    }

    /// Load an image from the texture directory as RGBA
    pub fn load_texture(
        &mut self,
        gfx: &mut dyn GraphicsBackend,
        path: &str,
    ) -> ResourceResult<&Texture> {
        let texture = Texture::load_image(gfx, self.texture_path(path))?;
        let index = self.textures.len();
        self.textures.push(texture);
        Ok(&self.textures[index])
    }

    /// Textures loaded so far, in load order
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Release every texture and sound
    ///
    /// All resources are released even when one fails; the first error is
    /// returned.
    pub fn close(&mut self, gfx: &mut dyn GraphicsBackend) -> ResourceResult<()> {
        let mut first_error: Option<ResourceError> = None;

        for texture in self.textures.drain(..) {
            if let Err(e) = texture.delete(gfx) {
                if first_error.is_none() {
                    first_error = Some(e.into());
                }
            }
        }
        if let Err(e) = self.free_sounds() {
            if first_error.is_none() {
                first_error = Some(e);
            }
        }

        log::info!("Closed resources of domain {}", self.domain);
        first_error.map_or(Ok(()), Err)
    }

    fn free_sounds(&mut self) -> ResourceResult<()> {
        let mut result = Ok(());
        for (_, sound) in std::mem::take(&mut self.sounds) {
            if let Err(e) = sound.delete(self.audio.as_mut()) {
                if result.is_ok() {
                    result = Err(e.into());
                }
            }
        }
        result
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        if let Err(e) = self.free_sounds() {
            log::warn!("Failed to release sounds of domain {}: {}", self.domain, e);
        }
        if !self.textures.is_empty() {
            log::warn!(
                "ResourceManager {} dropped with {} textures still allocated",
                self.domain,
                self.textures.len()
            );
        }
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("domain", &self.domain)
            .field("base_dir", &self.base_dir)
            .field("sounds", &self.sounds.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}
