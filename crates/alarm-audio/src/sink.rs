//! Audio sink capability and scoped sound handles

use std::fmt;
use std::sync::Arc;

use crate::AudioError;

/// Identifier of one playing sound instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundId(pub u64);

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fire-and-forget playback commands.
///
/// Implementations use interior mutability so one sink can be shared by
/// every alarm and by the handles they own. Volumes are 0-100.
pub trait AudioSink: Send + Sync {
    /// Load `sound_ref` and start playing it
    fn load_and_play(&self, sound_ref: &str, volume: u8) -> Result<SoundId, AudioError>;

    fn set_volume(&self, id: SoundId, volume: u8);

    /// Stop playback. Stopping an unknown or finished sound is a no-op.
    fn stop(&self, id: SoundId);

    fn is_playing(&self, id: SoundId) -> bool;
}

/// Owner of one playing sound. Dropping the handle stops the sound.
pub struct SoundHandle {
    id: SoundId,
    sound_ref: String,
    sink: Arc<dyn AudioSink>,
}

impl SoundHandle {
    /// Start `sound_ref` on `sink` and take ownership of the instance
    pub fn play(sink: Arc<dyn AudioSink>, sound_ref: &str, volume: u8) -> Result<Self, AudioError> {
        let id = sink.load_and_play(sound_ref, volume)?;
        Ok(Self {
            id,
            sound_ref: sound_ref.to_string(),
            sink,
        })
    }

    pub fn id(&self) -> SoundId {
        self.id
    }

    /// Sound actually playing (after any fallback)
    pub fn sound_ref(&self) -> &str {
        &self.sound_ref
    }

    pub fn set_volume(&self, volume: u8) {
        self.sink.set_volume(self.id, volume);
    }

    pub fn is_playing(&self) -> bool {
        self.sink.is_playing(self.id)
    }

    /// Stop now. Equivalent to dropping the handle.
    pub fn stop(self) {}
}

impl Drop for SoundHandle {
    fn drop(&mut self) {
        self.sink.stop(self.id);
    }
}

impl fmt::Debug for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundHandle")
            .field("id", &self.id)
            .field("sound_ref", &self.sound_ref)
            .finish()
    }
}
