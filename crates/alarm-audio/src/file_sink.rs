//! Sound-file checking sink
//!
//! Resolves sound references against a sound directory and rejects missing
//! or unsupported files, then logs playback commands. Used when no audio
//! device backend is wired in, so alarm behavior (including fallbacks) can
//! still be exercised end to end. Without a sound directory every reference
//! is accepted and only logged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::sink::{AudioSink, SoundId};
use crate::AudioError;

const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "ogg", "flac", "mp3"];

#[derive(Debug, Default)]
struct Playing {
    next_id: u64,
    sounds: HashMap<SoundId, (PathBuf, u8)>,
}

/// Sink validating sound files on disk and logging playback.
///
/// Only sounds that are currently playing are tracked.
#[derive(Debug)]
pub struct FileCheckedSink {
    sound_dir: Option<PathBuf>,
    playing: Mutex<Playing>,
}

impl FileCheckedSink {
    pub fn new(sound_dir: impl Into<PathBuf>) -> Self {
        let sound_dir = sound_dir.into();
        info!("Resolving alarm sounds under {}", sound_dir.display());
        Self {
            sound_dir: Some(sound_dir),
            playing: Mutex::new(Playing::default()),
        }
    }

    /// Accept any sound reference without touching the filesystem
    pub fn log_only() -> Self {
        info!("No sound directory, alarm playback is only logged");
        Self {
            sound_dir: None,
            playing: Mutex::new(Playing::default()),
        }
    }

    fn resolve(sound_dir: &Path, sound_ref: &str) -> PathBuf {
        let path = Path::new(sound_ref);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            sound_dir.join(path)
        }
    }

    fn check(&self, sound_ref: &str) -> Result<PathBuf, AudioError> {
        let Some(sound_dir) = &self.sound_dir else {
            return Ok(PathBuf::from(sound_ref));
        };
        let path = Self::resolve(sound_dir, sound_ref);
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(AudioError::Unsupported(sound_ref.to_string()));
        }
        if !path.is_file() {
            return Err(AudioError::NotFound(path.display().to_string()));
        }
        Ok(path)
    }
}

impl AudioSink for FileCheckedSink {
    fn load_and_play(&self, sound_ref: &str, volume: u8) -> Result<SoundId, AudioError> {
        let path = self.check(sound_ref)?;
        let mut playing = self
            .playing
            .lock()
            .map_err(|e| AudioError::Device(format!("Lock error: {}", e)))?;

        playing.next_id += 1;
        let id = SoundId(playing.next_id);
        info!("Playing {} at volume {} ({})", path.display(), volume, id);
        playing.sounds.insert(id, (path, volume));
        Ok(id)
    }

    fn set_volume(&self, id: SoundId, volume: u8) {
        match self.playing.lock() {
            Ok(mut playing) => {
                if let Some(entry) = playing.sounds.get_mut(&id) {
                    if entry.1 != volume {
                        debug!("Volume of {} -> {}", id, volume);
                        entry.1 = volume;
                    }
                }
            }
            Err(e) => warn!("Audio state unavailable: {}", e),
        }
    }

    fn stop(&self, id: SoundId) {
        match self.playing.lock() {
            Ok(mut playing) => {
                if playing.sounds.remove(&id).is_some() {
                    debug!("Stopped {}", id);
                }
            }
            Err(e) => warn!("Audio state unavailable: {}", e),
        }
    }

    fn is_playing(&self, id: SoundId) -> bool {
        self.playing
            .lock()
            .map(|playing| playing.sounds.contains_key(&id))
            .unwrap_or(false)
    }
}
