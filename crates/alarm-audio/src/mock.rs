//! Recording sink for tests

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::sink::{AudioSink, SoundId};
use crate::AudioError;

/// A command received by [`MockAudioSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCommand {
    Play { id: SoundId, sound: String, volume: u8 },
    SetVolume { id: SoundId, volume: u8 },
    Stop { id: SoundId },
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    playing: HashMap<SoundId, (String, u8)>,
    missing: HashSet<String>,
    commands: Vec<AudioCommand>,
}

/// Sink that records commands instead of producing sound.
///
/// Sounds registered with [`set_missing`](Self::set_missing) fail to load.
/// Playing sounds stay playing until stopped or [`finish`](Self::finish)ed.
#[derive(Debug, Default)]
pub struct MockAudioSink {
    state: Mutex<MockState>,
}

impl MockAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `sound` fail to load from now on
    pub fn set_missing(&self, sound: &str) {
        self.state().missing.insert(sound.to_string());
    }

    /// End a sound as if it played to completion
    pub fn finish(&self, id: SoundId) {
        self.state().playing.remove(&id);
    }

    pub fn commands(&self) -> Vec<AudioCommand> {
        self.state().commands.clone()
    }

    /// Number of play commands that succeeded
    pub fn play_count(&self) -> usize {
        self.state()
            .commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play { .. }))
            .count()
    }

    pub fn playing_count(&self) -> usize {
        self.state().playing.len()
    }

    /// Current volume of a playing sound
    pub fn volume_of(&self, id: SoundId) -> Option<u8> {
        self.state().playing.get(&id).map(|(_, volume)| *volume)
    }

    /// Sound name of a playing sound
    pub fn sound_of(&self, id: SoundId) -> Option<String> {
        self.state().playing.get(&id).map(|(sound, _)| sound.clone())
    }
}

impl AudioSink for MockAudioSink {
    fn load_and_play(&self, sound_ref: &str, volume: u8) -> Result<SoundId, AudioError> {
        let mut state = self.state();
        if state.missing.contains(sound_ref) {
            return Err(AudioError::NotFound(sound_ref.to_string()));
        }
        state.next_id += 1;
        let id = SoundId(state.next_id);
        state.playing.insert(id, (sound_ref.to_string(), volume));
        state.commands.push(AudioCommand::Play {
            id,
            sound: sound_ref.to_string(),
            volume,
        });
        Ok(id)
    }

    fn set_volume(&self, id: SoundId, volume: u8) {
        let mut state = self.state();
        if let Some(entry) = state.playing.get_mut(&id) {
            entry.1 = volume;
        }
        state.commands.push(AudioCommand::SetVolume { id, volume });
    }

    fn stop(&self, id: SoundId) {
        let mut state = self.state();
        state.playing.remove(&id);
        state.commands.push(AudioCommand::Stop { id });
    }

    fn is_playing(&self, id: SoundId) -> bool {
        self.state().playing.contains_key(&id)
    }
}
