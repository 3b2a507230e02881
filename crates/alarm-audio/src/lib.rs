//! Alarm Audio
//!
//! Playback side of the lookout alarms. The audio device itself is an
//! external collaborator reached through [`AudioSink`]; this crate adds
//! scoped ownership of playing sounds and the fallback chain used when a
//! configured sound cannot be loaded.

mod file_sink;
mod mock;
mod player;
mod sink;

pub use file_sink::FileCheckedSink;
pub use mock::{AudioCommand, MockAudioSink};
pub use player::{AlarmPlayer, Playback, SoundFailure};
pub use sink::{AudioSink, SoundHandle, SoundId};

use thiserror::Error;

/// Audio error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Sound not found: {0}")]
    NotFound(String),

    #[error("Unsupported sound format: {0}")]
    Unsupported(String),

    #[error("Audio device error: {0}")]
    Device(String),
}
