//! Alarm playback with default-sound fallback

use std::sync::Arc;

use tracing::{error, warn};

use crate::sink::{AudioSink, SoundHandle};
use crate::AudioError;

/// Why playback did not use the requested sound
#[derive(Debug, Clone, PartialEq)]
pub enum SoundFailure {
    /// Requested sound failed, default sound is playing instead
    FellBack { requested: String, error: AudioError },
    /// Neither the requested nor the default sound could be played
    Unavailable { error: AudioError },
}

/// Result of a playback attempt. Never an error: a failed attempt leaves
/// the alarm silent for this cycle.
#[derive(Debug)]
pub struct Playback {
    pub handle: Option<SoundHandle>,
    pub failure: Option<SoundFailure>,
}

/// Plays alarm sounds on a shared sink
#[derive(Clone)]
pub struct AlarmPlayer {
    sink: Arc<dyn AudioSink>,
    default_sound: String,
}

impl AlarmPlayer {
    pub fn new(sink: Arc<dyn AudioSink>, default_sound: impl Into<String>) -> Self {
        Self {
            sink,
            default_sound: default_sound.into(),
        }
    }

    /// Play `audio_ref` (or the default sound when empty) at `volume`,
    /// falling back to the default sound when loading fails.
    pub fn play(&self, audio_ref: &str, volume: u8) -> Playback {
        let requested = if audio_ref.is_empty() {
            self.default_sound.as_str()
        } else {
            audio_ref
        };

        let first_error = match SoundHandle::play(self.sink.clone(), requested, volume) {
            Ok(handle) => {
                return Playback {
                    handle: Some(handle),
                    failure: None,
                }
            }
            Err(e) => e,
        };

        if requested == self.default_sound {
            error!("Could not play default alert sound {}: {}", requested, first_error);
            return Playback {
                handle: None,
                failure: Some(SoundFailure::Unavailable { error: first_error }),
            };
        }

        warn!(
            "Could not play {} ({}), falling back to {}",
            requested, first_error, self.default_sound
        );
        match SoundHandle::play(self.sink.clone(), &self.default_sound, volume) {
            Ok(handle) => Playback {
                handle: Some(handle),
                failure: Some(SoundFailure::FellBack {
                    requested: requested.to_string(),
                    error: first_error,
                }),
            },
            Err(e) => {
                error!(
                    "Could not play default alert sound {}: {}",
                    self.default_sound, e
                );
                Playback {
                    handle: None,
                    failure: Some(SoundFailure::Unavailable { error: e }),
                }
            }
        }
    }
}

impl std::fmt::Debug for AlarmPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmPlayer")
            .field("default_sound", &self.default_sound)
            .finish()
    }
}
