//! Per-alarm state tracking

use alarm_audio::SoundHandle;
use serde::{Deserialize, Serialize};

/// Directions seen since the last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeenDirections {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Alarm state (tracked over time, owned by one alarm)
#[derive(Debug, Default)]
pub struct AlarmState {
    /// Warning currently sounding or escalating
    pub warning_active: bool,

    /// Time since the last complete scan (ms)
    pub time_since_scan_ms: f64,

    /// Time since the sound was last (re)triggered during a warning (ms)
    pub repeat_elapsed_ms: f64,

    /// Tick time the current warning began (ms)
    pub warning_started_at_ms: f64,

    pub seen: SeenDirections,

    /// Tick time of the first left detection since reset (ms)
    pub left_seen_at_ms: Option<f64>,

    /// Tick time of the first right detection since reset (ms)
    pub right_seen_at_ms: Option<f64>,

    /// Warning escalation is suppressed before this tick time (ms)
    pub silenced_until_ms: f64,

    /// Sound playing for this alarm, stopped when dropped
    pub sound: Option<SoundHandle>,

    /// Last volume applied to the sound
    pub volume: u8,

    /// Suppressed-warning notice already reported for this episode
    pub(crate) suppression_reported: bool,
}

impl AlarmState {
    /// Back to the initial state, stopping any sound
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Forget direction progress, leaving warning and timers alone
    pub fn clear_directions(&mut self) {
        self.seen = SeenDirections::default();
        self.left_seen_at_ms = None;
        self.right_seen_at_ms = None;
    }

    /// Forget left/right progress, keeping up/down
    pub fn clear_horizontal(&mut self) {
        self.seen.left = false;
        self.seen.right = false;
        self.left_seen_at_ms = None;
        self.right_seen_at_ms = None;
    }

    pub fn is_silenced(&self, now_ms: f64) -> bool {
        now_ms < self.silenced_until_ms
    }

    pub fn silence_remaining_ms(&self, now_ms: f64) -> f64 {
        (self.silenced_until_ms - now_ms).max(0.0)
    }

    /// Separation between first left and first right detection
    pub fn left_right_gap_ms(&self) -> Option<f64> {
        match (self.left_seen_at_ms, self.right_seen_at_ms) {
            (Some(left), Some(right)) => Some((left - right).abs()),
            _ => None,
        }
    }

    pub fn sound_playing(&self) -> bool {
        self.sound.as_ref().map(|s| s.is_playing()).unwrap_or(false)
    }
}
