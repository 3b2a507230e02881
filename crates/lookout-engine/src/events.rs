//! Engine events reported to the host

use serde::{Deserialize, Serialize};

/// Look direction relative to forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Why an alarm was returned to its initial state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetReason {
    /// Widest alarm completed a valid scan
    WiderScan { by: usize },
    /// Host reported the flight ended
    FlightEnded,
    /// Session became inactive
    SessionEnded,
    /// Monitor shutting down
    Shutdown,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlarmEvent {
    /// A direction was seen for the first time since reset
    DirectionSeen {
        alarm: usize,
        direction: Direction,
        at_ms: f64,
    },

    /// Valid scan, alarm reset
    ScanCompleted { alarm: usize, lr_gap_ms: f64 },

    /// All directions seen but left and right too close together
    ScanRejected { alarm: usize, lr_gap_ms: f64 },

    /// Time budget exceeded inside a silence window
    WarningSuppressed { alarm: usize },

    WarningStarted { alarm: usize, volume: u8 },

    WarningRepeated { alarm: usize, volume: u8 },

    /// Repeat interval elapsed inside a silence window
    RepeatSkipped { alarm: usize },

    /// Configured sound failed, default sound used
    SoundFallback {
        alarm: usize,
        requested: String,
        error: String,
    },

    /// No sound could be played, warning continues silently
    SoundUnavailable { alarm: usize, error: String },

    AlarmReset { alarm: usize, reason: ResetReason },

    /// Sustained forward posture cleared all direction progress
    CenterReset,
}

impl AlarmEvent {
    /// Alarm the event belongs to, `None` for engine-wide events
    pub fn alarm(&self) -> Option<usize> {
        match self {
            AlarmEvent::DirectionSeen { alarm, .. }
            | AlarmEvent::ScanCompleted { alarm, .. }
            | AlarmEvent::ScanRejected { alarm, .. }
            | AlarmEvent::WarningSuppressed { alarm }
            | AlarmEvent::WarningStarted { alarm, .. }
            | AlarmEvent::WarningRepeated { alarm, .. }
            | AlarmEvent::RepeatSkipped { alarm }
            | AlarmEvent::SoundFallback { alarm, .. }
            | AlarmEvent::SoundUnavailable { alarm, .. }
            | AlarmEvent::AlarmReset { alarm, .. } => Some(*alarm),
            AlarmEvent::CenterReset => None,
        }
    }

    /// Events the host should surface in its own log
    pub fn is_resource_problem(&self) -> bool {
        matches!(
            self,
            AlarmEvent::SoundFallback { .. } | AlarmEvent::SoundUnavailable { .. }
        )
    }
}
