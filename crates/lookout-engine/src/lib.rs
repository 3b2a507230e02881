//! Lookout Engine
//!
//! Head-orientation lookout monitoring for flight simulation:
//! - Per-alarm scan detection (left, right, optional up/down)
//! - Warning escalation with volume ramp, repeats and silence windows
//! - Cross-alarm reset when the widest alarm completes a scan
//! - Center reset after a sustained forward posture
//!
//! The engine is single-threaded and never blocks. Time advances only
//! through the `dt_ms` handed to [`LookoutEngine::step`].

pub mod alarm;
pub mod center;
pub mod diagnostics;
pub mod engine;
pub mod events;
pub mod state;

pub use alarm::{AlarmEngine, AlarmSnapshot, Look, Tick};
pub use center::{CenterResetMonitor, CenterResetState};
pub use diagnostics::Diagnostics;
pub use engine::{LookoutEngine, TickInput};
pub use events::{AlarmEvent, Direction, ResetReason};
pub use state::{AlarmState, SeenDirections};

use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No alarms configured")]
    NoAlarms,
}
