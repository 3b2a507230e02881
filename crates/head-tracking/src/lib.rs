//! Head Tracking
//!
//! Orientation plumbing between a head-mounted display and the lookout
//! engine:
//! - Quaternion to yaw/pitch conversion
//! - Forward reference (baseline) handling and recentering
//! - Orientation sources producing one centered sample per tick
//!
//! Sign convention: positive yaw is a turn to the left, positive pitch is
//! looking up.

pub mod orientation;
pub mod reference;
pub mod source;

pub use orientation::{wrap_degrees, OrientationSample, Quaternion, RawOrientation};
pub use reference::{CenterMode, TrackingReference, DEFAULT_MEDIAN_WINDOW};
pub use source::{OrientationSource, RecordDecoder, ReplaySource, ScriptedSource};

use thiserror::Error;

/// Tracking error types
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Failed to open orientation source: {0}")]
    Open(#[from] std::io::Error),

    #[error("Malformed orientation record on line {line}: {reason}")]
    Record { line: usize, reason: String },
}
