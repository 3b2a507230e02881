//! Lookout Settings
//!
//! Settings model for the lookout monitor:
//! - Per-alarm scan thresholds and timings
//! - Center-reset window
//! - Engine tick cadence and default alert sound
//!
//! Settings are loaded once at startup, normalized, and treated as
//! read-only afterwards.

mod alarm;
mod error;
mod normalize;
mod settings;

pub use alarm::{AlarmConfig, RequiredDirections};
pub use error::ConfigError;
pub use normalize::{Adjustment, MIN_REPEAT_INTERVAL_MS, SAFE_REPEAT_INTERVAL_MS};
pub use settings::{CenterResetConfig, EngineSettings, Settings};
