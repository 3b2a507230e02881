//! Settings Error Types

use thiserror::Error;

/// Errors while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings source could not be read or deserialized
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// Settings contain no alarm records
    #[error("No alarms configured")]
    NoAlarms,

    /// A numeric field cannot be normalized (NaN or infinite)
    #[error("Alarm {alarm}: {field} value {value} is not a finite number")]
    NonFinite {
        alarm: usize,
        field: &'static str,
        value: f64,
    },
}
