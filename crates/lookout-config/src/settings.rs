//! Top-level settings and loading

use std::path::Path;

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alarm::AlarmConfig;
use crate::error::ConfigError;
use crate::normalize::{self, Adjustment};

/// Sustained-forward posture that clears direction progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterResetConfig {
    /// Half-width of the centered window (degrees, yaw and pitch)
    pub window_degrees: f64,

    /// Time the posture must be held before resetting (seconds)
    pub hold_time_seconds: f64,
}

impl Default for CenterResetConfig {
    fn default() -> Self {
        Self {
            window_degrees: 10.0,
            hold_time_seconds: 4.0,
        }
    }
}

impl CenterResetConfig {
    pub fn is_enabled(&self) -> bool {
        self.window_degrees > 0.0 && self.hold_time_seconds > 0.0
    }
}

/// Tick cadence and shared playback defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Tick period while a session is active (ms)
    pub tick_interval_ms: u64,

    /// Coarser poll period while no session is active (ms)
    pub idle_poll_interval_ms: u64,

    /// Period of the per-alarm status dump (ms of tick time)
    pub diagnostics_interval_ms: u64,

    /// Sound used when an alarm has no sound or its sound fails to load
    pub default_sound: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            idle_poll_interval_ms: 1000,
            diagnostics_interval_ms: 1000,
            default_sound: "beep.wav".to_string(),
        }
    }
}

/// Complete lookout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub alarms: Vec<AlarmConfig>,

    #[serde(default)]
    pub center_reset: CenterResetConfig,

    #[serde(default)]
    pub engine: EngineSettings,
}

impl Default for Settings {
    /// A frequent narrow alarm paired with a wide one
    fn default() -> Self {
        Self {
            alarms: vec![AlarmConfig::frequent(), AlarmConfig::wide()],
            center_reset: CenterResetConfig::default(),
            engine: EngineSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// Environment variables prefixed `LOOKOUT__` override file values
    /// (e.g. `LOOKOUT__ENGINE__TICK_INTERVAL_MS=20`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading settings from {}", path.display());

        let raw = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(
                Environment::with_prefix("LOOKOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(raw.try_deserialize()?)
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw = config::Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?;

        Self::finish(raw.try_deserialize()?)
    }

    fn finish(mut settings: Settings) -> Result<Self, ConfigError> {
        for adjustment in settings.normalize()? {
            match adjustment.alarm {
                Some(alarm) => warn!(
                    alarm,
                    field = adjustment.field,
                    "Setting {} out of range, using {}",
                    adjustment.from,
                    adjustment.to
                ),
                None => warn!(
                    field = adjustment.field,
                    "Setting {} out of range, using {}",
                    adjustment.from,
                    adjustment.to
                ),
            }
        }

        for (index, alarm) in settings.alarms.iter().enumerate() {
            info!(alarm = index, "Alarm configured: {}", alarm.summary());
        }
        info!(
            "Center reset window: {}°, hold time: {}s",
            settings.center_reset.window_degrees, settings.center_reset.hold_time_seconds
        );

        Ok(settings)
    }

    /// Coerce out-of-range values and reject unusable ones.
    ///
    /// Returns every change made. Fails when the alarm list is empty or an
    /// angle is not a finite number.
    pub fn normalize(&mut self) -> Result<Vec<Adjustment>, ConfigError> {
        if self.alarms.is_empty() {
            return Err(ConfigError::NoAlarms);
        }

        let mut adjustments = Vec::new();
        for (index, alarm) in self.alarms.iter_mut().enumerate() {
            normalize::normalize_alarm(index, alarm, &mut adjustments)?;
        }
        normalize::normalize_center_reset(&mut self.center_reset, &mut adjustments);
        normalize::normalize_engine(&mut self.engine, &mut adjustments);

        Ok(adjustments)
    }

    /// Number of alarms that will actually run
    pub fn enabled_alarm_count(&self) -> usize {
        self.alarms.iter().filter(|a| a.is_enabled()).count()
    }
}
