//! Per-alarm configuration

use serde::{Deserialize, Serialize};

/// Thresholds and timings for one lookout alarm.
///
/// Field names follow the model; the settings-file spellings
/// (`min_horizontal_angle`, `audio_file`, ...) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Total left + right sweep required (degrees). `<= 0` disables the alarm.
    #[serde(alias = "min_horizontal_angle")]
    pub min_horizontal_angle_deg: f64,

    /// Required upward deflection (degrees). `<= 0` means not required.
    #[serde(alias = "min_vertical_angle_up")]
    pub min_vertical_angle_up_deg: f64,

    /// Required downward deflection (degrees). `<= 0` means not required.
    #[serde(alias = "min_vertical_angle_down")]
    pub min_vertical_angle_down_deg: f64,

    /// Time budget without a complete scan before warning (ms)
    pub max_time_ms: i64,

    /// Sound to play. Empty selects the default alert sound.
    #[serde(alias = "audio_file")]
    pub audio_ref: String,

    /// Volume when the warning starts (0-100)
    pub start_volume: i32,

    /// Volume reached at the end of the ramp (0-100)
    pub end_volume: i32,

    /// Ramp duration from start to end volume (ms). 0 jumps to end volume.
    pub volume_ramp_time_ms: i64,

    /// Interval between sound re-triggers while warning (ms)
    pub repeat_interval_ms: i64,

    /// Grace window after a new left/right detection (ms)
    pub silence_after_look_ms: i64,

    /// Minimum separation between first left and first right detection (ms)
    pub min_lookout_time_ms: i64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            min_horizontal_angle_deg: 45.0,
            min_vertical_angle_up_deg: 7.5,
            min_vertical_angle_down_deg: 0.0,
            max_time_ms: 30_000,
            audio_ref: String::new(),
            start_volume: 50,
            end_volume: 100,
            volume_ramp_time_ms: 30_000,
            repeat_interval_ms: 5_000,
            silence_after_look_ms: 5_000,
            min_lookout_time_ms: 2_000,
        }
    }
}

/// Which directions a scan must include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequiredDirections {
    pub horizontal: bool,
    pub up: bool,
    pub down: bool,
}

impl AlarmConfig {
    /// Frequent narrow scan (45° sweep every 30s)
    pub fn frequent() -> Self {
        Self::default()
    }

    /// Wide scan on a longer budget (120° sweep every 90s)
    pub fn wide() -> Self {
        Self {
            min_horizontal_angle_deg: 120.0,
            max_time_ms: 90_000,
            ..Default::default()
        }
    }

    /// An alarm without a horizontal requirement never runs.
    pub fn is_enabled(&self) -> bool {
        self.min_horizontal_angle_deg > 0.0
    }

    /// Yaw deflection (degrees) needed on each side
    pub fn horizontal_half_angle(&self) -> f64 {
        self.min_horizontal_angle_deg / 2.0
    }

    pub fn required_directions(&self) -> RequiredDirections {
        RequiredDirections {
            horizontal: self.min_horizontal_angle_deg > 0.0,
            up: self.min_vertical_angle_up_deg > 0.0,
            down: self.min_vertical_angle_down_deg > 0.0,
        }
    }

    /// Whether the configured ramp actually changes volume over time
    pub fn has_volume_ramp(&self) -> bool {
        self.volume_ramp_time_ms > 0 && self.start_volume != self.end_volume
    }

    /// One-line summary used in startup logs
    pub fn summary(&self) -> String {
        let sound = if self.audio_ref.is_empty() {
            "default"
        } else {
            self.audio_ref.as_str()
        };
        format!(
            "{}°H {}°U {}°D, {}s, {}",
            self.min_horizontal_angle_deg,
            self.min_vertical_angle_up_deg,
            self.min_vertical_angle_down_deg,
            self.max_time_ms / 1000,
            sound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_follows_horizontal() {
        assert!(AlarmConfig::default().is_enabled());

        let disabled = AlarmConfig {
            min_horizontal_angle_deg: 0.0,
            ..Default::default()
        };
        assert!(!disabled.is_enabled());
    }

    #[test]
    fn test_required_directions() {
        let config = AlarmConfig {
            min_vertical_angle_up_deg: 0.0,
            min_vertical_angle_down_deg: 5.0,
            ..Default::default()
        };
        let required = config.required_directions();
        assert!(required.horizontal);
        assert!(!required.up);
        assert!(required.down);
    }

    #[test]
    fn test_settings_file_aliases() {
        let json = r#"{ "min_horizontal_angle": 120.0, "audio_file": "horn.ogg", "max_time_ms": 90000 }"#;
        let config: AlarmConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.min_horizontal_angle_deg, 120.0);
        assert_eq!(config.audio_ref, "horn.ogg");
        assert_eq!(config.max_time_ms, 90_000);
        // Unspecified fields take defaults
        assert_eq!(config.repeat_interval_ms, 5_000);
    }

    #[test]
    fn test_summary() {
        assert_eq!(AlarmConfig::wide().summary(), "120°H 7.5°U 0°D, 90s, default");
    }
}
