//! Normalization of numeric settings
//!
//! Out-of-range values are coerced to safe values rather than rejected.
//! Every coercion is reported as an [`Adjustment`] so the caller can log it.

use crate::alarm::AlarmConfig;
use crate::error::ConfigError;
use crate::settings::{CenterResetConfig, EngineSettings};

/// Repeat intervals below this floor are replaced (ms)
pub const MIN_REPEAT_INTERVAL_MS: i64 = 100;

/// Replacement for a repeat interval below the floor (ms)
pub const SAFE_REPEAT_INTERVAL_MS: i64 = 5_000;

const VOLUME_RANGE: (i32, i32) = (0, 100);
const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

/// A value that was changed during normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    /// Alarm index, `None` for shared sections
    pub alarm: Option<usize>,
    pub field: &'static str,
    pub from: f64,
    pub to: f64,
}

struct Adjustments<'a> {
    alarm: Option<usize>,
    out: &'a mut Vec<Adjustment>,
}

impl Adjustments<'_> {
    fn record(&mut self, field: &'static str, from: f64, to: f64) {
        self.out.push(Adjustment {
            alarm: self.alarm,
            field,
            from,
            to,
        });
    }

    fn non_negative_ms(&mut self, field: &'static str, value: &mut i64) {
        if *value < 0 {
            self.record(field, *value as f64, 0.0);
            *value = 0;
        }
    }

    fn volume(&mut self, field: &'static str, value: &mut i32) {
        let clamped = (*value).clamp(VOLUME_RANGE.0, VOLUME_RANGE.1);
        if clamped != *value {
            self.record(field, *value as f64, clamped as f64);
            *value = clamped;
        }
    }

    fn non_negative_angle(&mut self, field: &'static str, value: &mut f64) {
        if *value < 0.0 {
            self.record(field, *value, 0.0);
            *value = 0.0;
        }
    }
}

fn ensure_finite(alarm: usize, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { alarm, field, value })
    }
}

/// Normalize one alarm in place
pub(crate) fn normalize_alarm(
    index: usize,
    alarm: &mut AlarmConfig,
    out: &mut Vec<Adjustment>,
) -> Result<(), ConfigError> {
    ensure_finite(index, "min_horizontal_angle_deg", alarm.min_horizontal_angle_deg)?;
    ensure_finite(index, "min_vertical_angle_up_deg", alarm.min_vertical_angle_up_deg)?;
    ensure_finite(index, "min_vertical_angle_down_deg", alarm.min_vertical_angle_down_deg)?;

    let mut adj = Adjustments {
        alarm: Some(index),
        out,
    };

    adj.non_negative_angle("min_vertical_angle_up_deg", &mut alarm.min_vertical_angle_up_deg);
    adj.non_negative_angle("min_vertical_angle_down_deg", &mut alarm.min_vertical_angle_down_deg);

    adj.volume("start_volume", &mut alarm.start_volume);
    adj.volume("end_volume", &mut alarm.end_volume);

    adj.non_negative_ms("max_time_ms", &mut alarm.max_time_ms);
    adj.non_negative_ms("volume_ramp_time_ms", &mut alarm.volume_ramp_time_ms);
    adj.non_negative_ms("silence_after_look_ms", &mut alarm.silence_after_look_ms);
    adj.non_negative_ms("min_lookout_time_ms", &mut alarm.min_lookout_time_ms);

    if alarm.repeat_interval_ms < MIN_REPEAT_INTERVAL_MS {
        adj.record(
            "repeat_interval_ms",
            alarm.repeat_interval_ms as f64,
            SAFE_REPEAT_INTERVAL_MS as f64,
        );
        alarm.repeat_interval_ms = SAFE_REPEAT_INTERVAL_MS;
    }

    Ok(())
}

/// Non-finite center-reset values switch the monitor off
pub(crate) fn normalize_center_reset(center: &mut CenterResetConfig, out: &mut Vec<Adjustment>) {
    let mut adj = Adjustments { alarm: None, out };
    if !center.window_degrees.is_finite() {
        adj.record("center_reset.window_degrees", center.window_degrees, 0.0);
        center.window_degrees = 0.0;
    }
    if !center.hold_time_seconds.is_finite() {
        adj.record("center_reset.hold_time_seconds", center.hold_time_seconds, 0.0);
        center.hold_time_seconds = 0.0;
    }
}

pub(crate) fn normalize_engine(engine: &mut EngineSettings, out: &mut Vec<Adjustment>) {
    let mut adj = Adjustments { alarm: None, out };
    if engine.tick_interval_ms == 0 {
        adj.record("engine.tick_interval_ms", 0.0, DEFAULT_TICK_INTERVAL_MS as f64);
        engine.tick_interval_ms = DEFAULT_TICK_INTERVAL_MS;
    }
    if engine.idle_poll_interval_ms < engine.tick_interval_ms {
        adj.record(
            "engine.idle_poll_interval_ms",
            engine.idle_poll_interval_ms as f64,
            engine.tick_interval_ms as f64,
        );
        engine.idle_poll_interval_ms = engine.tick_interval_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_interval_floor() {
        let mut alarm = AlarmConfig {
            repeat_interval_ms: 50,
            ..Default::default()
        };
        let mut out = Vec::new();
        normalize_alarm(0, &mut alarm, &mut out).unwrap();

        assert_eq!(alarm.repeat_interval_ms, SAFE_REPEAT_INTERVAL_MS);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].field, "repeat_interval_ms");
    }

    #[test]
    fn test_repeat_interval_at_floor_kept() {
        let mut alarm = AlarmConfig {
            repeat_interval_ms: MIN_REPEAT_INTERVAL_MS,
            ..Default::default()
        };
        let mut out = Vec::new();
        normalize_alarm(0, &mut alarm, &mut out).unwrap();

        assert_eq!(alarm.repeat_interval_ms, MIN_REPEAT_INTERVAL_MS);
        assert!(out.is_empty());
    }

    #[test]
    fn test_volume_clamped() {
        let mut alarm = AlarmConfig {
            start_volume: -10,
            end_volume: 150,
            ..Default::default()
        };
        let mut out = Vec::new();
        normalize_alarm(3, &mut alarm, &mut out).unwrap();

        assert_eq!(alarm.start_volume, 0);
        assert_eq!(alarm.end_volume, 100);
        assert!(out.iter().all(|a| a.alarm == Some(3)));
    }

    #[test]
    fn test_negative_durations_zeroed() {
        let mut alarm = AlarmConfig {
            silence_after_look_ms: -1,
            volume_ramp_time_ms: -500,
            ..Default::default()
        };
        let mut out = Vec::new();
        normalize_alarm(0, &mut alarm, &mut out).unwrap();

        assert_eq!(alarm.silence_after_look_ms, 0);
        assert_eq!(alarm.volume_ramp_time_ms, 0);
    }

    #[test]
    fn test_nan_angle_rejected() {
        let mut alarm = AlarmConfig {
            min_horizontal_angle_deg: f64::NAN,
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = normalize_alarm(1, &mut alarm, &mut out).unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { alarm: 1, .. }));
    }

    #[test]
    fn test_idle_poll_not_faster_than_tick() {
        let mut engine = EngineSettings {
            tick_interval_ms: 100,
            idle_poll_interval_ms: 10,
            ..Default::default()
        };
        let mut out = Vec::new();
        normalize_engine(&mut engine, &mut out);
        assert_eq!(engine.idle_poll_interval_ms, 100);
    }
}
