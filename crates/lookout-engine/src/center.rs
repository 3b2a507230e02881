//! Center-reset monitor
//!
//! Holding the head near forward for long enough forgives direction
//! progress on every alarm. It fires once per centered dwell; leaving the
//! window re-arms it.

use head_tracking::OrientationSample;
use lookout_config::CenterResetConfig;
use serde::Serialize;

/// Shared hold state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CenterResetState {
    /// Time spent inside the window during the current dwell (ms)
    pub hold_timer_ms: f64,
    /// Reset already fired during the current dwell
    pub is_active: bool,
}

impl CenterResetState {
    pub fn hold_timer_s(&self) -> f64 {
        self.hold_timer_ms / 1000.0
    }
}

#[derive(Debug, Clone)]
pub struct CenterResetMonitor {
    config: CenterResetConfig,
    state: CenterResetState,
}

impl CenterResetMonitor {
    pub fn new(config: CenterResetConfig) -> Self {
        Self {
            config,
            state: CenterResetState::default(),
        }
    }

    pub fn config(&self) -> &CenterResetConfig {
        &self.config
    }

    pub fn state(&self) -> &CenterResetState {
        &self.state
    }

    /// Advance the hold timer. Returns true on the tick the reset fires.
    pub fn update(&mut self, sample: &OrientationSample, dt_ms: f64) -> bool {
        if !self.config.is_enabled() {
            return false;
        }

        if sample.is_within(self.config.window_degrees) {
            self.state.hold_timer_ms += dt_ms;
            if !self.state.is_active && self.state.hold_timer_ms >= self.config.hold_time_seconds * 1000.0 {
                self.state.is_active = true;
                return true;
            }
        } else {
            self.interrupt();
        }
        false
    }

    /// End the current dwell without firing
    pub fn interrupt(&mut self) {
        self.state = CenterResetState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> CenterResetMonitor {
        CenterResetMonitor::new(CenterResetConfig {
            window_degrees: 10.0,
            hold_time_seconds: 1.0,
        })
    }

    #[test]
    fn test_fires_once_per_dwell() {
        let mut monitor = monitor();
        let forward = OrientationSample::new(2.0, -3.0);

        let fired: Vec<bool> = (0..40).map(|_| monitor.update(&forward, 50.0)).collect();
        assert_eq!(fired.iter().filter(|&&f| f).count(), 1);
        // 20 ticks of 50ms reach the 1s hold
        assert!(fired[19]);
        assert!(monitor.state().is_active);
    }

    #[test]
    fn test_leaving_window_rearms() {
        let mut monitor = monitor();
        let forward = OrientationSample::FORWARD;
        let away = OrientationSample::new(30.0, 0.0);

        let first = (0..20).filter(|_| monitor.update(&forward, 50.0)).count();
        assert_eq!(first, 1);

        assert!(!monitor.update(&away, 50.0));
        assert_eq!(monitor.state().hold_timer_ms, 0.0);
        assert!(!monitor.state().is_active);

        let second = (0..20).filter(|_| monitor.update(&forward, 50.0)).count();
        assert_eq!(second, 1);
    }

    #[test]
    fn test_short_dwell_does_not_fire() {
        let mut monitor = monitor();
        let forward = OrientationSample::FORWARD;
        let away = OrientationSample::new(0.0, 15.0);

        for _ in 0..3 {
            for _ in 0..19 {
                assert!(!monitor.update(&forward, 50.0));
            }
            monitor.update(&away, 50.0);
        }
    }

    #[test]
    fn test_disabled_never_fires() {
        let mut monitor = CenterResetMonitor::new(CenterResetConfig {
            window_degrees: 0.0,
            hold_time_seconds: 1.0,
        });
        assert!((0..100).all(|_| !monitor.update(&OrientationSample::FORWARD, 50.0)));
    }

    #[test]
    fn test_hold_timer_seconds() {
        let mut monitor = monitor();
        for _ in 0..10 {
            monitor.update(&OrientationSample::FORWARD, 50.0);
        }
        assert_eq!(monitor.state().hold_timer_s(), 0.5);
    }
}
