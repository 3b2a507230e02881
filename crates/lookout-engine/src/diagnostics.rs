//! Periodic status dump cadence

/// Decides when the per-alarm status dump is due.
///
/// Cadence is measured in tick time so replays and tests see the same
/// output as live runs.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    interval_ms: f64,
    last_emitted_at_ms: f64,
}

impl Diagnostics {
    /// `interval_ms == 0` disables the dump
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as f64,
            last_emitted_at_ms: 0.0,
        }
    }

    pub fn last_emitted_at_ms(&self) -> f64 {
        self.last_emitted_at_ms
    }

    /// True when a dump is due at `now_ms`; records the emission
    pub fn due(&mut self, now_ms: f64) -> bool {
        if self.interval_ms <= 0.0 || now_ms - self.last_emitted_at_ms < self.interval_ms {
            return false;
        }
        self.last_emitted_at_ms = now_ms;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_once_per_interval() {
        let mut diagnostics = Diagnostics::new(1000);

        assert!(!diagnostics.due(500.0));
        assert!(diagnostics.due(1000.0));
        assert_eq!(diagnostics.last_emitted_at_ms(), 1000.0);
        assert!(!diagnostics.due(1999.0));
        assert!(diagnostics.due(2050.0));
        assert_eq!(diagnostics.last_emitted_at_ms(), 2050.0);
    }

    #[test]
    fn test_disabled() {
        let mut diagnostics = Diagnostics::new(0);
        assert!(!diagnostics.due(1_000_000.0));
    }
}
