//! Forward reference (baseline) handling
//!
//! The lookout engine only ever sees orientation relative to "forward".
//! [`TrackingReference`] owns that baseline explicitly, either as a fixed
//! pose captured on recenter or as a robust rolling median of recent poses.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::orientation::{wrap_degrees, OrientationSample, RawOrientation};

/// Samples kept for the rolling median (~30s at 20Hz)
pub const DEFAULT_MEDIAN_WINDOW: usize = 600;

/// How the forward baseline is established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CenterMode {
    /// Baseline captured explicitly on recenter
    #[default]
    Fixed,
    /// Baseline follows the median of the inter-quartile band of recent samples
    RollingMedian { window: usize },
}

/// Forward reference owned by the orientation source
#[derive(Debug, Clone)]
pub struct TrackingReference {
    mode: CenterMode,
    baseline: RawOrientation,
    yaw_window: VecDeque<f64>,
    pitch_window: VecDeque<f64>,
    last_raw: Option<RawOrientation>,
    recenter_pending: bool,
}

impl TrackingReference {
    pub fn new(mode: CenterMode) -> Self {
        let capacity = match mode {
            CenterMode::Fixed => 0,
            CenterMode::RollingMedian { window } => window,
        };
        Self {
            mode,
            baseline: RawOrientation::default(),
            yaw_window: VecDeque::with_capacity(capacity),
            pitch_window: VecDeque::with_capacity(capacity),
            last_raw: None,
            recenter_pending: false,
        }
    }

    /// Rolling median over [`DEFAULT_MEDIAN_WINDOW`] samples
    pub fn rolling() -> Self {
        Self::new(CenterMode::RollingMedian {
            window: DEFAULT_MEDIAN_WINDOW,
        })
    }

    pub fn mode(&self) -> CenterMode {
        self.mode
    }

    /// Current forward baseline
    pub fn baseline(&self) -> RawOrientation {
        self.baseline
    }

    /// Make the most recent pose the new forward direction.
    ///
    /// With no pose seen yet, the next resolved pose becomes forward.
    pub fn recenter(&mut self) {
        match self.last_raw {
            Some(raw) => self.apply_recenter(raw),
            None => {
                debug!("Recenter requested before first sample, deferring");
                self.recenter_pending = true;
            }
        }
    }

    fn apply_recenter(&mut self, raw: RawOrientation) {
        self.baseline = raw;
        self.recenter_pending = false;
        if let CenterMode::RollingMedian { .. } = self.mode {
            self.yaw_window.clear();
            self.pitch_window.clear();
            self.yaw_window.push_back(raw.yaw_deg);
            self.pitch_window.push_back(raw.pitch_deg);
        }
        info!(
            "Forward reference recentered at yaw {:.1}°, pitch {:.1}°",
            raw.yaw_deg, raw.pitch_deg
        );
    }

    /// Convert an absolute pose into a sample relative to forward
    pub fn resolve(&mut self, raw: RawOrientation) -> OrientationSample {
        self.last_raw = Some(raw);
        if self.recenter_pending {
            self.apply_recenter(raw);
        }

        if let CenterMode::RollingMedian { window } = self.mode {
            // Baseline excludes the sample being resolved
            if let (Some(yaw), Some(pitch)) = (
                iqr_median(&self.yaw_window),
                iqr_median(&self.pitch_window),
            ) {
                self.baseline = RawOrientation {
                    yaw_deg: yaw,
                    pitch_deg: pitch,
                };
            }
            self.yaw_window.push_back(raw.yaw_deg);
            self.pitch_window.push_back(raw.pitch_deg);
            while self.yaw_window.len() > window {
                self.yaw_window.pop_front();
                self.pitch_window.pop_front();
            }
        }

        OrientationSample {
            yaw_deg: wrap_degrees(raw.yaw_deg - self.baseline.yaw_deg),
            pitch_deg: wrap_degrees(raw.pitch_deg - self.baseline.pitch_deg),
        }
    }
}

impl Default for TrackingReference {
    fn default() -> Self {
        Self::new(CenterMode::Fixed)
    }
}

/// Median of the inter-quartile band, robust to long glances to one side
fn iqr_median(values: &VecDeque<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let band = &sorted[n / 4..=(3 * n) / 4];
    Some(band[band.len() / 2])
}
