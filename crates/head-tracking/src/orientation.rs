//! Orientation types

use serde::{Deserialize, Serialize};

/// Unit quaternion as reported by the headset runtime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Yaw about the vertical axis and pitch about the lateral axis (degrees)
    pub fn to_yaw_pitch(&self) -> RawOrientation {
        let Quaternion { w, x, y, z } = *self;

        let siny_cosp = 2.0 * (w * y + x * z);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
        let sinp = (2.0 * (w * x - z * y)).clamp(-1.0, 1.0);

        RawOrientation {
            yaw_deg: siny_cosp.atan2(cosy_cosp).to_degrees(),
            pitch_deg: sinp.asin().to_degrees(),
        }
    }
}

/// Absolute headset orientation before the forward reference is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrientation {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
}

impl From<Quaternion> for RawOrientation {
    fn from(q: Quaternion) -> Self {
        q.to_yaw_pitch()
    }
}

/// Orientation relative to the forward reference, one per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Positive is left of forward (degrees)
    pub yaw_deg: f64,
    /// Positive is above forward (degrees)
    pub pitch_deg: f64,
}

impl OrientationSample {
    pub fn new(yaw_deg: f64, pitch_deg: f64) -> Self {
        Self { yaw_deg, pitch_deg }
    }

    pub const FORWARD: OrientationSample = OrientationSample {
        yaw_deg: 0.0,
        pitch_deg: 0.0,
    };

    /// Both axes strictly inside `±window_deg`
    pub fn is_within(&self, window_deg: f64) -> bool {
        self.yaw_deg.abs() < window_deg && self.pitch_deg.abs() < window_deg
    }
}

/// Wrap an angle into [-180, 180] degrees
pub fn wrap_degrees(angle_deg: f64) -> f64 {
    let wrapped = (angle_deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep +180 as given
    if wrapped == -180.0 && angle_deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaw_quat(deg: f64) -> Quaternion {
        let half = deg.to_radians() / 2.0;
        Quaternion {
            w: half.cos(),
            x: 0.0,
            y: half.sin(),
            z: 0.0,
        }
    }

    fn pitch_quat(deg: f64) -> Quaternion {
        let half = deg.to_radians() / 2.0;
        Quaternion {
            w: half.cos(),
            x: half.sin(),
            y: 0.0,
            z: 0.0,
        }
    }

    #[test]
    fn test_identity_is_forward() {
        let raw = Quaternion::IDENTITY.to_yaw_pitch();
        assert!(raw.yaw_deg.abs() < 1e-9);
        assert!(raw.pitch_deg.abs() < 1e-9);
    }

    #[test]
    fn test_pure_yaw() {
        let raw = yaw_quat(30.0).to_yaw_pitch();
        assert!((raw.yaw_deg - 30.0).abs() < 1e-6);
        assert!(raw.pitch_deg.abs() < 1e-6);

        let raw = yaw_quat(-75.0).to_yaw_pitch();
        assert!((raw.yaw_deg + 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_pure_pitch() {
        let raw = pitch_quat(12.0).to_yaw_pitch();
        assert!((raw.pitch_deg - 12.0).abs() < 1e-6);
        assert!(raw.yaw_deg.abs() < 1e-6);
    }

    #[test]
    fn test_pitch_clamped_at_pole() {
        // Slightly denormalized quaternion must not produce NaN
        let q = Quaternion {
            w: 0.7072,
            x: 0.7072,
            y: 0.0,
            z: 0.0,
        };
        let raw = q.to_yaw_pitch();
        assert!((raw.pitch_deg - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(540.0), 180.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), -180.0);
    }

    #[test]
    fn test_is_within() {
        assert!(OrientationSample::new(5.0, -5.0).is_within(10.0));
        assert!(!OrientationSample::new(10.0, 0.0).is_within(10.0));
        assert!(!OrientationSample::new(0.0, -12.0).is_within(10.0));
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_wrap_stays_in_range(angle in -10_000.0f64..10_000.0) {
                let wrapped = wrap_degrees(angle);
                prop_assert!((-180.0..=180.0).contains(&wrapped));
                let turns = (angle - wrapped) / 360.0;
                prop_assert!((turns - turns.round()).abs() < 1e-9);
            }

            #[test]
            fn prop_yaw_roundtrip(deg in -179.0f64..179.0) {
                let half = deg.to_radians() / 2.0;
                let q = Quaternion { w: half.cos(), x: 0.0, y: half.sin(), z: 0.0 };
                prop_assert!((q.to_yaw_pitch().yaw_deg - deg).abs() < 1e-6);
            }
        }
    }
}
