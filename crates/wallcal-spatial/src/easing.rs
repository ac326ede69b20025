//! Easing functions

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Easing function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseInOutQuad,
    /// Accelerates through the first half, decelerates through the second.
    #[default]
    EaseInOutCubic,
    EaseInOutSine,
}

impl Easing {
    /// Apply easing function to progress value (0-1)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t = 2.0 * t - 2.0;
                    0.5 * t * t * t + 1.0
                }
            }
            Easing::EaseInOutSine => -0.5 * ((PI * t).cos() - 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseInOutQuad,
        Easing::EaseInOutCubic,
        Easing::EaseInOutSine,
    ];

    #[test]
    fn test_endpoints_and_clamping() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-12, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{:?}", easing);
            assert_eq!(easing.apply(-1.0), easing.apply(0.0));
            assert_eq!(easing.apply(2.0), easing.apply(1.0));
        }
    }

    #[test]
    fn test_in_out_is_symmetric() {
        for easing in [Easing::EaseInOutQuad, Easing::EaseInOutCubic, Easing::EaseInOutSine] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-12);
            // Slow start, slow finish
            assert!(easing.apply(0.1) < 0.1);
            assert!(easing.apply(0.9) > 0.9);
            let a = easing.apply(0.2);
            let b = 1.0 - easing.apply(0.8);
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&Easing::EaseInOutCubic).unwrap();
        assert_eq!(json, "\"ease_in_out_cubic\"");
    }
}
