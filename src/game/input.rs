//! Tilt Input Normalization
//!
//! Converts raw accelerometer samples into a single commanded direction.
//! Only the dominant axis is considered; readings at or below the
//! threshold, and exact ties between the axes, command nothing.

use serde::{Serialize, Deserialize};
use crate::core::grid::Direction;

/// Minimum axis magnitude that counts as a command (sensor units).
pub const DEFAULT_TILT_THRESHOLD: f32 = 2.0;

/// One accelerometer reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltSample {
    /// Lateral axis: negative tilts left.
    pub x: f32,
    /// Longitudinal axis: positive tilts up.
    pub y: f32,
}

impl TiltSample {
    /// Create a new sample.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Resolve this sample against `threshold`.
    #[inline]
    pub fn direction(self, threshold: f32) -> Direction {
        direction_from_tilt(self.x, self.y, threshold)
    }
}

/// Derive the commanded direction from a tilt reading.
///
/// NaN readings never command a roll.
pub fn direction_from_tilt(x: f32, y: f32, threshold: f32) -> Direction {
    let (ax, ay) = (x.abs(), y.abs());

    if ax > ay {
        if x < -threshold {
            return Direction::Left;
        }
        if x > threshold {
            return Direction::Right;
        }
    } else if ay > ax {
        if y < -threshold {
            return Direction::Down;
        }
        if y > threshold {
            return Direction::Up;
        }
    }

    Direction::None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_axis() {
        let t = DEFAULT_TILT_THRESHOLD;
        assert_eq!(direction_from_tilt(-3.0, 1.0, t), Direction::Left);
        assert_eq!(direction_from_tilt(3.0, -1.0, t), Direction::Right);
        assert_eq!(direction_from_tilt(0.5, 4.0, t), Direction::Up);
        assert_eq!(direction_from_tilt(-0.5, -4.0, t), Direction::Down);
    }

    #[test]
    fn test_below_threshold() {
        let t = DEFAULT_TILT_THRESHOLD;
        assert_eq!(direction_from_tilt(1.9, 0.0, t), Direction::None);
        assert_eq!(direction_from_tilt(0.0, -2.0, t), Direction::None);
        assert_eq!(direction_from_tilt(2.0, 1.0, t), Direction::None);
        assert_eq!(direction_from_tilt(0.0, 0.0, t), Direction::None);
    }

    #[test]
    fn test_tie_is_none() {
        let t = DEFAULT_TILT_THRESHOLD;
        assert_eq!(direction_from_tilt(5.0, 5.0, t), Direction::None);
        assert_eq!(direction_from_tilt(-5.0, 5.0, t), Direction::None);
    }

    #[test]
    fn test_non_finite() {
        let t = DEFAULT_TILT_THRESHOLD;
        assert_eq!(direction_from_tilt(f32::NAN, 0.0, t), Direction::None);
        assert_eq!(direction_from_tilt(0.0, f32::NAN, t), Direction::None);
    }

    #[test]
    fn test_sample_uses_threshold() {
        let sample = TiltSample::new(3.0, 0.0);
        assert_eq!(sample.direction(2.0), Direction::Right);
        assert_eq!(sample.direction(5.0), Direction::None);
    }
}
