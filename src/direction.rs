//! Directional weight distribution
//!
//! Maps a 2D direction vector onto per-actuator intensity weights. The
//! actuator list is split at its midpoint: the first half represents the
//! left side of the device, the second half the right side, and both
//! halves share the vertical axis.

use std::fmt;

/// 2D direction vector for directional vibration
///
/// Positive x points right, positive y points up. The vector does not
/// need to be normalized; weights are computed from its direction only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub x: f64,
    pub y: f64,
}

impl Direction {
    /// Create a new direction vector
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Normalized per-axis weight components of a direction vector
///
/// Each component is the positive part of the vector along that axis,
/// divided by the vector magnitude. At most two components are non-zero
/// (one horizontal, one vertical) and each lies in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWeights {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl AxisWeights {
    /// Decompose a direction vector into axis weights
    ///
    /// Returns None when the vector has zero or non-finite magnitude;
    /// callers fall back to an undirected parallel dispatch in that case.
    pub fn from_direction(direction: Direction) -> Option<Self> {
        let total = direction.magnitude();
        if total == 0.0 || !total.is_finite() {
            return None;
        }

        Some(Self {
            left: (-direction.x).max(0.0) / total,
            right: direction.x.max(0.0) / total,
            top: direction.y.max(0.0) / total,
            bottom: (-direction.y).max(0.0) / total,
        })
    }

    /// Weight for the actuator at `index` out of `count` actuators
    ///
    /// The first half of the list (indices below `count / 2`) carries the
    /// left and top components, the second half the right and bottom
    /// components. The vertical component is always divided by the
    /// floored `count / 2`, so for odd counts the two halves are not
    /// symmetric: an upward vector concentrates on the smaller first
    /// half while a downward vector spreads thicker over the larger
    /// second half. `count` must be at least 2.
    pub fn actuator_weight(&self, index: usize, count: usize) -> f64 {
        let midpoint = count / 2;
        let vertical_split = (count / 2) as f64;

        if index < midpoint {
            self.left / midpoint as f64 + self.top / vertical_split
        } else {
            self.right / (count - midpoint) as f64 + self.bottom / vertical_split
        }
    }

    /// Weights for every actuator position, in index order
    ///
    /// Counts below 2 have no direction to spread across and every
    /// actuator receives the full weight.
    pub fn spread(&self, count: usize) -> Vec<f64> {
        if count < 2 {
            return vec![1.0; count];
        }
        (0..count).map(|i| self.actuator_weight(i, count)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_magnitude() {
        assert_close(Direction::new(3.0, 4.0).magnitude(), 5.0);
        assert_close(Direction::new(0.0, 0.0).magnitude(), 0.0);
        assert_close(Direction::new(-1.0, 0.0).magnitude(), 1.0);
    }

    #[test]
    fn test_zero_vector_has_no_weights() {
        assert_eq!(AxisWeights::from_direction(Direction::new(0.0, 0.0)), None);
        assert_eq!(AxisWeights::from_direction(Direction::new(-0.0, 0.0)), None);
    }

    #[test]
    fn test_non_finite_vector_has_no_weights() {
        assert_eq!(
            AxisWeights::from_direction(Direction::new(f64::NAN, 1.0)),
            None
        );
        assert_eq!(
            AxisWeights::from_direction(Direction::new(f64::INFINITY, 0.0)),
            None
        );
    }

    #[test]
    fn test_right_vector_four_actuators() {
        // dir = (1, 0): right = 1, everything else 0
        // midpoint = 2; left half gets 0, right half gets 1/(4-2) = 0.5
        let axis = AxisWeights::from_direction(Direction::new(1.0, 0.0)).unwrap();
        let weights = axis.spread(4);

        assert_close(weights[0], 0.0);
        assert_close(weights[1], 0.0);
        assert_close(weights[2], 0.5);
        assert_close(weights[3], 0.5);
    }

    #[test]
    fn test_left_vector_four_actuators() {
        // Mirror of the rightward case: left half gets 1/2 each
        let axis = AxisWeights::from_direction(Direction::new(-2.0, 0.0)).unwrap();
        let weights = axis.spread(4);

        assert_close(weights[0], 0.5);
        assert_close(weights[1], 0.5);
        assert_close(weights[2], 0.0);
        assert_close(weights[3], 0.0);
    }

    #[test]
    fn test_up_vector_three_actuators() {
        // dir = (0, 1): top = 1. midpoint = 1, vertical split = 3/2 = 1.
        // Actuator 0 takes the whole top component; the second half
        // carries only bottom, which is zero.
        let axis = AxisWeights::from_direction(Direction::new(0.0, 1.0)).unwrap();
        let weights = axis.spread(3);

        assert_close(weights[0], 1.0);
        assert_close(weights[1], 0.0);
        assert_close(weights[2], 0.0);
    }

    #[test]
    fn test_down_vector_three_actuators() {
        // dir = (0, -1): bottom = 1, vertical split = 1, so both
        // second-half actuators get the full component. The floored
        // divisor makes odd counts deliberately asymmetric.
        let axis = AxisWeights::from_direction(Direction::new(0.0, -1.0)).unwrap();
        let weights = axis.spread(3);

        assert_close(weights[0], 0.0);
        assert_close(weights[1], 1.0);
        assert_close(weights[2], 1.0);
    }

    #[test]
    fn test_up_vector_five_actuators() {
        // midpoint = 2, vertical split = 2: top spreads 0.5 over the
        // first two actuators, the remaining three stay silent
        let axis = AxisWeights::from_direction(Direction::new(0.0, 3.0)).unwrap();
        let weights = axis.spread(5);

        assert_close(weights[0], 0.5);
        assert_close(weights[1], 0.5);
        assert_close(weights[2], 0.0);
        assert_close(weights[3], 0.0);
        assert_close(weights[4], 0.0);
    }

    #[test]
    fn test_diagonal_two_actuators_exceeds_one() {
        // dir = (1, -1): right = bottom = 1/sqrt(2). With two actuators
        // both components land on index 1, summing to sqrt(2) > 1.
        let axis = AxisWeights::from_direction(Direction::new(1.0, -1.0)).unwrap();
        let weights = axis.spread(2);

        assert_close(weights[0], 0.0);
        assert_close(weights[1], std::f64::consts::SQRT_2);
    }

    #[test]
    fn test_rightward_component_never_reaches_left_half() {
        for count in 2..8 {
            let axis = AxisWeights::from_direction(Direction::new(1.0, 0.0)).unwrap();
            let weights = axis.spread(count);
            let midpoint = count / 2;
            for (i, w) in weights.iter().enumerate() {
                if i < midpoint {
                    assert_close(*w, 0.0);
                } else {
                    assert!(*w > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_weights_are_never_negative() {
        let directions = [
            Direction::new(1.0, 1.0),
            Direction::new(-1.0, 1.0),
            Direction::new(1.0, -1.0),
            Direction::new(-3.0, -0.5),
            Direction::new(0.2, 7.0),
        ];
        for direction in directions {
            let axis = AxisWeights::from_direction(direction).unwrap();
            for count in 2..9 {
                for weight in axis.spread(count) {
                    assert!(weight >= 0.0, "negative weight for {direction}");
                }
            }
        }
    }

    #[test]
    fn test_weights_ignore_vector_length() {
        let short = AxisWeights::from_direction(Direction::new(1.0, 0.5)).unwrap();
        let long = AxisWeights::from_direction(Direction::new(4.0, 2.0)).unwrap();
        for (a, b) in short.spread(4).iter().zip(long.spread(4)) {
            assert_close(*a, b);
        }
    }

    #[test]
    fn test_spread_below_two_actuators() {
        let axis = AxisWeights::from_direction(Direction::new(1.0, 0.0)).unwrap();
        assert_eq!(axis.spread(1), vec![1.0]);
        assert!(axis.spread(0).is_empty());
    }
}
