// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The flatness test shared by the adaptive subdivision algorithms.

use crate::Point;

/// Default bound on the squared distance of a midpoint from its chord.
pub const DEFAULT_DISTANCE_EPSILON: f64 = 1e-10;

/// Default bound on the squared midpoint distance relative to the squared
/// chord length.
pub const DEFAULT_CURVE_EPSILON: f64 = 1e-8;

/// Default recursion depth for adaptive subdivision.
pub const DEFAULT_MAX_LEVELS: u32 = 15;

/// Tolerances for adaptive subdivision.
///
/// A range of a segment is treated as flat when the point at the middle of
/// the range is close enough to the chord between its endpoints; see
/// [`is_sufficiently_flat`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flatness {
    /// Bound on the squared distance from the midpoint to the chord.
    pub distance_epsilon: f64,
    /// Bound on the squared distance from the midpoint to the chord,
    /// divided by the squared chord length.
    pub curve_epsilon: f64,
    /// Maximum number of binary subdivisions.
    pub max_levels: u32,
}

impl Default for Flatness {
    fn default() -> Self {
        Flatness {
            distance_epsilon: DEFAULT_DISTANCE_EPSILON,
            curve_epsilon: DEFAULT_CURVE_EPSILON,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }
}

impl Flatness {
    /// Builder method for setting the absolute distance tolerance.
    pub fn with_distance_epsilon(mut self, distance_epsilon: f64) -> Self {
        self.distance_epsilon = distance_epsilon;
        self
    }

    /// Builder method for setting the relative (curvature) tolerance.
    pub fn with_curve_epsilon(mut self, curve_epsilon: f64) -> Self {
        self.curve_epsilon = curve_epsilon;
        self
    }

    /// Builder method for setting the maximum subdivision depth.
    pub fn with_max_levels(mut self, max_levels: u32) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Apply [`is_sufficiently_flat`] with these tolerances.
    #[inline]
    pub fn is_flat(&self, start: Point, middle: Point, end: Point) -> bool {
        is_sufficiently_flat(
            self.distance_epsilon,
            self.curve_epsilon,
            start,
            middle,
            end,
        )
    }
}

/// Whether the chord `start..end` approximates a curve passing through
/// `middle` well enough.
///
/// With `d2` the squared distance from `middle` to the chord, the range is
/// not flat if `d2 / |end - start|²` exceeds `curve_epsilon`, or if `d2`
/// itself exceeds `distance_epsilon`.
///
/// A zero-length chord is flat only if `middle` coincides with it.
pub fn is_sufficiently_flat(
    distance_epsilon: f64,
    curve_epsilon: f64,
    start: Point,
    middle: Point,
    end: Point,
) -> bool {
    let d2 = middle.distance_to_segment_squared(start, end);
    if d2 == 0.0 {
        return true;
    }
    if d2 / start.distance_squared(end) > curve_epsilon {
        return false;
    }
    d2 <= distance_epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_is_flat() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(10.0, 0.0);
        assert!(is_sufficiently_flat(0.0, 0.0, start, Point::new(5.0, 0.0), end));
    }

    #[test]
    fn relative_test_fails_first() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(1.0, 0.0);
        // d2 = 0.01, relative to |chord|² = 1.
        let middle = Point::new(0.5, 0.1);
        assert!(!is_sufficiently_flat(1.0, 1e-3, start, middle, end));
        assert!(is_sufficiently_flat(1.0, 0.1, start, middle, end));
    }

    #[test]
    fn absolute_test() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        // Relatively flat (d2 / chord² = 1e-4) but 1 unit off the chord.
        let middle = Point::new(50.0, 1.0);
        assert!(!is_sufficiently_flat(0.5, 1e-3, start, middle, end));
        assert!(is_sufficiently_flat(2.0, 1e-3, start, middle, end));
    }

    #[test]
    fn zero_length_chord() {
        let p = Point::new(3.0, 3.0);
        assert!(is_sufficiently_flat(1e-10, 1e-8, p, p, p));
        assert!(!is_sufficiently_flat(1e-10, 1e-8, p, Point::new(3.0, 4.0), p));
    }

    #[test]
    fn builder() {
        let f = Flatness::default()
            .with_distance_epsilon(1e-4)
            .with_curve_epsilon(1e-3)
            .with_max_levels(3);
        assert_eq!(f.distance_epsilon, 1e-4);
        assert_eq!(f.curve_epsilon, 1e-3);
        assert_eq!(f.max_levels, 3);
    }
}
