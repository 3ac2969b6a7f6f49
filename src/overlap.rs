// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detecting when two polynomial segments trace the same path.
//!
//! Each solver works on a single axis, given the power-basis coefficients
//! (constant term first) of two polynomials `p` and `q` of the same degree.
//! It looks for a reparametrization `(a, b)` with `p(t) = q(a t + b)`.
//! A true overlap of two segments needs the same `(a, b)` in both axes;
//! [`SegmentOverlap`] checks that.

use crate::Segment;

/// Relative tolerance when comparing the per-axis solutions.
const AXIS_EPSILON: f64 = 1e-8;

/// Relative tolerance when checking positions of an overlap.
const POSITION_EPSILON: f64 = 1e-9;

/// The solution of a single-axis overlap problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Overlap {
    /// No reparametrization maps one polynomial onto the other.
    None,
    /// Both polynomials are the same constant, so every reparametrization
    /// works.
    Always,
    /// `p(t) = q(a t + b)`.
    Solution {
        /// The scale of the reparametrization.
        a: f64,
        /// The offset of the reparametrization.
        b: f64,
    },
}

/// Solve `p0 + p1 t = q0 + q1 (a t + b)`.
pub fn overlap_linear(p0: f64, p1: f64, q0: f64, q1: f64) -> Overlap {
    if q1 == 0.0 {
        return if p0 == q0 {
            Overlap::Always
        } else {
            Overlap::None
        };
    }
    let a = p1 / q1;
    if a == 0.0 {
        return Overlap::None;
    }
    let b = (p0 - q0) / q1;
    Overlap::Solution { a, b }
}

/// Solve the quadratic overlap problem.
///
/// Falls back to [`overlap_linear`] when `q2` is zero. Only the positive
/// root of `p2 / q2` is considered for the scale; a negative scale is found
/// by solving against `q` reversed, as [`QuadBez::overlap`] does.
///
/// [`QuadBez::overlap`]: crate::QuadBez::overlap
pub fn overlap_quadratic(p0: f64, p1: f64, p2: f64, q0: f64, q1: f64, q2: f64) -> Overlap {
    if q2 == 0.0 {
        return overlap_linear(p0, p1, q0, q1);
    }
    let ratio = p2 / q2;
    if ratio < 0.0 {
        return Overlap::None;
    }
    let a = ratio.sqrt();
    if a == 0.0 {
        return Overlap::None;
    }
    let b = (p1 - a * q1) / (2.0 * a * q2);
    Overlap::Solution { a, b }
}

/// Solve the cubic overlap problem.
///
/// Falls back to [`overlap_quadratic`] when `q3` is zero.
#[expect(
    clippy::too_many_arguments,
    reason = "two sets of cubic coefficients"
)]
pub fn overlap_cubic(
    p0: f64,
    p1: f64,
    p2: f64,
    p3: f64,
    q0: f64,
    q1: f64,
    q2: f64,
    q3: f64,
) -> Overlap {
    if q3 == 0.0 {
        return overlap_quadratic(p0, p1, p2, q0, q1, q2);
    }
    let a = (p3 / q3).cbrt();
    if a == 0.0 {
        return Overlap::None;
    }
    let a2 = a * a;
    let b = (p2 - a2 * q2) / (3.0 * a2 * q3);
    Overlap::Solution { a, b }
}

/// Combine the solutions for the x and y axes into one reparametrization.
///
/// An axis where both polynomials are the same constant accepts the
/// solution of the other axis. Two constant axes mean both segments are
/// the same point, which has no meaningful reparametrization.
pub(crate) fn combine_axes(x: Overlap, y: Overlap) -> Option<(f64, f64)> {
    match (x, y) {
        (Overlap::Solution { a, b }, Overlap::Solution { a: a_y, b: b_y }) => {
            let scale = a.abs().max(b.abs()).max(1.0);
            if (a - a_y).abs() <= AXIS_EPSILON * scale && (b - b_y).abs() <= AXIS_EPSILON * scale
            {
                Some((a, b))
            } else {
                None
            }
        }
        (Overlap::Solution { a, b }, Overlap::Always)
        | (Overlap::Always, Overlap::Solution { a, b }) => Some((a, b)),
        _ => None,
    }
}

/// A verified overlap of two segments of the same family.
///
/// The range `t0..t1` of the first segment traces the same path as the
/// range `qt0..qt1` of the second, with `qt = a t + b`. `qt0` is greater
/// than `qt1` when the segments run in opposite directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentOverlap {
    /// The scale of the reparametrization.
    pub a: f64,
    /// The offset of the reparametrization.
    pub b: f64,
    /// Start of the shared range on the first segment.
    pub t0: f64,
    /// End of the shared range on the first segment.
    pub t1: f64,
    /// The parameter on the second segment corresponding to `t0`.
    pub qt0: f64,
    /// The parameter on the second segment corresponding to `t1`.
    pub qt1: f64,
}

impl SegmentOverlap {
    /// Clip the reparametrization `(a, b)` to the domains of both segments,
    /// then check that the positions agree.
    ///
    /// Returns `None` if the shared range is empty or the positions differ.
    pub(crate) fn verified<S: Segment>(p: &S, q: &S, (a, b): (f64, f64)) -> Option<Self> {
        let (lo, hi) = if a > 0.0 {
            (-b / a, (1.0 - b) / a)
        } else {
            ((1.0 - b) / a, -b / a)
        };
        let t0 = lo.max(0.0);
        let t1 = hi.min(1.0);
        // Also rejects NaN.
        if !(t1 - t0 > AXIS_EPSILON) {
            return None;
        }

        let extent = p.bounds().union(q.bounds());
        let tolerance = POSITION_EPSILON * (1.0 + extent.width().max(extent.height()));
        let map = |t: f64| (a * t + b).clamp(0.0, 1.0);
        let n = 4;
        for i in 0..=n {
            let t = t0 + (t1 - t0) * (i as f64 / n as f64);
            if p.position_at(t).distance_squared(q.position_at(map(t))) > tolerance * tolerance {
                return None;
            }
        }

        Some(SegmentOverlap {
            a,
            b,
            t0,
            t1,
            qt0: map(t0),
            qt1: map(t1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CubicBez, QuadBez};

    fn assert_solution(overlap: Overlap, a0: f64, b0: f64) {
        match overlap {
            Overlap::Solution { a, b } => {
                assert!((a - a0).abs() < 1e-9, "a = {a}, expected {a0}");
                assert!((b - b0).abs() < 1e-9, "b = {b}, expected {b0}");
            }
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    #[test]
    fn linear_cases() {
        assert_solution(overlap_linear(0.0, 4.0, 2.0, 4.0), 1.0, -0.5);
        assert_eq!(overlap_linear(1.0, 0.0, 1.0, 0.0), Overlap::Always);
        assert_eq!(overlap_linear(1.0, 0.0, 2.0, 0.0), Overlap::None);
        // A constant p cannot match a moving q.
        assert_eq!(overlap_linear(1.0, 0.0, 1.0, 3.0), Overlap::None);
    }

    #[test]
    fn quadratic_cases() {
        // q(s) = s², p(t) = q(2t + 1) = 4t² + 4t + 1.
        assert_solution(overlap_quadratic(1.0, 4.0, 4.0, 0.0, 0.0, 1.0), 2.0, 1.0);
        // Opposite signs on the leading coefficient.
        assert_eq!(
            overlap_quadratic(0.0, 0.0, -1.0, 0.0, 0.0, 1.0),
            Overlap::None
        );
        // Degrades to the linear case.
        assert_solution(overlap_quadratic(0.0, 6.0, 0.0, 0.0, 6.0, 0.0), 1.0, 0.0);
    }

    #[test]
    fn cubic_negative_scale() {
        // q(s) = s³, p(t) = q(1 - t) = 1 - 3t + 3t² - t³.
        assert_solution(
            overlap_cubic(1.0, -3.0, 3.0, -1.0, 0.0, 0.0, 0.0, 1.0),
            -1.0,
            1.0,
        );
    }

    #[test]
    fn quad_against_its_elevation() {
        let quad = QuadBez::new((0.0, 0.0), (3.0, 6.0), (6.0, 0.0));
        let cubic = CubicBez::new((0.0, 0.0), (2.0, 4.0), (4.0, 4.0), (6.0, 0.0));
        let [p0, p1, p2, p3] = quad.raise().power_coefficients();
        let [q0, q1, q2, q3] = cubic.power_coefficients();
        assert_solution(
            overlap_cubic(p0.x, p1.x, p2.x, p3.x, q0.x, q1.x, q2.x, q3.x),
            1.0,
            0.0,
        );
        assert_solution(
            overlap_cubic(p0.y, p1.y, p2.y, p3.y, q0.y, q1.y, q2.y, q3.y),
            1.0,
            0.0,
        );

        let o = quad.raise().overlap(&cubic).unwrap();
        assert!(o.t0.abs() < 1e-12 && (o.t1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn raised_quads_in_opposite_directions() {
        let q = QuadBez::new((0.0, 0.0), (3.0, 6.0), (6.0, 1.0));
        let o = q.raise().overlap(&q.reverse().raise()).unwrap();
        assert!((o.a + 1.0).abs() < 1e-9 && (o.b - 1.0).abs() < 1e-9);

        let c = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let o = c.overlap(&c.reverse()).unwrap();
        assert!((o.a + 1.0).abs() < 1e-9 && (o.b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cubic_slice_round_trip() {
        let c = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        // q(s) = c(0.2 + 0.5 s), so c(t) = q(2 t - 0.4).
        let q = c.slice(0.2, 0.7);
        let [p0, p1, p2, p3] = c.power_coefficients();
        let [q0, q1, q2, q3] = q.power_coefficients();
        assert_solution(
            overlap_cubic(p0.x, p1.x, p2.x, p3.x, q0.x, q1.x, q2.x, q3.x),
            2.0,
            -0.4,
        );
        assert_solution(
            overlap_cubic(p0.y, p1.y, p2.y, p3.y, q0.y, q1.y, q2.y, q3.y),
            2.0,
            -0.4,
        );

        let o = c.overlap(&q).unwrap();
        assert!((o.t0 - 0.2).abs() < 1e-9 && (o.t1 - 0.7).abs() < 1e-9);
        assert!(o.qt0.abs() < 1e-9 && (o.qt1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn distinct_cubics_do_not_overlap() {
        let c1 = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let c2 = CubicBez::new((0.0, 0.0), (0.3, 1.3), (1.1, -0.4), (2.0, 0.5));
        assert!(c1.overlap(&c2).is_none());
    }

    #[test]
    fn combine() {
        let s = Overlap::Solution { a: 1.0, b: 0.5 };
        assert_eq!(combine_axes(s, s), Some((1.0, 0.5)));
        assert_eq!(combine_axes(Overlap::Always, s), Some((1.0, 0.5)));
        assert_eq!(combine_axes(Overlap::Always, Overlap::Always), None);
        assert_eq!(
            combine_axes(s, Overlap::Solution { a: 1.0, b: 0.25 }),
            None
        );
        assert_eq!(combine_axes(s, Overlap::None), None);
    }
}
