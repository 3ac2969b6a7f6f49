// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability set shared by every curve segment, and the kernel
//! operations built only on it.

use arrayvec::ArrayVec;

use crate::common::linear_map;
use crate::dash::{dash_values, DashValues};
use crate::piecewise::{
    piecewise_linear, piecewise_linear_or_arc, LinearOrArcOpts, PiecewiseLinearOpts,
};
use crate::{Flatness, Line, Point, Rect, SegmentKind, Vec2};

/// The maximum number of interior extrema a segment reports.
pub const MAX_EXTREMA: usize = 4;

/// The nearest position on a segment to some point, as returned by
/// [`Segment::nearest_exact`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// The square of the distance from the nearest position on the segment
    /// to the given point.
    pub distance_sq: f64,
    /// The position on the segment of the nearest point, as a parameter.
    pub t: f64,
}

/// A continuous 2D curve parametrized by `t` in `[0, 1]`.
///
/// Concrete segments implement the required methods; the provided methods
/// are the algorithms that work on any segment.
pub trait Segment: Sized + Clone {
    /// The point at `t = 0`.
    fn start(&self) -> Point;

    /// The point at `t = 1`.
    fn end(&self) -> Point;

    /// Evaluate the segment at parameter `t`.
    fn position_at(&self, t: f64) -> Point;

    /// The (non-normalized) derivative with respect to `t`.
    fn tangent_at(&self, t: f64) -> Vec2;

    /// The signed curvature at `t`.
    ///
    /// Positive values turn clockwise on screen (in a y-down coordinate
    /// system).
    fn curvature_at(&self, t: f64) -> f64;

    /// The axis-aligned bounding box of the segment.
    fn bounds(&self) -> Rect;

    /// Split the segment at `t` into two segments that together trace the
    /// original.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < t < 1`.
    fn subdivided(&self, t: f64) -> (Self, Self);

    /// The parameters strictly inside `(0, 1)` where either coordinate has
    /// a zero derivative, sorted ascending.
    ///
    /// Splitting at these values gives pieces that are monotone in both
    /// coordinates.
    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA>;

    /// The unit tangent at the start.
    fn start_tangent(&self) -> Vec2 {
        self.tangent_at(0.0).normalize()
    }

    /// The unit tangent at the end.
    fn end_tangent(&self) -> Vec2 {
        self.tangent_at(1.0).normalize()
    }

    /// The nearest point on the segment to `p`, if it has a closed form.
    ///
    /// Segments that return `None` are searched numerically by
    /// [`closest_to_point`](crate::closest_to_point).
    fn nearest_exact(&self, _p: Point) -> Option<Nearest> {
        None
    }

    /// The part of the segment between `t0` and `t1`, reparametrized to
    /// `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if either value is outside `[0, 1]` or if `t0 >= t1`.
    fn slice(&self, t0: f64, t1: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&t0) && (0.0..=1.0).contains(&t1),
            "slice parameters out of range: {t0}..{t1}"
        );
        assert!(t0 < t1, "slice requires t0 < t1, got {t0}..{t1}");
        let mut segment = self.clone();
        if t1 < 1.0 {
            segment = segment.subdivided(t1).0;
        }
        if t0 > 0.0 {
            segment = segment.subdivided(linear_map(0.0, t1, 0.0, 1.0, t0)).1;
        }
        segment
    }

    /// Split the segment at every parameter in `ts`.
    ///
    /// Returns `ts.len() + 1` segments in order.
    ///
    /// # Panics
    ///
    /// Panics unless the values are strictly increasing and strictly inside
    /// `(0, 1)`.
    fn subdivisions(&self, ts: &[f64]) -> Vec<Self> {
        assert!(
            ts.iter().all(|&t| t > 0.0 && t < 1.0),
            "subdivision parameters must be inside (0, 1)"
        );
        assert!(
            ts.windows(2).all(|w| w[0] < w[1]),
            "subdivision parameters must be strictly increasing"
        );
        let mut ts = ts.to_vec();
        let mut result = Vec::with_capacity(ts.len() + 1);
        let mut right = self.clone();
        for i in 0..ts.len() {
            let t = ts[i];
            let (left, rest) = right.subdivided(t);
            result.push(left);
            right = rest;
            for later in &mut ts[i + 1..] {
                *later = linear_map(t, 1.0, 0.0, 1.0, *later);
            }
        }
        result.push(right);
        result
    }

    /// Estimate the arc length by adaptive subdivision.
    ///
    /// Ranges that pass the flatness test (or exhaust `max_levels`)
    /// contribute their chord length.
    fn arc_length(&self, flatness: &Flatness) -> f64 {
        fn rec<S: Segment>(s: &S, flatness: &Flatness, levels: u32) -> f64 {
            let (start, end) = (s.start(), s.end());
            if levels == 0 || flatness.is_flat(start, s.position_at(0.5), end) {
                return start.distance(end);
            }
            let (left, right) = s.subdivided(0.5);
            rec(&left, flatness, levels - 1) + rec(&right, flatness, levels - 1)
        }
        rec(self, flatness, flatness.max_levels)
    }

    /// The parameters at which a dash pattern toggles along this segment.
    ///
    /// See [`dash_values`] for details.
    ///
    /// # Panics
    ///
    /// Panics if `dashes` is empty, contains a negative length, or sums to
    /// zero.
    fn dash_values(
        &self,
        dashes: &[f64],
        offset: f64,
        distance_epsilon: f64,
        curve_epsilon: f64,
    ) -> DashValues {
        dash_values(self, dashes, offset, distance_epsilon, curve_epsilon)
    }

    /// Approximate the segment by lines.
    fn to_piecewise_linear(&self, opts: &PiecewiseLinearOpts<'_>) -> Vec<Line> {
        piecewise_linear(self, opts)
    }

    /// Approximate the segment by lines and circular arcs.
    fn to_piecewise_linear_or_arc(&self, opts: &LinearOrArcOpts) -> Vec<SegmentKind> {
        piecewise_linear_or_arc(self, opts)
    }
}

/// Check the precondition of [`Segment::subdivided`].
#[inline]
pub(crate) fn assert_interior(t: f64) {
    assert!(
        t > 0.0 && t < 1.0,
        "subdivision parameter must be inside (0, 1), got {t}"
    );
}

/// The signed curvature given first and second derivatives.
#[inline]
pub(crate) fn curvature_from_derivs(d: Vec2, d2: Vec2) -> f64 {
    let denom = d.hypot2().powf(1.5);
    if denom == 0.0 {
        return 0.0;
    }
    d.cross(d2) / denom
}

#[cfg(test)]
mod tests {
    use crate::{Affine, Arc, CubicBez, EllipticalArc, Flatness, Line, Point, QuadBez, Segment};

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!((p1 - p0).hypot() < epsilon, "{p0:?} != {p1:?}");
    }

    fn check_subdivided<S: Segment>(s: &S, t: f64) {
        let (left, right) = s.subdivided(t);
        assert_eq!(left.end(), right.start());
        let n = 20;
        for i in 0..=n {
            let u = i as f64 / n as f64;
            assert_near(left.position_at(u), s.position_at(u * t), 1e-12);
            assert_near(
                right.position_at(u),
                s.position_at(t + u * (1.0 - t)),
                1e-12,
            );
        }
    }

    #[test]
    fn subdivided_reproduces_curve() {
        let c = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let q = QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0));
        for &t in &[0.1, 0.5, 0.77] {
            check_subdivided(&c, t);
            check_subdivided(&q, t);
        }
    }

    #[test]
    fn subdivided_arcs_reproduce_curve() {
        let arc = Arc::new((1.0, -2.0), 3.0, 0.4, -4.0);
        let ellipse = EllipticalArc::new(
            Affine::translate((2.0, 1.0))
                * Affine::rotate(0.3)
                * Affine::scale_non_uniform(3.0, 1.5),
            -1.0,
            5.0,
        );
        for &t in &[0.1, 0.5, 0.77] {
            check_subdivided(&arc, t);
            check_subdivided(&ellipse, t);
        }
    }

    #[test]
    fn unit_line_halves() {
        let l = Line::new((0.0, 2.0), (1.0, 2.0));
        let (a, b) = l.subdivided(0.5);
        assert_eq!(a.end(), Point::new(0.5, 2.0));
        assert_eq!(b.start(), Point::new(0.5, 2.0));
        assert_eq!(a.length(), 0.5);
        assert_eq!(b.length(), 0.5);
    }

    #[test]
    #[should_panic(expected = "inside (0, 1)")]
    fn subdivided_at_endpoint_panics() {
        let l = Line::new((0.0, 0.0), (1.0, 0.0));
        let _ = l.subdivided(1.0);
    }

    #[test]
    fn slice_matches_range() {
        let c = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let (t0, t1) = (0.2, 0.7);
        let s = c.slice(t0, t1);
        let n = 10;
        for i in 0..=n {
            let u = i as f64 / n as f64;
            assert_near(s.position_at(u), c.position_at(t0 + u * (t1 - t0)), 1e-12);
        }
        // Whole range is a copy.
        assert_eq!(c.slice(0.0, 1.0).p2, c.p2);
    }

    #[test]
    #[should_panic(expected = "t0 < t1")]
    fn slice_rejects_empty_range() {
        let l = Line::new((0.0, 0.0), (1.0, 0.0));
        let _ = l.slice(0.5, 0.5);
    }

    #[test]
    fn subdivisions_cover_curve() {
        let c = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let ts = [0.25, 0.5, 0.9];
        let pieces = c.subdivisions(&ts);
        assert_eq!(pieces.len(), 4);
        let bounds = [0.0, 0.25, 0.5, 0.9, 1.0];
        for (piece, range) in pieces.iter().zip(bounds.windows(2)) {
            assert_near(piece.start(), c.position_at(range[0]), 1e-12);
            assert_near(piece.end(), c.position_at(range[1]), 1e-12);
            let mid = 0.5 * (range[0] + range[1]);
            assert_near(piece.position_at(0.5), c.position_at(mid), 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn subdivisions_unsorted() {
        let l = Line::new((0.0, 0.0), (1.0, 0.0));
        let _ = l.subdivisions(&[0.5, 0.25]);
    }

    #[test]
    fn arc_length_of_line_is_exact() {
        let l = Line::new((1.0, 1.0), (4.0, 5.0));
        assert_eq!(l.arc_length(&Flatness::default()), 5.0);
    }

    #[test]
    fn arc_length_converges() {
        use std::f64::consts::FRAC_PI_2;
        let arc = crate::Arc::new((0.0, 0.0), 2.0, 0.0, FRAC_PI_2);
        let exact = 2.0 * FRAC_PI_2;
        let mut last_err = f64::INFINITY;
        for levels in [1, 3, 5, 8] {
            let err = (arc.arc_length(&Flatness::default().with_max_levels(levels)) - exact).abs();
            assert!(err < last_err, "error {err} did not shrink from {last_err}");
            last_err = err;
        }
        let err = (arc.arc_length(&Flatness::default()) - exact).abs();
        assert!(err < 1e-6, "arc length error {err}");
        // Chords never exceed the arc.
        assert!(arc.arc_length(&Flatness::default()) <= exact);
    }

    #[test]
    fn arc_length_tighter_tolerance_is_closer() {
        // y = x^2
        let q = QuadBez::new((0.0, 0.0), (0.5, 0.0), (1.0, 1.0));
        let exact = 0.5 * 5.0f64.sqrt() + 0.25 * (2.0 + 5.0f64.sqrt()).ln();
        let loose = Flatness::default().with_curve_epsilon(1e-3).with_distance_epsilon(1e-3);
        let tight = Flatness::default();
        let loose_err = (q.arc_length(&loose) - exact).abs();
        let tight_err = (q.arc_length(&tight) - exact).abs();
        assert!(tight_err <= loose_err);
        assert!(tight_err < 1e-6);
    }
}
