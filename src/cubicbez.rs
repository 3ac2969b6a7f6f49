// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments.

use std::ops::Mul;

use arrayvec::ArrayVec;

use crate::common::{interior_roots, solve_quadratic};
use crate::overlap::{combine_axes, overlap_cubic, SegmentOverlap};
use crate::segment::{assert_interior, curvature_from_derivs};
use crate::{Affine, Point, Rect, Segment, Vec2, MAX_EXTREMA};

/// Cubic coefficients this small relative to the others count as zero when
/// looking for overlaps.
const RAISED_EPSILON: f64 = 1e-12;

/// A single cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBez {
    /// The start point.
    pub p0: Point,
    /// The first control point.
    pub p1: Point,
    /// The second control point.
    pub p2: Point,
    /// The end point.
    pub p3: Point,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// The power-basis coefficients `[c0, c1, c2, c3]` with
    /// `p(t) = c0 + c1 t + c2 t² + c3 t³`.
    #[inline]
    pub fn power_coefficients(&self) -> [Vec2; 4] {
        let p0 = self.p0.to_vec2();
        let p1 = self.p1.to_vec2();
        let p2 = self.p2.to_vec2();
        let p3 = self.p3.to_vec2();
        [
            p0,
            3.0 * (p1 - p0),
            3.0 * (p0 - 2.0 * p1 + p2),
            p3 - p0 + 3.0 * (p1 - p2),
        ]
    }

    /// The bounding box of the control points.
    ///
    /// This always contains the segment, and is cheaper than [`Segment::bounds`].
    pub fn control_box(&self) -> Rect {
        Rect::from_points(self.p0, self.p3)
            .union_pt(self.p1)
            .union_pt(self.p2)
    }

    /// Whether both control points lie within `tolerance` of the chord.
    pub fn is_linear(&self, tolerance: f64) -> bool {
        let tol2 = tolerance * tolerance;
        self.p1.distance_to_segment_squared(self.p0, self.p3) <= tol2
            && self.p2.distance_to_segment_squared(self.p0, self.p3) <= tol2
    }

    /// Find where `other` traces the same path as this segment.
    ///
    /// A quadratic can be compared with a cubic by [raising] it first.
    /// Segments running in opposite directions are also found by solving
    /// against the reverse of `other`, which covers raised quadratics.
    ///
    /// [raising]: crate::QuadBez::raise
    pub fn overlap(&self, other: &CubicBez) -> Option<SegmentOverlap> {
        let forward = solve_axes(self, other)
            .and_then(|solution| SegmentOverlap::verified(self, other, solution));
        forward.or_else(|| {
            // p(t) = q(1 - s) with s = a t + b.
            let (a, b) = solve_axes(self, &other.reverse())?;
            SegmentOverlap::verified(self, other, (-a, 1.0 - b))
        })
    }

    /// The same curve, traversed in the opposite direction.
    #[inline]
    pub fn reverse(&self) -> CubicBez {
        CubicBez::new(self.p3, self.p2, self.p1, self.p0)
    }

    /// Power-basis coefficients with a cubic term that is only rounding
    /// noise, as left by [`QuadBez::raise`], set to zero.
    ///
    /// [`QuadBez::raise`]: crate::QuadBez::raise
    fn overlap_coefficients(&self) -> [Vec2; 4] {
        let mut c = self.power_coefficients();
        let sx: f64 = c.iter().map(|v| v.x.abs()).sum();
        let sy: f64 = c.iter().map(|v| v.y.abs()).sum();
        if c[3].x.abs() <= RAISED_EPSILON * sx {
            c[3].x = 0.0;
        }
        if c[3].y.abs() <= RAISED_EPSILON * sy {
            c[3].y = 0.0;
        }
        c
    }
}

fn solve_axes(p: &CubicBez, q: &CubicBez) -> Option<(f64, f64)> {
    let [p0, p1, p2, p3] = p.overlap_coefficients();
    let [q0, q1, q2, q3] = q.overlap_coefficients();
    let x = overlap_cubic(p0.x, p1.x, p2.x, p3.x, q0.x, q1.x, q2.x, q3.x);
    let y = overlap_cubic(p0.y, p1.y, p2.y, p3.y, q0.y, q1.y, q2.y, q3.y);
    combine_axes(x, y)
}

impl Segment for CubicBez {
    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p3
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let v = self.p0.to_vec2() * (mt * mt * mt)
            + (self.p1.to_vec2() * (mt * mt * 3.0)
                + (self.p2.to_vec2() * (mt * 3.0) + self.p3.to_vec2() * t) * t)
                * t;
        v.to_point()
    }

    #[inline]
    fn tangent_at(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let d2 = self.p3 - self.p2;
        3.0 * (d0 * (mt * mt) + d1 * (2.0 * mt * t) + d2 * (t * t))
    }

    fn curvature_at(&self, t: f64) -> f64 {
        let dd0 = (self.p2 - self.p1) - (self.p1 - self.p0);
        let dd1 = (self.p3 - self.p2) - (self.p2 - self.p1);
        let dd = 6.0 * dd0.lerp(dd1, t);
        curvature_from_derivs(self.tangent_at(t), dd)
    }

    fn bounds(&self) -> Rect {
        self.interior_extrema()
            .iter()
            .fold(Rect::from_points(self.p0, self.p3), |r, &t| {
                r.union_pt(self.position_at(t))
            })
    }

    /// Subdivide using de Casteljau.
    fn subdivided(&self, t: f64) -> (CubicBez, CubicBez) {
        assert_interior(t);
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let pm = p012.lerp(p123, t);
        (
            CubicBez::new(self.p0, p01, p012, pm),
            CubicBez::new(pm, p123, p23, self.p3),
        )
    }

    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        fn one_coord(d0: f64, d1: f64, d2: f64) -> ArrayVec<f64, 2> {
            let a = d0 - 2.0 * d1 + d2;
            let b = 2.0 * (d1 - d0);
            let c = d0;
            solve_quadratic(c, b, a)
        }
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let d2 = self.p3 - self.p2;
        interior_roots(one_coord(d0.x, d1.x, d2.x).into_iter().chain(one_coord(d0.y, d1.y, d2.y)))
    }

    fn start_tangent(&self) -> Vec2 {
        let d = if self.p1 != self.p0 {
            self.p1 - self.p0
        } else if self.p2 != self.p0 {
            self.p2 - self.p0
        } else {
            self.p3 - self.p0
        };
        d.normalize()
    }

    fn end_tangent(&self) -> Vec2 {
        let d = if self.p3 != self.p2 {
            self.p3 - self.p2
        } else if self.p3 != self.p1 {
            self.p3 - self.p1
        } else {
            self.p3 - self.p0
        };
        d.normalize()
    }
}

impl Mul<CubicBez> for Affine {
    type Output = CubicBez;

    #[inline]
    fn mul(self, c: CubicBez) -> CubicBez {
        CubicBez {
            p0: self * c.p0,
            p1: self * c.p1,
            p2: self * c.p2,
            p3: self * c.p3,
        }
    }
}
