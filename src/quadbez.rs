// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadratic Bézier segments.

use std::ops::Mul;

use arrayvec::ArrayVec;

use crate::overlap::{combine_axes, overlap_quadratic, SegmentOverlap};
use crate::segment::{assert_interior, curvature_from_derivs};
use crate::{Affine, CubicBez, Point, Rect, Segment, Vec2, MAX_EXTREMA};

/// A single quadratic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadBez {
    /// The start point.
    pub p0: Point,
    /// The control point.
    pub p1: Point,
    /// The end point.
    pub p2: Point,
}

impl QuadBez {
    /// Create a new quadratic Bézier segment.
    #[inline]
    pub fn new<V: Into<Point>>(p0: V, p1: V, p2: V) -> QuadBez {
        QuadBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
        }
    }

    /// Raise the order by 1.
    ///
    /// Returns a cubic Bézier segment that exactly represents this quadratic.
    #[inline]
    pub fn raise(&self) -> CubicBez {
        CubicBez::new(
            self.p0,
            self.p0 + (2.0 / 3.0) * (self.p1 - self.p0),
            self.p2 + (2.0 / 3.0) * (self.p1 - self.p2),
            self.p2,
        )
    }

    /// The power-basis coefficients `[c0, c1, c2]` with
    /// `p(t) = c0 + c1 t + c2 t²`.
    #[inline]
    pub fn power_coefficients(&self) -> [Vec2; 3] {
        let p0 = self.p0.to_vec2();
        let p1 = self.p1.to_vec2();
        let p2 = self.p2.to_vec2();
        [p0, 2.0 * (p1 - p0), p0 - 2.0 * p1 + p2]
    }

    /// The same curve, traversed in the opposite direction.
    #[inline]
    pub fn reverse(&self) -> QuadBez {
        QuadBez::new(self.p2, self.p1, self.p0)
    }

    /// Find where `other` traces the same path as this segment.
    ///
    /// Segments running in opposite directions are found by solving against
    /// the reverse of `other`.
    pub fn overlap(&self, other: &QuadBez) -> Option<SegmentOverlap> {
        let forward = solve_axes(self, other)
            .and_then(|solution| SegmentOverlap::verified(self, other, solution));
        forward.or_else(|| {
            // p(t) = q(1 - s) with s = a t + b.
            let (a, b) = solve_axes(self, &other.reverse())?;
            SegmentOverlap::verified(self, other, (-a, 1.0 - b))
        })
    }
}

fn solve_axes(p: &QuadBez, q: &QuadBez) -> Option<(f64, f64)> {
    let [p0, p1, p2] = p.power_coefficients();
    let [q0, q1, q2] = q.power_coefficients();
    let x = overlap_quadratic(p0.x, p1.x, p2.x, q0.x, q1.x, q2.x);
    let y = overlap_quadratic(p0.y, p1.y, p2.y, q0.y, q1.y, q2.y);
    combine_axes(x, y)
}

impl Segment for QuadBez {
    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p2
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        (self.p0.to_vec2() * (mt * mt)
            + (self.p1.to_vec2() * (mt * 2.0) + self.p2.to_vec2() * t) * t)
            .to_point()
    }

    #[inline]
    fn tangent_at(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        2.0 * (mt * (self.p1 - self.p0) + t * (self.p2 - self.p1))
    }

    fn curvature_at(&self, t: f64) -> f64 {
        let dd = 2.0 * ((self.p2 - self.p1) - (self.p1 - self.p0));
        curvature_from_derivs(self.tangent_at(t), dd)
    }

    fn bounds(&self) -> Rect {
        self.interior_extrema()
            .iter()
            .fold(Rect::from_points(self.p0, self.p2), |r, &t| {
                r.union_pt(self.position_at(t))
            })
    }

    fn subdivided(&self, t: f64) -> (QuadBez, QuadBez) {
        assert_interior(t);
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let pm = p01.lerp(p12, t);
        (QuadBez::new(self.p0, p01, pm), QuadBez::new(pm, p12, self.p2))
    }

    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let dd = d1 - d0;
        if dd.x != 0.0 {
            let t = -d0.x / dd.x;
            if t > 0.0 && t < 1.0 {
                result.push(t);
            }
        }
        if dd.y != 0.0 {
            let t = -d0.y / dd.y;
            if t > 0.0 && t < 1.0 {
                result.push(t);
                if result.len() == 2 && result[0] > t {
                    result.swap(0, 1);
                }
            }
        }
        result
    }

    fn start_tangent(&self) -> Vec2 {
        let d = if self.p1 != self.p0 {
            self.p1 - self.p0
        } else {
            self.p2 - self.p0
        };
        d.normalize()
    }

    fn end_tangent(&self) -> Vec2 {
        let d = if self.p2 != self.p1 {
            self.p2 - self.p1
        } else {
            self.p2 - self.p0
        };
        d.normalize()
    }
}

impl Mul<QuadBez> for Affine {
    type Output = QuadBez;

    #[inline]
    fn mul(self, other: QuadBez) -> QuadBez {
        QuadBez {
            p0: self * other.p0,
            p1: self * other.p1,
            p2: self * other.p2,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Affine, Point, QuadBez, Segment, Vec2};

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!((p1 - p0).hypot() < epsilon, "{p0:?} != {p1:?}");
    }

    #[test]
    fn quadbez_raise() {
        let q = QuadBez::new((3.1, 4.1), (5.9, 2.6), (5.3, 5.8));
        let c = q.raise();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_near(q.position_at(t), c.position_at(t), 1e-12);
        }
    }

    #[test]
    fn quadbez_tangent() {
        let q = QuadBez::new((0.0, 0.0), (0.0, 0.5), (1.0, 1.0));
        let n = 10;
        for i in 0..n {
            let t = (i as f64) * (n as f64).recip();
            let delta = 1e-6;
            let p = q.position_at(t);
            let p1 = q.position_at(t + delta);
            let d_approx = (p1 - p) * delta.recip();
            assert!((q.tangent_at(t) - d_approx).hypot() < delta * 2.0);
        }
    }

    #[test]
    fn quadbez_curvature() {
        // y = x², curvature at the vertex is 2 and turns clockwise.
        let q = QuadBez::new((-1.0, 1.0), (0.0, -1.0), (1.0, 1.0));
        assert!((q.curvature_at(0.5) - 2.0).abs() < 1e-12);
        let mirrored = Affine::scale_non_uniform(1.0, -1.0) * q;
        assert!((mirrored.curvature_at(0.5) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn quadbez_extrema() {
        let q = QuadBez::new((0.0, 0.0), (0.5, 1.0), (1.0, 0.0));
        let extrema = q.interior_extrema();
        assert_eq!(extrema.len(), 1);
        assert!((extrema[0] - 0.5).abs() < 1e-12);

        let q = QuadBez::new((0.0, 0.0), (2.0, 1.0), (1.0, 0.0));
        let extrema = q.interior_extrema();
        assert_eq!(extrema.len(), 2);
        assert!(extrema[0] < extrema[1]);
    }

    #[test]
    fn quadbez_bounds() {
        let q = QuadBez::new((0.0, 0.0), (0.5, 1.0), (1.0, 0.0));
        let r = q.bounds();
        assert_eq!((r.x0, r.x1, r.y0), (0.0, 1.0, 0.0));
        assert!((r.y1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn coincident_control_tangent() {
        let q = QuadBez::new((0.0, 0.0), (0.0, 0.0), (3.0, 4.0));
        assert_eq!(q.start_tangent(), Vec2::new(0.6, 0.8));
        assert_eq!(q.end_tangent(), Vec2::new(0.6, 0.8));
    }

    #[test]
    fn quadbez_overlap() {
        let q = QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0));
        let (left, _) = q.subdivided(0.6);
        let o = q.overlap(&left).unwrap();
        assert!(o.t0.abs() < 1e-9 && (o.t1 - 0.6).abs() < 1e-9);
        assert!((o.a - 1.0 / 0.6).abs() < 1e-9);

        let other = QuadBez::new((0.0, 0.0), (1.0, 2.5), (2.0, 0.0));
        assert!(q.overlap(&other).is_none());
    }

    #[test]
    fn reversed_overlap() {
        let q = QuadBez::new((0.0, 0.0), (3.0, 6.0), (6.0, 1.0));
        let r = q.reverse();
        let o = q.overlap(&r).unwrap();
        assert!((o.a + 1.0).abs() < 1e-9 && (o.b - 1.0).abs() < 1e-9);
        assert!(o.t0.abs() < 1e-9 && (o.t1 - 1.0).abs() < 1e-9);
        assert!((o.qt0 - 1.0).abs() < 1e-9 && o.qt1.abs() < 1e-9);

        let (_, right) = q.subdivided(0.25);
        let o = q.overlap(&right.reverse()).unwrap();
        assert!((o.t0 - 0.25).abs() < 1e-9 && (o.t1 - 1.0).abs() < 1e-9);
        assert!(o.a < 0.0);
    }
}
