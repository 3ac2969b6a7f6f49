// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use std::ops::Mul;

use arrayvec::ArrayVec;

use crate::overlap::{combine_axes, overlap_linear, SegmentOverlap};
use crate::segment::assert_interior;
use crate::{Affine, Flatness, Nearest, Point, Rect, Segment, Vec2, MAX_EXTREMA};

/// A single line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// The power-basis coefficients `[c0, c1]` with `p(t) = c0 + c1 t`.
    #[inline]
    pub fn power_coefficients(&self) -> [Vec2; 2] {
        [self.p0.to_vec2(), self.p1 - self.p0]
    }

    /// The transform that maps this line onto `(0, 0)..(1, 0)`.
    ///
    /// The transform is a similarity (rotation, uniform scale and
    /// translation), so circles stay circles. It is not finite for a
    /// zero-length line.
    pub fn unit_frame(&self) -> Affine {
        let d = self.p1 - self.p0;
        let len2 = d.hypot2();
        let (c, s) = (d.x / len2, d.y / len2);
        // Rotate by -angle and scale by 1 / length.
        let linear = Affine::new([c, -s, s, c, 0.0, 0.0]);
        let origin = linear * self.p0;
        Affine::new([c, -s, s, c, -origin.x, -origin.y])
    }

    /// Find where `other` traces the same path as this line.
    ///
    /// Returns `None` unless the two lines are collinear and share a range
    /// of positive length.
    pub fn overlap(&self, other: &Line) -> Option<SegmentOverlap> {
        let [p0, p1] = self.power_coefficients();
        let [q0, q1] = other.power_coefficients();
        let x = overlap_linear(p0.x, p1.x, q0.x, q1.x);
        let y = overlap_linear(p0.y, p1.y, q0.y, q1.y);
        SegmentOverlap::verified(self, other, combine_axes(x, y)?)
    }
}

impl From<(Point, Point)> for Line {
    #[inline(always)]
    fn from((from, to): (Point, Point)) -> Self {
        Line::new(from, to)
    }
}

impl Segment for Line {
    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p1
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    #[inline]
    fn tangent_at(&self, _t: f64) -> Vec2 {
        self.p1 - self.p0
    }

    #[inline(always)]
    fn curvature_at(&self, _t: f64) -> f64 {
        0.0
    }

    #[inline]
    fn bounds(&self) -> Rect {
        Rect::from_points(self.p0, self.p1)
    }

    fn subdivided(&self, t: f64) -> (Line, Line) {
        assert_interior(t);
        let pm = self.position_at(t);
        (Line::new(self.p0, pm), Line::new(pm, self.p1))
    }

    #[inline]
    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        ArrayVec::new()
    }

    #[inline]
    fn arc_length(&self, _flatness: &Flatness) -> f64 {
        self.length()
    }

    fn nearest_exact(&self, p: Point) -> Option<Nearest> {
        let d = self.p1 - self.p0;
        let v = p - self.p0;

        // Projection parameter of `p` onto the line. This is infinite or NaN
        // for a zero-length line; the clamp sends both to an endpoint.
        let t = d.dot(v) / d.hypot2();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let distance_sq = (v - t * d).hypot2();
        Some(Nearest { distance_sq, t })
    }
}

impl Mul<Line> for Affine {
    type Output = Line;

    #[inline]
    fn mul(self, other: Line) -> Line {
        Line {
            p0: self * other.p0,
            p1: self * other.p1,
        }
    }
}
