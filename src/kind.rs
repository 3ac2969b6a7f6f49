// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A segment of any of the supported kinds.

use std::ops::Mul;

use arrayvec::ArrayVec;

use crate::{
    Affine, Arc, CubicBez, EllipticalArc, Intersection, Line, Nearest, Point, QuadBez, Rect,
    Segment, Vec2, MAX_EXTREMA,
};

/// A segment of any supported kind.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// A line segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
    /// An elliptical arc.
    EllipticalArc(EllipticalArc),
    /// A quadratic Bézier segment.
    Quad(QuadBez),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
}

macro_rules! dispatch {
    ($self:expr, $seg:ident => $body:expr) => {
        match $self {
            SegmentKind::Line($seg) => $body,
            SegmentKind::Arc($seg) => $body,
            SegmentKind::EllipticalArc($seg) => $body,
            SegmentKind::Quad($seg) => $body,
            SegmentKind::Cubic($seg) => $body,
        }
    };
}

impl SegmentKind {
    /// An affine-transformed copy of the segment.
    ///
    /// Circular arcs become elliptical arcs.
    #[inline]
    #[must_use]
    pub fn transformed(&self, transform: Affine) -> SegmentKind {
        transform * *self
    }

    /// Find the intersections with another segment.
    ///
    /// See [`intersect()`](crate::intersect()).
    pub fn intersect(&self, other: &SegmentKind) -> Vec<Intersection> {
        crate::intersect(self, other)
    }

    /// Returns this segment as a cubic Bézier, for the polynomial kinds.
    ///
    /// Lines and quadratics are raised exactly.
    pub fn as_cubic(&self) -> Option<CubicBez> {
        match *self {
            SegmentKind::Line(l) => Some(CubicBez::new(
                l.p0,
                l.p0.lerp(l.p1, 1.0 / 3.0),
                l.p0.lerp(l.p1, 2.0 / 3.0),
                l.p1,
            )),
            SegmentKind::Quad(q) => Some(q.raise()),
            SegmentKind::Cubic(c) => Some(c),
            SegmentKind::Arc(_) | SegmentKind::EllipticalArc(_) => None,
        }
    }
}

impl Segment for SegmentKind {
    #[inline]
    fn start(&self) -> Point {
        dispatch!(self, s => s.start())
    }

    #[inline]
    fn end(&self) -> Point {
        dispatch!(self, s => s.end())
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point {
        dispatch!(self, s => s.position_at(t))
    }

    #[inline]
    fn tangent_at(&self, t: f64) -> Vec2 {
        dispatch!(self, s => s.tangent_at(t))
    }

    #[inline]
    fn curvature_at(&self, t: f64) -> f64 {
        dispatch!(self, s => s.curvature_at(t))
    }

    #[inline]
    fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    fn subdivided(&self, t: f64) -> (SegmentKind, SegmentKind) {
        dispatch!(self, s => {
            let (a, b) = s.subdivided(t);
            (a.into(), b.into())
        })
    }

    #[inline]
    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        dispatch!(self, s => s.interior_extrema())
    }

    #[inline]
    fn start_tangent(&self) -> Vec2 {
        dispatch!(self, s => s.start_tangent())
    }

    #[inline]
    fn end_tangent(&self) -> Vec2 {
        dispatch!(self, s => s.end_tangent())
    }

    #[inline]
    fn nearest_exact(&self, p: Point) -> Option<Nearest> {
        dispatch!(self, s => s.nearest_exact(p))
    }
}

impl From<Line> for SegmentKind {
    #[inline(always)]
    fn from(l: Line) -> SegmentKind {
        SegmentKind::Line(l)
    }
}

impl From<Arc> for SegmentKind {
    #[inline(always)]
    fn from(a: Arc) -> SegmentKind {
        SegmentKind::Arc(a)
    }
}

impl From<EllipticalArc> for SegmentKind {
    #[inline(always)]
    fn from(e: EllipticalArc) -> SegmentKind {
        SegmentKind::EllipticalArc(e)
    }
}

impl From<QuadBez> for SegmentKind {
    #[inline(always)]
    fn from(q: QuadBez) -> SegmentKind {
        SegmentKind::Quad(q)
    }
}

impl From<CubicBez> for SegmentKind {
    #[inline(always)]
    fn from(c: CubicBez) -> SegmentKind {
        SegmentKind::Cubic(c)
    }
}

impl Mul<SegmentKind> for Affine {
    type Output = SegmentKind;

    fn mul(self, other: SegmentKind) -> SegmentKind {
        match other {
            SegmentKind::Line(l) => SegmentKind::Line(self * l),
            SegmentKind::Arc(a) => SegmentKind::EllipticalArc(self * a),
            SegmentKind::EllipticalArc(e) => SegmentKind::EllipticalArc(self * e),
            SegmentKind::Quad(q) => SegmentKind::Quad(self * q),
            SegmentKind::Cubic(c) => SegmentKind::Cubic(self * c),
        }
    }
}
