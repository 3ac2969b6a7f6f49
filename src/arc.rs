// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circular arcs.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::Mul;

use arrayvec::ArrayVec;

use crate::common::interior_roots;
use crate::segment::assert_interior;
use crate::{Affine, EllipticalArc, Line, Point, Rect, Segment, SegmentKind, Vec2, MAX_EXTREMA};

/// Three points closer to collinear than this, relative to the lengths
/// involved, give a line.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// A circular arc.
///
/// The arc starts at `start_angle` and turns through `sweep_angle`. Angles
/// are measured from the positive x axis towards the positive y axis, so a
/// positive sweep turns clockwise in a y-down coordinate system.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    /// The center of the circle.
    pub center: Point,
    /// The radius of the circle.
    pub radius: f64,
    /// The angle of the start point, in radians.
    pub start_angle: f64,
    /// The signed angle from the start to the end point, in radians.
    pub sweep_angle: f64,
}

impl Arc {
    /// Create a new arc.
    ///
    /// The sweep is clamped to a full turn in either direction.
    #[inline]
    pub fn new(center: impl Into<Point>, radius: f64, start_angle: f64, sweep_angle: f64) -> Arc {
        Arc {
            center: center.into(),
            radius,
            start_angle,
            sweep_angle: sweep_angle.clamp(-TAU, TAU),
        }
    }

    /// The circular arc through three points, starting at `start`, passing
    /// through `middle` and ending at `end`.
    ///
    /// Returns a [`Line`] from `start` to `end` when the points are
    /// collinear.
    pub fn from_points(start: Point, middle: Point, end: Point) -> SegmentKind {
        let b = middle - start;
        let c = end - start;
        let d = 2.0 * b.cross(c);
        if d.abs() <= COLLINEAR_EPSILON * b.hypot() * c.hypot() {
            return Line::new(start, end).into();
        }
        let (b2, c2) = (b.hypot2(), c.hypot2());
        let offset = Vec2::new((c.y * b2 - b.y * c2) / d, (b.x * c2 - c.x * b2) / d);
        let center = start + offset;
        if !center.is_finite() {
            return Line::new(start, end).into();
        }

        let start_angle = (start - center).atan2();
        let end_angle = (end - center).atan2();
        // A clockwise turn at the middle point means increasing angles.
        let sweep_angle = if b.cross(end - middle) > 0.0 {
            (end_angle - start_angle).rem_euclid(TAU)
        } else {
            -(start_angle - end_angle).rem_euclid(TAU)
        };
        Arc::new(center, offset.hypot(), start_angle, sweep_angle).into()
    }

    /// The angle of the end point, in radians.
    #[inline]
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle
    }

    /// The parameter at which the arc reaches `angle`, if it does.
    ///
    /// `angle` may differ from the arc's angles by any multiple of a full
    /// turn.
    pub fn t_at_angle(&self, angle: f64) -> Option<f64> {
        let mut result = None;
        for_each_angle_t(self.start_angle, self.sweep_angle, angle, TAU, |t| {
            result = result.or(Some(t));
        });
        result
    }
}

/// Calls `f` with the parameter of every angle `base + k * period` that lies
/// within the closed range swept from `start` by `sweep`.
pub(crate) fn for_each_angle_t(
    start: f64,
    sweep: f64,
    base: f64,
    period: f64,
    mut f: impl FnMut(f64),
) {
    if sweep == 0.0 || !sweep.is_finite() {
        return;
    }
    let (lo, hi) = if sweep > 0.0 {
        (start, start + sweep)
    } else {
        (start + sweep, start)
    };
    let mut theta = base + ((lo - base) / period).ceil() * period;
    while theta <= hi {
        f((theta - start) / sweep);
        theta += period;
    }
}

impl Segment for Arc {
    #[inline]
    fn start(&self) -> Point {
        self.center + self.radius * Vec2::from_angle(self.start_angle)
    }

    #[inline]
    fn end(&self) -> Point {
        self.center + self.radius * Vec2::from_angle(self.end_angle())
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point {
        self.center + self.radius * Vec2::from_angle(self.start_angle + self.sweep_angle * t)
    }

    #[inline]
    fn tangent_at(&self, t: f64) -> Vec2 {
        let u = Vec2::from_angle(self.start_angle + self.sweep_angle * t);
        (self.radius * self.sweep_angle) * Vec2::new(-u.y, u.x)
    }

    fn curvature_at(&self, _t: f64) -> f64 {
        if self.sweep_angle == 0.0 {
            0.0
        } else {
            self.sweep_angle.signum() / self.radius
        }
    }

    fn bounds(&self) -> Rect {
        self.interior_extrema()
            .iter()
            .fold(Rect::from_points(self.start(), self.end()), |r, &t| {
                r.union_pt(self.position_at(t))
            })
    }

    fn subdivided(&self, t: f64) -> (Arc, Arc) {
        assert_interior(t);
        let split = self.sweep_angle * t;
        (
            Arc {
                sweep_angle: split,
                ..*self
            },
            Arc {
                start_angle: self.start_angle + split,
                sweep_angle: self.sweep_angle - split,
                ..*self
            },
        )
    }

    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        // A sweep of at most a full turn holds at most 5 quarter turns.
        let mut ts = ArrayVec::<f64, 6>::new();
        for_each_angle_t(self.start_angle, self.sweep_angle, 0.0, FRAC_PI_2, |t| {
            ts.push(t);
        });
        interior_roots(ts)
    }
}

impl Mul<Arc> for Affine {
    type Output = EllipticalArc;

    fn mul(self, arc: Arc) -> EllipticalArc {
        self * EllipticalArc::from(arc)
    }
}
