// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elliptical arcs.

use std::f64::consts::{PI, TAU};
use std::ops::Mul;

use arrayvec::ArrayVec;

use crate::arc::for_each_angle_t;
use crate::common::interior_roots;
use crate::segment::{assert_interior, curvature_from_derivs};
use crate::{Affine, Arc, Point, Rect, Segment, Vec2, MAX_EXTREMA};

/// Tolerance, relative to the size of the ellipse, for [`EllipticalArc::same_ellipse`].
const SAME_ELLIPSE_EPSILON: f64 = 1e-9;

/// An arc of an ellipse.
///
/// The ellipse is stored as the affine image of the unit circle, and the
/// arc covers the angles `start_angle..start_angle + sweep_angle` of that
/// circle. This representation is closed under affine transforms.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipticalArc {
    /// Maps the unit circle onto the ellipse.
    inner: Affine,
    start_angle: f64,
    sweep_angle: f64,
}

impl EllipticalArc {
    /// Create a new elliptical arc from the image of the unit circle and the
    /// angles on it.
    ///
    /// The sweep is clamped to a full turn in either direction.
    #[inline]
    pub fn new(transform: Affine, start_angle: f64, sweep_angle: f64) -> EllipticalArc {
        EllipticalArc {
            inner: transform,
            start_angle,
            sweep_angle: sweep_angle.clamp(-TAU, TAU),
        }
    }

    /// An arc of the axis-aligned-before-rotation ellipse with the given
    /// center, radii and rotation of the x axis.
    pub fn from_radii(
        center: impl Into<Point>,
        radii: impl Into<Vec2>,
        x_rotation: f64,
        start_angle: f64,
        sweep_angle: f64,
    ) -> EllipticalArc {
        let center: Point = center.into();
        let radii = radii.into();
        let transform = Affine::translate(center.to_vec2())
            * Affine::rotate(x_rotation)
            * Affine::scale_non_uniform(radii.x, radii.y);
        EllipticalArc::new(transform, start_angle, sweep_angle)
    }

    /// The transform mapping the unit circle onto the ellipse.
    #[inline]
    pub fn transform(&self) -> Affine {
        self.inner
    }

    /// The center of the ellipse.
    #[inline]
    pub fn center(&self) -> Point {
        self.inner.translation().to_point()
    }

    /// The start angle on the unit circle, in radians.
    #[inline]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// The sweep angle on the unit circle, in radians.
    #[inline]
    pub fn sweep_angle(&self) -> f64 {
        self.sweep_angle
    }

    /// Whether both arcs lie on the same ellipse.
    ///
    /// Two transforms describe the same ellipse when they differ only by a
    /// rotation or reflection of the unit circle, which leaves `M Mᵀ`
    /// unchanged for the linear part `M`.
    pub fn same_ellipse(&self, other: &EllipticalArc) -> bool {
        fn gram([a, b, c, d, _, _]: [f64; 6]) -> [f64; 3] {
            [a * a + c * c, a * b + c * d, b * b + d * d]
        }
        let g0 = gram(self.inner.as_coeffs());
        let g1 = gram(other.inner.as_coeffs());
        let scale = g0.iter().chain(&g1).fold(1.0_f64, |m, v| m.max(v.abs()));
        let tolerance = SAME_ELLIPSE_EPSILON * scale;
        (self.center() - other.center()).hypot2() <= tolerance * tolerance
            && g0.iter().zip(&g1).all(|(x, y)| (x - y).abs() <= tolerance)
    }

    #[inline]
    fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + self.sweep_angle * t
    }
}

impl From<Arc> for EllipticalArc {
    fn from(arc: Arc) -> EllipticalArc {
        let transform = Affine::translate(arc.center.to_vec2()) * Affine::scale(arc.radius);
        EllipticalArc::new(transform, arc.start_angle, arc.sweep_angle)
    }
}

impl Segment for EllipticalArc {
    #[inline]
    fn start(&self) -> Point {
        self.inner * Vec2::from_angle(self.start_angle).to_point()
    }

    #[inline]
    fn end(&self) -> Point {
        self.inner * Vec2::from_angle(self.start_angle + self.sweep_angle).to_point()
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point {
        self.inner * Vec2::from_angle(self.angle_at(t)).to_point()
    }

    fn tangent_at(&self, t: f64) -> Vec2 {
        let u = Vec2::from_angle(self.angle_at(t));
        self.inner
            .apply_linear(self.sweep_angle * Vec2::new(-u.y, u.x))
    }

    fn curvature_at(&self, t: f64) -> f64 {
        let u = Vec2::from_angle(self.angle_at(t));
        let dd = self
            .inner
            .apply_linear(-(self.sweep_angle * self.sweep_angle) * u);
        curvature_from_derivs(self.tangent_at(t), dd)
    }

    fn bounds(&self) -> Rect {
        self.interior_extrema()
            .iter()
            .fold(Rect::from_points(self.start(), self.end()), |r, &t| {
                r.union_pt(self.position_at(t))
            })
    }

    fn subdivided(&self, t: f64) -> (EllipticalArc, EllipticalArc) {
        assert_interior(t);
        let split = self.sweep_angle * t;
        (
            EllipticalArc {
                sweep_angle: split,
                ..*self
            },
            EllipticalArc {
                start_angle: self.start_angle + split,
                sweep_angle: self.sweep_angle - split,
                ..*self
            },
        )
    }

    fn interior_extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        // x(θ) = a cos θ + c sin θ + e is stationary where tan θ = c / a,
        // and likewise for y. A full turn holds at most 3 of each.
        let [a, b, c, d, _, _] = self.inner.as_coeffs();
        let mut ts = ArrayVec::<f64, 8>::new();
        for base in [c.atan2(a), d.atan2(b)] {
            for_each_angle_t(self.start_angle, self.sweep_angle, base, PI, |t| {
                ts.push(t);
            });
        }
        interior_roots(ts)
    }
}

impl Mul<EllipticalArc> for Affine {
    type Output = EllipticalArc;

    #[inline]
    fn mul(self, other: EllipticalArc) -> EllipticalArc {
        EllipticalArc {
            inner: self * other.inner,
            ..other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_near(p0: Point, p1: Point) {
        assert!((p1 - p0).hypot() < 1e-9, "{p0:?} != {p1:?}");
    }

    #[test]
    fn from_arc_matches_arc() {
        let arc = Arc::new((1.0, -2.0), 3.0, 0.4, -2.0);
        let ellipse = EllipticalArc::from(arc);
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            assert_near(ellipse.position_at(t), arc.position_at(t));
            assert!((ellipse.tangent_at(t) - arc.tangent_at(t)).hypot() < 1e-9);
            assert!((ellipse.curvature_at(t) - arc.curvature_at(t)).abs() < 1e-12);
        }
    }

    #[test]
    fn ellipse_positions() {
        let e = EllipticalArc::from_radii((0.0, 0.0), (2.0, 1.0), 0.0, 0.0, FRAC_PI_2);
        assert_near(e.start(), Point::new(2.0, 0.0));
        assert_near(e.end(), Point::new(0.0, 1.0));
        // Curvature at the end of the major axis is a / b².
        assert!((e.curvature_at(0.0) - 2.0).abs() < 1e-9);
        assert!((e.curvature_at(1.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn rotated_ellipse_extrema() {
        let e = EllipticalArc::from_radii((1.0, 1.0), (3.0, 1.0), 0.6, 0.0, TAU);
        let extrema = e.interior_extrema();
        assert!(extrema.len() <= MAX_EXTREMA);
        // Sampled extremes agree with the bounds.
        let n = 2000;
        let bounds = e.bounds();
        let mut sampled = Rect::from_point(e.start());
        for i in 0..=n {
            sampled = sampled.union_pt(e.position_at(i as f64 / n as f64));
        }
        assert!((sampled.x0 - bounds.x0).abs() < 1e-4);
        assert!((sampled.x1 - bounds.x1).abs() < 1e-4);
        assert!((sampled.y0 - bounds.y0).abs() < 1e-4);
        assert!((sampled.y1 - bounds.y1).abs() < 1e-4);
        assert!(bounds.x0 <= sampled.x0 + 1e-12 && bounds.y1 >= sampled.y1 - 1e-12);
    }

    #[test]
    fn same_ellipse_ignores_parametrization() {
        let e1 = EllipticalArc::from_radii((1.0, 2.0), (3.0, 1.0), 0.3, 0.0, 1.0);
        // Rotating the unit circle first changes the angles but not the
        // ellipse.
        let e2 = EllipticalArc::new(e1.transform() * Affine::rotate(0.7), 0.5, 1.0);
        assert!(e1.same_ellipse(&e2));
        let e3 = EllipticalArc::from_radii((1.0, 2.0), (3.0, 1.1), 0.3, 0.0, 1.0);
        assert!(!e1.same_ellipse(&e3));
    }

    #[test]
    fn transform_composes() {
        let e = EllipticalArc::from_radii((0.0, 0.0), (2.0, 1.0), 0.0, 0.2, 1.5);
        let a = Affine::rotate(0.3) * Affine::translate((1.0, 4.0));
        let moved = a * e;
        for i in 0..=4 {
            let t = i as f64 / 4.0;
            assert_near(moved.position_at(t), a * e.position_at(t));
        }
    }
}
