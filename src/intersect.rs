// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections between segments of any kind.

use std::f64::consts::TAU;

use arrayvec::ArrayVec;

use crate::arc::for_each_angle_t;
use crate::bezier_intersect::cubic_intersections;
use crate::common::{solve_cubic, solve_quadratic};
use crate::{Arc, EllipticalArc, Line, Point, Rect, Segment, SegmentKind, Vec2};

/// Hits on a line closer than this (in its parameter) to an endpoint are
/// dropped.
const LINE_END_EPSILON: f64 = 1e-8;

/// Parameter pairs closer than this in both coordinates are duplicates.
const DUPLICATE_EPSILON: f64 = 1e-9;

/// A point where two segments cross.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// The intersection point.
    pub point: Point,
    /// The parameter on the first segment.
    pub t0: f64,
    /// The parameter on the second segment.
    pub t1: f64,
}

impl Intersection {
    fn swapped(self) -> Intersection {
        Intersection {
            t0: self.t1,
            t1: self.t0,
            ..self
        }
    }
}

/// Options for [`intersect_by_bounds`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundsIntersectOpts {
    /// Pieces whose bounding boxes are both at most this wide and high are
    /// reported as an intersection.
    pub tolerance: f64,
    /// Subdivision depth at which overlapping pieces are reported anyway.
    pub max_depth: u32,
    /// Number of piece pairs examined before giving up.
    pub max_pairs: usize,
    /// Reported points closer than this to an earlier one are dropped.
    pub dedup_distance: f64,
}

impl Default for BoundsIntersectOpts {
    fn default() -> Self {
        BoundsIntersectOpts {
            tolerance: 1e-10,
            max_depth: 48,
            max_pairs: 1 << 16,
            dedup_distance: 1e-7,
        }
    }
}

impl BoundsIntersectOpts {
    /// Builder method for setting the box size tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method for setting the depth cap.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder method for setting the work cap.
    pub fn max_pairs(mut self, max_pairs: usize) -> Self {
        self.max_pairs = max_pairs;
        self
    }

    /// Builder method for setting the deduplication distance.
    pub fn dedup_distance(mut self, dedup_distance: f64) -> Self {
        self.dedup_distance = dedup_distance;
        self
    }
}

/// Find the points where two segments cross, sorted by the parameter on
/// `a`.
///
/// Closed forms are used where they exist: line/line, line against any
/// other kind, and arc/arc. Quadratic and cubic Béziers are raised to
/// cubics and intersected by subdivision, unless they overlap along a range.
/// Everything else goes to [`intersect_by_bounds`].
///
/// Segments that trace the same path over a range have no isolated
/// intersections, and give an empty result when that is detected. A point
/// where an endpoint of `a` is exactly an endpoint of `b` is not reported.
pub fn intersect(a: &SegmentKind, b: &SegmentKind) -> Vec<Intersection> {
    let hits = match (a, b) {
        (SegmentKind::Line(p), SegmentKind::Line(q)) => line_line(p, q).into_iter().collect(),
        (SegmentKind::Line(line), other) => line_segment(line, other),
        (other, SegmentKind::Line(line)) => line_segment(line, other)
            .into_iter()
            .map(Intersection::swapped)
            .collect(),
        (SegmentKind::Arc(p), SegmentKind::Arc(q)) => arc_arc(p, q),
        (SegmentKind::EllipticalArc(p), SegmentKind::EllipticalArc(q)) => {
            if p.same_ellipse(q) {
                Vec::new()
            } else {
                intersect_by_bounds(p, q, &BoundsIntersectOpts::default())
            }
        }
        (
            SegmentKind::Quad(_) | SegmentKind::Cubic(_),
            SegmentKind::Quad(_) | SegmentKind::Cubic(_),
        ) => polynomial(a, b),
        _ => intersect_by_bounds(a, b, &BoundsIntersectOpts::default()),
    };
    finish(a, b, hits)
}

/// Find intersections by subdividing both segments while their bounding
/// boxes overlap.
///
/// A pair of pieces is reported (at the middle of both ranges) once both
/// boxes are within `opts.tolerance`, or once `opts.max_depth` is reached.
/// This works for any pair of segments, at the cost of precision and speed
/// compared with the closed forms used by [`intersect()`]. Results are sorted
/// by the parameter on `a`.
pub fn intersect_by_bounds<A: Segment, B: Segment>(
    a: &A,
    b: &B,
    opts: &BoundsIntersectOpts,
) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = Vec::new();
    let mut work = vec![(Piece::new(a.clone()), Piece::new(b.clone()), 0_u32)];
    let mut processed = 0;
    while let Some((pa, pb, depth)) = work.pop() {
        processed += 1;
        if processed > opts.max_pairs {
            log::debug!(
                "intersect_by_bounds: giving up after {} pairs with {} found",
                opts.max_pairs,
                hits.len()
            );
            break;
        }
        let (box_a, box_b) = (pa.segment.bounds(), pb.segment.bounds());
        if !box_a.overlaps(box_b) {
            continue;
        }
        let small = |r: Rect| r.width().max(r.height()) <= opts.tolerance;
        let (small_a, small_b) = (small(box_a), small(box_b));
        if (small_a && small_b) || depth >= opts.max_depth {
            let (t0, t1) = (pa.mid(), pb.mid());
            let point = a.position_at(t0).midpoint(b.position_at(t1));
            if !hits
                .iter()
                .any(|h| h.point.distance(point) <= opts.dedup_distance)
            {
                hits.push(Intersection { point, t0, t1 });
            }
            continue;
        }
        let depth = depth + 1;
        match (small_a, small_b) {
            (true, _) => {
                let (b0, b1) = pb.split();
                work.extend([(pa.clone(), b0, depth), (pa, b1, depth)]);
            }
            (_, true) => {
                let (a0, a1) = pa.split();
                work.extend([(a0, pb.clone(), depth), (a1, pb, depth)]);
            }
            _ => {
                let (a0, a1) = pa.split();
                let (b0, b1) = pb.split();
                work.extend([
                    (a0.clone(), b0.clone(), depth),
                    (a0, b1.clone(), depth),
                    (a1.clone(), b0, depth),
                    (a1, b1, depth),
                ]);
            }
        }
    }
    hits.sort_by(|x, y| x.t0.total_cmp(&y.t0));
    hits
}

/// A piece of a segment, remembering the range it covers on the original.
#[derive(Clone)]
struct Piece<S> {
    segment: S,
    t0: f64,
    t1: f64,
}

impl<S: Segment> Piece<S> {
    fn new(segment: S) -> Self {
        Piece {
            segment,
            t0: 0.0,
            t1: 1.0,
        }
    }

    fn mid(&self) -> f64 {
        0.5 * (self.t0 + self.t1)
    }

    fn split(&self) -> (Self, Self) {
        let (left, right) = self.segment.subdivided(0.5);
        let t_mid = self.mid();
        (
            Piece {
                segment: left,
                t0: self.t0,
                t1: t_mid,
            },
            Piece {
                segment: right,
                t0: t_mid,
                t1: self.t1,
            },
        )
    }
}

fn line_line(p: &Line, q: &Line) -> Option<Intersection> {
    let d1 = p.p1 - p.p0;
    let d2 = q.p1 - q.p0;
    let denom = d1.cross(d2);
    if denom == 0.0 {
        return None;
    }
    let w = q.p0 - p.p0;
    let t0 = w.cross(d2) / denom;
    let t1 = w.cross(d1) / denom;
    if (0.0..=1.0).contains(&t0) && (0.0..=1.0).contains(&t1) {
        Some(Intersection {
            point: p.position_at(t0),
            t0,
            t1,
        })
    } else {
        None
    }
}

/// Intersect a line with another segment. `t0` is on the line.
///
/// The other segment is mapped into the frame where the line runs from
/// `(0, 0)` to `(1, 0)`, and its crossings of the x axis are solved for.
fn line_segment(line: &Line, other: &SegmentKind) -> Vec<Intersection> {
    let frame = line.unit_frame();
    if !frame.as_coeffs().iter().all(|c| c.is_finite()) {
        return Vec::new();
    }
    let roots: ArrayVec<f64, 4> = match *other {
        SegmentKind::Line(q) => return line_line(line, &q).into_iter().collect(),
        SegmentKind::Quad(q) => {
            let [c0, c1, c2] = (frame * q).power_coefficients();
            solve_quadratic(c0.y, c1.y, c2.y).into_iter().collect()
        }
        SegmentKind::Cubic(c) => {
            let [c0, c1, c2, c3] = (frame * c).power_coefficients();
            solve_cubic(c0.y, c1.y, c2.y, c3.y).into_iter().collect()
        }
        SegmentKind::Arc(arc) => elliptical_axis_crossings(&(frame * arc)),
        SegmentKind::EllipticalArc(e) => elliptical_axis_crossings(&(frame * e)),
    };
    roots
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .filter_map(|t1| {
            let point = other.position_at(t1);
            let t0 = (frame * point).x;
            (t0 > LINE_END_EPSILON && t0 < 1.0 - LINE_END_EPSILON)
                .then_some(Intersection { point, t0, t1 })
        })
        .collect()
}

/// The parameters where an elliptical arc crosses the x axis.
///
/// With the arc's transform `[a, b, c, d, e, f]`, `y(θ) = b cos θ + d sin θ + f`,
/// which is zero at `atan2(d, b) ± acos(-f / hypot(b, d))`.
fn elliptical_axis_crossings(arc: &EllipticalArc) -> ArrayVec<f64, 4> {
    let [_, b, _, d, _, f] = arc.transform().as_coeffs();
    let mut result = ArrayVec::new();
    let r = b.hypot(d);
    if r == 0.0 {
        return result;
    }
    let k = -f / r;
    if !(-1.0..=1.0).contains(&k) {
        return result;
    }
    let phase = d.atan2(b);
    let delta = k.acos();
    let mut angles = ArrayVec::<f64, 2>::new();
    angles.push(phase - delta);
    if delta > 0.0 {
        angles.push(phase + delta);
    }
    // A sweep of at most a full turn meets each angle at most twice.
    for angle in angles {
        for_each_angle_t(arc.start_angle(), arc.sweep_angle(), angle, TAU, |t| {
            result.push(t);
        });
    }
    result
}

fn arc_arc(p: &Arc, q: &Arc) -> Vec<Intersection> {
    let v = q.center - p.center;
    let dist = v.hypot();
    if dist == 0.0
        || dist > p.radius + q.radius
        || dist < (p.radius - q.radius).abs()
    {
        return Vec::new();
    }
    // Distance from p's center to the chord through both crossings, and the
    // half-length of that chord.
    let along = (p.radius * p.radius - q.radius * q.radius + dist * dist) / (2.0 * dist);
    let half = (p.radius * p.radius - along * along).max(0.0).sqrt();
    let u = v / dist;
    let base = p.center + along * u;
    let perp = Vec2::new(-u.y, u.x);
    let mut points = ArrayVec::<Point, 2>::new();
    points.push(base + half * perp);
    if half > 0.0 {
        points.push(base - half * perp);
    }
    points
        .into_iter()
        .filter_map(|point| {
            let t0 = p.t_at_angle((point - p.center).atan2())?;
            let t1 = q.t_at_angle((point - q.center).atan2())?;
            Some(Intersection { point, t0, t1 })
        })
        .collect()
}

/// Intersect two quadratic or cubic Béziers.
fn polynomial(a: &SegmentKind, b: &SegmentKind) -> Vec<Intersection> {
    let (Some(ca), Some(cb)) = (a.as_cubic(), b.as_cubic()) else {
        return intersect_by_bounds(a, b, &BoundsIntersectOpts::default());
    };
    let overlapping = match (a, b) {
        (SegmentKind::Quad(qa), SegmentKind::Quad(qb)) => qa.overlap(qb).is_some(),
        _ => ca.overlap(&cb).is_some(),
    };
    if overlapping {
        return Vec::new();
    }
    cubic_intersections(&ca, &cb)
        .into_iter()
        .map(|(t0, t1)| Intersection {
            point: ca.position_at(t0),
            t0,
            t1,
        })
        .collect()
}

/// Drop non-finite and duplicate hits and hits on shared endpoints, then
/// sort.
fn finish(a: &SegmentKind, b: &SegmentKind, hits: Vec<Intersection>) -> Vec<Intersection> {
    let mut shared = ArrayVec::<(f64, f64), 4>::new();
    for (ta, pa) in [(0.0, a.start()), (1.0, a.end())] {
        for (tb, pb) in [(0.0, b.start()), (1.0, b.end())] {
            if pa == pb {
                shared.push((ta, tb));
            }
        }
    }
    let near = |x: f64, y: f64| (x - y).abs() <= DUPLICATE_EPSILON;

    let mut result: Vec<Intersection> = Vec::with_capacity(hits.len());
    for hit in hits {
        if !(hit.point.is_finite() && hit.t0.is_finite() && hit.t1.is_finite()) {
            continue;
        }
        if shared
            .iter()
            .any(|&(ta, tb)| near(hit.t0, ta) && near(hit.t1, tb))
        {
            continue;
        }
        if result
            .iter()
            .any(|r| near(r.t0, hit.t0) && near(r.t1, hit.t1))
        {
            continue;
        }
        result.push(hit);
    }
    result.sort_by(|x, y| x.t0.total_cmp(&y.t0));
    result
}
