// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Finding the closest positions on a set of segments to a point.

use crate::{Point, Rect, Segment};

/// Bisection rounds after which every remaining range is reported.
const MAX_ROUNDS: u32 = 60;

/// Live ranges after which bisection stops.
const MAX_CANDIDATES: usize = 1 << 16;

/// Squared distances within this of the minimum are reported as ties.
const TIE_EPSILON: f64 = 1e-11;

/// A position on one of the searched segments, closest to the query point.
#[derive(Clone, Copy, Debug)]
pub struct ClosestPoint<'a, S> {
    /// The segment the position is on.
    pub segment: &'a S,
    /// The index of the segment in the searched slice.
    pub index: usize,
    /// The parameter of the position on the segment.
    pub t: f64,
    /// The position.
    pub point: Point,
    /// The squared distance from the query point.
    pub distance_sq: f64,
}

/// A range of a segment that is monotone in both coordinates, so that the
/// box spanned by its endpoints contains it.
#[derive(Clone, Copy)]
struct Span {
    index: usize,
    t0: f64,
    t1: f64,
    p0: Point,
    p1: Point,
}

impl Span {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.p0, self.p1)
    }
}

#[derive(Clone, Copy)]
struct Hit {
    index: usize,
    /// The range the position was taken from.
    range: (f64, f64),
    t: f64,
    point: Point,
    distance_sq: f64,
}

/// Find the positions on `segments` closest to `point`.
///
/// Segments with a closed form ([`Segment::nearest_exact`]) are solved
/// directly. The others are split at their extrema into monotone ranges and
/// bisected, discarding every range whose bounding box is farther away than
/// the best distance found so far. A range is resolved once its endpoints
/// are within `threshold` of each other.
///
/// Every position whose distance ties with the minimum is returned, at most
/// one per run of adjacent ranges (or positions within `threshold`) on the
/// same segment, ordered by segment index and then parameter. The result is
/// empty only when `segments` is.
pub fn closest_to_point<S: Segment>(
    segments: &[S],
    point: Point,
    threshold: f64,
) -> Vec<ClosestPoint<'_, S>> {
    let mut hits = Vec::new();
    let mut spans = Vec::new();
    let mut best = f64::INFINITY;

    for (index, segment) in segments.iter().enumerate() {
        if let Some(nearest) = segment.nearest_exact(point) {
            best = best.min(nearest.distance_sq);
            hits.push(Hit {
                index,
                range: (nearest.t, nearest.t),
                t: nearest.t,
                point: segment.position_at(nearest.t),
                distance_sq: nearest.distance_sq,
            });
            continue;
        }
        let mut t0 = 0.0;
        let mut p0 = segment.start();
        best = best.min(p0.distance_squared(point));
        for t1 in segment.interior_extrema().into_iter().chain(Some(1.0)) {
            let p1 = if t1 == 1.0 {
                segment.end()
            } else {
                segment.position_at(t1)
            };
            best = best.min(p1.distance_squared(point));
            spans.push(Span {
                index,
                t0,
                t1,
                p0,
                p1,
            });
            (t0, p0) = (t1, p1);
        }
    }

    let mut rounds = 0;
    let mut bisect = true;
    while !spans.is_empty() {
        let mut next = Vec::with_capacity(spans.len());
        for span in spans {
            let bounds = span.bounds();
            let min = bounds.min_distance_sq(point);
            if min > best {
                continue;
            }
            let max = bounds.max_distance_sq(point);
            best = best.min(max);
            let segment = &segments[span.index];
            let t_mid = 0.5 * (span.t0 + span.t1);
            let p_mid = segment.position_at(t_mid);
            let d_mid = p_mid.distance_squared(point);
            best = best.min(d_mid);
            if !bisect || span.p0.distance(span.p1) <= threshold || max - min <= TIE_EPSILON {
                hits.push(Hit {
                    index: span.index,
                    range: (span.t0, span.t1),
                    t: t_mid,
                    point: p_mid,
                    distance_sq: d_mid,
                });
            } else {
                next.push(Span {
                    t1: t_mid,
                    p1: p_mid,
                    ..span
                });
                next.push(Span {
                    t0: t_mid,
                    p0: p_mid,
                    ..span
                });
            }
        }
        spans = next;
        rounds += 1;
        if bisect && (rounds >= MAX_ROUNDS || spans.len() > MAX_CANDIDATES) {
            log::debug!(
                "closest_to_point: stopping bisection after {rounds} rounds with {} ranges",
                spans.len()
            );
            bisect = false;
        }
    }

    let Some(min) = hits.iter().map(|h| h.distance_sq).min_by(f64::total_cmp) else {
        return Vec::new();
    };
    hits.retain(|h| h.distance_sq <= min + TIE_EPSILON);
    hits.sort_by(|a, b| a.index.cmp(&b.index).then(a.t.total_cmp(&b.t)));

    // Adjacent ranges around one minimum all survive; keep the best of each
    // run of touching ranges.
    let mut result: Vec<ClosestPoint<'_, S>> = Vec::new();
    let mut previous: Option<Hit> = None;
    for hit in hits {
        let same_run = previous.is_some_and(|p| {
            p.index == hit.index
                && (hit.range.0 <= p.range.1 || p.point.distance(hit.point) <= threshold)
        });
        previous = Some(hit);
        if same_run {
            if let Some(last) = result.last_mut() {
                if hit.distance_sq < last.distance_sq {
                    last.t = hit.t;
                    last.point = hit.point;
                    last.distance_sq = hit.distance_sq;
                }
            }
            continue;
        }
        result.push(ClosestPoint {
            segment: &segments[hit.index],
            index: hit.index,
            t: hit.t,
            point: hit.point,
            distance_sq: hit.distance_sq,
        });
    }
    log::trace!(
        "closest_to_point: {} result(s) at distance² {min} after {rounds} rounds",
        result.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{Arc, CubicBez, Line, QuadBez, SegmentKind};

    #[test]
    fn line_closed_form() {
        let lines = [Line::new((0.0, 0.0), (10.0, 0.0))];
        let result = closest_to_point(&lines, Point::new(5.0, 3.0), 1e-9);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].index, 0);
        assert_eq!(result[0].t, 0.5);
        assert_eq!(result[0].distance_sq, 9.0);
        assert_eq!(result[0].point, Point::new(5.0, 0.0));
    }

    #[test]
    fn empty_input() {
        let lines: [Line; 0] = [];
        assert!(closest_to_point(&lines, Point::ZERO, 1e-9).is_empty());
    }

    #[test]
    fn equidistant_lines_both_reported() {
        let lines = [
            Line::new((0.0, 1.0), (2.0, 1.0)),
            Line::new((0.0, -1.0), (2.0, -1.0)),
        ];
        let result = closest_to_point(&lines, Point::new(1.0, 0.0), 1e-9);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].index, 0);
        assert_eq!(result[1].index, 1);
        assert!(std::ptr::eq(result[1].segment, &lines[1]));
    }

    #[test]
    fn point_on_curve() {
        let c = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let p = c.position_at(0.37);
        let curves = [c];
        let result = closest_to_point(&curves, p, 1e-9);
        assert_eq!(result.len(), 1);
        assert!(result[0].distance_sq < 1e-10);
        assert!((result[0].t - 0.37).abs() < 1e-4);
    }

    #[test]
    fn collapsed_cubic() {
        let curves = [CubicBez::new((1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0))];
        let result = closest_to_point(&curves, Point::new(4.0, 5.0), 1e-9);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].distance_sq, 25.0);
    }

    #[test]
    fn circle_center_is_bounded() {
        // Every position is a minimum, so the search has to give up.
        let arcs = [Arc::new((0.0, 0.0), 1.0, 0.0, std::f64::consts::TAU)];
        let result = closest_to_point(&arcs, Point::ZERO, 1e-12);
        assert!(!result.is_empty());
        assert!(result.iter().all(|r| (r.distance_sq - 1.0).abs() < 1e-9));
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pt = || Point::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
        for _ in 0..20 {
            let segments: Vec<SegmentKind> = vec![
                CubicBez::new(pt(), pt(), pt(), pt()).into(),
                QuadBez::new(pt(), pt(), pt()).into(),
                Arc::new(pt(), 3.0, 0.5, 2.0).into(),
                Line::new(pt(), pt()).into(),
            ];
            let query = pt();
            let result = closest_to_point(&segments, query, 1e-9);
            assert!(!result.is_empty());

            let n = 10_000;
            let brute = segments
                .iter()
                .flat_map(|s| (0..=n).map(move |i| s.position_at(i as f64 / n as f64)))
                .map(|p| p.distance_squared(query))
                .fold(f64::INFINITY, f64::min);
            for r in &result {
                assert!(r.distance_sq <= brute + 1e-6, "{} > {brute}", r.distance_sq);
                assert!(
                    r.distance_sq >= brute - 1e-2,
                    "{} << {brute}",
                    r.distance_sq
                );
                let p = segments[r.index].position_at(r.t);
                assert!((p.distance_squared(query) - r.distance_sq).abs() < 1e-9);
            }
        }
    }
}
