// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections of two cubic Béziers by subdividing their control boxes.

use crate::{CubicBez, Line, Segment};

/// Subdivision depth at which a pair is resolved even if not linear.
const MAX_DEPTH: u32 = 48;

/// Number of pairs examined before giving up.
const MAX_PAIRS: usize = 1 << 16;

/// Control point distance from the chord, relative to the size of the
/// input, below which a piece counts as linear.
const LINEAR_EPSILON: f64 = 1e-10;

/// Chord crossings this far outside a piece are still accepted; the crossing
/// is then refined on the full curves.
const CHORD_SLACK: f64 = 1e-9;

/// Parameter pairs closer than this in both coordinates are duplicates.
const DEDUP_EPSILON: f64 = 1e-7;

const NEWTON_ITERATIONS: usize = 4;

/// A piece of a cubic, remembering the range it covers on the original.
#[derive(Clone, Copy)]
struct Piece {
    curve: CubicBez,
    t0: f64,
    t1: f64,
}

impl Piece {
    fn new(curve: CubicBez) -> Self {
        Piece {
            curve,
            t0: 0.0,
            t1: 1.0,
        }
    }

    fn split(&self) -> (Piece, Piece) {
        let (left, right) = self.curve.subdivided(0.5);
        let t_mid = 0.5 * (self.t0 + self.t1);
        (
            Piece {
                curve: left,
                t0: self.t0,
                t1: t_mid,
            },
            Piece {
                curve: right,
                t0: t_mid,
                t1: self.t1,
            },
        )
    }

    /// Map a parameter on the piece to the original curve.
    fn at(&self, s: f64) -> f64 {
        self.t0 + s * (self.t1 - self.t0)
    }

    fn chord(&self) -> Line {
        Line::new(self.curve.p0, self.curve.p3)
    }
}

/// Find the parameter pairs `(ta, tb)` where `a` and `b` cross, sorted by
/// `ta`.
///
/// Pairs of pieces whose control boxes overlap are split in half until both
/// are linear within a tolerance scaled to the input; the crossing of their
/// chords is then polished with Newton iterations on the full curves.
///
/// Curves that overlap along a range give unbounded work, which is capped;
/// callers should rule that case out first with [`CubicBez::overlap`].
pub(crate) fn cubic_intersections(a: &CubicBez, b: &CubicBez) -> Vec<(f64, f64)> {
    let extent = a.control_box().union(b.control_box());
    let tolerance = LINEAR_EPSILON * (1.0 + extent.width().max(extent.height()));

    let mut hits: Vec<(f64, f64)> = Vec::new();
    let mut work = vec![(Piece::new(*a), Piece::new(*b), 0_u32)];
    let mut processed = 0;
    while let Some((pa, pb, depth)) = work.pop() {
        processed += 1;
        if processed > MAX_PAIRS {
            log::debug!(
                "cubic_intersections: giving up after {MAX_PAIRS} pairs with {} found",
                hits.len()
            );
            break;
        }
        if !pa.curve.control_box().overlaps(pb.curve.control_box()) {
            continue;
        }
        if depth >= MAX_DEPTH || (pa.curve.is_linear(tolerance) && pb.curve.is_linear(tolerance)) {
            if let Some((s, u)) = chord_crossing(pa.chord(), pb.chord()) {
                let (ta, tb) = refine(a, b, pa.at(s), pb.at(u));
                let duplicate = hits.iter().any(|&(ha, hb)| {
                    (ha - ta).abs() <= DEDUP_EPSILON && (hb - tb).abs() <= DEDUP_EPSILON
                });
                if !duplicate {
                    hits.push((ta, tb));
                }
            }
            continue;
        }
        let (a0, a1) = pa.split();
        let (b0, b1) = pb.split();
        let depth = depth + 1;
        work.extend([
            (a0, b0, depth),
            (a0, b1, depth),
            (a1, b0, depth),
            (a1, b1, depth),
        ]);
    }
    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    hits
}

/// The parameters on both chords of their crossing, clamped to `[0, 1]`.
fn chord_crossing(p: Line, q: Line) -> Option<(f64, f64)> {
    let d1 = p.p1 - p.p0;
    let d2 = q.p1 - q.p0;
    let denom = d1.cross(d2);
    if denom == 0.0 {
        return None;
    }
    let w = q.p0 - p.p0;
    let s = w.cross(d2) / denom;
    let u = w.cross(d1) / denom;
    let range = -CHORD_SLACK..=1.0 + CHORD_SLACK;
    if range.contains(&s) && range.contains(&u) {
        Some((s.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Newton iterations on `a(ta) - b(tb) = 0`.
///
/// Steps that are not finite or leave the unit square are not taken.
fn refine(a: &CubicBez, b: &CubicBez, mut ta: f64, mut tb: f64) -> (f64, f64) {
    for _ in 0..NEWTON_ITERATIONS {
        let r = b.position_at(tb) - a.position_at(ta);
        let da = a.tangent_at(ta);
        let db = -b.tangent_at(tb);
        let det = da.cross(db);
        if det == 0.0 {
            break;
        }
        let next_a = ta + r.cross(db) / det;
        let next_b = tb + da.cross(r) / det;
        if !(0.0..=1.0).contains(&next_a) || !(0.0..=1.0).contains(&next_b) {
            break;
        }
        (ta, tb) = (next_a, next_b);
    }
    (ta, tb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hump_crosses_flat_line() {
        // y = 3t(1 - t) crosses y = 0.5 where t² - t + 1/6 = 0.
        let hump = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0));
        let flat = CubicBez::new((0.0, 0.5), (1.0, 0.5), (2.0, 0.5), (3.0, 0.5));
        let hits = cubic_intersections(&hump, &flat);
        let root = (1.0 - (1.0_f64 / 3.0).sqrt()) / 2.0;
        assert_eq!(hits.len(), 2, "{hits:?}");
        for ((ta, tb), expected) in hits.iter().zip([root, 1.0 - root]) {
            assert!((ta - expected).abs() < 1e-9, "{ta} != {expected}");
            assert!((tb - expected).abs() < 1e-9, "{tb} != {expected}");
        }
    }

    #[test]
    fn disjoint_curves() {
        let a = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0));
        let b = CubicBez::new((0.0, 5.0), (1.0, 6.0), (2.0, 6.0), (3.0, 5.0));
        assert!(cubic_intersections(&a, &b).is_empty());
    }

    #[test]
    fn order_is_symmetric() {
        let a = CubicBez::new((0.0, 0.0), (0.3, 1.2), (1.1, -0.4), (2.0, 0.5));
        let b = CubicBez::new((0.0, 0.6), (0.8, -0.5), (1.4, 1.2), (2.0, -0.1));
        let ab = cubic_intersections(&a, &b);
        let mut ba = cubic_intersections(&b, &a);
        assert!(!ab.is_empty());
        assert_eq!(ab.len(), ba.len());
        ba.sort_by(|x, y| x.1.total_cmp(&y.1));
        for (&(ta, tb), &(ub, ua)) in ab.iter().zip(&ba) {
            assert!((ta - ua).abs() < 1e-9 && (tb - ub).abs() < 1e-9);
            let gap = a.position_at(ta) - b.position_at(tb);
            assert!(gap.hypot() < 1e-9);
        }
    }
}
