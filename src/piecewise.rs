// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Approximating segments by lines, or by lines and circular arcs.

use core::fmt;

use smallvec::{smallvec, SmallVec};

use crate::flatten::{DEFAULT_CURVE_EPSILON, DEFAULT_DISTANCE_EPSILON};
use crate::{is_sufficiently_flat, Arc, Line, Point, Segment, SegmentKind};

/// Options for [`Segment::to_piecewise_linear`].
#[derive(Clone, Copy)]
pub struct PiecewiseLinearOpts<'a> {
    /// Number of subdivision levels applied regardless of flatness.
    pub min_levels: u32,
    /// Maximum number of subdivision levels.
    pub max_levels: u32,
    /// Bound on the squared distance of a range's midpoint from its chord,
    /// or `None` for no bound.
    pub distance_epsilon: Option<f64>,
    /// Bound on the squared midpoint distance relative to the squared chord
    /// length, or `None` for no bound.
    pub curve_epsilon: Option<f64>,
    /// Applied to every sampled point before the flatness test and before it
    /// is stored in a line.
    pub point_map: Option<&'a dyn Fn(Point) -> Point>,
}

impl Default for PiecewiseLinearOpts<'_> {
    fn default() -> Self {
        PiecewiseLinearOpts {
            min_levels: 0,
            max_levels: 10,
            distance_epsilon: Some(DEFAULT_DISTANCE_EPSILON),
            curve_epsilon: Some(DEFAULT_CURVE_EPSILON),
            point_map: None,
        }
    }
}

impl fmt::Debug for PiecewiseLinearOpts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseLinearOpts")
            .field("min_levels", &self.min_levels)
            .field("max_levels", &self.max_levels)
            .field("distance_epsilon", &self.distance_epsilon)
            .field("curve_epsilon", &self.curve_epsilon)
            .field("point_map", &self.point_map.map(|_| "<fn>"))
            .finish()
    }
}

impl<'a> PiecewiseLinearOpts<'a> {
    /// Builder method for setting the minimum subdivision depth.
    pub fn min_levels(mut self, min_levels: u32) -> Self {
        self.min_levels = min_levels;
        self
    }

    /// Builder method for setting the maximum subdivision depth.
    pub fn max_levels(mut self, max_levels: u32) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Builder method for setting (or removing) the distance bound.
    pub fn distance_epsilon(mut self, distance_epsilon: Option<f64>) -> Self {
        self.distance_epsilon = distance_epsilon;
        self
    }

    /// Builder method for setting (or removing) the relative bound.
    pub fn curve_epsilon(mut self, curve_epsilon: Option<f64>) -> Self {
        self.curve_epsilon = curve_epsilon;
        self
    }

    /// Builder method for setting the point map.
    pub fn point_map(mut self, point_map: &'a dyn Fn(Point) -> Point) -> Self {
        self.point_map = Some(point_map);
        self
    }

    #[inline]
    fn map(&self, p: Point) -> Point {
        match self.point_map {
            Some(f) => f(p),
            None => p,
        }
    }

    fn is_flat(&self, start: Point, middle: Point, end: Point) -> bool {
        is_sufficiently_flat(
            self.distance_epsilon.unwrap_or(f64::INFINITY),
            self.curve_epsilon.unwrap_or(f64::INFINITY),
            start,
            middle,
            end,
        )
    }
}

/// Options for [`Segment::to_piecewise_linear_or_arc`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearOrArcOpts {
    /// Number of subdivision levels applied regardless of the fit.
    pub min_levels: u32,
    /// Maximum number of subdivision levels.
    pub max_levels: u32,
    /// A range is split if its curvature varies by more than twice this.
    pub curvature_threshold: f64,
    /// A fitted arc is rejected if a sample is farther than this from it.
    pub error_threshold: f64,
    /// Fractions of each range at which a fitted arc is checked.
    pub error_points: SmallVec<[f64; 2]>,
}

impl Default for LinearOrArcOpts {
    fn default() -> Self {
        LinearOrArcOpts {
            min_levels: 2,
            max_levels: 7,
            curvature_threshold: 0.02,
            error_threshold: 10.0,
            error_points: smallvec![0.25, 0.75],
        }
    }
}

impl LinearOrArcOpts {
    /// Builder method for setting the minimum subdivision depth.
    pub fn min_levels(mut self, min_levels: u32) -> Self {
        self.min_levels = min_levels;
        self
    }

    /// Builder method for setting the maximum subdivision depth.
    pub fn max_levels(mut self, max_levels: u32) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Builder method for setting the curvature threshold.
    pub fn curvature_threshold(mut self, curvature_threshold: f64) -> Self {
        self.curvature_threshold = curvature_threshold;
        self
    }

    /// Builder method for setting the error threshold.
    pub fn error_threshold(mut self, error_threshold: f64) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    /// Builder method for setting the error sample points.
    pub fn error_points(mut self, error_points: &[f64]) -> Self {
        self.error_points = SmallVec::from_slice(error_points);
        self
    }
}

pub(crate) fn piecewise_linear<S: Segment>(
    segment: &S,
    opts: &PiecewiseLinearOpts<'_>,
) -> Vec<Line> {
    fn rec<S: Segment>(
        segment: &S,
        opts: &PiecewiseLinearOpts<'_>,
        (t0, t1): (f64, f64),
        (start, end): (Point, Point),
        min_levels: u32,
        max_levels: u32,
        result: &mut Vec<Line>,
    ) {
        let t_mid = 0.5 * (t0 + t1);
        let middle = opts.map(segment.position_at(t_mid));
        if max_levels == 0 || (min_levels == 0 && opts.is_flat(start, middle, end)) {
            result.push(Line::new(start, end));
        } else {
            let min_levels = min_levels.saturating_sub(1);
            let max_levels = max_levels - 1;
            rec(
                segment,
                opts,
                (t0, t_mid),
                (start, middle),
                min_levels,
                max_levels,
                result,
            );
            rec(
                segment,
                opts,
                (t_mid, t1),
                (middle, end),
                min_levels,
                max_levels,
                result,
            );
        }
    }

    let mut result = Vec::new();
    let start = opts.map(segment.start());
    let end = opts.map(segment.end());
    rec(
        segment,
        opts,
        (0.0, 1.0),
        (start, end),
        opts.min_levels,
        opts.max_levels,
        &mut result,
    );
    result
}

pub(crate) fn piecewise_linear_or_arc<S: Segment>(
    segment: &S,
    opts: &LinearOrArcOpts,
) -> Vec<SegmentKind> {
    let mut result = Vec::new();
    let start = segment.start();
    let end = segment.end();
    let approx = ArcApprox { segment, opts };
    approx.rec(
        (0.0, 1.0),
        (start, end),
        (segment.curvature_at(0.0), segment.curvature_at(1.0)),
        opts.min_levels,
        opts.max_levels,
        &mut result,
    );
    result
}

struct ArcApprox<'a, S> {
    segment: &'a S,
    opts: &'a LinearOrArcOpts,
}

impl<S: Segment> ArcApprox<'_, S> {
    fn rec(
        &self,
        (t0, t1): (f64, f64),
        (start, end): (Point, Point),
        (start_curvature, end_curvature): (f64, f64),
        min_levels: u32,
        max_levels: u32,
        result: &mut Vec<SegmentKind>,
    ) {
        let t_mid = 0.5 * (t0 + t1);
        let middle = self.segment.position_at(t_mid);
        let mid_curvature = self.segment.curvature_at(t_mid);

        let lo = start_curvature.min(mid_curvature).min(end_curvature);
        let hi = start_curvature.max(mid_curvature).max(end_curvature);
        let mut split = max_levels > 0
            && (min_levels > 0 || hi - lo > 2.0 * self.opts.curvature_threshold);

        let mut fit = None;
        if !split {
            let candidate = Arc::from_points(start, middle, end);
            if let SegmentKind::Arc(arc) = candidate {
                if max_levels > 0 && !self.arc_within_error(&arc, t0, t1) {
                    split = true;
                }
            }
            fit = Some(candidate);
        }

        match fit {
            Some(fit) if !split => result.push(fit),
            _ => {
                let min_levels = min_levels.saturating_sub(1);
                let max_levels = max_levels.saturating_sub(1);
                let curvatures = (start_curvature, mid_curvature);
                self.rec(
                    (t0, t_mid),
                    (start, middle),
                    curvatures,
                    min_levels,
                    max_levels,
                    result,
                );
                let curvatures = (mid_curvature, end_curvature);
                self.rec(
                    (t_mid, t1),
                    (middle, end),
                    curvatures,
                    min_levels,
                    max_levels,
                    result,
                );
            }
        }
    }

    fn arc_within_error(&self, arc: &Arc, t0: f64, t1: f64) -> bool {
        self.opts.error_points.iter().all(|&e| {
            let p = self.segment.position_at(t0 + e * (t1 - t0));
            (p.distance(arc.center) - arc.radius).abs() <= self.opts.error_threshold
        })
    }
}
