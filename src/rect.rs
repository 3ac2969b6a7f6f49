// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding boxes.

use crate::Point;

/// An axis-aligned rectangle, used as a bounding box.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate.
    pub x0: f64,
    /// The minimum y coordinate.
    pub y0: f64,
    /// The maximum x coordinate.
    pub x1: f64,
    /// The maximum y coordinate.
    pub y1: f64,
}

impl Rect {
    /// A new rectangle from minimum and maximum coordinates.
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A zero-area rectangle containing only `pt`.
    #[inline]
    pub fn from_point(pt: Point) -> Rect {
        Rect::new(pt.x, pt.y, pt.x, pt.y)
    }

    /// A new rectangle from two points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Rect {
        let p0 = p0.into();
        let p1 = p1.into();
        Rect::from_point(p0).union_pt(p1)
    }

    /// The width of the rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The smallest rectangle enclosing two rectangles.
    #[inline]
    pub fn union(&self, other: Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Compute the union with one point.
    ///
    /// This method includes the perimeter of zero-area rectangles.
    /// Thus, a succession of `union_pt` operations on a series of
    /// points yields their enclosing rectangle.
    #[inline]
    pub fn union_pt(&self, pt: Point) -> Rect {
        Rect::new(
            self.x0.min(pt.x),
            self.y0.min(pt.y),
            self.x1.max(pt.x),
            self.y1.max(pt.y),
        )
    }

    /// Whether two rectangles share any point, boundaries included.
    #[inline]
    pub fn overlaps(&self, other: Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// The squared distance from `pt` to the closest point of the rectangle.
    ///
    /// This is zero when `pt` is inside.
    pub fn min_distance_sq(&self, pt: Point) -> f64 {
        let dx = (self.x0 - pt.x).max(0.0).max(pt.x - self.x1);
        let dy = (self.y0 - pt.y).max(0.0).max(pt.y - self.y1);
        dx * dx + dy * dy
    }

    /// The squared distance from `pt` to the farthest point of the rectangle.
    ///
    /// The farthest point is always one of the corners.
    pub fn max_distance_sq(&self, pt: Point) -> f64 {
        let dx = (pt.x - self.x0).abs().max((pt.x - self.x1).abs());
        let dy = (pt.y - self.y0).abs().max((pt.y - self.y1).abs());
        dx * dx + dy * dy
    }

    /// Is this rectangle finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}
