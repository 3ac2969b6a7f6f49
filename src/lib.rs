// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Algorithms on parametric 2D curve segments.
//!
//! Every segment kind (lines, circular and elliptical arcs, quadratic and
//! cubic Béziers) is a continuous curve parametrized by `t` in `[0, 1]`
//! and implements the [`Segment`] trait. The algorithms in this crate are
//! written once against that trait:
//!
//! - subdivision and slicing, with parameter remapping;
//! - adaptive arc length estimation;
//! - laying a dash pattern along a segment ([`dash_values`]);
//! - approximation by lines or by lines and circular arcs;
//! - the closest positions on a set of segments to a point
//!   ([`closest_to_point`]);
//! - detecting when two polynomial segments trace the same path
//!   ([`SegmentOverlap`]);
//! - intersections between segments of any kind ([`intersect()`]).
//!
//! [`SegmentKind`] is the closed set of segment kinds, for code that needs
//! to store or dispatch over mixed segments.
//!
//! # Examples
//!
//! ```
//! use segkit::{closest_to_point, CubicBez, Flatness, Line, Point, Segment, SegmentKind};
//!
//! let hump = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0));
//! let (left, right) = hump.subdivided(0.5);
//! assert_eq!(left.end(), right.start());
//! assert!(hump.arc_length(&Flatness::default()) > 3.0);
//!
//! let segments: [SegmentKind; 2] = [hump.into(), Line::new((0.0, 2.0), (3.0, 2.0)).into()];
//! let closest = closest_to_point(&segments, Point::new(1.5, 3.0), 1e-9);
//! assert_eq!(closest.len(), 1);
//! assert_eq!(closest[0].index, 1);
//!
//! let flat: SegmentKind = Line::new((0.0, 0.5), (3.0, 0.5)).into();
//! assert_eq!(segments[0].intersect(&flat).len(), 2);
//! ```
//!
//! # Features
//!
//! - `serde`: Implement `serde::Deserialize` and `serde::Serialize` on the
//!   value types.
//!
//! Positive angles and positive curvature turn from the x axis towards the y
//! axis, which is clockwise on screen in a y-down coordinate system.

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET

mod affine;
mod arc;
mod bezier_intersect;
pub mod common;
mod cubicbez;
mod dash;
mod elliptical_arc;
mod flatten;
mod intersect;
mod kind;
mod line;
mod nearest;
mod overlap;
mod piecewise;
mod point;
mod quadbez;
mod rect;
mod segment;
mod tracked;
mod vec2;

pub use crate::affine::Affine;
pub use crate::arc::Arc;
pub use crate::cubicbez::CubicBez;
pub use crate::dash::{dash_values, DashValues, Dashes};
pub use crate::elliptical_arc::EllipticalArc;
pub use crate::flatten::{
    is_sufficiently_flat, Flatness, DEFAULT_CURVE_EPSILON, DEFAULT_DISTANCE_EPSILON,
    DEFAULT_MAX_LEVELS,
};
pub use crate::intersect::{intersect, intersect_by_bounds, BoundsIntersectOpts, Intersection};
pub use crate::kind::SegmentKind;
pub use crate::line::Line;
pub use crate::nearest::{closest_to_point, ClosestPoint};
pub use crate::overlap::{
    overlap_cubic, overlap_linear, overlap_quadratic, Overlap, SegmentOverlap,
};
pub use crate::piecewise::{LinearOrArcOpts, PiecewiseLinearOpts};
pub use crate::point::Point;
pub use crate::quadbez::QuadBez;
pub use crate::rect::Rect;
pub use crate::segment::{Nearest, Segment, MAX_EXTREMA};
pub use crate::tracked::Tracked;
pub use crate::vec2::Vec2;
