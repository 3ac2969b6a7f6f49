// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Laying a dash pattern along a segment.

use smallvec::SmallVec;

use crate::common::linear_map;
use crate::{is_sufficiently_flat, Point, Segment};

/// Collection of values representing lengths in a dash pattern.
pub type Dashes = SmallVec<[f64; 4]>;

/// Subdivision depth at which a range is measured even if it is not flat.
const MAX_DASH_DEPTH: u32 = 14;

/// The result of laying a dash pattern along a segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashValues {
    /// Parameters at which the pattern switches between a dash and a gap,
    /// in increasing order.
    pub values: Vec<f64>,
    /// The estimated length of the segment.
    pub arc_length: f64,
    /// Whether the segment starts inside a dash (rather than a gap).
    pub initially_inside: bool,
}

impl DashValues {
    /// The parameter ranges covered by dashes.
    pub fn dash_ranges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        // Boundaries are 0, the toggles, then 1; dashes alternate from the
        // initial state.
        let skip = usize::from(!self.initially_inside);
        let bounds: Vec<f64> = std::iter::once(0.0)
            .chain(self.values.iter().copied())
            .chain(std::iter::once(1.0))
            .collect();
        (skip..bounds.len() - 1)
            .step_by(2)
            .map(move |i| (bounds[i], bounds[i + 1]))
            .filter(|(t0, t1)| t1 > t0)
    }
}

/// Where the walk currently is in the dash pattern.
#[derive(Clone, Copy, Debug)]
struct DashState {
    /// Index of the current dash or gap.
    index: usize,
    /// Length already consumed of the current dash or gap.
    offset: f64,
    /// Whether the current entry is a dash.
    inside: bool,
}

impl DashState {
    /// Start the pattern at `offset`, which must be in `[0, sum)`.
    fn new(dashes: &[f64], offset: f64) -> Self {
        let mut state = DashState {
            index: 0,
            offset: 0.0,
            inside: true,
        };
        let mut remaining = offset;
        while remaining > 0.0 {
            let dash_len = dashes[state.index];
            if remaining < dash_len {
                state.offset = remaining;
                break;
            }
            remaining -= dash_len;
            state.advance(dashes.len());
        }
        state
    }

    fn advance(&mut self, n: usize) {
        self.index = (self.index + 1) % n;
        self.inside = !self.inside;
        self.offset = 0.0;
    }
}

/// Lay the pattern `dashes`, starting `offset` into it, along `segment`.
///
/// `dashes` alternates dash and gap lengths, starting with a dash. The
/// offset is reduced modulo the total pattern length first, so negative
/// offsets are allowed.
///
/// The segment is walked by binary subdivision until each range passes the
/// flatness test (or a fixed depth is reached); each range contributes the
/// length of the two chords through its midpoint, and toggles are placed by
/// linear interpolation within a range.
///
/// # Panics
///
/// Panics if `dashes` is empty, contains a negative length, or sums to
/// zero.
pub fn dash_values<S: Segment>(
    segment: &S,
    dashes: &[f64],
    offset: f64,
    distance_epsilon: f64,
    curve_epsilon: f64,
) -> DashValues {
    assert!(!dashes.is_empty(), "dash pattern must not be empty");
    assert!(
        dashes.iter().all(|&d| d >= 0.0),
        "dash lengths must not be negative"
    );
    let sum: f64 = dashes.iter().sum();
    assert!(sum > 0.0, "dash pattern must have a positive length");

    let offset = offset.rem_euclid(sum);
    let mut state = DashState::new(dashes, offset);
    let mut result = DashValues {
        initially_inside: state.inside,
        ..DashValues::default()
    };

    let walk = DashWalk {
        segment,
        dashes,
        distance_epsilon,
        curve_epsilon,
    };
    walk.rec(
        0.0,
        1.0,
        segment.start(),
        segment.end(),
        0,
        &mut state,
        &mut result,
    );
    result
}

struct DashWalk<'a, S> {
    segment: &'a S,
    dashes: &'a [f64],
    distance_epsilon: f64,
    curve_epsilon: f64,
}

impl<S: Segment> DashWalk<'_, S> {
    #[expect(clippy::too_many_arguments, reason = "recursion state")]
    fn rec(
        &self,
        t0: f64,
        t1: f64,
        p0: Point,
        p1: Point,
        depth: u32,
        state: &mut DashState,
        result: &mut DashValues,
    ) {
        let t_mid = 0.5 * (t0 + t1);
        let p_mid = self.segment.position_at(t_mid);
        if depth > MAX_DASH_DEPTH
            || is_sufficiently_flat(self.distance_epsilon, self.curve_epsilon, p0, p_mid, p1)
        {
            let total = p0.distance(p_mid) + p_mid.distance(p1);
            result.arc_length += total;
            let mut left = total;
            while state.offset + left >= self.dashes[state.index] {
                let consumed = total - left + self.dashes[state.index] - state.offset;
                result.values.push(linear_map(0.0, total, t0, t1, consumed));
                left -= self.dashes[state.index] - state.offset;
                state.advance(self.dashes.len());
            }
            state.offset += left;
        } else {
            self.rec(t0, t_mid, p0, p_mid, depth + 1, state, result);
            self.rec(t_mid, t1, p_mid, p1, depth + 1, state, result);
        }
    }
}
