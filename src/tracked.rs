// Copyright 2024 the Segkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A segment with cached derived data and change notification.

use core::fmt;
use std::cell::OnceCell;

use crate::{Flatness, Rect, Segment};

/// Owns a segment, caches its bounds and arc length, and tells listeners
/// when its shape changes.
///
/// The kernel algorithms never mutate segments. Every change goes through
/// [`set`](Self::set), [`update`](Self::update) or
/// [`invalidate`](Self::invalidate), each of which drops the caches and
/// calls every listener in registration order.
pub struct Tracked<S> {
    segment: S,
    flatness: Flatness,
    bounds: OnceCell<Rect>,
    arc_length: OnceCell<f64>,
    listeners: Vec<Box<dyn FnMut()>>,
}

impl<S: Segment> Tracked<S> {
    /// Track `segment`, measuring arc length with the default [`Flatness`].
    pub fn new(segment: S) -> Self {
        Self::with_flatness(segment, Flatness::default())
    }

    /// Track `segment`, measuring arc length with `flatness`.
    pub fn with_flatness(segment: S, flatness: Flatness) -> Self {
        Tracked {
            segment,
            flatness,
            bounds: OnceCell::new(),
            arc_length: OnceCell::new(),
            listeners: Vec::new(),
        }
    }

    /// The tracked segment.
    #[inline]
    pub fn get(&self) -> &S {
        &self.segment
    }

    /// The bounding box of the segment, computed on first use.
    pub fn bounds(&self) -> Rect {
        *self.bounds.get_or_init(|| self.segment.bounds())
    }

    /// The arc length of the segment, computed on first use.
    pub fn arc_length(&self) -> f64 {
        *self
            .arc_length
            .get_or_init(|| self.segment.arc_length(&self.flatness))
    }

    /// Replace the segment.
    pub fn set(&mut self, segment: S) {
        self.segment = segment;
        self.invalidate();
    }

    /// Change the segment in place.
    pub fn update(&mut self, f: impl FnOnce(&mut S)) {
        f(&mut self.segment);
        self.invalidate();
    }

    /// Drop the cached data and notify the listeners.
    pub fn invalidate(&mut self) {
        self.bounds.take();
        self.arc_length.take();
        for listener in &mut self.listeners {
            listener();
        }
    }

    /// Register a function to call whenever the segment changes.
    pub fn on_invalidate(&mut self, listener: impl FnMut() + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Unwrap the segment, dropping the listeners.
    pub fn into_inner(self) -> S {
        self.segment
    }
}

impl<S: fmt::Debug> fmt::Debug for Tracked<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("segment", &self.segment)
            .field("flatness", &self.flatness)
            .field("bounds", &self.bounds.get())
            .field("arc_length", &self.arc_length.get())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::{Line, Point, QuadBez};

    #[test]
    fn caches_follow_changes() {
        let mut tracked = Tracked::new(Line::new((0.0, 0.0), (3.0, 4.0)));
        assert_eq!(tracked.arc_length(), 5.0);
        assert_eq!(tracked.bounds(), Rect::new(0.0, 0.0, 3.0, 4.0));

        tracked.set(Line::new((0.0, 0.0), (6.0, 8.0)));
        assert_eq!(tracked.arc_length(), 10.0);

        tracked.update(|l| l.p1 = Point::new(1.0, 0.0));
        assert_eq!(tracked.arc_length(), 1.0);
        assert_eq!(tracked.bounds(), Rect::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn listeners_are_notified() {
        let count = Rc::new(Cell::new(0));
        let mut tracked = Tracked::new(QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0)));
        for _ in 0..2 {
            let count = Rc::clone(&count);
            tracked.on_invalidate(move || count.set(count.get() + 1));
        }
        let _ = tracked.bounds();
        assert_eq!(count.get(), 0);
        tracked.update(|q| q.p1 = Point::new(1.0, 2.0));
        assert_eq!(count.get(), 2);
        tracked.invalidate();
        assert_eq!(count.get(), 4);
        assert_eq!(tracked.get().p1, Point::new(1.0, 2.0));
    }
}
