// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Axis-aligned rectangles with value equality, so they can live in hash sets.

use std::hash::{Hash, Hasher};

use super::Point;

/// An axis-aligned box `{x, y, width, height}` in page space.
///
/// Width and height are never negative; constructors normalise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// Coordinates are always finite, so bitwise hashing agrees with `==` once
// negative zero is folded into positive zero.
impl Eq for Rect {}

impl Hash for Rect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in [self.x, self.y, self.width, self.height] {
            (v + 0.0).to_bits().hash(state);
        }
    }
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Smallest rectangle containing both corners, in any order.
    pub fn from_corners(p: Point, q: Point) -> Self {
        let x = p.x.min(q.x);
        let y = p.y.min(q.y);
        Self {
            x,
            y,
            width: p.x.max(q.x) - x,
            height: p.y.max(q.y) - y,
        }
    }

    /// Bounding rectangle of a set of points, `None` when empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::from_corners(min, max))
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Grow (positive) or shrink (negative) by `margin` on every side.
    pub fn with_margin(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: (self.width + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }

    /// Closed-interval overlap on both axes; touching edges count.
    pub fn intersects(&self, other: &Rect) -> bool {
        intervals_touch(self.left(), self.right(), other.left(), other.right())
            && intervals_touch(self.bottom(), self.top(), other.bottom(), other.top())
    }
}

fn intervals_touch(start1: f32, end1: f32, start2: f32, end2: f32) -> bool {
    if start1 < start2 {
        start2 <= end1
    } else {
        start1 <= end2
    }
}
