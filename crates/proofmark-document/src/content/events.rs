// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render events emitted by the content interpreter. All coordinates are in
// page space (the CTM has already been applied).

use crate::geometry::{Matrix, Point};

/// A straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

/// One piece of a subpath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(LineSegment),
    Curve {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

/// A connected run of segments. A closing `h` (or the implicit close of `re`)
/// sets `closed` but does not add a segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subpath {
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl Subpath {
    /// Straight-line segments in encounter order.
    pub fn lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Line(line) => Some(line),
            Segment::Curve { .. } => None,
        })
    }
}

/// Stroke colour components as set by `G`, `RG`, `K` or `SC`/`SCN`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeColor(pub Vec<f32>);

impl StrokeColor {
    pub fn black() -> Self {
        Self(vec![0.0])
    }

    /// Exactly the RGB red primary.
    pub fn is_pure_red(&self) -> bool {
        self.0.as_slice() == [1.0, 0.0, 0.0]
    }
}

/// An image XObject (or inline image) painted through `ctm`; the image
/// occupies the unit square in its own space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub ctm: Matrix,
}

/// One shown string, described by its ascent and descent lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun {
    pub ascent: LineSegment,
    pub descent: LineSegment,
}

/// A stroked path and the stroke colour in effect when it was painted.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStroke {
    pub subpaths: Vec<Subpath>,
    pub stroke_color: StrokeColor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Image(ImagePlacement),
    Text(TextRun),
    Path(PathStroke),
}

/// Receives render events in content-stream order.
pub trait RenderListener {
    fn on_event(&mut self, event: RenderEvent);
}

impl<F: FnMut(RenderEvent)> RenderListener for F {
    fn on_event(&mut self, event: RenderEvent) {
        self(event)
    }
}
