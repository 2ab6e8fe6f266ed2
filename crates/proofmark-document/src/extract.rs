// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry extraction: turn one page's render events into bounding rectangles
// for images, text and red stroke marks.

use std::collections::HashSet;

use lopdf::{Document, ObjectId};
use proofmark_core::error::Result;
use tracing::{debug, instrument};

use crate::content::{
    ImagePlacement, LineSegment, PathStroke, RenderEvent, RenderListener, TextRun, interpret_page,
};
use crate::geometry::{Point, Rect};

/// Height of the band laid over a stroke mark.
const STROKE_BAND: f32 = 5.0;
/// Margin added to text boxes and single stroke marks.
const FINE_MARGIN: f32 = 0.1;
/// Margin added to a synthesized bracket.
const BRACKET_MARGIN: f32 = 0.5;
/// Red lines in one subpath that make up a perforation bracket.
const BRACKET_LINES: usize = 3;

const UNIT_SQUARE: [Point; 4] = [
    Point { x: 0.0, y: 0.0 },
    Point { x: 1.0, y: 0.0 },
    Point { x: 1.0, y: 1.0 },
    Point { x: 0.0, y: 1.0 },
];

/// Rectangle sets for one page. Identical rectangles collapse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGeometry {
    pub images: HashSet<Rect>,
    pub texts: HashSet<Rect>,
    pub paths: HashSet<Rect>,
}

/// Accumulates a [`PageGeometry`] from render events.
#[derive(Debug, Default)]
pub struct GeometryExtractor {
    geometry: PageGeometry,
}

impl GeometryExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_geometry(self) -> PageGeometry {
        self.geometry
    }

    fn add_image(&mut self, placement: &ImagePlacement) {
        let corners = UNIT_SQUARE.map(|corner| placement.ctm.transform(corner));
        if let Some(bounds) = Rect::bounding(corners) {
            self.geometry.images.insert(bounds);
        }
    }

    fn add_text(&mut self, run: &TextRun) {
        let ends = [run.ascent.start, run.ascent.end, run.descent.start, run.descent.end];
        let Some(bounds) = Rect::bounding(ends) else {
            return;
        };
        if bounds.is_degenerate() {
            return;
        }
        self.geometry.texts.insert(bounds.with_margin(FINE_MARGIN));
    }

    /// Only pure red strokes count. Each red line becomes a thin band; a
    /// subpath of exactly three red lines also yields one bracket box.
    fn add_path(&mut self, stroke: &PathStroke) {
        if !stroke.stroke_color.is_pure_red() {
            return;
        }
        for subpath in &stroke.subpaths {
            let lines: Vec<&LineSegment> = subpath.lines().collect();
            for line in &lines {
                self.geometry.paths.insert(stroke_band(line).with_margin(FINE_MARGIN));
            }
            if let [first, _, last] = lines.as_slice() {
                self.geometry.paths.insert(bracket(first, last));
            }
        }
    }
}

impl RenderListener for GeometryExtractor {
    fn on_event(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Image(placement) => self.add_image(&placement),
            RenderEvent::Text(run) => self.add_text(&run),
            RenderEvent::Path(stroke) => self.add_path(&stroke),
        }
    }
}

/// Band for one red line: 5pt tall, anchored 2.5pt below and to the left of
/// the line's start and as wide as its horizontal run. A vertical stroke
/// therefore only marks the area around its starting point.
fn stroke_band(line: &LineSegment) -> Rect {
    let half = STROKE_BAND / 2.0;
    let origin = Point::new(line.start.x - half, line.start.y - half);
    Rect::from_corners(
        origin,
        Point::new(origin.x + (line.end.x - line.start.x), origin.y + STROKE_BAND),
    )
}

/// Box over a three-line bracket: a band centred on the first line's start
/// x, spanning vertically from the first line's start to the last line's end.
fn bracket(first: &LineSegment, last: &LineSegment) -> Rect {
    let half = STROKE_BAND / 2.0;
    Rect::from_corners(
        Point::new(first.start.x - half, first.start.y),
        Point::new(first.start.x + half, last.end.y),
    )
    .with_margin(BRACKET_MARGIN)
}

/// Interpret a page and collect its geometry.
#[instrument(skip(doc), fields(page = ?page_id))]
pub fn extract_page(doc: &Document, page_id: ObjectId) -> Result<PageGeometry> {
    let mut extractor = GeometryExtractor::new();
    interpret_page(doc, page_id, &mut extractor)?;
    let geometry = extractor.into_geometry();
    debug!(
        images = geometry.images.len(),
        texts = geometry.texts.len(),
        paths = geometry.paths.len(),
        "page geometry extracted"
    );
    Ok(geometry)
}
