// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content module: walks page content streams and reports what gets drawn
// (images, text runs, stroked paths) as render events in page space.

pub mod events;
pub mod fonts;
pub mod interpreter;

pub use events::{
    ImagePlacement, LineSegment, PathStroke, RenderEvent, RenderListener, Segment, StrokeColor,
    Subpath, TextRun,
};
pub use interpreter::{interpret_page, page_content_bytes};
