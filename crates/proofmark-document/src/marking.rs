// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlap marking: highlight marks that collide with printed content on a
// review copy of the composed document.

use std::cmp::Ordering;
use std::path::Path;

use proofmark_core::error::Result;
use tracing::{info, instrument};

use crate::geometry::{Point, Rect};
use crate::overlap::document_overlaps;
use crate::pdf::canvas::Rgb;
use crate::pdf::{PageCanvas, PdfSource};

const HIGHLIGHT: Rgb = [0.0, 1.0, 0.0];
const NOTICE: Rgb = [0.0, 0.0, 1.0];
const NOTICE_SIZE: f32 = 20.0;

/// Session subdirectory holding composed documents.
pub const COMPOSED_DIR: &str = "overlay";
/// Session subdirectory receiving marked review copies.
pub const MARKED_DIR: &str = "overlapping";

/// Detect overlaps in `input` and draw them onto the session's composed
/// copy of `file_name`.
///
/// Each overlapping mark is outlined in green with a blue "!" at its
/// corner. The result is written to `<session>/overlapping/<file_name>`
/// and returned.
#[instrument(skip_all, fields(input = %input.display(), file = file_name))]
pub fn mark_overlaps(input: &Path, session_dir: &Path, file_name: &str) -> Result<Vec<u8>> {
    let overlaps = document_overlaps(&PdfSource::open(input)?)?;

    let mut composed = PdfSource::open(session_dir.join(COMPOSED_DIR).join(file_name))?;
    let mut marked = 0;
    for (index, rects) in overlaps.into_iter().enumerate() {
        if rects.is_empty() {
            continue;
        }
        let page_id = composed.page_id(index as u32 + 1)?;
        let doc = composed.document_mut();

        let mut ordered: Vec<Rect> = rects.into_iter().collect();
        ordered.sort_by(position);
        let mut canvas = PageCanvas::native(page_id);
        for rect in &ordered {
            canvas.stroke_rect(*rect, HIGHLIGHT);
            canvas.show_text(doc, "!", Point::new(rect.x, rect.y), NOTICE_SIZE, NOTICE)?;
        }
        canvas.finish(doc)?;
        marked += ordered.len();
    }

    let out_dir = session_dir.join(MARKED_DIR);
    std::fs::create_dir_all(&out_dir)?;
    let bytes = composed.to_bytes()?;
    std::fs::write(out_dir.join(file_name), &bytes)?;
    info!(marked, "Overlap marking written");
    Ok(bytes)
}

fn position(a: &Rect, b: &Rect) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.width.total_cmp(&b.width))
        .then(a.height.total_cmp(&b.height))
}
