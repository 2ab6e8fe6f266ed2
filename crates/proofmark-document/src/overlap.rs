// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlap detection between printed content and stroke marks.

use std::collections::HashSet;

use proofmark_core::error::Result;
use tracing::debug;

use crate::extract::{PageGeometry, extract_page};
use crate::geometry::Rect;
use crate::pdf::PdfSource;

/// Path rectangles touched by at least one text or image rectangle.
///
/// Pairwise test over `(texts ∪ images) × paths`; every set involved holds
/// one page's worth of boxes.
pub fn find_overlaps(geometry: &PageGeometry) -> HashSet<Rect> {
    let content = geometry.texts.iter().chain(geometry.images.iter());
    let mut hits = HashSet::new();
    for printed in content {
        for mark in &geometry.paths {
            if printed.intersects(mark) {
                hits.insert(*mark);
            }
        }
    }
    hits
}

/// Overlapping marks of every page, in page order.
pub fn document_overlaps(pdf: &PdfSource) -> Result<Vec<HashSet<Rect>>> {
    let mut pages = Vec::new();
    for (index, page_id) in pdf.page_ids().into_iter().enumerate() {
        let hits = find_overlaps(&extract_page(pdf.document(), page_id)?);
        if !hits.is_empty() {
            debug!(page = index + 1, overlaps = hits.len(), "marks overlap content");
        }
        pages.push(hits);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(texts: &[Rect], images: &[Rect], paths: &[Rect]) -> PageGeometry {
        PageGeometry {
            images: images.iter().copied().collect(),
            texts: texts.iter().copied().collect(),
            paths: paths.iter().copied().collect(),
        }
    }

    #[test]
    fn text_crossing_a_mark_is_reported() {
        let mark = Rect::new(0.0, 100.0, 200.0, 5.0);
        let page = geometry(&[Rect::new(50.0, 95.0, 40.0, 12.0)], &[], &[mark]);
        assert_eq!(find_overlaps(&page), HashSet::from([mark]));
    }

    #[test]
    fn touching_edges_count() {
        let mark = Rect::new(10.0, 10.0, 10.0, 10.0);
        let page = geometry(&[], &[Rect::new(20.0, 0.0, 5.0, 10.0)], &[mark]);
        assert_eq!(find_overlaps(&page).len(), 1);
    }

    #[test]
    fn any_gap_separates() {
        let mark = Rect::new(10.0, 10.0, 10.0, 10.0);
        let beside = Rect::new(20.5, 10.0, 5.0, 5.0);
        let above = Rect::new(10.0, 20.01, 5.0, 5.0);
        let page = geometry(&[beside], &[above], &[mark]);
        assert!(find_overlaps(&page).is_empty());
    }

    #[test]
    fn a_mark_hit_twice_is_reported_once() {
        let mark = Rect::new(0.0, 0.0, 100.0, 5.0);
        let page = geometry(
            &[Rect::new(10.0, 0.0, 5.0, 5.0), Rect::new(50.0, 0.0, 5.0, 5.0)],
            &[Rect::new(80.0, 0.0, 5.0, 5.0)],
            &[mark],
        );
        assert_eq!(find_overlaps(&page).len(), 1);
    }

    #[test]
    fn empty_page_has_no_overlaps() {
        assert!(find_overlaps(&PageGeometry::default()).is_empty());
    }

    #[test]
    fn text_over_a_red_line_is_found_per_page() {
        let clean = b"1 0 0 RG 0 100 m 200 100 l S".to_vec();
        let crossed = b"1 0 0 RG 0 100 m 200 100 l S BT /F1 12 Tf 20 98 Td (PAY HERE) Tj ET".to_vec();
        let mut doc = crate::fixtures::document(vec![clean, crossed], crate::fixtures::A4);
        let pdf = PdfSource::from_bytes(&crate::fixtures::to_bytes(&mut doc)).expect("open");

        let pages = document_overlaps(&pdf).expect("overlaps");
        assert_eq!(pages.len(), 2);
        assert!(pages[0].is_empty());
        assert_eq!(pages[1].len(), 1);
    }
}
