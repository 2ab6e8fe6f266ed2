// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// proofmark-document: PDF preflight and overlay composition for Proofmark.
//
// Reconstructs page geometry from content streams (images, text runs, red
// stroke marks), detects marks that collide with printed content, validates
// page size, fonts and page weight, and draws overlay documents onto pages.

pub mod compose;
pub mod content;
pub mod dimension;
pub mod extract;
pub mod geometry;
pub mod integrity;
pub mod marking;
pub mod overlap;
pub mod pdf;
pub mod preflight;
pub mod selection;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export the primary types so callers can use `proofmark_document::Preflight` etc.
pub use compose::OverlayComposer;
pub use dimension::DimensionChecker;
pub use extract::{GeometryExtractor, PageGeometry, extract_page};
pub use geometry::{Matrix, Point, Rect};
pub use overlap::find_overlaps;
pub use pdf::{PdfSource, StampLine, StampWriter};
pub use preflight::Preflight;
pub use selection::resolve_pages;
pub use validate::ValidationReport;
