// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay composition: draw overlay documents onto a source document's pages
// according to an OverlayPlan.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use proofmark_core::error::{ProofmarkError, Result};
use proofmark_core::{OverlayCategory, OverlayDetail, OverlayPlan, PreflightConfig};
use tracing::{debug, info, instrument};

use crate::dimension::DimensionChecker;
use crate::geometry::Point;
use crate::integrity::hash_bytes;
use crate::pdf::form::import_first_page_as_form;
use crate::pdf::{PageBox, PageCanvas, PdfSource};
use crate::selection::resolve_pages;

/// Categories drawn on pages chosen by their page selection, in draw order.
const SELECTED_CATEGORIES: [OverlayCategory; 2] =
    [OverlayCategory::PerforationLine, OverlayCategory::Payment];

/// Draws overlay files onto documents.
///
/// Overlay file names are resolved against `overlay_dir`. Pages whose
/// displayed size matches the expected paper get overlays in their displayed
/// orientation; other pages get them in their native orientation.
#[derive(Debug, Clone)]
pub struct OverlayComposer {
    checker: DimensionChecker,
    overlay_dir: PathBuf,
}

impl OverlayComposer {
    pub fn new(checker: DimensionChecker, overlay_dir: impl Into<PathBuf>) -> Self {
        Self {
            checker,
            overlay_dir: overlay_dir.into(),
        }
    }

    pub fn from_config(config: &PreflightConfig) -> Self {
        Self::new(DimensionChecker::from_config(config), config.overlay_dir.clone())
    }

    /// Compose `source` according to `plan`, write the result to `dest` and
    /// return its bytes.
    #[instrument(skip(self, plan), fields(source = %source.display(), dest = %dest.display()))]
    pub fn apply_overlays(&self, source: &Path, dest: &Path, plan: &OverlayPlan) -> Result<Vec<u8>> {
        let mut pdf = PdfSource::open(source)?;
        self.compose(&mut pdf, plan)?;

        let bytes = pdf.to_bytes()?;
        std::fs::write(dest, &bytes)?;
        info!(bytes = bytes.len(), sha256 = %hash_bytes(&bytes), "Overlays applied");
        Ok(bytes)
    }

    /// Apply `plan` to an open document in place.
    ///
    /// Draw order: first-page overlays on page 1, then perforation-line and
    /// payment overlays on their selected pages (when enabled), then
    /// all-pages overlays on every page.
    pub fn compose(&self, pdf: &mut PdfSource, plan: &OverlayPlan) -> Result<()> {
        let first_page = required(plan, OverlayCategory::FirstPage)?;
        let all_pages = required(plan, OverlayCategory::AllPages)?;

        let page_ids = pdf.page_ids();
        let mut forms = FormCache::new(&self.overlay_dir);

        if let Some(&page_id) = page_ids.first() {
            self.draw_upright(pdf.document_mut(), page_id, &first_page.overlay_files, &mut forms)?;
        }

        for category in SELECTED_CATEGORIES {
            let Some(detail) = plan.get(&category) else {
                continue;
            };
            if !detail.enabled {
                debug!(%category, "overlay category disabled");
                continue;
            }
            let selection = detail.page_selection.as_ref().ok_or_else(|| {
                ProofmarkError::Config(format!("{} overlay is enabled without a page selection", category))
            })?;
            let pages = resolve_pages(selection, pdf.page_count())?;
            debug!(%category, ?pages, "drawing on selected pages");

            for page in pages {
                let page_id = pdf.page_id(page)?;
                let doc = pdf.document_mut();
                let mut canvas = PageCanvas::native(page_id);
                draw_files(doc, &mut canvas, &detail.overlay_files, &mut forms)?;
                canvas.finish(doc)?;
            }
        }

        for page_id in page_ids {
            self.draw_upright(pdf.document_mut(), page_id, &all_pages.overlay_files, &mut forms)?;
        }

        info!(forms = forms.len(), "Overlay plan applied");
        Ok(())
    }

    fn draw_upright(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        files: &[String],
        forms: &mut FormCache,
    ) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        let (width, height) = PageBox::of(doc, page_id).rotated_size();
        let mut canvas = if self.checker.matches(width, height) {
            PageCanvas::logical(doc, page_id)?
        } else {
            debug!(page = ?page_id, width, height, "page off expected size, drawing natively");
            PageCanvas::native(page_id)
        };
        draw_files(doc, &mut canvas, files, forms)?;
        canvas.finish(doc)
    }
}

fn required(plan: &OverlayPlan, category: OverlayCategory) -> Result<&OverlayDetail> {
    plan.get(&category)
        .ok_or(ProofmarkError::MissingOverlay(category))
}

/// Draw each overlay file at the page origin, in list order.
fn draw_files(
    doc: &mut Document,
    canvas: &mut PageCanvas,
    files: &[String],
    forms: &mut FormCache,
) -> Result<()> {
    for file in files {
        let form_id = forms.form_for(doc, file)?;
        canvas.draw_form(doc, form_id, Point::new(0.0, 0.0))?;
    }
    Ok(())
}

/// Overlay files already imported into the document being composed.
struct FormCache<'a> {
    overlay_dir: &'a Path,
    forms: HashMap<String, ObjectId>,
}

impl<'a> FormCache<'a> {
    fn new(overlay_dir: &'a Path) -> Self {
        Self {
            overlay_dir,
            forms: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.forms.len()
    }

    fn form_for(&mut self, doc: &mut Document, file: &str) -> Result<ObjectId> {
        if let Some(&form_id) = self.forms.get(file) {
            return Ok(form_id);
        }
        let overlay = PdfSource::open(self.overlay_dir.join(file))?;
        let form_id = import_first_page_as_form(overlay.document(), doc)?;
        self.forms.insert(file.to_string(), form_id);
        Ok(form_id)
    }
}
