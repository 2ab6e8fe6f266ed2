// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp writer: author single-page overlay PDFs using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use proofmark_core::PaperSize;
use proofmark_core::error::Result;
use tracing::{debug, info, instrument};

/// One line of text placed at a fixed position, in points from the
/// bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct StampLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Creates transparent single-page overlay documents holding text stamps,
/// such as a branding line for the first page.
pub struct StampWriter {
    /// Paper size of the stamp page; should match the documents it overlays.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl StampWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Render `lines` onto one otherwise empty page.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn create_stamp(&self, lines: &[StampLine]) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Proofmark Stamp");

        info!(paper = ?self.paper_size, title, "Creating stamp overlay");

        let mut ops: Vec<Op> = Vec::new();
        for line in lines {
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(line.x),
                    y: Pt(line.y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(line.size),
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(line.text.clone())],
                font: BuiltinFont::Helvetica,
            });
            ops.push(Op::EndTextSection);
        }

        let mut doc = PdfDocument::new(title);
        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), warnings = warnings.len(), "Stamp rendered");

        Ok(output)
    }

    /// Create a stamp and write it directly to a file.
    pub fn write_stamp_to_file(&self, lines: &[StampLine], path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.create_stamp(lines)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote stamp overlay to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfSource;

    fn branding() -> StampLine {
        StampLine {
            text: "Printed by Proofmark".to_string(),
            x: 40.0,
            y: 800.0,
            size: 9.0,
        }
    }

    #[test]
    fn stamp_is_a_single_page_of_the_requested_size() {
        let bytes = StampWriter::a4().create_stamp(&[branding()]).expect("stamp");
        let source = PdfSource::from_bytes(&bytes).expect("reopen");
        assert_eq!(source.page_count(), 1);

        let page_id = source.page_id(1).expect("page");
        let page = crate::pdf::page::PageBox::of(source.document(), page_id);
        let (w, h) = page.rotated_size();
        assert!((w - 595.3).abs() < 1.0, "width {}", w);
        assert!((h - 841.9).abs() < 1.0, "height {}", h);
    }

    #[test]
    fn stamp_file_is_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("brand.pdf");
        StampWriter::new(PaperSize::Letter)
            .write_stamp_to_file(&[branding()], &path)
            .expect("write");
        assert!(std::fs::metadata(&path).expect("metadata").len() > 0);
    }
}
