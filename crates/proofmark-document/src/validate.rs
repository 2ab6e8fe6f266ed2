// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Validator suite: independent read-only checks over a stored document,
// addressed as `<dir>/<file>`.

use std::path::Path;

use chrono::{DateTime, Utc};
use lopdf::{Document, Object};
use proofmark_core::error::{ProofmarkError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::dimension::DimensionChecker;
use crate::marking::COMPOSED_DIR;
use crate::overlap::document_overlaps;
use crate::pdf::objects::name;
use crate::pdf::{PageBox, PdfSource};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Opens without a password.
///
/// Returns `Ok(true)` for readable documents and
/// [`ProofmarkError::PasswordRequired`] for encrypted ones.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn validate_password(dir: &Path, file: &str) -> Result<bool> {
    PdfSource::open(dir.join(file))?;
    Ok(true)
}

/// `true` when **any** page's displayed size differs from the expected
/// paper size, i.e. `true` means a problem was found.
#[instrument(skip(dir, checker), fields(dir = %dir.display()))]
pub fn validate_same_size(dir: &Path, file: &str, checker: &DimensionChecker) -> Result<bool> {
    let pdf = PdfSource::open(dir.join(file))?;
    let mismatched: Vec<usize> = pdf
        .page_ids()
        .into_iter()
        .enumerate()
        .filter(|(_, page_id)| {
            let (width, height) = PageBox::of(pdf.document(), *page_id).rotated_size();
            !checker.matches(width, height)
        })
        .map(|(index, _)| index + 1)
        .collect();
    if !mismatched.is_empty() {
        info!(pages = ?mismatched, "pages differ from expected paper size");
    }
    Ok(!mismatched.is_empty())
}

/// `true` when every font dictionary names a subset-embedded font.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn validate_embedded_fonts(dir: &Path, file: &str) -> Result<bool> {
    let pdf = PdfSource::open(dir.join(file))?;
    let missing = unembedded_fonts(pdf.document());
    if !missing.is_empty() {
        info!(fonts = ?missing, "fonts are not subset-embedded");
    }
    Ok(missing.is_empty())
}

/// `true` when the average size per page is within `max_mb_per_page`.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn validate_page_weight(dir: &Path, file: &str, max_mb_per_page: f64) -> Result<bool> {
    let path = dir.join(file);
    let pdf = PdfSource::open(&path)?;
    Ok(page_weight_ok(pdf.byte_len(), pdf.page_count(), max_mb_per_page))
}

/// `true` when any mark overlaps printed content in the composed copy at
/// `<dir>/overlay/<file>`.
///
/// A missing composed copy is [`ProofmarkError::NotFound`].
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn validate_overlapping(dir: &Path, file: &str) -> Result<bool> {
    let path = dir.join(COMPOSED_DIR).join(file);
    if !path.exists() {
        return Err(ProofmarkError::NotFound(path.display().to_string()));
    }
    let pdf = PdfSource::open(&path)?;
    let total: usize = document_overlaps(&pdf)?.iter().map(|page| page.len()).sum();
    debug!(total, "overlapping marks counted");
    Ok(total > 0)
}

/// BaseFont names of font dictionaries that are not subset-embedded.
pub fn unembedded_fonts(doc: &Document) -> Vec<String> {
    doc.objects
        .values()
        .filter_map(|object| match object {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        })
        .filter(|dict| dict.get(b"Type").ok().and_then(name) == Some(b"Font".as_slice()))
        .filter_map(|dict| dict.get(b"BaseFont").ok().and_then(name))
        .filter(|base_font| !is_subset_name(base_font))
        .map(|base_font| String::from_utf8_lossy(base_font).into_owned())
        .collect()
}

/// Six-letter subset tag followed by `+` and a non-empty font name, as in
/// `ABCDEF+Arial`.
pub fn is_subset_name(base_font: &[u8]) -> bool {
    base_font.len() > 7 && base_font[6] == b'+'
}

/// Average megabytes per page within the limit. A document without pages
/// never passes.
pub fn page_weight_ok(file_bytes: u64, page_count: u32, max_mb_per_page: f64) -> bool {
    if page_count == 0 {
        return false;
    }
    let average = file_bytes as f64 / BYTES_PER_MB / page_count as f64;
    average <= max_mb_per_page
}

/// Outcome of running every validator over one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub file: String,
    pub checked_at: DateTime<Utc>,
    /// SHA-256 of the validated file, when it could be read.
    pub sha256: Option<String>,
    pub password_ok: bool,
    /// `true` when some page differs from the expected paper size.
    pub size_mismatch: bool,
    pub fonts_embedded: bool,
    pub page_weight_ok: bool,
    /// `None` when no composed copy exists to check.
    pub overlapping: Option<bool>,
    /// Checks that could not run and report their fallback value.
    pub degraded: Vec<String>,
}

impl ValidationReport {
    /// Report for a file that cannot be opened without a password; no other
    /// check can run.
    pub fn locked(file: &str) -> Self {
        Self {
            file: file.to_string(),
            checked_at: Utc::now(),
            sha256: None,
            password_ok: false,
            size_mismatch: false,
            fonts_embedded: false,
            page_weight_ok: false,
            overlapping: None,
            degraded: Vec::new(),
        }
    }

    /// Every check ran and none found a problem.
    pub fn passed(&self) -> bool {
        self.password_ok
            && !self.size_mismatch
            && self.fonts_embedded
            && self.page_weight_ok
            && self.overlapping != Some(true)
            && self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use lopdf::dictionary;

    fn store(dir: &Path, file: &str, mut doc: Document) {
        fixtures::write(&mut doc, &dir.join(file));
    }

    #[test]
    fn subset_names_need_tag_and_plus() {
        assert!(is_subset_name(b"ABCDEF+Arial"));
        assert!(!is_subset_name(b"Arial"));
        assert!(!is_subset_name(b"ABCDEF+"));
        assert!(!is_subset_name(b"ABCDEFG+Arial"));
    }

    #[test]
    fn page_weight_threshold() {
        let mb = |n: f64| (n * BYTES_PER_MB) as u64;
        assert!(page_weight_ok(mb(2.5), 10, 0.3));
        assert!(!page_weight_ok(mb(3.5), 10, 0.3));
        assert!(page_weight_ok(mb(3.0), 10, 0.3));
        assert!(!page_weight_ok(0, 0, 0.3));
    }

    #[test]
    fn small_document_passes_page_weight() {
        let dir = tempfile::tempdir().expect("tempdir");
        store(dir.path(), "doc.pdf", fixtures::document(vec![Vec::new(); 2], fixtures::A4));
        assert!(validate_page_weight(dir.path(), "doc.pdf", 0.3).expect("weight"));
    }

    #[test]
    fn page_weight_uses_the_loaded_file_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        store(dir.path(), "doc.pdf", fixtures::document(vec![Vec::new(); 2], fixtures::A4));
        let on_disk = std::fs::metadata(dir.path().join("doc.pdf")).expect("stat").len();
        let per_page_mb = on_disk as f64 / BYTES_PER_MB / 2.0;

        assert!(validate_page_weight(dir.path(), "doc.pdf", per_page_mb).expect("at limit"));
        assert!(!validate_page_weight(dir.path(), "doc.pdf", per_page_mb * 0.99).expect("below"));
    }

    #[test]
    fn same_size_reports_true_on_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let checker = DimensionChecker::new(595.0, 842.0, 3.0);
        store(dir.path(), "a4.pdf", fixtures::document(vec![Vec::new(); 2], fixtures::A4));
        store(dir.path(), "letter.pdf", fixtures::document(vec![Vec::new()], (612.0, 792.0)));

        assert!(!validate_same_size(dir.path(), "a4.pdf", &checker).expect("a4"));
        assert!(validate_same_size(dir.path(), "letter.pdf", &checker).expect("letter"));
    }

    #[test]
    fn rotated_landscape_page_counts_as_expected_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (doc, _) = fixtures::inherited_box_doc(842.0, 595.0, 90);
        store(dir.path(), "rotated.pdf", doc);
        let checker = DimensionChecker::new(595.0, 842.0, 3.0);
        assert!(!validate_same_size(dir.path(), "rotated.pdf", &checker).expect("rotated"));
    }

    #[test]
    fn fonts_without_subset_tag_fail() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Fixture pages reference a plain Helvetica.
        store(dir.path(), "plain.pdf", fixtures::document(vec![Vec::new()], fixtures::A4));
        assert!(!validate_embedded_fonts(dir.path(), "plain.pdf").expect("plain"));

        let mut doc = Document::with_version("1.5");
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Arial",
        });
        assert!(unembedded_fonts(&doc).is_empty());
        doc.add_object(dictionary! { "Type" => "Font", "BaseFont" => "Arial" });
        assert_eq!(unembedded_fonts(&doc), vec!["Arial".to_string()]);
    }

    #[test]
    fn overlapping_requires_composed_copy() {
        let dir = tempfile::tempdir().expect("tempdir");
        match validate_overlapping(dir.path(), "doc.pdf") {
            Err(ProofmarkError::NotFound(path)) => assert!(path.ends_with("doc.pdf")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn overlapping_counts_across_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let composed = dir.path().join(COMPOSED_DIR);
        std::fs::create_dir(&composed).expect("overlay dir");
        let line = b"1 0 0 RG 0 100 m 200 100 l S".to_vec();
        let crossed = b"1 0 0 RG 0 100 m 200 100 l S BT /F1 12 Tf 20 98 Td (X) Tj ET".to_vec();

        store(&composed, "clean.pdf", fixtures::document(vec![line.clone(), line.clone()], fixtures::A4));
        store(&composed, "crossed.pdf", fixtures::document(vec![line, crossed], fixtures::A4));

        assert!(!validate_overlapping(dir.path(), "clean.pdf").expect("clean"));
        assert!(validate_overlapping(dir.path(), "crossed.pdf").expect("crossed"));
    }

    #[test]
    fn password_check_accepts_plain_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        store(dir.path(), "doc.pdf", fixtures::document(vec![Vec::new()], fixtures::A4));
        assert!(validate_password(dir.path(), "doc.pdf").expect("password"));
    }

    #[test]
    fn report_passes_only_when_every_check_is_clean() {
        let mut report = ValidationReport::locked("doc.pdf");
        assert!(!report.passed());
        report.password_ok = true;
        report.fonts_embedded = true;
        report.page_weight_ok = true;
        assert!(report.passed());
        report.overlapping = Some(true);
        assert!(!report.passed());
    }
}
