// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Proofmark.

use thiserror::Error;

use crate::types::OverlayCategory;

/// Top-level error type for all Proofmark operations.
#[derive(Debug, Error)]
pub enum ProofmarkError {
    // -- Document access --
    #[error("document requires a password: {0}")]
    PasswordRequired(String),

    #[error("expected file not found: {0}")]
    NotFound(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Page selection --
    #[error("invalid page selection: {0}")]
    PageSelection(String),

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    // -- Configuration --
    #[error("overlay plan has no entry for {0}")]
    MissingOverlay(OverlayCategory),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProofmarkError {
    /// Whether a caller may degrade to a fallback value instead of failing.
    ///
    /// Only generic read/write/parse failures qualify; password, missing
    /// artifact, page selection and configuration errors always propagate.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::PdfError(_) | Self::Io(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProofmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_pdf_errors_are_degradable() {
        let io = ProofmarkError::Io(std::io::Error::other("disk gone"));
        assert!(io.is_degradable());
        assert!(ProofmarkError::PdfError("bad xref".into()).is_degradable());
    }

    #[test]
    fn contract_errors_propagate() {
        assert!(!ProofmarkError::PasswordRequired("a.pdf".into()).is_degradable());
        assert!(!ProofmarkError::NotFound("overlay/a.pdf".into()).is_degradable());
        assert!(!ProofmarkError::PageSelection("x".into()).is_degradable());
        assert!(
            !ProofmarkError::PageOutOfRange {
                page: 9,
                page_count: 2
            }
            .is_degradable()
        );
        assert!(!ProofmarkError::MissingOverlay(OverlayCategory::FirstPage).is_degradable());
    }

    #[test]
    fn out_of_range_message_names_both_numbers() {
        let err = ProofmarkError::PageOutOfRange {
            page: 7,
            page_count: 5,
        };
        assert_eq!(
            err.to_string(),
            "page 7 out of range (document has 5 pages)"
        );
    }
}
