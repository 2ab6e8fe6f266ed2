// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for document-production operators.
//
// Every technical error is mapped to plain English with a concrete next step.

use crate::error::ProofmarkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fix the job input (page list, overlay plan) and run again.
    ActionRequired,
    /// The document itself must be replaced or re-exported.
    Permanent,
    /// Filesystem or environment trouble; retrying may help.
    Transient,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `ProofmarkError` into a message an operator can act on.
pub fn humanize_error(err: &ProofmarkError) -> HumanError {
    match err {
        ProofmarkError::PasswordRequired(_) => HumanError {
            message: "This PDF is password protected.".into(),
            suggestion: "Ask the sender for an unprotected export; protected files cannot be preflighted.".into(),
            severity: Severity::Permanent,
        },

        ProofmarkError::NotFound(path) => HumanError {
            message: "A file the check depends on is missing.".into(),
            suggestion: format!("Run overlay composition first so that {path} exists."),
            severity: Severity::ActionRequired,
        },

        ProofmarkError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Re-export it from the source application and try again.".into(),
            severity: Severity::Permanent,
        },

        ProofmarkError::PageSelection(detail) => HumanError {
            message: "The custom page list could not be read.".into(),
            suggestion: format!("Use comma-separated page numbers such as \"1,3,5\". ({detail})"),
            severity: Severity::ActionRequired,
        },

        ProofmarkError::PageOutOfRange { page, page_count } => HumanError {
            message: format!("Page {page} does not exist."),
            suggestion: format!("The document has {page_count} pages; adjust the page selection."),
            severity: Severity::ActionRequired,
        },

        ProofmarkError::MissingOverlay(category) => HumanError {
            message: format!("The overlay plan has no {category} entry."),
            suggestion: "First-page and all-pages overlays are required; add them (an empty file list is fine).".into(),
            severity: Severity::ActionRequired,
        },

        ProofmarkError::Config(detail) => HumanError {
            message: "The preflight configuration is invalid.".into(),
            suggestion: detail.clone(),
            severity: Severity::ActionRequired,
        },

        ProofmarkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "Check the path and the overlay directory setting.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Reading or writing a file failed.".into(),
                    suggestion: format!("Check disk space and permissions, then try again. ({io_err})"),
                    severity: Severity::Transient,
                }
            }
        }

        ProofmarkError::Serialization(_) => HumanError {
            message: "A JSON file could not be read.".into(),
            suggestion: "Check the configuration or overlay plan for syntax errors.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OverlayCategory;

    #[test]
    fn password_is_permanent() {
        let human = humanize_error(&ProofmarkError::PasswordRequired("a.pdf".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn out_of_range_mentions_page_count() {
        let human = humanize_error(&ProofmarkError::PageOutOfRange {
            page: 9,
            page_count: 4,
        });
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains('4'));
    }

    #[test]
    fn missing_overlay_names_category() {
        let human = humanize_error(&ProofmarkError::MissingOverlay(OverlayCategory::AllPages));
        assert!(human.message.contains("all-pages"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = ProofmarkError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
