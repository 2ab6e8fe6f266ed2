// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF source: open a document, detect password protection, and address its
// pages by 1-based number.

use std::path::Path;

use lopdf::{Document, ObjectId};
use proofmark_core::error::{ProofmarkError, Result};
use tracing::{debug, info, instrument};

/// An opened PDF document and where it came from.
pub struct PdfSource {
    /// The underlying lopdf document.
    document: Document,
    /// Size of the serialised input.
    byte_len: u64,
}

impl PdfSource {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    ///
    /// Encrypted documents fail with [`ProofmarkError::PasswordRequired`];
    /// any other read or parse failure is a degradable error.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let data = std::fs::read(path_ref)?;
        Self::load(&data, &path_ref.display().to_string())
    }

    /// Open a PDF already held in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::load(data, "in-memory PDF")
    }

    fn load(data: &[u8], label: &str) -> Result<Self> {
        let document = match Document::load_mem(data) {
            Ok(document) => document,
            Err(err) if looks_encrypted(data) => {
                debug!(%err, "load failed on an encrypted document");
                return Err(ProofmarkError::PasswordRequired(label.to_string()));
            }
            Err(err) => {
                return Err(ProofmarkError::PdfError(format!(
                    "failed to open {}: {}",
                    label, err
                )));
            }
        };
        if document.is_encrypted() {
            return Err(ProofmarkError::PasswordRequired(label.to_string()));
        }

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            byte_len: data.len() as u64,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Size in bytes of the file or buffer this document was loaded from.
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // lopdf pages are keyed by 1-indexed page number, in a BTreeMap.
        self.document.get_pages().into_values().collect()
    }

    /// Object id of page `page_number` (1-based).
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages
            .get(&page_number)
            .copied()
            .ok_or(ProofmarkError::PageOutOfRange {
                page: page_number,
                page_count: pages.len() as u32,
            })
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise the (possibly modified) document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            ProofmarkError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}

/// A trailer or object referencing an /Encrypt dictionary.
fn looks_encrypted(data: &[u8]) -> bool {
    data.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}
