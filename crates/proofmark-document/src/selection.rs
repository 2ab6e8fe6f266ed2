// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page selection: resolve a PageSelection against a document's page count.

use proofmark_core::PageSelection;
use proofmark_core::error::{ProofmarkError, Result};

/// Resolve `selection` into 1-based page numbers, in the order given.
///
/// Custom lists keep duplicates and order. Any page outside
/// `1..=page_count` fails with [`ProofmarkError::PageOutOfRange`] rather than
/// being clamped.
pub fn resolve_pages(selection: &PageSelection, page_count: u32) -> Result<Vec<u32>> {
    let pages = match selection {
        PageSelection::Single { page } => vec![*page],
        PageSelection::Range { from, to } => {
            if from <= to {
                check_range(*from, *to, page_count)?;
            }
            (*from..=*to).collect()
        }
        PageSelection::Custom { pages } => parse_custom(pages)?,
        PageSelection::All => (1..=page_count).collect(),
    };

    if let Some(&page) = pages.iter().find(|&&page| page == 0 || page > page_count) {
        return Err(ProofmarkError::PageOutOfRange { page, page_count });
    }
    Ok(pages)
}

/// Bounds check for a non-empty range, reporting the first page outside
/// the document.
fn check_range(from: u32, to: u32, page_count: u32) -> Result<()> {
    let outside = if from == 0 || from > page_count {
        Some(from)
    } else if to > page_count {
        Some(page_count + 1)
    } else {
        None
    };
    match outside {
        Some(page) => Err(ProofmarkError::PageOutOfRange { page, page_count }),
        None => Ok(()),
    }
}

fn parse_custom(list: &str) -> Result<Vec<u32>> {
    list.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<u32>().map_err(|_| {
                ProofmarkError::PageSelection(format!("'{}' is not a page number in '{}'", token, list))
            })
        })
        .collect()
}
