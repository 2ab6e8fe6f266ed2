// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Proofmark: paper sizes, overlay categories and page
// selection descriptors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Points per millimetre (1 pt = 1/72 in, 1 in = 25.4 mm).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF user-space points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (w as f32 * PT_PER_MM, h as f32 * PT_PER_MM)
    }
}

/// Which group of overlays an [`OverlayDetail`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCategory {
    /// Branding drawn on page 1 only.
    FirstPage,
    /// Drawn on every page, after everything else.
    AllPages,
    /// Perforation marks on selected pages.
    PerforationLine,
    /// Payment slips on selected pages.
    Payment,
}

impl fmt::Display for OverlayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstPage => "first-page",
            Self::AllPages => "all-pages",
            Self::PerforationLine => "perforation-line",
            Self::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// Which pages a custom-placed overlay lands on.
///
/// Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PageSelection {
    Single { page: u32 },
    /// Inclusive on both ends; empty when `from > to`.
    Range { from: u32, to: u32 },
    /// Comma-delimited page list, kept verbatim until resolution.
    Custom { pages: String },
    All,
}

/// Overlay files and placement for one [`OverlayCategory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayDetail {
    /// Overlay document file names, relative to the overlay directory,
    /// drawn in list order.
    pub overlay_files: Vec<String>,
    /// Gates `PerforationLine` and `Payment`; ignored by the other categories.
    #[serde(default)]
    pub enabled: bool,
    /// Only meaningful for categories that use page selection.
    #[serde(default)]
    pub page_selection: Option<PageSelection>,
}

impl OverlayDetail {
    /// Detail for `FirstPage` / `AllPages`, which never use page selection.
    pub fn always(overlay_files: Vec<String>) -> Self {
        Self {
            overlay_files,
            enabled: true,
            page_selection: None,
        }
    }

    /// Enabled detail placed on the given pages.
    pub fn on_pages(overlay_files: Vec<String>, selection: PageSelection) -> Self {
        Self {
            overlay_files,
            enabled: true,
            page_selection: Some(selection),
        }
    }
}

/// Mapping of overlay category to its detail, as supplied by the caller.
pub type OverlayPlan = BTreeMap<OverlayCategory, OverlayDetail>;
