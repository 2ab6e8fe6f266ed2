// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: opening documents, page boxes, appending content, importing
// overlay pages as forms, and authoring stamp overlays.

pub mod canvas;
pub mod form;
pub(crate) mod objects;
pub mod page;
pub mod reader;
pub mod writer;

pub use canvas::PageCanvas;
pub use page::PageBox;
pub use reader::PdfSource;
pub use writer::{StampLine, StampWriter};
