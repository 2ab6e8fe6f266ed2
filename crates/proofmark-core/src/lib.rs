// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Proofmark: Core types, configuration and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod outcome;
pub mod types;

pub use config::{PreflightConfig, load_overlay_plan};
pub use error::ProofmarkError;
pub use outcome::Outcome;
pub use types::*;
