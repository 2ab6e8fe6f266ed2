// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preflight configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ProofmarkError, Result};
use crate::{OverlayPlan, PaperSize};

/// Immutable settings shared by every validation and composition call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Expected paper size of print-ready pages.
    pub paper: PaperSize,
    /// Allowed deviation from the expected width and height, in points.
    pub tolerance_pt: f32,
    /// Directory overlay file names are resolved against.
    pub overlay_dir: PathBuf,
    /// Maximum average file size per page, in megabytes.
    pub max_page_weight_mb: f64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            tolerance_pt: 3.0,
            overlay_dir: PathBuf::from("overlays"),
            max_page_weight_mb: 0.3,
        }
    }
}

impl PreflightConfig {
    /// Load configuration from a JSON file; missing fields take defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(?config, "Preflight configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.tolerance_pt > 0.0) {
            return Err(ProofmarkError::Config(format!(
                "tolerance_pt must be positive, got {}",
                self.tolerance_pt
            )));
        }
        if !(self.max_page_weight_mb > 0.0) {
            return Err(ProofmarkError::Config(format!(
                "max_page_weight_mb must be positive, got {}",
                self.max_page_weight_mb
            )));
        }
        Ok(())
    }

    /// Expected (width, height) in points.
    pub fn expected_size_pt(&self) -> (f32, f32) {
        self.paper.dimensions_pt()
    }
}

/// Load an overlay plan from JSON, e.g.
/// `{"first_page": {"overlay_files": ["logo.pdf"]}, ...}`.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_overlay_plan(path: impl AsRef<Path>) -> Result<OverlayPlan> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let plan: OverlayPlan = serde_json::from_str(&raw)?;
    debug!(categories = plan.len(), "Overlay plan loaded");
    Ok(plan)
}
