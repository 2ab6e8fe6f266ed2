// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preflight facade: the caller-facing operations, bound to one immutable
// configuration. I/O-class failures come back as `Outcome::Degraded` with
// the historical fallback value; every other error propagates. Overlap
// marking is the exception and degrades on any error.

use std::path::Path;

use chrono::Utc;
use proofmark_core::error::{ProofmarkError, Result};
use proofmark_core::{OverlayPlan, Outcome, PreflightConfig};
use tracing::{info, instrument, warn};

use crate::compose::OverlayComposer;
use crate::dimension::DimensionChecker;
use crate::integrity::hash_file;
use crate::marking::mark_overlaps;
use crate::validate::{self, ValidationReport};

/// Entry point for composition, marking and validation.
#[derive(Debug, Clone)]
pub struct Preflight {
    config: PreflightConfig,
    checker: DimensionChecker,
    composer: OverlayComposer,
}

impl Preflight {
    pub fn new(config: PreflightConfig) -> Self {
        Self {
            checker: DimensionChecker::from_config(&config),
            composer: OverlayComposer::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &PreflightConfig {
        &self.config
    }

    /// Compose `source` into `dest`. Degrades to empty bytes.
    pub fn apply_overlays(
        &self,
        source: &Path,
        dest: &Path,
        plan: &OverlayPlan,
    ) -> Result<Outcome<Vec<u8>>> {
        Outcome::degrade_with(self.composer.apply_overlays(source, dest, plan), Vec::new)
    }

    /// Write a marked review copy.
    ///
    /// Any failure, including a locked input or a composed copy with fewer
    /// pages than the input, degrades to the unmodified input bytes.
    pub fn apply_overlap_marking(
        &self,
        input: &Path,
        session_dir: &Path,
        file_name: &str,
    ) -> Result<Outcome<Vec<u8>>> {
        Ok(Outcome::recover(mark_overlaps(input, session_dir, file_name), || {
            std::fs::read(input).unwrap_or_else(|err| {
                warn!(%err, input = %input.display(), "original unreadable, falling back to empty bytes");
                Vec::new()
            })
        }))
    }

    pub fn validate_password(&self, dir: &Path, file: &str) -> Result<Outcome<bool>> {
        Outcome::degrade_with(validate::validate_password(dir, file), || false)
    }

    /// `true` means some page differs from the expected size.
    pub fn validate_same_size(&self, dir: &Path, file: &str) -> Result<Outcome<bool>> {
        Outcome::degrade_with(validate::validate_same_size(dir, file, &self.checker), || false)
    }

    pub fn validate_embedded_fonts(&self, dir: &Path, file: &str) -> Result<Outcome<bool>> {
        Outcome::degrade_with(validate::validate_embedded_fonts(dir, file), || true)
    }

    pub fn validate_page_weight(&self, dir: &Path, file: &str) -> Result<Outcome<bool>> {
        Outcome::degrade_with(
            validate::validate_page_weight(dir, file, self.config.max_page_weight_mb),
            || true,
        )
    }

    /// `true` means marks overlap content in the composed copy.
    pub fn validate_overlapping(&self, dir: &Path, file: &str) -> Result<Outcome<bool>> {
        Outcome::degrade_with(validate::validate_overlapping(dir, file), || false)
    }

    /// Run every validator and collect the results.
    ///
    /// An encrypted file yields a locked report. A missing composed copy
    /// leaves `overlapping` unset.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn validate_all(&self, dir: &Path, file: &str) -> Result<ValidationReport> {
        let password = match self.validate_password(dir, file) {
            Err(ProofmarkError::PasswordRequired(_)) => {
                info!("file is password protected");
                return Ok(ValidationReport::locked(file));
            }
            other => other?,
        };

        let mut degraded = Vec::new();
        let mut take = |check: &str, outcome: Outcome<bool>| {
            if !outcome.is_completed() {
                degraded.push(check.to_string());
            }
            outcome.into_value()
        };

        let password_ok = take("password", password);
        let size_mismatch = take("same_size", self.validate_same_size(dir, file)?);
        let fonts_embedded = take("embedded_fonts", self.validate_embedded_fonts(dir, file)?);
        let page_weight_ok = take("page_weight", self.validate_page_weight(dir, file)?);
        let overlapping = match self.validate_overlapping(dir, file) {
            Ok(outcome) => Some(take("overlapping", outcome)),
            Err(ProofmarkError::NotFound(path)) => {
                info!(%path, "no composed copy, overlap check skipped");
                None
            }
            Err(err) => return Err(err),
        };

        let sha256 = hash_file(dir.join(file)).ok();
        let report = ValidationReport {
            file: file.to_string(),
            checked_at: Utc::now(),
            sha256,
            password_ok,
            size_mismatch,
            fonts_embedded,
            page_weight_ok,
            overlapping,
            degraded,
        };
        info!(passed = report.passed(), "Validation complete");
        Ok(report)
    }
}
