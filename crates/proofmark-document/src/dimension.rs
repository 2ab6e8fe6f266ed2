// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tolerance-based page size comparison.

use proofmark_core::PreflightConfig;

/// Compares actual page dimensions against an expected paper size.
///
/// The tolerance band is open: a value exactly `tolerance` away from the
/// expected size does not match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionChecker {
    expected_width: f32,
    expected_height: f32,
    tolerance: f32,
}

impl DimensionChecker {
    pub fn new(expected_width: f32, expected_height: f32, tolerance: f32) -> Self {
        Self {
            expected_width,
            expected_height,
            tolerance,
        }
    }

    /// Checker for the configured paper size and tolerance.
    pub fn from_config(config: &PreflightConfig) -> Self {
        let (width, height) = config.expected_size_pt();
        Self::new(width, height, config.tolerance_pt)
    }

    pub fn check_width(&self, actual: f32) -> bool {
        within(self.expected_width, self.tolerance, actual)
    }

    pub fn check_height(&self, actual: f32) -> bool {
        within(self.expected_height, self.tolerance, actual)
    }

    /// Both axes match.
    pub fn matches(&self, width: f32, height: f32) -> bool {
        self.check_width(width) && self.check_height(height)
    }
}

fn within(expected: f32, tolerance: f32, actual: f32) -> bool {
    expected - tolerance < actual && actual < expected + tolerance
}
