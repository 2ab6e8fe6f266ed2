// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Success-or-degraded results for batch-friendly operations.

use tracing::error;

use crate::error::{ProofmarkError, Result};

/// Result of an operation that degrades rather than fails on I/O problems.
///
/// `Completed` carries the real payload. `Degraded` carries the fallback the
/// caller would historically have received (empty bytes, `false`, the
/// original document) together with the error that caused it, so "passed"
/// and "silently failed" stay distinguishable.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Degraded { fallback: T, error: ProofmarkError },
}

impl<T> Outcome<T> {
    /// Convert a fallible result, degrading only on degradable errors.
    ///
    /// Non-degradable errors are returned as `Err` untouched.
    pub fn degrade_with(result: Result<T>, fallback: impl FnOnce() -> T) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Completed(value)),
            Err(err) if err.is_degradable() => {
                error!(%err, "operation degraded to fallback value");
                Ok(Self::Degraded {
                    fallback: fallback(),
                    error: err,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Convert a fallible result, degrading on any error.
    ///
    /// For operations whose contract is to hand back a usable fallback no
    /// matter why they failed.
    pub fn recover(result: Result<T>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => {
                error!(%err, "operation failed, returning fallback value");
                Self::Degraded {
                    fallback: fallback(),
                    error: err,
                }
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The payload, whichever branch produced it.
    pub fn into_value(self) -> T {
        match self {
            Self::Completed(value) => value,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Completed(value) => value,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn error(&self) -> Option<&ProofmarkError> {
        match self {
            Self::Completed(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }
}
