// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry module: points, affine matrices and axis-aligned rectangles in
// PDF user space.

pub mod matrix;
pub mod rect;

pub use matrix::{Matrix, Point};
pub use rect::Rect;
