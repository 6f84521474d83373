// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod ray;
pub mod triangle;

use self::triangle::Triangle;

/// The immutable triangle soup a BVH is built over. Builders and traversal
/// borrow it read-only; the BVH never outlives it.
pub type TriangleSet = Vec<Triangle>;

/// An ordered set of indices into a [`TriangleSet`]; how builders pass
/// triangle subsets around without copying triangle data.
pub type TriangleMapping = Vec<u32>;
