// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// BVH construction
pub const BVH_NUM_BUCKETS: usize = 8;
// Subsets at or below this size always become a leaf.
pub const BVH_LEAF_FORCE_COUNT: usize = 3;

// Traversal
// Initial capacity of the explicit traversal stack; grows on demand for
// pathological trees.
pub const TRAVERSAL_STACK_DEPTH: usize = 64;

// Ray/triangle intersection
pub const MOLLER_TRUMBORE_EPS: f32 = 1e-7;

// Bounce budget for freshly spawned rays
pub const STARTING_TTL: i32 = 10;
