// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use super::Splitter;
use crate::accel::aabb::Aabb;
use crate::scene::triangle::Triangle;
use crate::scene::TriangleMapping;

/// Never splits: the whole soup lands in a single root leaf, so traversal
/// degrades to a linear scan. The worst-case baseline, and a handy fixture
/// for sanity tests.
pub struct StupidSplitter;

impl Splitter for StupidSplitter {
    fn get_split(
        _triangles: &[Triangle],
        _indices: &[u32],
        _bounds: &Aabb,
    ) -> Option<(TriangleMapping, TriangleMapping)> {
        None
    }
}
