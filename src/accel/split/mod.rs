// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod centroid_sah;
pub mod sbvh;
pub mod stupid;

use crate::accel::aabb::Aabb;
use crate::constants::BVH_NUM_BUCKETS;
use crate::scene::triangle::Triangle;
use crate::scene::TriangleMapping;

/// A partitioning strategy for the recursive builder.
///
/// `get_split` either returns the two child subsets or `None` to make the
/// node a leaf. On a split, both sides are non-empty and neither equals the
/// whole input; an index may land on both sides only for spatial splits.
pub trait Splitter {
    fn get_split(
        triangles: &[Triangle],
        indices: &[u32],
        bounds: &Aabb,
    ) -> Option<(TriangleMapping, TriangleMapping)>;
}

/// AABB around the full extents of a triangle subset.
pub fn extrema_bounds(triangles: &[Triangle], indices: &[u32]) -> Aabb {
    debug_assert!(!indices.is_empty());
    indices.iter().fold(Aabb::EMPTY, |acc, &idx| {
        acc.union(triangles[idx as usize].bounds())
    })
}

/// AABB around the centroids of a triangle subset. Always contained in the
/// subset's extrema bounds.
pub fn centroid_bounds(triangles: &[Triangle], indices: &[u32]) -> Aabb {
    debug_assert!(!indices.is_empty());
    indices.iter().fold(Aabb::EMPTY, |acc, &idx| {
        acc.expand(triangles[idx as usize].centroid())
    })
}

/// Which of the `BVH_NUM_BUCKETS` equal-width buckets over `[low, low +
/// range]` a coordinate falls in; the top edge folds into the last bucket.
pub fn bucket_index(pos: f32, low: f32, range: f32) -> usize {
    debug_assert!(range > 0.0);
    let bucket = (((pos - low) / range) * BVH_NUM_BUCKETS as f32) as usize;
    bucket.min(BVH_NUM_BUCKETS - 1)
}

/// Per-bucket accumulator for object (centroid) splits.
#[derive(Debug, Clone, Copy)]
pub struct ObjectBucket {
    pub bounds: Aabb,
    pub count: u32,
}

impl ObjectBucket {
    pub const EMPTY: Self = Self {
        bounds: Aabb::EMPTY,
        count: 0,
    };
}
