// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ObjectBucket, Splitter, bucket_index, centroid_bounds};
use crate::accel::aabb::Aabb;
use crate::constants::{BVH_LEAF_FORCE_COUNT, BVH_NUM_BUCKETS};
use crate::scene::triangle::Triangle;
use crate::scene::TriangleMapping;

/// Surface Area Heuristic splitter over triangle centroids. Buckets the
/// centroids along the longest centroid axis and picks the cheapest of the
/// `BVH_NUM_BUCKETS - 1` candidate planes. Each triangle lands in exactly
/// one child.
pub struct CentroidSahSplitter;

impl Splitter for CentroidSahSplitter {
    fn get_split(
        triangles: &[Triangle],
        indices: &[u32],
        bounds: &Aabb,
    ) -> Option<(TriangleMapping, TriangleMapping)> {
        debug_assert!(bounds.is_valid());

        if indices.len() <= BVH_LEAF_FORCE_COUNT {
            return None;
        }

        let centroids = centroid_bounds(triangles, indices);
        debug_assert!(bounds.contains(&centroids));

        let axis = centroids.longest_axis();
        let low = centroids.min[axis];
        let high = centroids.max[axis];
        // every centroid coincides on the longest axis: nothing to split
        if low >= high {
            return None;
        }
        let range = high - low;

        let mut buckets = [ObjectBucket::EMPTY; BVH_NUM_BUCKETS];
        for &idx in indices {
            let tri = &triangles[idx as usize];
            let bucket = &mut buckets[bucket_index(tri.average_coord(axis), low, range)];
            // count by centroid, but bound by the triangle's full extent
            bucket.bounds = bucket.bounds.union(tri.bounds());
            bucket.count += 1;
        }

        let parent_area = bounds.surface_area();
        let mut best_bucket = 0;
        let mut min_cost = f32::INFINITY;

        for i in 0..BVH_NUM_BUCKETS - 1 {
            let mut left = ObjectBucket::EMPTY;
            for bucket in &buckets[..=i] {
                left.bounds = left.bounds.union(bucket.bounds);
                left.count += bucket.count;
            }

            let mut right = ObjectBucket::EMPTY;
            for bucket in &buckets[i + 1..] {
                right.bounds = right.bounds.union(bucket.bounds);
                right.count += bucket.count;
            }

            let cost = 1.0
                + (left.count as f32 * left.bounds.surface_area()
                    + right.count as f32 * right.bounds.surface_area())
                    / parent_area;

            if cost < min_cost {
                min_cost = cost;
                best_bucket = i;
            }
        }

        // splitting must beat testing every triangle in this node
        if min_cost > indices.len() as f32 {
            return None;
        }

        let mut left = TriangleMapping::new();
        let mut right = TriangleMapping::new();
        for &idx in indices {
            let pos = triangles[idx as usize].average_coord(axis);
            if bucket_index(pos, low, range) <= best_bucket {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }

        // no duplication here: every triangle sits on exactly one side
        debug_assert_eq!(left.len() + right.len(), indices.len());
        debug_assert!(!left.is_empty());
        debug_assert!(!right.is_empty());

        Some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::accel::split::extrema_bounds;

    fn flat_tri(x: f32) -> Triangle {
        Triangle::new(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x + 1.0, 0.0, 0.0),
            Vec3::new(x, 1.0, 0.0),
        )
    }

    #[test]
    fn test_small_subset_forces_leaf() {
        let triangles: Vec<_> = (0..3).map(|i| flat_tri(i as f32)).collect();
        let indices = [0u32, 1, 2];
        let bounds = extrema_bounds(&triangles, &indices);
        assert!(CentroidSahSplitter::get_split(&triangles, &indices, &bounds).is_none());
    }

    #[test]
    fn test_coincident_centroids_force_leaf() {
        let triangles: Vec<_> = (0..8).map(|_| flat_tri(0.0)).collect();
        let indices: Vec<u32> = (0..8).collect();
        let bounds = extrema_bounds(&triangles, &indices);
        assert!(CentroidSahSplitter::get_split(&triangles, &indices, &bounds).is_none());
    }

    #[test]
    fn test_two_clusters_split_cleanly() {
        // two groups of four, far apart on x
        let triangles: Vec<_> = (0..4)
            .map(|i| flat_tri(i as f32 * 0.1))
            .chain((0..4).map(|i| flat_tri(100.0 + i as f32 * 0.1)))
            .collect();
        let indices: Vec<u32> = (0..8).collect();
        let bounds = extrema_bounds(&triangles, &indices);

        let (left, right) =
            CentroidSahSplitter::get_split(&triangles, &indices, &bounds).expect("should split");
        assert_eq!(left, vec![0, 1, 2, 3]);
        assert_eq!(right, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_partition_accounts_for_every_triangle() {
        let triangles: Vec<_> = (0..32).map(|i| flat_tri((i * i % 23) as f32)).collect();
        let indices: Vec<u32> = (0..32).collect();
        let bounds = extrema_bounds(&triangles, &indices);

        if let Some((left, right)) = CentroidSahSplitter::get_split(&triangles, &indices, &bounds) {
            assert_eq!(left.len() + right.len(), indices.len());
            let mut all: Vec<u32> = left.iter().chain(right.iter()).copied().collect();
            all.sort_unstable();
            assert_eq!(all, indices);
        }
    }
}
