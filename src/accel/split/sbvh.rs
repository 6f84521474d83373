// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ObjectBucket, Splitter, bucket_index, centroid_bounds};
use crate::accel::aabb::Aabb;
use crate::constants::{BVH_LEAF_FORCE_COUNT, BVH_NUM_BUCKETS};
use crate::scene::triangle::Triangle;
use crate::scene::TriangleMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitKind {
    Object,
    Spatial,
}

/// Running minimum over every (axis, plane, kind) candidate.
#[derive(Debug)]
struct SplitDecision {
    min_cost: f32,
    bucket: usize,
    axis: usize,
    kind: SplitKind,
}

impl SplitDecision {
    fn new() -> Self {
        Self {
            min_cost: f32::INFINITY,
            bucket: 0,
            axis: 0,
            kind: SplitKind::Object,
        }
    }

    fn add_candidate(&mut self, cost: f32, bucket: usize, axis: usize, kind: SplitKind) {
        debug_assert!(cost.is_finite());
        if cost < self.min_cost {
            self.min_cost = cost;
            self.bucket = bucket;
            self.axis = axis;
            self.kind = kind;
        }
    }

    /// False when every axis was degenerate and no candidate was costed.
    fn is_resolved(&self) -> bool {
        self.min_cost < f32::INFINITY
    }
}

/// What a bucket contributes to the two sides of a candidate plane. Object
/// buckets count each triangle once on both views; spatial buckets count a
/// triangle where it enters (left view) and where it exits (right view).
trait Bucket {
    fn bounds(&self) -> Aabb;
    fn left_count(&self) -> u32;
    fn right_count(&self) -> u32;
}

impl Bucket for ObjectBucket {
    fn bounds(&self) -> Aabb {
        self.bounds
    }
    fn left_count(&self) -> u32 {
        self.count
    }
    fn right_count(&self) -> u32 {
        self.count
    }
}

#[derive(Debug, Clone, Copy)]
struct SpatialBucket {
    bounds: Aabb,
    entry_count: u32,
    exit_count: u32,
}

impl SpatialBucket {
    const EMPTY: Self = Self {
        bounds: Aabb::EMPTY,
        entry_count: 0,
        exit_count: 0,
    };
}

impl Bucket for SpatialBucket {
    fn bounds(&self) -> Aabb {
        self.bounds
    }
    fn left_count(&self) -> u32 {
        self.entry_count
    }
    fn right_count(&self) -> u32 {
        self.exit_count
    }
}

/// Cost every plane between consecutive buckets and feed the survivors into
/// `decision`. Planes where both sides count zero triangles are skipped.
fn find_min_cost_split<B: Bucket>(
    buckets: &[B; BVH_NUM_BUCKETS],
    parent_area: f32,
    axis: usize,
    kind: SplitKind,
    decision: &mut SplitDecision,
) {
    for i in 0..BVH_NUM_BUCKETS - 1 {
        let mut left_bounds = Aabb::EMPTY;
        let mut left_count = 0;
        for bucket in &buckets[..=i] {
            left_bounds = left_bounds.union(bucket.bounds());
            left_count += bucket.left_count();
        }

        let mut right_bounds = Aabb::EMPTY;
        let mut right_count = 0;
        for bucket in &buckets[i + 1..] {
            right_bounds = right_bounds.union(bucket.bounds());
            right_count += bucket.right_count();
        }

        if left_count == 0 && right_count == 0 {
            continue;
        }

        // an empty side contributes nothing; its bounds are still EMPTY and
        // must not be area-measured
        let left_area = if left_count > 0 {
            left_bounds.surface_area()
        } else {
            0.0
        };
        let right_area = if right_count > 0 {
            right_bounds.surface_area()
        } else {
            0.0
        };

        let cost = 1.0
            + (left_count as f32 * left_area + right_count as f32 * right_area) / parent_area;

        // zero-area soups make this 1 + 0/0; such planes are never
        // candidates and the node falls back to a leaf
        if !cost.is_finite() {
            continue;
        }

        decision.add_candidate(cost, i, axis, kind);
    }
}

/// SAH object-split candidates on one axis, bucketing triangle centroids.
/// A no-op when the centroid range on `axis` is degenerate.
fn try_object_split(
    triangles: &[Triangle],
    indices: &[u32],
    parent_area: f32,
    centroids: &Aabb,
    axis: usize,
    decision: &mut SplitDecision,
) {
    debug_assert!(indices.len() > 1);

    let low = centroids.min[axis];
    let high = centroids.max[axis];
    if low >= high {
        return;
    }
    let range = high - low;

    let mut buckets = [ObjectBucket::EMPTY; BVH_NUM_BUCKETS];
    for &idx in indices {
        let tri = &triangles[idx as usize];
        let bucket = &mut buckets[bucket_index(tri.average_coord(axis), low, range)];
        bucket.bounds = bucket.bounds.union(tri.bounds());
        bucket.count += 1;
    }

    find_min_cost_split(&buckets, parent_area, axis, SplitKind::Object, decision);
}

/// SAH spatial-split candidates on one axis, bucketing the parent's extrema
/// range. Triangles overlapping a bucket get clipped against the bucket's
/// planes; a triangle counts once where it enters and once where it exits.
/// A no-op when the extrema range on `axis` is degenerate.
fn try_spatial_split(
    triangles: &[Triangle],
    indices: &[u32],
    parent_area: f32,
    extrema: &Aabb,
    axis: usize,
    decision: &mut SplitDecision,
) {
    debug_assert!(indices.len() > 1);

    let low = extrema.min[axis];
    let high = extrema.max[axis];
    if low >= high {
        return;
    }
    let width = (high - low) / BVH_NUM_BUCKETS as f32;

    let mut buckets = [SpatialBucket::EMPTY; BVH_NUM_BUCKETS];

    for &idx in indices {
        let tri = &triangles[idx as usize];
        let tri_min = tri.min_coord(axis);
        let tri_max = tri.max_coord(axis);

        for (i, bucket) in buckets.iter_mut().enumerate() {
            let bucket_low = low + i as f32 * width;
            let bucket_high = bucket_low + width;

            // an extreme coordinate exactly on a bucket plane sits on the
            // boundary rather than clipping it, so == is a miss here
            if tri_min >= bucket_high || tri_max <= bucket_low {
                continue;
            }

            if tri_min < bucket_low {
                let cut = tri.clip_axis_plane(axis, bucket_low);
                bucket.bounds = bucket.bounds.expand_pair(cut);
            } else {
                // doesn't reach the low plane: the triangle starts here
                bucket.entry_count += 1;
            }

            if tri_max > bucket_high {
                let cut = tri.clip_axis_plane(axis, bucket_high);
                bucket.bounds = bucket.bounds.expand_pair(cut);
            } else {
                // doesn't reach the high plane: the triangle ends here
                bucket.exit_count += 1;
            }

            // grow by the original vertices inside this bucket's closed
            // interval; clip points alone miss vertices between the planes
            for p in &tri.v {
                if p[axis] >= bucket_low && p[axis] <= bucket_high {
                    bucket.bounds = bucket.bounds.expand(*p);
                }
            }
        }
    }

    find_min_cost_split(&buckets, parent_area, axis, SplitKind::Spatial, decision);
}

/// Spatial-split BVH splitter. Costs object candidates and spatial
/// candidates on all three axes and commits to the overall minimum. A
/// spatial winner sends straddling triangles to *both* children, so child
/// subsets may overlap; an object winner partitions like
/// [`super::centroid_sah::CentroidSahSplitter`].
pub struct SbvhSplitter;

impl Splitter for SbvhSplitter {
    fn get_split(
        triangles: &[Triangle],
        indices: &[u32],
        bounds: &Aabb,
    ) -> Option<(TriangleMapping, TriangleMapping)> {
        debug_assert!(bounds.is_valid());

        if indices.len() <= BVH_LEAF_FORCE_COUNT {
            return None;
        }

        let parent_area = bounds.surface_area();
        let centroids = centroid_bounds(triangles, indices);
        debug_assert!(bounds.contains(&centroids));

        let mut decision = SplitDecision::new();
        for axis in 0..3 {
            try_object_split(triangles, indices, parent_area, &centroids, axis, &mut decision);
        }
        for axis in 0..3 {
            try_spatial_split(triangles, indices, parent_area, bounds, axis, &mut decision);
        }

        // every axis degenerate on both views: a point-like soup
        if !decision.is_resolved() {
            return None;
        }

        if decision.min_cost > indices.len() as f32 {
            return None;
        }

        log::debug!(
            "sbvh split: {:?} axis {} bucket {} cost {:.3} over {} tris",
            decision.kind,
            decision.axis,
            decision.bucket,
            decision.min_cost,
            indices.len()
        );

        let mut left = TriangleMapping::new();
        let mut right = TriangleMapping::new();

        match decision.kind {
            SplitKind::Object => {
                let low = centroids.min[decision.axis];
                let high = centroids.max[decision.axis];
                // the axis produced candidates, so its range is non-degenerate
                debug_assert!(low < high);
                let range = high - low;

                for &idx in indices {
                    let pos = triangles[idx as usize].average_coord(decision.axis);
                    if bucket_index(pos, low, range) <= decision.bucket {
                        left.push(idx);
                    } else {
                        right.push(idx);
                    }
                }

                debug_assert_eq!(left.len() + right.len(), indices.len());
            }
            SplitKind::Spatial => {
                let low = bounds.min[decision.axis];
                let high = bounds.max[decision.axis];
                debug_assert!(low < high);
                let width = (high - low) / BVH_NUM_BUCKETS as f32;
                let split = low + (decision.bucket + 1) as f32 * width;
                debug_assert!(split > low && split < high);

                for &idx in indices {
                    let tri = &triangles[idx as usize];
                    if tri.min_coord(decision.axis) <= split {
                        left.push(idx);
                    }
                    if tri.max_coord(decision.axis) >= split {
                        right.push(idx);
                    }
                }

                debug_assert!(left.len() + right.len() >= indices.len());

                // floating point can shove every triangle onto one side;
                // recursing on the full set again would never terminate
                if left.len() == indices.len() || right.len() == indices.len() {
                    return None;
                }
            }
        }

        debug_assert!(!left.is_empty());
        debug_assert!(!right.is_empty());
        debug_assert!(left.len() < indices.len());
        debug_assert!(right.len() < indices.len());

        Some((left, right))
    }
}
