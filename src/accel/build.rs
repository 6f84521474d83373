// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use thiserror::Error;

use super::bvh::Bvh;
use super::split::centroid_sah::CentroidSahSplitter;
use super::split::sbvh::SbvhSplitter;
use super::split::stupid::StupidSplitter;
use super::split::{Splitter, extrema_bounds};
use super::stats::sanity_check;
use crate::scene::triangle::Triangle;
use crate::scene::TriangleMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhMethod {
    Stupid,
    CentroidSah,
    Sbvh,
}

impl fmt::Display for BvhMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stupid => "stupid",
            Self::CentroidSah => "sah",
            Self::Sbvh => "sbvh",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("unknown BVH method '{0}' (expected stupid, sah or sbvh)")]
pub struct ParseBvhMethodError(String);

impl FromStr for BvhMethod {
    type Err = ParseBvhMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stupid" => Ok(Self::Stupid),
            "sah" => Ok(Self::CentroidSah),
            "sbvh" => Ok(Self::Sbvh),
            other => Err(ParseBvhMethodError(other.to_string())),
        }
    }
}

/// Build a BVH over `triangles` with the chosen construction method. The
/// soup must be non-empty; the result is immutable and read-only thereafter.
pub fn build_bvh(method: BvhMethod, triangles: &[Triangle]) -> Bvh {
    assert!(!triangles.is_empty(), "cannot build a BVH over zero triangles");

    let start = Instant::now();
    let bvh = match method {
        BvhMethod::Stupid => build_with::<StupidSplitter>(triangles),
        BvhMethod::CentroidSah => build_with::<CentroidSahSplitter>(triangles),
        BvhMethod::Sbvh => build_with::<SbvhSplitter>(triangles),
    };

    log::info!(
        "built {method} BVH over {} triangles in {:.1?}: {} pool slots, {} leaf indices",
        triangles.len(),
        start.elapsed(),
        bvh.node_count(),
        bvh.indices().len(),
    );

    sanity_check(&bvh, triangles);
    bvh
}

fn build_with<S: Splitter>(triangles: &[Triangle]) -> Bvh {
    let mut bvh = Bvh::new(triangles.len());
    let identity: TriangleMapping = (0..triangles.len() as u32).collect();

    // Subdivision runs on an explicit work stack keyed by node index so
    // pathological trees cannot exhaust the call stack. A node's bounds are
    // known from its subset before its children run, so processing order
    // between siblings does not matter; right is pushed first to keep the
    // left-then-right order of the pool layout.
    let mut work: Vec<(u32, TriangleMapping)> = vec![(0, identity)];

    while let Some((node_index, subset)) = work.pop() {
        debug_assert!(!subset.is_empty());
        let bounds = extrema_bounds(triangles, &subset);
        debug_assert!(bounds.is_valid());

        match S::get_split(triangles, &subset, &bounds) {
            None => {
                let first = bvh.append_indices(&subset);
                let node = bvh.node_mut(node_index);
                node.bounds = bounds;
                node.left_first = first;
                node.count = subset.len() as u32;
                log::debug!(
                    "leaf {node_index}: {} tris at index {first}",
                    subset.len()
                );
            }
            Some((left, right)) => {
                debug_assert!(!left.is_empty());
                debug_assert!(!right.is_empty());
                // a child equal to the whole subset would recurse forever
                debug_assert!(left.len() < subset.len());
                debug_assert!(right.len() < subset.len());
                // splitters may duplicate, never drop
                debug_assert!(left.len() + right.len() >= subset.len());

                let left_index = bvh.alloc_pair();
                let node = bvh.node_mut(node_index);
                node.bounds = bounds;
                node.left_first = left_index;
                node.count = 0;

                work.push((left_index + 1, right));
                work.push((left_index, left));
            }
        }
    }

    bvh
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::accel::aabb::Aabb;
    use crate::accel::stats::stats;

    fn unit_corner_triangle() -> Triangle {
        Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)
    }

    fn two_distant_triangles() -> Vec<Triangle> {
        vec![
            Triangle::new(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ),
            Triangle::new(
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(11.0, 0.0, 0.0),
                Vec3::new(10.0, 1.0, 0.0),
            ),
        ]
    }

    #[test]
    fn test_stupid_build_is_one_leaf() {
        let triangles: Vec<_> = (0..16)
            .map(|i| {
                let base = Vec3::new(i as f32, 0.0, 0.0);
                Triangle::new(base, base + Vec3::X, base + Vec3::Y)
            })
            .collect();

        let bvh = build_bvh(BvhMethod::Stupid, &triangles);
        assert!(bvh.root().is_leaf());
        assert_eq!(bvh.root().count, 16);
        assert_eq!(bvh.indices().len(), 16);
        assert_eq!(stats(&bvh).total_nodes, 1);
    }

    #[test]
    fn test_single_triangle_leaf_bounds() {
        // the smallest possible build: one triangle, one leaf
        let triangles = vec![unit_corner_triangle()];
        for method in [BvhMethod::Stupid, BvhMethod::CentroidSah, BvhMethod::Sbvh] {
            let bvh = build_bvh(method, &triangles);
            let root = bvh.root();
            assert!(root.is_leaf());
            assert_eq!(root.count, 1);
            assert_eq!(
                root.bounds,
                Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))
            );
        }
    }

    #[test]
    fn test_identity_mapping_for_stupid_build() {
        let triangles = two_distant_triangles();
        let bvh = build_bvh(BvhMethod::Stupid, &triangles);
        assert_eq!(bvh.indices(), &[0, 1]);
    }

    #[test]
    fn test_sah_split_builds_two_leaves() {
        // disjoint clusters end up in separate leaves
        let mut triangles = Vec::new();
        for i in 0..4 {
            let off = Vec3::new(i as f32 * 0.01, 0.0, 0.0);
            triangles.push(Triangle::new(
                off,
                off + Vec3::new(1.0, 0.0, 0.0),
                off + Vec3::new(0.0, 1.0, 0.0),
            ));
            let far = Vec3::new(10.0 + i as f32 * 0.01, 0.0, 0.0);
            triangles.push(Triangle::new(
                far,
                far + Vec3::new(1.0, 0.0, 0.0),
                far + Vec3::new(0.0, 1.0, 0.0),
            ));
        }

        let bvh = build_bvh(BvhMethod::CentroidSah, &triangles);
        let root = bvh.root();
        assert!(!root.is_leaf());
        assert_eq!(root.left_index(), 2);
        assert_eq!(root.right_index(), 3);

        let left = bvh.node(root.left_index());
        let right = bvh.node(root.right_index());
        assert!(left.is_leaf());
        assert!(right.is_leaf());
        assert_eq!(left.count + right.count, 8);
        // the two subtrees do not overlap on x
        assert!(left.bounds.max.x < right.bounds.min.x);
    }

    #[test]
    fn test_object_builders_index_every_triangle_once() {
        let triangles: Vec<_> = (0..64)
            .map(|i| {
                let base = Vec3::new((i % 8) as f32 * 2.0, (i / 8) as f32 * 2.0, 0.0);
                Triangle::new(base, base + Vec3::X, base + Vec3::Y)
            })
            .collect();

        for method in [BvhMethod::Stupid, BvhMethod::CentroidSah] {
            let bvh = build_bvh(method, &triangles);
            let mut seen: Vec<u32> = bvh.indices().to_vec();
            seen.sort_unstable();
            let expected: Vec<u32> = (0..64).collect();
            assert_eq!(seen, expected, "{method} lost or duplicated a triangle");
        }
    }

    #[test]
    fn test_sbvh_build_covers_every_triangle() {
        let mut triangles = vec![Triangle::new(
            Vec3::new(-10.0, 0.45, 0.0),
            Vec3::new(10.0, 0.55, 0.0),
            Vec3::new(0.0, 0.6, 0.0),
        )];
        for i in 0..40 {
            let base = Vec3::new(-10.0 + i as f32 * 0.5, 0.25, 0.0);
            triangles.push(Triangle::new(
                base,
                base + Vec3::new(0.3, 0.0, 0.0),
                base + Vec3::new(0.0, 0.3, 0.0),
            ));
        }

        let bvh = build_bvh(BvhMethod::Sbvh, &triangles);
        let mut seen = vec![false; triangles.len()];
        for &idx in bvh.indices() {
            seen[idx as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "SBVH dropped a triangle");
        // the sliver straddles the spatial plane, so indices exceed the soup
        assert!(bvh.indices().len() > triangles.len());
    }

    #[test]
    fn test_degenerate_soup_terminates() {
        // coincident and zero-area triangles must still build (one leaf)
        let triangles: Vec<_> = (0..10)
            .map(|_| Triangle::new(Vec3::ONE, Vec3::ONE, Vec3::ONE))
            .collect();
        for method in [BvhMethod::Stupid, BvhMethod::CentroidSah, BvhMethod::Sbvh] {
            let bvh = build_bvh(method, &triangles);
            assert!(bvh.root().is_leaf());
            assert_eq!(bvh.root().count, 10);
        }
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in [BvhMethod::Stupid, BvhMethod::CentroidSah, BvhMethod::Sbvh] {
            assert_eq!(method.to_string().parse::<BvhMethod>().unwrap(), method);
        }
        assert!("octree".parse::<BvhMethod>().is_err());
    }
}
