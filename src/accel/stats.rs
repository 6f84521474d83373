// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

use super::aabb::Aabb;
use super::bvh::Bvh;
use crate::scene::triangle::Triangle;

/// Aggregate post-build statistics, gathered by a full tree walk.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhStats {
    pub total_nodes: u32,
    pub leaf_count: u32,
    /// Length of the global index array; exceeds the triangle count when a
    /// spatial split duplicated triangles.
    pub total_indices: usize,
    pub min_leaf_tris: u32,
    pub max_leaf_tris: u32,
    pub avg_leaf_tris: f32,
    pub min_leaf_depth: u32,
    pub max_leaf_depth: u32,
    pub avg_leaf_depth: f32,
    pub root_bounds: Aabb,
}

impl fmt::Display for BvhStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} nodes, {} leaves, {} leaf indices",
            self.total_nodes, self.leaf_count, self.total_indices
        )?;
        writeln!(
            f,
            "per leaf: tris {}..{} (avg {:.1}), depth {}..{} (avg {:.1})",
            self.min_leaf_tris,
            self.max_leaf_tris,
            self.avg_leaf_tris,
            self.min_leaf_depth,
            self.max_leaf_depth,
            self.avg_leaf_depth
        )?;
        write!(
            f,
            "root bounds {:?}..{:?} SA {:.3}",
            self.root_bounds.min,
            self.root_bounds.max,
            self.root_bounds.surface_area()
        )
    }
}

/// Walk the tree and collect [`BvhStats`].
pub fn stats(bvh: &Bvh) -> BvhStats {
    let mut total_nodes = 0u32;
    let mut leaf_count = 0u32;
    let mut min_leaf_tris = u32::MAX;
    let mut max_leaf_tris = 0u32;
    let mut sum_leaf_tris = 0u64;
    let mut min_leaf_depth = u32::MAX;
    let mut max_leaf_depth = 0u32;
    let mut sum_leaf_depth = 0u64;

    let mut work: Vec<(u32, u32)> = vec![(0, 0)];
    while let Some((index, depth)) = work.pop() {
        let node = bvh.node(index);
        total_nodes += 1;

        if node.is_leaf() {
            leaf_count += 1;
            min_leaf_tris = min_leaf_tris.min(node.count);
            max_leaf_tris = max_leaf_tris.max(node.count);
            sum_leaf_tris += u64::from(node.count);
            min_leaf_depth = min_leaf_depth.min(depth);
            max_leaf_depth = max_leaf_depth.max(depth);
            sum_leaf_depth += u64::from(depth);
        } else {
            work.push((node.left_index(), depth + 1));
            work.push((node.right_index(), depth + 1));
        }
    }

    BvhStats {
        total_nodes,
        leaf_count,
        total_indices: bvh.indices().len(),
        min_leaf_tris,
        max_leaf_tris,
        avg_leaf_tris: sum_leaf_tris as f32 / leaf_count as f32,
        min_leaf_depth,
        max_leaf_depth,
        avg_leaf_depth: sum_leaf_depth as f32 / leaf_count as f32,
        root_bounds: bvh.root().bounds,
    }
}

/// Walk the whole BVH and panic if any structural or bounds invariant is
/// broken. Expensive; compiles down to nothing in release builds. Must never
/// sit on a query path.
pub fn sanity_check(bvh: &Bvh, triangles: &[Triangle]) {
    if cfg!(debug_assertions) {
        do_sanity_check(bvh, triangles);
    }
}

fn do_sanity_check(bvh: &Bvh, triangles: &[Triangle]) {
    // every index slot refers to a real triangle
    for &idx in bvh.indices() {
        assert!((idx as usize) < triangles.len(), "index {idx} out of range");
    }

    // every triangle sits in at least one leaf; spatial splits may reference
    // one several times, so only absence is an error
    let mut referenced = vec![false; triangles.len()];
    for &idx in bvh.indices() {
        referenced[idx as usize] = true;
    }
    for (tri, seen) in referenced.iter().enumerate() {
        assert!(seen, "triangle {tri} missing from every leaf");
    }
    assert!(bvh.indices().len() >= triangles.len());

    if bvh.root().is_leaf() {
        assert_eq!(bvh.root().count as usize, bvh.indices().len());
    } else {
        // the first child pair always lands right after the alignment slot
        assert_eq!(bvh.root().left_index(), 2);
    }

    walk(bvh, triangles, 0);
    log::debug!("bvh sanity check OK");
}

fn walk(bvh: &Bvh, triangles: &[Triangle], index: u32) {
    let node = bvh.node(index);
    assert!(node.bounds.is_valid(), "node {index} has inverted bounds");

    if node.is_leaf() {
        let first = node.first() as usize;
        let count = node.count as usize;
        assert!(
            first + count <= bvh.indices().len(),
            "leaf {index} runs past the index array"
        );

        // quadratic in leaf size, which the leaf heuristics keep small
        for &idx in &bvh.indices()[first..first + count] {
            assert!(
                node.bounds.contains_triangle(&triangles[idx as usize]),
                "leaf {index} does not contain triangle {idx}"
            );
        }
    } else {
        let left = node.left_index();
        let right = node.right_index();
        assert!(left > index, "child pair {left} behind parent {index}");
        assert!(
            right < bvh.node_count(),
            "child pair {left} past the allocation mark"
        );

        assert!(
            node.bounds.contains(&bvh.node(left).bounds),
            "node {index} does not contain its left child"
        );
        assert!(
            node.bounds.contains(&bvh.node(right).bounds),
            "node {index} does not contain its right child"
        );

        walk(bvh, triangles, left);
        walk(bvh, triangles, right);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::accel::build::{BvhMethod, build_bvh};

    fn grid_scene(n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|i| {
                let base = Vec3::new((i % 8) as f32 * 2.0, (i / 8) as f32 * 2.0, 0.0);
                Triangle::new(base, base + Vec3::X, base + Vec3::Y)
            })
            .collect()
    }

    #[test]
    fn test_stats_for_single_leaf() {
        let triangles = grid_scene(5);
        let bvh = build_bvh(BvhMethod::Stupid, &triangles);
        let s = stats(&bvh);

        assert_eq!(s.total_nodes, 1);
        assert_eq!(s.leaf_count, 1);
        assert_eq!(s.total_indices, 5);
        assert_eq!(s.min_leaf_tris, 5);
        assert_eq!(s.max_leaf_tris, 5);
        assert_eq!(s.avg_leaf_tris, 5.0);
        assert_eq!(s.min_leaf_depth, 0);
        assert_eq!(s.max_leaf_depth, 0);
        assert_eq!(s.root_bounds, bvh.root().bounds);
    }

    #[test]
    fn test_stats_totals_consistent() {
        let triangles = grid_scene(64);
        for method in [BvhMethod::CentroidSah, BvhMethod::Sbvh] {
            let bvh = build_bvh(method, &triangles);
            let s = stats(&bvh);

            // a proper binary tree: leaves = internals + 1
            assert_eq!(s.total_nodes, 2 * s.leaf_count - 1);
            assert!(s.leaf_count > 1);
            assert!(s.total_indices >= triangles.len());
            assert!(s.min_leaf_tris >= 1);
            assert!(s.min_leaf_depth >= 1);
            assert!(s.max_leaf_depth >= s.min_leaf_depth);
            assert!(s.avg_leaf_tris >= s.min_leaf_tris as f32);
            assert!(s.avg_leaf_tris <= s.max_leaf_tris as f32);
        }
    }

    #[test]
    fn test_sanity_check_accepts_all_builders() {
        let triangles = grid_scene(64);
        for method in [BvhMethod::Stupid, BvhMethod::CentroidSah, BvhMethod::Sbvh] {
            let bvh = build_bvh(method, &triangles);
            sanity_check(&bvh, &triangles);
        }
    }
}
