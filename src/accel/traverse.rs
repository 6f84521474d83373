// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::bvh::Bvh;
use crate::constants::TRAVERSAL_STACK_DEPTH;
use crate::intersect::moller_trumbore;
use crate::scene::ray::Ray;
use crate::scene::triangle::Triangle;

/// Ordered traversal descends into the nearer child first and prunes the
/// farther one when the best hit already beats its entry distance;
/// unordered traversal examines both children whenever their boxes are hit.
/// Closest-hit results are identical either way, ordered is just faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    Ordered,
    Unordered,
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("unknown traversal mode '{0}' (expected ordered or unordered)")]
pub struct ParseTraversalModeError(String);

impl FromStr for TraversalMode {
    type Err = ParseTraversalModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" => Ok(Self::Ordered),
            "unordered" => Ok(Self::Unordered),
            other => Err(ParseTraversalModeError(other.to_string())),
        }
    }
}

/// A closest-hit result: distance along the ray (in units of its direction)
/// and the index of the winning triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    pub triangle: u32,
}

/// Per-query diagnostic counters, filled in by the `_diag` query flavour.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TraversalStats {
    pub nodes_visited: u32,
    pub leaves_visited: u32,
    pub triangles_tested: u32,
    pub splits_traversed: u32,
    /// Pool index of the leaf where the winning hit was recorded.
    pub hit_node: u32,
}

/// Closest forward intersection of `ray` with the triangle soup, or `None`.
/// At equal distance the smaller triangle index wins, so a triangle
/// duplicated across leaves is still reported exactly once and both
/// traversal modes agree exactly.
pub fn find_closest_intersection(
    bvh: &Bvh,
    triangles: &[Triangle],
    ray: &Ray,
    mode: TraversalMode,
) -> Option<Intersection> {
    closest(bvh, triangles, ray, mode, None)
}

/// [`find_closest_intersection`] with diagnostic counters.
pub fn find_closest_intersection_diag(
    bvh: &Bvh,
    triangles: &[Triangle],
    ray: &Ray,
    mode: TraversalMode,
    diag: &mut TraversalStats,
) -> Option<Intersection> {
    closest(bvh, triangles, ray, mode, Some(diag))
}

/// Whether any triangle lies on the ray strictly closer than `max_dist`.
/// Short-circuits on the first witness, which may differ between modes;
/// the boolean never does.
pub fn find_any_intersection(
    bvh: &Bvh,
    triangles: &[Triangle],
    ray: &Ray,
    max_dist: f32,
    mode: TraversalMode,
) -> bool {
    let inv_dir = ray.direction.recip();
    let mut stack: Vec<(u32, f32)> = Vec::with_capacity(TRAVERSAL_STACK_DEPTH);

    let root_entry = bvh.root().bounds.intersect_ray(ray.origin, inv_dir);
    if root_entry < f32::INFINITY {
        stack.push((0, root_entry));
    }

    while let Some((index, _)) = stack.pop() {
        let node = bvh.node(index);

        if node.is_leaf() {
            for slot in node.first()..node.first() + node.count {
                let triangle = bvh.indices()[slot as usize];
                if let Some(t) = moller_trumbore(&triangles[triangle as usize], ray)
                    && t < max_dist
                {
                    return true;
                }
            }
        } else {
            push_children(bvh, node.left_index(), ray, inv_dir, mode, &mut stack);
        }
    }

    false
}

fn closest(
    bvh: &Bvh,
    triangles: &[Triangle],
    ray: &Ray,
    mode: TraversalMode,
    mut diag: Option<&mut TraversalStats>,
) -> Option<Intersection> {
    let inv_dir = ray.direction.recip();
    let mut best = Intersection {
        distance: f32::INFINITY,
        triangle: u32::MAX,
    };
    let mut stack: Vec<(u32, f32)> = Vec::with_capacity(TRAVERSAL_STACK_DEPTH);

    let root_entry = bvh.root().bounds.intersect_ray(ray.origin, inv_dir);
    if root_entry < f32::INFINITY {
        stack.push((0, root_entry));
    }

    while let Some((index, entry)) = stack.pop() {
        // strict comparison: a subtree entered exactly at the best distance
        // can still hold an equal-distance hit with a smaller index
        if mode == TraversalMode::Ordered && entry > best.distance {
            continue;
        }

        let node = bvh.node(index);
        if let Some(d) = diag.as_deref_mut() {
            d.nodes_visited += 1;
        }

        if node.is_leaf() {
            if let Some(d) = diag.as_deref_mut() {
                d.leaves_visited += 1;
            }
            for slot in node.first()..node.first() + node.count {
                let triangle = bvh.indices()[slot as usize];
                if let Some(d) = diag.as_deref_mut() {
                    d.triangles_tested += 1;
                }
                if let Some(t) = moller_trumbore(&triangles[triangle as usize], ray)
                    && (t < best.distance || (t == best.distance && triangle < best.triangle))
                {
                    best = Intersection {
                        distance: t,
                        triangle,
                    };
                    if let Some(d) = diag.as_deref_mut() {
                        d.hit_node = index;
                    }
                }
            }
        } else {
            if let Some(d) = diag.as_deref_mut() {
                d.splits_traversed += 1;
            }
            push_children(bvh, node.left_index(), ray, inv_dir, mode, &mut stack);
        }
    }

    (best.distance < f32::INFINITY).then_some(best)
}

/// Test both children of an inner node and push the ones the ray enters.
/// Ordered mode pushes the farther child first so the nearer one pops first.
fn push_children(
    bvh: &Bvh,
    left_index: u32,
    ray: &Ray,
    inv_dir: glam::Vec3,
    mode: TraversalMode,
    stack: &mut Vec<(u32, f32)>,
) {
    let right_index = left_index + 1;
    let t_left = bvh.node(left_index).bounds.intersect_ray(ray.origin, inv_dir);
    let t_right = bvh
        .node(right_index)
        .bounds
        .intersect_ray(ray.origin, inv_dir);

    let mut near = (left_index, t_left);
    let mut far = (right_index, t_right);
    if mode == TraversalMode::Ordered && t_right < t_left {
        std::mem::swap(&mut near, &mut far);
    }

    if far.1 < f32::INFINITY {
        stack.push(far);
    }
    if near.1 < f32::INFINITY {
        stack.push(near);
    }
}
