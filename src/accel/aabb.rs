// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::scene::triangle::Triangle;

/// Axis-aligned bounding box. `EMPTY` is the union identity and the only
/// legal state where `min > max`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn expand(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn expand_pair(self, pair: [Vec3; 2]) -> Self {
        self.expand(pair[0]).expand(pair[1])
    }

    /// Surface area used for the SAH cost metric.
    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index of the longest axis (0=x, 1=y, 2=z).
    /// Ties resolve to the lowest axis index.
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// `min <= max` on every axis. The `EMPTY` box fails this.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Does `self` fully contain `other`? Both boxes must be non-empty.
    pub fn contains(&self, other: &Aabb) -> bool {
        debug_assert!(self.is_valid());
        debug_assert!(other.is_valid());
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Are all three vertices of `tri` inside `self` (inclusive)?
    pub fn contains_triangle(&self, tri: &Triangle) -> bool {
        debug_assert!(self.is_valid());
        tri.v
            .iter()
            .all(|p| self.min.cmple(*p).all() && self.max.cmpge(*p).all())
    }

    /// Slab-method ray intersection. Returns the entry distance `tmin`, or
    /// `f32::INFINITY` on a miss. `tmin` is negative when the origin is
    /// inside the box; a box entirely behind the origin (`tmax < 0`) is a
    /// miss. `inv_dir` may contain infinities for axis-aligned rays.
    pub fn intersect_ray(&self, origin: Vec3, inv_dir: Vec3) -> f32 {
        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;

        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        if tmax < 0.0 || tmin > tmax {
            f32::INFINITY
        } else {
            tmin
        }
    }
}
