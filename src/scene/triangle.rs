// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::Vec3;

use crate::accel::aabb::Aabb;

/// Triangle vertex positions. Everything the builders and traversal need
/// (extrema, centroid, bounds, plane clipping) derives from these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v: [Vec3; 3],
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v: [v0, v1, v2] }
    }

    pub fn min_coord(&self, axis: usize) -> f32 {
        self.v[0][axis].min(self.v[1][axis]).min(self.v[2][axis])
    }

    pub fn max_coord(&self, axis: usize) -> f32 {
        self.v[0][axis].max(self.v[1][axis]).max(self.v[2][axis])
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v[0] + self.v[1] + self.v[2]) / 3.0
    }

    /// Centroid coordinate on one axis; what the object splitters bucket on.
    pub fn average_coord(&self, axis: usize) -> f32 {
        self.centroid()[axis]
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_point(self.v[0])
            .expand(self.v[1])
            .expand(self.v[2])
    }

    pub fn area(&self) -> f32 {
        let e1 = self.v[1] - self.v[0];
        let e2 = self.v[2] - self.v[0];
        0.5 * e1.cross(e2).length()
    }

    /// Clip against the axis-aligned plane `axis = split`, which must lie
    /// strictly between this triangle's extrema on `axis`. Returns the two
    /// points where the straddling edges cross the plane; both have their
    /// `axis` coordinate set to `split` exactly.
    ///
    /// A vertex sitting exactly on the plane counts as being on the low
    /// side, so its edges do not straddle.
    pub fn clip_axis_plane(&self, axis: usize, split: f32) -> [Vec3; 2] {
        debug_assert!(split > self.min_coord(axis));
        debug_assert!(split < self.max_coord(axis));

        let mut points = [Vec3::ZERO; 2];
        let mut found = 0;

        for i in 0..3 {
            let a = self.v[i];
            let b = self.v[(i + 1) % 3];

            let straddles = (a[axis] <= split && b[axis] > split)
                || (b[axis] <= split && a[axis] > split);
            if !straddles {
                continue;
            }

            let t = (split - a[axis]) / (b[axis] - a[axis]);
            let mut p = a.lerp(b, t);
            p[axis] = split;

            assert!(found < 2, "triangle straddles a plane on more than two edges");
            points[found] = p;
            found += 1;
        }

        assert_eq!(found, 2, "triangle must straddle the plane on exactly two edges");
        points
    }
}
