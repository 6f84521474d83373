// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::constants::MOLLER_TRUMBORE_EPS;
use crate::scene::ray::Ray;
use crate::scene::triangle::Triangle;

/// Möller-Trumbore ray-triangle intersection. Returns the hit distance in
/// units of `ray.direction`, forward hits only; `None` covers misses,
/// parallel rays, and hits behind the origin.
pub fn moller_trumbore(tri: &Triangle, ray: &Ray) -> Option<f32> {
    let e1 = tri.v[1] - tri.v[0];
    let e2 = tri.v[2] - tri.v[0];
    let h = ray.direction.cross(e2);
    let a = e1.dot(h);
    if a.abs() < MOLLER_TRUMBORE_EPS {
        return None;
    }
    let f = 1.0 / a;
    let s = ray.origin - tri.v[0];
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * e2.dot(q);
    (t > 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn unit_corner_triangle() -> Triangle {
        Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y)
    }

    #[test]
    fn test_hit_through_interior() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::Z, 1);
        let t = moller_trumbore(&unit_corner_triangle(), &ray).unwrap();
        assert!((t - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_miss_outside_edges() {
        let ray = Ray::new(Vec3::new(0.75, 0.75, -1.0), Vec3::Z, 1);
        assert_eq!(moller_trumbore(&unit_corner_triangle(), &ray), None);
    }

    #[test]
    fn test_behind_origin_is_miss() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::Z, 1);
        assert_eq!(moller_trumbore(&unit_corner_triangle(), &ray), None);
    }

    #[test]
    fn test_parallel_ray_is_miss() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, -1.0), Vec3::X, 1);
        assert_eq!(moller_trumbore(&unit_corner_triangle(), &ray), None);
    }

    #[test]
    fn test_unnormalized_direction_scales_distance() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, -2.0), Vec3::Z * 2.0, 1);
        let t = moller_trumbore(&unit_corner_triangle(), &ray).unwrap();
        assert!((t - 1.0).abs() < 1e-6);
    }
}
