#![allow(dead_code)]

mod accel;
mod constants;
mod intersect;
mod model;
mod scene;

use std::env;

use anyhow::{Context, Result};
use glam::Vec3;

use crate::accel::build::{BvhMethod, build_bvh};
use crate::accel::stats::stats;
use crate::accel::traverse::{
    TraversalMode, TraversalStats, find_any_intersection, find_closest_intersection_diag,
};
use crate::constants::STARTING_TTL;
use crate::model::obj_loader::load_obj;
use crate::scene::ray::Ray;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .context("usage: bvh-tracer <model.obj> [stupid|sah|sbvh] [ordered|unordered]")?;
    let method = match args.next() {
        Some(raw) => raw.parse::<BvhMethod>()?,
        None => BvhMethod::Sbvh,
    };
    let mode = match args.next() {
        Some(raw) => raw.parse::<TraversalMode>()?,
        None => TraversalMode::Ordered,
    };

    let triangles = load_obj(&path)?;
    let bvh = build_bvh(method, &triangles);

    println!(
        "{method} BVH over {} triangles, {mode} traversal",
        triangles.len()
    );
    println!("{}", stats(&bvh));

    // probe the scene centre with a ray cast from outside the root bounds
    let bounds = bvh.root().bounds;
    let target = bounds.center();
    let origin = target - Vec3::Z * (bounds.max - bounds.min).length().max(1.0);
    let ray = Ray::new(origin, (target - origin).normalize(), STARTING_TTL);

    let mut diag = TraversalStats::default();
    match find_closest_intersection_diag(&bvh, &triangles, &ray, mode, &mut diag) {
        Some(hit) => {
            println!(
                "probe ray from {origin} hit triangle {} at distance {:.4} (leaf node {})",
                hit.triangle, hit.distance, diag.hit_node
            );
            let occluded =
                find_any_intersection(&bvh, &triangles, &ray, hit.distance * 0.5, mode);
            println!("occluded within half the hit distance: {occluded}");
        }
        None => println!("probe ray from {origin} missed the scene"),
    }
    println!(
        "probe visited {} nodes / {} leaves, tested {} triangles across {} splits",
        diag.nodes_visited, diag.leaves_visited, diag.triangles_tested, diag.splits_traversed
    );

    Ok(())
}
