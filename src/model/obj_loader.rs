// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use thiserror::Error;

use crate::scene::triangle::Triangle;
use crate::scene::TriangleSet;

#[derive(Debug, Error)]
#[error("'{0}' contains no triangles")]
pub struct EmptyMeshError(String);

/// Load an OBJ model as a bare triangle soup. Materials, normals and UVs
/// are ignored; only vertex positions feed the BVH.
pub fn load_obj(path: &str) -> Result<TriangleSet> {
    let (models, _materials) = tobj::load_obj(Path::new(path), &tobj::GPU_LOAD_OPTIONS)
        .with_context(|| format!("Failed to load OBJ: {path}"))?;

    let total_tris: usize = models.iter().map(|m| m.mesh.indices.len() / 3).sum();
    let mut triangles = Vec::with_capacity(total_tris);

    for model in &models {
        let mesh = &model.mesh;
        // tobj triangulates for us
        debug_assert_eq!(mesh.indices.len() % 3, 0);

        for tri in mesh.indices.chunks_exact(3) {
            triangles.push(Triangle::new(
                read_vertex(&mesh.positions, tri[0] as usize),
                read_vertex(&mesh.positions, tri[1] as usize),
                read_vertex(&mesh.positions, tri[2] as usize),
            ));
        }
    }

    if triangles.is_empty() {
        return Err(EmptyMeshError(path.to_string()).into());
    }

    log::info!("Loaded OBJ '{}': {} triangles", path, triangles.len());
    Ok(triangles)
}

fn read_vertex(positions: &[f32], index: usize) -> Vec3 {
    Vec3::new(
        positions[index * 3],
        positions[index * 3 + 1],
        positions[index * 3 + 2],
    )
}
