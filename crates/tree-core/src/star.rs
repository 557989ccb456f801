use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::PI;

use crate::constants::*;
use crate::mesh::{Mesh, MeshVertex};

/// Alternating outer/inner outline, starting at the top point.
pub fn star_outline(points: usize, outer: f32, inner: f32) -> Vec<Vec2> {
    let n = points * 2;
    (0..n)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = PI / 2.0 + i as f32 * PI / points as f32;
            Vec2::new(a.cos() * r, a.sin() * r)
        })
        .collect()
}

/// Flat star extruded along Z and centred on the origin.
pub fn star_mesh(points: usize, outer: f32, inner: f32, depth: f32) -> Mesh {
    let outline = star_outline(points, outer, inner);
    let n = outline.len() as u32;
    let half = depth * 0.5;
    let mut m = Mesh::default();

    for (z, nz) in [(half, 1.0f32), (-half, -1.0)] {
        let base = m.vertices.len() as u32;
        m.vertices.push(MeshVertex {
            position: [0.0, 0.0, z],
            normal: [0.0, 0.0, nz],
        });
        for p in &outline {
            m.vertices.push(MeshVertex {
                position: [p.x, p.y, z],
                normal: [0.0, 0.0, nz],
            });
        }
        for i in 0..n {
            let a = base + 1 + i;
            let b = base + 1 + (i + 1) % n;
            if nz > 0.0 {
                m.indices.extend_from_slice(&[base, a, b]);
            } else {
                m.indices.extend_from_slice(&[base, b, a]);
            }
        }
    }

    for i in 0..outline.len() {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % outline.len()];
        let edge = p1 - p0;
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
        let base = m.vertices.len() as u32;
        for (p, z) in [(p0, half), (p1, half), (p1, -half), (p0, -half)] {
            m.vertices.push(MeshVertex {
                position: [p.x, p.y, z],
                normal: normal.to_array(),
            });
        }
        m.indices
            .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }
    m
}

/// Bobbing, spinning star perched above the tree tip.
#[derive(Clone, Copy, Debug)]
pub struct TopStar {
    pub base_height: f32,
}

impl TopStar {
    pub fn new(tree_height: f32) -> Self {
        Self {
            base_height: tree_height / 2.0 + 0.5,
        }
    }

    pub fn mesh() -> Mesh {
        star_mesh(STAR_POINTS, STAR_OUTER_RADIUS, STAR_INNER_RADIUS, STAR_DEPTH)
    }

    /// Tree-local transform at `elapsed` seconds.
    pub fn transform(&self, elapsed: f32) -> Mat4 {
        let y = self.base_height + 0.1 * (elapsed * 1.5).sin();
        Mat4::from_translation(Vec3::new(0.0, y, 0.0)) * Mat4::from_rotation_y(elapsed * 0.5)
    }
}
