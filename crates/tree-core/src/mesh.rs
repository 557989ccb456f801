//! GPU-facing vertex and instance records plus the small primitive meshes
//! shared by ornaments, frames and the star.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::{PI, TAU};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// One instanced object: model matrix columns plus an RGBA tint.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    /// Zero-scale placeholder for slots that should not draw this frame.
    pub fn hidden() -> Self {
        Self::new(Mat4::from_scale(Vec3::ZERO), Vec4::ZERO)
    }
}

/// Textured photo plane over a filled frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PhotoInstance {
    pub model: [[f32; 4]; 4],
    /// x = texture rotation in radians around the plane centre.
    pub params: [f32; 4],
}

impl PhotoInstance {
    pub fn new(model: Mat4, uv_rotation: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            params: [uv_rotation, 0.0, 0.0, 0.0],
        }
    }

    pub fn uv_rotation(&self) -> f32 {
        self.params[0]
    }
}

/// Billboard sprite instance used by dust and the hat clouds.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        for c in corners {
            self.vertices.push(MeshVertex {
                position: c.to_array(),
                normal: normal.to_array(),
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Axis-aligned unit cube centred on the origin, flat-shaded.
pub fn unit_cube() -> Mesh {
    let mut m = Mesh::default();
    let h = 0.5;
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::Z),
        (Vec3::NEG_Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y),
    ];
    // right x up == n keeps every face counter-clockwise from outside
    for (n, up) in faces {
        let c = n * h;
        let u = up * h;
        let r = up.cross(n) * h;
        m.push_quad([c - r - u, c + r - u, c + r + u, c - r + u], n);
    }
    m
}

/// Unit-radius UV sphere.
pub fn uv_sphere(segments: u32, rings: u32) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut m = Mesh::default();
    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for seg in 0..=segments {
            let theta = TAU * seg as f32 / segments as f32;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            m.vertices.push(MeshVertex {
                position: n.to_array(),
                normal: n.to_array(),
            });
        }
    }
    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            m.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_faces() {
        let m = unit_cube();
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 36);
        assert!(m
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() <= 0.5 + 1e-6)));
    }

    #[test]
    fn sphere_indices_in_range() {
        let m = uv_sphere(16, 8);
        let n = m.vertices.len() as u32;
        assert!(m.indices.iter().all(|&i| i < n));
    }
}
