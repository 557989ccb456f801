//! Ribbon mesh along the spiral and its reveal animation.

use bytemuck::{Pod, Zeroable};

use crate::constants::{HIDE_RATE, REVEAL_RATE};
use crate::curve::SpiralCurve;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// x across the ribbon, y = curve parameter (drives the reveal wipe).
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct RibbonMesh {
    pub vertices: Vec<RibbonVertex>,
    pub indices: Vec<u32>,
}

/// Two vertices per sample, offset along the binormal so the strip lies
/// edge-on against the cone.
pub fn build_ribbon(curve: &SpiralCurve, segments: usize, width: f32) -> RibbonMesh {
    let half = width * 0.5;
    let mut mesh = RibbonMesh::default();
    for (t, f) in curve.sample(segments) {
        let left = f.point + f.binormal * half;
        let right = f.point - f.binormal * half;
        let normal = f.normal.to_array();
        mesh.vertices.push(RibbonVertex {
            position: left.to_array(),
            normal,
            uv: [0.0, t],
        });
        mesh.vertices.push(RibbonVertex {
            position: right.to_array(),
            normal,
            uv: [1.0, t],
        });
    }
    let quads = (mesh.vertices.len() / 2).saturating_sub(1) as u32;
    for i in 0..quads {
        let base = i * 2;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 1, base + 3, base + 2]);
    }
    mesh
}

/// Wipe progress that chases a binary target, hiding faster than it reveals.
#[derive(Clone, Copy, Debug, Default)]
pub struct RevealProgress {
    value: f32,
    target: f32,
}

impl RevealProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance toward 1 when `shown`, else toward 0.
    pub fn update(&mut self, shown: bool, dt: f32) -> f32 {
        self.target = if shown { 1.0 } else { 0.0 };
        let rate = if shown { REVEAL_RATE } else { HIDE_RATE };
        let step = (rate * dt).clamp(0.0, 1.0);
        self.value += (self.target - self.value) * step;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
