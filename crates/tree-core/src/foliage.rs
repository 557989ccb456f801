//! Foliage shard field.
//!
//! The per-shard chaos/target pairs are uploaded once; each frame only the
//! progress and time uniforms change and the vertex shader does the blend.
//! [`FoliageField::evaluate`] mirrors that shader on the CPU.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::constants::*;
use crate::layout::FoliageLayout;
use crate::state::TickContext;

/// Per-shard attributes, uploaded verbatim as an instance buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FoliageInstance {
    pub chaos: [f32; 3],
    pub scale: f32,
    pub target: [f32; 3],
    pub _pad: f32,
}

/// Uniform block read by the foliage shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FoliageUniforms {
    pub time: f32,
    pub progress: f32,
    pub tree_height: f32,
    pub point_size: f32,
}

#[inline]
pub fn ease_out_cubic(x: f32) -> f32 {
    1.0 - (1.0 - x).powi(3)
}

/// Same blend the foliage vertex shader performs.
pub fn morph_position(chaos: Vec3, target: Vec3, progress: f32, time: f32, tree_height: f32) -> Vec3 {
    let p = ease_out_cubic(progress.clamp(0.0, 1.0));
    let mut pos = chaos.lerp(target, p);
    if p > FOLIAGE_SWAY_THRESHOLD {
        let wind = (time + pos.y * 0.5).sin() * FOLIAGE_SWAY_AMPLITUDE * (pos.y / tree_height);
        pos.x += wind;
        pos.z += wind;
    }
    pos
}

pub struct FoliageField {
    instances: Vec<FoliageInstance>,
    progress: f32,
    time: f32,
    tree_height: f32,
}

impl FoliageField {
    pub fn new(layout: &FoliageLayout, tree_height: f32) -> Self {
        let instances = layout
            .chaos
            .iter()
            .zip(&layout.target)
            .zip(&layout.scale)
            .map(|((c, t), s)| FoliageInstance {
                chaos: c.to_array(),
                scale: *s,
                target: t.to_array(),
                _pad: 0.0,
            })
            .collect();
        Self {
            instances,
            progress: 0.0,
            time: 0.0,
            tree_height,
        }
    }

    pub fn update(&mut self, ctx: &TickContext) {
        let target = if ctx.morph.is_assembled() { 1.0 } else { 0.0 };
        let step = (FOLIAGE_PROGRESS_RATE * ctx.dt).clamp(0.0, 1.0);
        self.progress += (target - self.progress) * step;
        self.time = ctx.elapsed;
    }

    /// Raw progress in [0, 1] before easing.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn instances(&self) -> &[FoliageInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn uniforms(&self) -> FoliageUniforms {
        FoliageUniforms {
            time: self.time,
            progress: self.progress,
            tree_height: self.tree_height,
            point_size: FOLIAGE_BASE_POINT_SIZE,
        }
    }

    /// Tree-local position of shard `index` at the current progress.
    pub fn evaluate(&self, index: usize) -> Option<Vec3> {
        let inst = self.instances.get(index)?;
        Some(morph_position(
            Vec3::from(inst.chaos),
            Vec3::from(inst.target),
            self.progress,
            self.time,
            self.tree_height,
        ))
    }
}
