//! Instanced ornament field: gifts, baubles and lights.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::constants::*;
use crate::layout::{OrnamentKind, OrnamentRecord};
use crate::mesh::InstanceRaw;
use crate::state::TickContext;

/// Which primitive an instance batch draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrnamentBatch {
    Boxes,
    Spheres,
}

impl OrnamentKind {
    pub fn batch(self) -> OrnamentBatch {
        match self {
            OrnamentKind::Gift => OrnamentBatch::Boxes,
            OrnamentKind::Ball | OrnamentKind::Light => OrnamentBatch::Spheres,
        }
    }
}

pub struct OrnamentField {
    records: Vec<OrnamentRecord>,
    current: Vec<Vec3>,
    // indices into `records` for each batch, fixed at construction
    box_ids: Vec<usize>,
    sphere_ids: Vec<usize>,
    box_instances: Vec<InstanceRaw>,
    sphere_instances: Vec<InstanceRaw>,
}

impl OrnamentField {
    /// Every ornament starts at its chaos position.
    pub fn new(records: Vec<OrnamentRecord>) -> Self {
        let current = records.iter().map(|r| r.chaos).collect();
        let mut box_ids = Vec::new();
        let mut sphere_ids = Vec::new();
        for (i, r) in records.iter().enumerate() {
            match r.kind.batch() {
                OrnamentBatch::Boxes => box_ids.push(i),
                OrnamentBatch::Spheres => sphere_ids.push(i),
            }
        }
        let mut field = Self {
            box_instances: vec![InstanceRaw::hidden(); box_ids.len()],
            sphere_instances: vec![InstanceRaw::hidden(); sphere_ids.len()],
            records,
            current,
            box_ids,
            sphere_ids,
        };
        field.write_instances(0.0);
        field
    }

    pub fn update(&mut self, ctx: &TickContext) {
        let assembled = ctx.morph.is_assembled();
        let direction = if assembled { 1.0 } else { SCATTER_RATE_FACTOR };
        for (rec, cur) in self.records.iter().zip(self.current.iter_mut()) {
            let goal = if assembled { rec.target } else { rec.chaos };
            let step = (ctx.dt * rec.speed * direction).clamp(0.0, 1.0);
            *cur = cur.lerp(goal, step);
        }
        self.write_instances(ctx.elapsed);
    }

    fn model(&self, i: usize, time: f32) -> Mat4 {
        let rec = &self.records[i];
        let pos = self.current[i];
        match rec.kind {
            OrnamentKind::Gift => {
                let rot = Quat::from_euler(
                    EulerRot::XYZ,
                    rec.rotation_offset.x + time * GIFT_SPIN_RATE[0],
                    rec.rotation_offset.y + time * GIFT_SPIN_RATE[1],
                    rec.rotation_offset.z,
                );
                Mat4::from_scale_rotation_translation(Vec3::splat(rec.scale), rot, pos)
            }
            OrnamentKind::Ball => Mat4::from_scale_rotation_translation(
                Vec3::splat(rec.scale),
                Quat::IDENTITY,
                pos,
            ),
            OrnamentKind::Light => {
                let pulse = 1.0
                    + LIGHT_PULSE_AMPLITUDE * (time * LIGHT_PULSE_FREQ + rec.id as f32).sin();
                Mat4::from_scale_rotation_translation(
                    Vec3::splat(rec.scale * pulse),
                    Quat::IDENTITY,
                    pos,
                )
            }
        }
    }

    fn write_instances(&mut self, time: f32) {
        for slot in 0..self.box_ids.len() {
            let i = self.box_ids[slot];
            self.box_instances[slot] = InstanceRaw::new(
                self.model(i, time),
                self.records[i].color.rgb().extend(1.0),
            );
        }
        for slot in 0..self.sphere_ids.len() {
            let i = self.sphere_ids[slot];
            // lights glow past the bloom threshold
            let glow = if self.records[i].kind == OrnamentKind::Light { 2.0 } else { 1.0 };
            self.sphere_instances[slot] = InstanceRaw::new(
                self.model(i, time),
                (self.records[i].color.rgb() * glow).extend(1.0),
            );
        }
    }

    pub fn records(&self) -> &[OrnamentRecord] {
        &self.records
    }

    pub fn current_positions(&self) -> &[Vec3] {
        &self.current
    }

    pub fn instances(&self, batch: OrnamentBatch) -> &[InstanceRaw] {
        match batch {
            OrnamentBatch::Boxes => &self.box_instances,
            OrnamentBatch::Spheres => &self.sphere_instances,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
