//! Free-running ambient dust with pointer magnetism.
//!
//! Forces are tuned per 60 Hz frame; each update scales them by
//! `k = clamp(dt * 60, 0, 3)` so a slow frame cannot blow the system up.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::constants::*;
use crate::mesh::SpriteInstance;
use crate::state::{Camera, TickContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DustKind {
    Gold,
    White,
}

#[derive(Clone, Copy, Debug)]
pub struct DustMote {
    pub kind: DustKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    pub phase: f32,
}

/// Axis-aligned wrap box centred on the origin.
#[derive(Clone, Copy, Debug)]
pub struct DustBounds {
    pub half_extents: Vec3,
}

impl DustBounds {
    /// Teleport each axis that left the box to the opposite face.
    pub fn wrap(&self, mut p: Vec3) -> Vec3 {
        let h = self.half_extents;
        for axis in 0..3 {
            if p[axis] > h[axis] {
                p[axis] = -h[axis];
            } else if p[axis] < -h[axis] {
                p[axis] = h[axis];
            }
        }
        p
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.abs().cmple(self.half_extents).all()
    }
}

impl Default for DustBounds {
    fn default() -> Self {
        Self {
            half_extents: DUST_HALF_EXTENTS,
        }
    }
}

/// Where the attraction point comes from this frame.
#[derive(Clone, Copy, Debug)]
pub struct DustInput<'a> {
    /// Latest pointer (or hand) position in NDC.
    pub pointer: Vec2,
    /// Set once a gesture session is running.
    pub gesture_active: bool,
    pub camera: &'a Camera,
}

/// Step scale relative to a 60 Hz reference frame.
#[inline]
pub fn step_scale(dt: f32) -> f32 {
    (dt * DUST_REFERENCE_HZ).clamp(0.0, DUST_MAX_STEP_SCALE)
}

/// Intersect the pointer ray with the world plane z = 0.
///
/// `None` when the ray is parallel or the hit lies outside (0, 100).
pub fn attraction_point(camera: &Camera, ndc: Vec2) -> Option<Vec3> {
    let (origin, dir) = camera.screen_ray(ndc);
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let dist = -origin.z / dir.z;
    (dist > 0.0 && dist < DUST_PLANE_MAX_DISTANCE).then(|| origin + dir * dist)
}

pub struct DustField {
    motes: Vec<DustMote>,
    instances: Vec<SpriteInstance>,
    bounds: DustBounds,
    rng: StdRng,
    interacted: bool,
    attractor: Vec3,
    // (distance, index) candidates reused across frames
    candidates: Vec<(f32, usize)>,
}

impl DustField {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bounds = DustBounds::default();
        let h = bounds.half_extents;
        let motes: Vec<DustMote> = (0..count)
            .map(|_| {
                let kind = if rng.gen::<f32>() < DUST_GOLD_FRACTION {
                    DustKind::Gold
                } else {
                    DustKind::White
                };
                let position = Vec3::new(
                    rng.gen_range(-h.x..h.x),
                    rng.gen_range(-h.y..h.y),
                    rng.gen_range(-h.z..h.z),
                );
                let size = match kind {
                    DustKind::Gold => rng.gen_range(0.1..0.5),
                    DustKind::White => rng.gen_range(0.4..1.2),
                };
                DustMote {
                    kind,
                    position,
                    velocity: Vec3::ZERO,
                    size,
                    phase: rng.gen::<f32>() * TAU,
                }
            })
            .collect();
        let mut field = Self {
            instances: Vec::with_capacity(motes.len()),
            motes,
            bounds,
            rng,
            interacted: false,
            attractor: Vec3::ZERO,
            candidates: Vec::new(),
        };
        field.write_instances(0.0);
        field
    }

    pub fn update(&mut self, ctx: &TickContext, input: &DustInput<'_>) {
        let k = step_scale(ctx.dt);
        let t = ctx.elapsed;

        if !self.interacted && (input.pointer != Vec2::ZERO || input.gesture_active) {
            self.interacted = true;
            log::debug!("[dust] attraction enabled");
        }
        if self.interacted {
            if let Some(p) = attraction_point(input.camera, input.pointer) {
                self.attractor = p;
            }
        }

        for m in &mut self.motes {
            let accel = match m.kind {
                DustKind::Gold => Vec3::new(
                    DUST_GOLD_SWAY * (t * 0.5 + m.phase).sin(),
                    DUST_GOLD_LIFT,
                    0.0,
                ),
                DustKind::White => Vec3::new(
                    DUST_WHITE_SWAY * (t * 0.3 + m.phase).sin(),
                    -DUST_WHITE_GRAVITY,
                    DUST_WHITE_SWAY * (t * 0.2 + m.phase).cos(),
                ),
            };
            m.velocity += accel * k;
        }

        if self.interacted {
            self.attract(k);
        }

        let drag = DUST_DRAG.powf(k);
        for m in &mut self.motes {
            m.velocity *= drag;
            m.velocity = m.velocity.clamp_length_max(DUST_MAX_SPEED);
            m.position = self.bounds.wrap(m.position + m.velocity * k);
        }

        self.write_instances(t);
    }

    /// Magnetism toward the attractor for the nearest motes, up to the cap.
    fn attract(&mut self, k: f32) {
        let target = self.attractor;
        self.candidates.clear();
        for (i, m) in self.motes.iter().enumerate() {
            let d = m.position.distance(target);
            if d < DUST_GATHER_RADIUS {
                self.candidates.push((d, i));
            }
        }
        if self.candidates.len() > DUST_INTERACTION_CAP {
            self.candidates
                .select_nth_unstable_by(DUST_INTERACTION_CAP, |a, b| a.0.total_cmp(&b.0));
            self.candidates.truncate(DUST_INTERACTION_CAP);
        }

        let hover_damping = DUST_HOVER_DAMPING.powf(k);
        let half_jitter = DUST_JITTER * 0.5;
        for &(d, i) in &self.candidates {
            let m = &mut self.motes[i];
            if d > DUST_HOVER_RADIUS {
                let dir = (target - m.position) / d;
                m.velocity += dir * DUST_GATHER_STRENGTH * k;
            } else {
                m.velocity *= hover_damping;
            }
            let jitter = Vec3::new(
                self.rng.gen_range(-half_jitter..=half_jitter),
                self.rng.gen_range(-half_jitter..=half_jitter),
                self.rng.gen_range(-half_jitter..=half_jitter),
            );
            m.velocity += jitter * k;
        }
    }

    fn write_instances(&mut self, t: f32) {
        self.instances.clear();
        for m in &self.motes {
            let (freq, color) = match m.kind {
                DustKind::Gold => (4.0, palette(GOLD_HIGH)),
                DustKind::White => (1.5, palette(SNOW_WHITE)),
            };
            let size = m.size * (1.0 + (t * freq + m.phase).sin() * DUST_SIZE_PULSE);
            self.instances.push(SpriteInstance {
                position: m.position.to_array(),
                size,
                color: color.extend(1.0).to_array(),
            });
        }
    }

    /// Number of motes pulled toward the attractor on the last update.
    pub fn affected_last_update(&self) -> usize {
        if self.interacted {
            self.candidates.len()
        } else {
            0
        }
    }

    pub fn attractor(&self) -> Option<Vec3> {
        self.interacted.then_some(self.attractor)
    }

    pub fn bounds(&self) -> DustBounds {
        self.bounds
    }

    pub fn motes(&self) -> &[DustMote] {
        &self.motes
    }

    /// Direct access for tests and scripted scenes.
    pub fn motes_mut(&mut self) -> &mut [DustMote] {
        &mut self.motes
    }

    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }
}
