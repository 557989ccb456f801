//! Procedural placement of every particle population.
//!
//! All generators are pure apart from the random source passed in, so a
//! seeded `StdRng` reproduces a layout exactly.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::constants::*;

/// Uniform sample inside a sphere of `radius` around the origin.
///
/// The radius is scaled by a cube root so density is even through the volume.
pub fn sample_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let r = radius * rng.gen::<f32>().cbrt();
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Upright cone centred vertically on the origin, apex up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeShape {
    pub height: f32,
    pub radius: f32,
}

impl ConeShape {
    pub fn new(height: f32, radius: f32) -> Self {
        Self { height, radius }
    }

    /// Largest radial offset allowed at `h` above the base.
    #[inline]
    pub fn radius_at(&self, h: f32) -> f32 {
        self.radius * (1.0 - h / self.height)
    }

    /// Volume sample biased toward the surface by a square-root radius.
    pub fn sample_volume<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let h = rng.gen::<f32>() * self.height;
        let r = self.radius_at(h) * rng.gen::<f32>().sqrt();
        let a = rng.gen::<f32>() * TAU;
        Vec3::new(r * a.cos(), h - self.height / 2.0, r * a.sin())
    }
}

/// Fixed chaos/target pairs for the foliage shards.
#[derive(Clone, Debug, Default)]
pub struct FoliageLayout {
    pub chaos: Vec<Vec3>,
    pub target: Vec<Vec3>,
    pub scale: Vec<f32>,
}

impl FoliageLayout {
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        cone: ConeShape,
        chaos_radius: f32,
    ) -> Self {
        let mut out = Self {
            chaos: Vec::with_capacity(count),
            target: Vec::with_capacity(count),
            scale: Vec::with_capacity(count),
        };
        for _ in 0..count {
            out.chaos.push(sample_in_sphere(rng, chaos_radius));
            out.target.push(cone.sample_volume(rng));
            out.scale.push(rng.gen::<f32>());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.chaos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chaos.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrnamentKind {
    Gift,
    Ball,
    Light,
}

impl OrnamentKind {
    /// Speed weight; gifts feel heavy, lights weightless.
    pub fn speed(self) -> f32 {
        match self {
            OrnamentKind::Gift => GIFT_SPEED,
            OrnamentKind::Ball => BALL_SPEED,
            OrnamentKind::Light => LIGHT_SPEED,
        }
    }

    pub fn base_scale(self) -> f32 {
        match self {
            OrnamentKind::Gift => GIFT_SCALE,
            OrnamentKind::Ball => BALL_SCALE,
            OrnamentKind::Light => LIGHT_SCALE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrnamentColor {
    Red,
    Gold,
    Silver,
}

impl OrnamentColor {
    pub fn rgb(self) -> Vec3 {
        match self {
            OrnamentColor::Red => palette(RED_VELVET),
            OrnamentColor::Gold => palette(GOLD_HIGH),
            OrnamentColor::Silver => palette(SILVER),
        }
    }
}

/// Categorical weights for the ornament class draw. Balls take the remainder.
#[derive(Clone, Copy, Debug)]
pub struct OrnamentMix {
    pub gift: f32,
    pub light: f32,
}

impl Default for OrnamentMix {
    fn default() -> Self {
        Self {
            gift: GIFT_PROBABILITY,
            light: LIGHT_PROBABILITY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrnamentRecord {
    pub id: u32,
    pub kind: OrnamentKind,
    pub color: OrnamentColor,
    pub chaos: Vec3,
    pub target: Vec3,
    pub scale: f32,
    pub speed: f32,
    pub rotation_offset: Vec3,
    /// Height above the cone base as a fraction of the tree height.
    pub height_fraction: f32,
}

fn two_tone<R: Rng + ?Sized>(rng: &mut R) -> OrnamentColor {
    if rng.gen::<f32>() > 0.5 {
        OrnamentColor::Red
    } else {
        OrnamentColor::Gold
    }
}

/// Draw `requested` ornament candidates and keep the ones that survive the
/// height cull. Gifts are never culled.
pub fn generate_ornaments<R: Rng + ?Sized>(
    rng: &mut R,
    requested: usize,
    cone: ConeShape,
    chaos_radius: f32,
    mix: OrnamentMix,
) -> Vec<OrnamentRecord> {
    let mut out = Vec::with_capacity(requested);
    let usable_radius = (cone.radius - 0.5).max(0.0);
    for i in 0..requested {
        let chaos = sample_in_sphere(rng, chaos_radius);
        let h = rng.gen::<f32>() * (cone.height - 1.0).max(0.0);
        let hp = h / cone.height;
        let r = usable_radius * (1.0 - hp);
        let a = rng.gen::<f32>() * TAU;
        let target = Vec3::new(r * a.cos(), h - cone.height / 2.0, r * a.sin());

        let roll = rng.gen::<f32>();
        let kind = if roll < mix.light {
            OrnamentKind::Light
        } else if roll >= 1.0 - mix.gift {
            OrnamentKind::Gift
        } else {
            OrnamentKind::Ball
        };

        if kind != OrnamentKind::Gift {
            let cull = CULL_BASE + hp * CULL_HEIGHT_GAIN;
            if rng.gen::<f32>() < cull {
                continue;
            }
        }

        let (scale, color) = match kind {
            OrnamentKind::Gift => {
                let variance = (rng.gen::<f32>() * 2.0 - 1.0) * GIFT_SCALE_VARIANCE;
                (GIFT_SCALE * (1.0 + variance), two_tone(rng))
            }
            OrnamentKind::Ball => {
                let silver_chance = if hp < SILVER_HEIGHT_SPLIT {
                    SILVER_CHANCE_LOW
                } else {
                    SILVER_CHANCE_HIGH
                };
                let color = if rng.gen::<f32>() < silver_chance {
                    OrnamentColor::Silver
                } else {
                    two_tone(rng)
                };
                (BALL_SCALE, color)
            }
            OrnamentKind::Light => {
                const LIGHTS: [OrnamentColor; 4] = [
                    OrnamentColor::Red,
                    OrnamentColor::Red,
                    OrnamentColor::Gold,
                    OrnamentColor::Gold,
                ];
                (LIGHT_SCALE, LIGHTS[rng.gen_range(0..LIGHTS.len())])
            }
        };

        let rotation_offset = Vec3::new(rng.gen::<f32>() * PI, rng.gen::<f32>() * PI, 0.0);
        out.push(OrnamentRecord {
            id: i as u32,
            kind,
            color,
            chaos,
            target,
            scale,
            speed: kind.speed(),
            rotation_offset,
            height_fraction: hp,
        });
    }
    log::debug!("[layout] ornaments kept {} of {}", out.len(), requested);
    out
}

/// A single coloured point in one of the greeting character's clouds.
#[derive(Clone, Copy, Debug)]
pub struct CloudPoint {
    pub position: Vec3,
    pub color: Vec3,
}

/// Parts of the velvet hat, each a separate point cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VelvetShape {
    Cone,
    Brim,
    PomPom,
}

impl VelvetShape {
    pub fn base_color(self) -> Vec3 {
        match self {
            VelvetShape::Cone => palette(HAT_RED),
            VelvetShape::Brim | VelvetShape::PomPom => palette(HAT_WHITE),
        }
    }

    /// World-space sprite size of each point.
    pub fn point_size(self) -> f32 {
        match self {
            VelvetShape::Cone => 0.045,
            VelvetShape::Brim => 0.055,
            VelvetShape::PomPom => 0.05,
        }
    }

    pub fn default_count(self) -> usize {
        match self {
            VelvetShape::Cone => HAT_CONE_COUNT,
            VelvetShape::Brim => HAT_BRIM_COUNT,
            VelvetShape::PomPom => HAT_POMPOM_COUNT,
        }
    }

    fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Vec3 {
        match self {
            VelvetShape::Cone => {
                let h = rng.gen::<f32>() * 2.5;
                let r = 1.0 - h / 2.5;
                let a = rng.gen::<f32>() * TAU;
                let jx = 0.8 + 0.2 * rng.gen::<f32>();
                let jz = 0.8 + 0.2 * rng.gen::<f32>();
                Vec3::new(r * jx * a.cos(), h, r * jz * a.sin())
            }
            VelvetShape::Brim => {
                let u = rng.gen::<f32>() * TAU;
                let v = rng.gen::<f32>() * TAU;
                let tube = 0.65 * (0.7 + 0.3 * rng.gen::<f32>());
                let ring = 1.0 + tube * v.cos();
                Vec3::new(ring * u.cos(), tube * v.sin() * 0.7, ring * u.sin())
            }
            VelvetShape::PomPom => sample_in_sphere(rng, 0.5),
        }
    }
}

/// Point cloud for one hat part with a small lightness jitter per point.
pub fn velvet_cloud<R: Rng + ?Sized>(rng: &mut R, shape: VelvetShape, count: usize) -> Vec<CloudPoint> {
    let base = shape.base_color();
    (0..count)
        .map(|_| {
            let position = shape.sample(rng);
            let jitter = (rng.gen::<f32>() - 0.5) * 0.15;
            let color = (base + Vec3::splat(jitter)).clamp(Vec3::ZERO, Vec3::ONE);
            CloudPoint { position, color }
        })
        .collect()
}
