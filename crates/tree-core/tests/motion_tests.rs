// Host-side tests for the per-frame engines: foliage, ornaments and dust.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tree_core::camera_rig::CameraRig;
use tree_core::constants::*;
use tree_core::dust::{step_scale, DustField, DustInput};
use tree_core::foliage::{ease_out_cubic, FoliageField};
use tree_core::layout::{generate_ornaments, ConeShape, FoliageLayout, OrnamentMix};
use tree_core::ornaments::{OrnamentBatch, OrnamentField};
use tree_core::{MorphState, TickContext};

const DT: f32 = 1.0 / 60.0;

fn ctx(morph: MorphState, frame: u32) -> TickContext {
    TickContext::new(morph, DT, frame as f32 * DT)
}

fn ornament_field(seed: u64, count: usize) -> OrnamentField {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let records = generate_ornaments(
        &mut StdRng::seed_from_u64(seed),
        count,
        cone,
        ORNAMENT_CHAOS_RADIUS,
        OrnamentMix::default(),
    );
    OrnamentField::new(records)
}

#[test]
fn ease_out_cubic_hits_its_endpoints() {
    assert_eq!(ease_out_cubic(0.0), 0.0);
    assert_eq!(ease_out_cubic(1.0), 1.0);
    assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
}

#[test]
fn foliage_progress_eases_toward_the_morph_target() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let layout = FoliageLayout::generate(&mut StdRng::seed_from_u64(3), 100, cone, FOLIAGE_CHAOS_RADIUS);
    let mut field = FoliageField::new(&layout, TREE_HEIGHT);
    assert_eq!(field.evaluate(0), Some(layout.chaos[0]), "starts scattered");
    assert_eq!(field.evaluate(100), None);

    let mut last = field.progress();
    for frame in 0..600 {
        field.update(&ctx(MorphState::Assembled, frame));
        assert!(field.progress() >= last, "progress must not move backwards");
        last = field.progress();
    }
    assert!(last > 0.99, "progress {} should approach 1", last);
    for i in 0..field.len() {
        let p = field.evaluate(i).unwrap();
        // sway is bounded by the amplitude scaled by relative height
        let d = p - layout.target[i];
        assert!(d.y.abs() < 0.1, "shard {} off its target height by {}", i, d.y);
        assert!(d.length() < 0.5, "shard {} should be assembled, off by {}", i, d.length());
    }

    field.update(&ctx(MorphState::Scattered, 600));
    assert!(field.progress() < last);
    assert_eq!(field.uniforms().progress, field.progress());
    assert_eq!(field.uniforms().tree_height, TREE_HEIGHT);
}

#[test]
fn ornaments_converge_on_their_targets() {
    let mut field = ornament_field(4, 120);
    assert!(!field.is_empty());
    for frame in 0..1000 {
        field.update(&ctx(MorphState::Assembled, frame));
    }
    for (rec, pos) in field.records().iter().zip(field.current_positions()) {
        assert!(
            pos.distance(rec.target) < 1e-3,
            "ornament {} still {} from its target",
            rec.id,
            pos.distance(rec.target)
        );
    }
}

#[test]
fn ornaments_scatter_at_half_speed() {
    let mut field = ornament_field(5, 120);
    for frame in 0..1000 {
        field.update(&ctx(MorphState::Assembled, frame));
    }
    field.update(&ctx(MorphState::Scattered, 1000));
    for (rec, pos) in field.records().iter().zip(field.current_positions()) {
        let gap = rec.target.distance(rec.chaos);
        if gap < 1e-3 {
            continue;
        }
        let travelled = pos.distance(rec.target) / gap;
        let expected = DT * rec.speed * SCATTER_RATE_FACTOR;
        assert!(
            (travelled - expected).abs() < 1e-3,
            "ornament {} moved {} of the way, expected {}",
            rec.id,
            travelled,
            expected
        );
    }
}

#[test]
fn ornament_batches_cover_every_record() {
    let field = ornament_field(6, 200);
    let boxes = field.instances(OrnamentBatch::Boxes).len();
    let spheres = field.instances(OrnamentBatch::Spheres).len();
    assert_eq!(boxes + spheres, field.len());
}

#[test]
fn step_scale_is_clamped() {
    assert!((step_scale(DT) - 1.0).abs() < 1e-6);
    assert_eq!(step_scale(1.0), DUST_MAX_STEP_SCALE);
    assert_eq!(step_scale(-1.0), 0.0);
}

#[test]
fn dust_wraps_to_the_opposite_face_keeping_velocity() {
    let rig = CameraRig::new(1.0);
    let mut field = DustField::new(1, 7);
    let top = field.bounds().half_extents.y;
    {
        let mote = &mut field.motes_mut()[0];
        mote.position = Vec3::new(0.0, top - 0.01, 0.0);
        mote.velocity = Vec3::new(0.0, 0.1, 0.0);
    }
    let input = DustInput {
        pointer: Vec2::ZERO,
        gesture_active: false,
        camera: rig.camera(),
    };
    field.update(&TickContext::new(MorphState::Scattered, DT, 0.0), &input);
    let mote = field.motes()[0];
    assert_eq!(mote.position.y, -top, "mote must reappear on the lower face");
    assert!(mote.velocity.y > 0.05, "velocity {:?} must survive the wrap", mote.velocity);
    assert_eq!(field.attractor(), None, "no attraction before any interaction");
}

#[test]
fn dust_stays_inside_bounds_under_uneven_frames() {
    let rig = CameraRig::new(1.5);
    let mut field = DustField::new(500, 8);
    let mut rng = StdRng::seed_from_u64(9);
    let mut elapsed = 0.0;
    for i in 0..2000 {
        let dt = rng.gen_range(0.0..0.3);
        elapsed += dt;
        let pointer = if i % 3 == 0 {
            Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        } else {
            Vec2::ZERO
        };
        let input = DustInput {
            pointer,
            gesture_active: false,
            camera: rig.camera(),
        };
        field.update(&TickContext::new(MorphState::Assembled, dt, elapsed), &input);
    }
    let bounds = field.bounds();
    for m in field.motes() {
        assert!(bounds.contains(m.position), "mote escaped to {:?}", m.position);
        assert!(m.velocity.length() <= DUST_MAX_SPEED + 1e-5);
    }
    assert_eq!(field.instances().len(), 500);
}

#[test]
fn attraction_touches_at_most_the_nearest_cap() {
    let rig = CameraRig::new(1.0);
    let mut field = DustField::new(1000, 10);
    let centre = Vec3::new(0.0, CAMERA_CENTER_HEIGHT, 0.0);
    let mut rng = StdRng::seed_from_u64(11);
    for m in field.motes_mut() {
        let offset = Vec3::new(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-3.0..3.0),
        );
        m.position = centre + offset;
        m.velocity = Vec3::ZERO;
    }
    let input = DustInput {
        pointer: Vec2::new(1e-3, 0.0),
        gesture_active: false,
        camera: rig.camera(),
    };
    field.update(&TickContext::new(MorphState::Scattered, DT, 0.0), &input);
    assert_eq!(field.affected_last_update(), DUST_INTERACTION_CAP);
    let attractor = field.attractor().expect("pointer movement enables attraction");
    assert!(attractor.z.abs() < 1e-3, "attractor sits on the z = 0 plane");
}

#[test]
fn gesture_enables_attraction_even_at_the_origin() {
    let rig = CameraRig::new(1.0);
    let mut field = DustField::new(50, 12);
    let input = DustInput {
        pointer: Vec2::ZERO,
        gesture_active: true,
        camera: rig.camera(),
    };
    field.update(&TickContext::new(MorphState::Scattered, DT, 0.0), &input);
    assert!(field.attractor().is_some());
}
