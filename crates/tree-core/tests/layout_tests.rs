// Host-side tests for the procedural layout generators.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tree_core::constants::*;
use tree_core::layout::*;

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[test]
fn chaos_samples_stay_inside_sphere() {
    let mut r = rng(1);
    for _ in 0..10_000 {
        let p = sample_in_sphere(&mut r, 40.0);
        assert!(p.length() <= 40.0 + 1e-3, "sample {:?} outside radius", p);
    }
}

#[test]
fn chaos_density_is_uniform_in_volume() {
    // For a uniform ball, P(r < R/2) = 1/8 and E[r] = 3R/4.
    let mut r = rng(2);
    let n = 20_000;
    let radius = 10.0;
    let mut inner = 0usize;
    let mut sum = 0.0f32;
    for _ in 0..n {
        let d = sample_in_sphere(&mut r, radius).length();
        if d < radius * 0.5 {
            inner += 1;
        }
        sum += d;
    }
    let inner_frac = inner as f32 / n as f32;
    let mean = sum / n as f32;
    assert!(
        (0.10..0.15).contains(&inner_frac),
        "inner-half fraction {} should be near 0.125",
        inner_frac
    );
    assert!(
        (7.2..7.8).contains(&mean),
        "mean distance {} should be near 0.75 R",
        mean
    );
}

#[test]
fn cone_targets_respect_height_and_taper() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let mut r = rng(3);
    for _ in 0..10_000 {
        let p = cone.sample_volume(&mut r);
        assert!(
            p.y >= -TREE_HEIGHT / 2.0 && p.y <= TREE_HEIGHT / 2.0,
            "y {} outside the tree",
            p.y
        );
        let h = p.y + TREE_HEIGHT / 2.0;
        let radial = Vec3::new(p.x, 0.0, p.z).length();
        assert!(
            radial <= cone.radius_at(h) + 1e-3,
            "radial {} exceeds {} at height {}",
            radial,
            cone.radius_at(h),
            h
        );
    }
}

#[test]
fn cone_targets_are_biased_toward_surface() {
    // sqrt radius: P(r > rmax/2) = 3/4
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let mut r = rng(4);
    let n = 10_000;
    let outer = (0..n)
        .filter(|_| {
            let p = cone.sample_volume(&mut r);
            let h = p.y + TREE_HEIGHT / 2.0;
            Vec3::new(p.x, 0.0, p.z).length() > cone.radius_at(h) * 0.5
        })
        .count();
    let frac = outer as f32 / n as f32;
    assert!((0.70..0.80).contains(&frac), "outer fraction {} should be near 0.75", frac);
}

#[test]
fn foliage_layout_is_deterministic_per_seed() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let a = FoliageLayout::generate(&mut rng(9), 200, cone, FOLIAGE_CHAOS_RADIUS);
    let b = FoliageLayout::generate(&mut rng(9), 200, cone, FOLIAGE_CHAOS_RADIUS);
    assert_eq!(a.len(), 200);
    assert_eq!(a.chaos, b.chaos);
    assert_eq!(a.target, b.target);
    assert!(a.scale.iter().all(|s| (0.0..1.0).contains(s)));
}

#[test]
fn empty_request_yields_empty_layouts() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    assert!(FoliageLayout::generate(&mut rng(0), 0, cone, 40.0).is_empty());
    let ornaments = generate_ornaments(&mut rng(0), 0, cone, 35.0, OrnamentMix::default());
    assert!(ornaments.is_empty());
}

#[test]
fn gifts_are_never_culled() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let mix = OrnamentMix { gift: 1.0, light: 0.0 };
    let out = generate_ornaments(&mut rng(5), 500, cone, ORNAMENT_CHAOS_RADIUS, mix);
    assert_eq!(out.len(), 500, "every gift candidate must survive");
    assert!(out.iter().all(|o| o.kind == OrnamentKind::Gift));
}

#[test]
fn ornament_tilt_offsets_span_half_a_turn() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let out = generate_ornaments(&mut rng(7), 2000, cone, ORNAMENT_CHAOS_RADIUS, OrnamentMix::default());
    let half_turn = std::f32::consts::PI;
    for o in &out {
        let r = o.rotation_offset;
        assert!((0.0..half_turn).contains(&r.x), "x offset {} out of range", r.x);
        assert!((0.0..half_turn).contains(&r.y), "y offset {} out of range", r.y);
        assert_eq!(r.z, 0.0);
    }
    let widest = out.iter().map(|o| o.rotation_offset.x).fold(0.0f32, f32::max);
    assert!(widest > 0.9 * half_turn, "offsets should cover the range, max was {}", widest);
}

#[test]
fn gift_colours_split_evenly_and_scale_stays_in_band() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let mix = OrnamentMix { gift: 1.0, light: 0.0 };
    let out = generate_ornaments(&mut rng(6), 4000, cone, ORNAMENT_CHAOS_RADIUS, mix);
    let red = out.iter().filter(|o| o.color == OrnamentColor::Red).count();
    let frac = red as f32 / out.len() as f32;
    assert!((0.45..0.55).contains(&frac), "red gifts {} should be near half", frac);
    assert!(out.iter().all(|o| o.color != OrnamentColor::Silver));
    for o in &out {
        let lo = GIFT_SCALE * (1.0 - GIFT_SCALE_VARIANCE) - 1e-5;
        let hi = GIFT_SCALE * (1.0 + GIFT_SCALE_VARIANCE) + 1e-5;
        assert!((lo..=hi).contains(&o.scale), "gift scale {} out of band", o.scale);
    }
}

#[test]
fn balls_and_lights_thin_out_with_height() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let mix = OrnamentMix { gift: 0.0, light: 0.0 };
    let requested = 6000;
    let out = generate_ornaments(&mut rng(7), requested, cone, ORNAMENT_CHAOS_RADIUS, mix);
    let kept = out.len() as f32 / requested as f32;
    assert!((0.6..0.8).contains(&kept), "kept fraction {} outside expected band", kept);

    let top_band = (cone.height - 1.0) / cone.height;
    let third = top_band / 3.0;
    let bottom = out.iter().filter(|o| o.height_fraction < third).count();
    let top = out.iter().filter(|o| o.height_fraction >= 2.0 * third).count();
    assert!(
        (top as f32) < bottom as f32 * 0.85,
        "top third {} should be noticeably sparser than bottom third {}",
        top,
        bottom
    );
}

#[test]
fn silver_is_reserved_for_balls_and_rarer_near_the_top() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let out = generate_ornaments(
        &mut rng(8),
        8000,
        cone,
        ORNAMENT_CHAOS_RADIUS,
        OrnamentMix::default(),
    );
    for o in &out {
        if o.color == OrnamentColor::Silver {
            assert_eq!(o.kind, OrnamentKind::Ball, "only balls may be silver");
        }
    }
    let share = |low: bool| {
        let balls: Vec<_> = out
            .iter()
            .filter(|o| o.kind == OrnamentKind::Ball && (o.height_fraction < SILVER_HEIGHT_SPLIT) == low)
            .collect();
        let silver = balls.iter().filter(|o| o.color == OrnamentColor::Silver).count();
        silver as f32 / balls.len().max(1) as f32
    };
    let low = share(true);
    let high = share(false);
    assert!((0.15..0.30).contains(&low), "low silver share {}", low);
    assert!(high < 0.12, "high silver share {}", high);
}

#[test]
fn ornament_targets_sit_on_the_inset_cone() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let out = generate_ornaments(&mut rng(10), 500, cone, ORNAMENT_CHAOS_RADIUS, OrnamentMix::default());
    for o in &out {
        let h = o.target.y + TREE_HEIGHT / 2.0;
        assert!(h >= 0.0 && h < TREE_HEIGHT - 1.0 + 1e-4, "height {} out of range", h);
        let expected = (TREE_RADIUS - 0.5) * (1.0 - h / TREE_HEIGHT);
        let radial = Vec3::new(o.target.x, 0.0, o.target.z).length();
        assert!((radial - expected).abs() < 1e-3, "radial {} vs {}", radial, expected);
        assert!(o.chaos.length() <= ORNAMENT_CHAOS_RADIUS + 1e-3);
        assert_eq!(o.speed, o.kind.speed());
    }
}

#[test]
fn lights_use_red_and_gold_only() {
    let cone = ConeShape::new(TREE_HEIGHT, TREE_RADIUS);
    let mix = OrnamentMix { gift: 0.0, light: 1.0 };
    let out = generate_ornaments(&mut rng(11), 1000, cone, ORNAMENT_CHAOS_RADIUS, mix);
    assert!(!out.is_empty());
    for o in &out {
        assert_eq!(o.kind, OrnamentKind::Light);
        assert_ne!(o.color, OrnamentColor::Silver);
        assert_eq!(o.scale, LIGHT_SCALE);
    }
}

#[test]
fn velvet_cloud_jitter_stays_close_to_base_colour() {
    let mut r = rng(12);
    let cloud = velvet_cloud(&mut r, VelvetShape::Cone, 2000);
    assert_eq!(cloud.len(), 2000);
    let base = VelvetShape::Cone.base_color();
    for p in &cloud {
        let d = p.color - base;
        assert!(d.abs().max_element() <= 0.075 + 1e-4, "jitter {:?} too large", d);
        assert!(p.position.y >= 0.0 && p.position.y <= 2.5);
    }
}
