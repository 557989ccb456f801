// Host-side tests for the spiral curve, the ribbon mesh and the frame anchors.

use glam::Vec3;
use std::f32::consts::TAU;
use tree_core::constants::*;
use tree_core::curve::SpiralCurve;
use tree_core::frames::frame_anchors;
use tree_core::ribbon::build_ribbon;

fn tree_curve() -> SpiralCurve {
    SpiralCurve::new(TREE_HEIGHT, TREE_RADIUS + RIBBON_RADIUS_PAD, RIBBON_TURNS)
}

#[test]
fn endpoints_follow_the_formula() {
    let c = tree_curve();
    let start = c.point_at(0.0);
    let end = c.point_at(1.0);
    let r0 = c.base_radius + c.min_radius;
    assert!((start - Vec3::new(r0, -TREE_HEIGHT / 2.0, 0.0)).length() < 1e-4);

    let a = TAU * c.turns;
    let expected_end = Vec3::new(a.cos() * c.min_radius, TREE_HEIGHT / 2.0, a.sin() * c.min_radius);
    assert!(
        (end - expected_end).length() < 1e-3,
        "end {:?} vs {:?}",
        end,
        expected_end
    );
}

#[test]
fn tangent_is_unit_length_everywhere() {
    let c = tree_curve();
    for i in 0..=1000 {
        let t = i as f32 / 1000.0;
        let len = c.tangent_at(t).length();
        assert!((len - 1.0).abs() < 1e-4, "tangent length {} at t={}", len, t);
    }
}

#[test]
fn radius_tapers_and_height_rises_monotonically() {
    let c = tree_curve();
    let mut last: Option<(f32, f32)> = None;
    for (_, f) in c.sample(RIBBON_SEGMENTS) {
        let radial = Vec3::new(f.point.x, 0.0, f.point.z).length();
        if let Some((r, y)) = last {
            assert!(radial < r + 1e-4, "radius must not grow");
            assert!(f.point.y > y, "height must rise");
        }
        last = Some((radial, f.point.y));
    }
}

#[test]
fn sample_basis_is_orthonormal() {
    let c = tree_curve();
    for (_, f) in c.sample(50) {
        assert!(f.normal.y.abs() < 1e-6, "normal must be horizontal");
        assert!((f.normal.length() - 1.0).abs() < 1e-4);
        assert!((f.binormal.length() - 1.0).abs() < 1e-4);
        assert!(f.binormal.dot(f.tangent).abs() < 1e-4);
        assert!(f.binormal.dot(f.normal).abs() < 1e-4);
    }
}

#[test]
#[should_panic]
fn zero_height_curve_is_rejected() {
    let _ = SpiralCurve::new(0.0, 6.0, 4.0);
}

#[test]
#[should_panic]
fn zero_turn_curve_is_rejected() {
    let _ = SpiralCurve::new(15.0, 6.0, 0.0);
}

#[test]
fn ribbon_has_two_vertices_per_sample_and_valid_indices() {
    let c = tree_curve();
    let mesh = build_ribbon(&c, RIBBON_SEGMENTS, RIBBON_WIDTH);
    assert_eq!(mesh.vertices.len(), 2 * (RIBBON_SEGMENTS + 1));
    assert_eq!(mesh.indices.len(), 6 * RIBBON_SEGMENTS);
    let n = mesh.vertices.len() as u32;
    assert!(mesh.indices.iter().all(|&i| i < n), "index out of range");
}

#[test]
fn ribbon_edges_straddle_the_curve_edge_on() {
    let c = tree_curve();
    let segments = 40;
    let mesh = build_ribbon(&c, segments, RIBBON_WIDTH);
    for (i, (t, f)) in c.sample(segments).enumerate() {
        let left = Vec3::from(mesh.vertices[2 * i].position);
        let right = Vec3::from(mesh.vertices[2 * i + 1].position);
        let mid = (left + right) * 0.5;
        assert!((mid - f.point).length() < 1e-4, "ribbon must be centred on the curve");
        assert!(((left - right).length() - RIBBON_WIDTH).abs() < 1e-4);
        // across-ribbon direction has no outward component
        assert!((left - right).dot(f.normal).abs() < 1e-4);
        assert_eq!(mesh.vertices[2 * i].uv[1], t);
    }
}

#[test]
fn anchors_sit_just_off_the_ribbon() {
    let c = tree_curve();
    let anchors = frame_anchors(&c, FRAME_COUNT, FRAME_SURFACE_OFFSET);
    assert_eq!(anchors.len(), FRAME_COUNT);
    for (i, a) in anchors.iter().enumerate() {
        let expected_t = FRAME_T_START + FRAME_T_SPAN * i as f32 / FRAME_COUNT as f32;
        assert!((a.t - expected_t).abs() < 1e-6);
        let on_curve = c.point_at(a.t);
        let offset = a.position - on_curve;
        assert!((offset.length() - FRAME_SURFACE_OFFSET).abs() < 1e-4);
        assert!(offset.normalize().dot(a.normal) > 0.999, "offset must be outward");
        // local +Z faces outward, local +Y follows the binormal
        let z = a.orientation * Vec3::Z;
        let y = a.orientation * Vec3::Y;
        assert!(z.dot(a.normal) > 0.999);
        assert!(y.dot(a.binormal) > 0.999);
    }
}
