// Host-side tests for the orbit integrator, camera rig and reveal progress.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use tree_core::camera_rig::CameraRig;
use tree_core::constants::*;
use tree_core::orbit::{OrbitIntegrator, OrbitState};
use tree_core::ribbon::RevealProgress;

const DT: f32 = 1.0 / 60.0;

#[test]
fn polar_angle_never_reaches_the_poles() {
    let mut orbit = OrbitIntegrator::new();
    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..5000 {
        let d = match rng.gen_range(0..4) {
            0 => 1e6,
            1 => -1e6,
            _ => rng.gen_range(-500.0..500.0),
        };
        orbit.pitch(d);
        let p = orbit.state().polar_angle;
        assert!(
            p >= POLAR_EPSILON && p <= PI - POLAR_EPSILON,
            "polar {} escaped after delta {}",
            p,
            d
        );
    }
}

#[test]
fn drag_pitch_is_immediate_and_clamped() {
    let mut orbit = OrbitIntegrator::new();
    let before = orbit.state().polar_angle;
    orbit.begin_drag(Vec2::new(100.0, 100.0));
    orbit.drag_to(Vec2::new(100.0, 110.0));
    let after = orbit.state().polar_angle;
    assert!((before - after - 10.0 * PITCH_GAIN).abs() < 1e-5);
    assert_eq!(orbit.state().yaw_velocity, 0.0, "vertical drag must not spin");

    orbit.drag_to(Vec2::new(100.0, -1e6));
    assert!(orbit.state().polar_angle <= PI - POLAR_EPSILON);
}

#[test]
fn distance_stays_within_zoom_limits() {
    let mut orbit = OrbitIntegrator::new();
    let mut rng = StdRng::seed_from_u64(22);
    for _ in 0..5000 {
        let wheel = rng.gen_range(-10_000.0..10_000.0);
        orbit.zoom(wheel);
        let d = orbit.state().distance;
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&d), "distance {} out of range", d);
    }
    orbit.set_zoom_slider(0.0);
    assert_eq!(orbit.state().distance, MAX_ZOOM);
    orbit.set_zoom_slider(100.0);
    assert_eq!(orbit.state().distance, MIN_ZOOM);
    orbit.set_zoom_slider(500.0);
    assert_eq!(orbit.state().distance, MIN_ZOOM);
}

#[test]
fn yaw_velocity_decays_to_exactly_zero() {
    let mut orbit = OrbitIntegrator::new();
    orbit.apply_drag_delta(Vec2::new(1250.0, 0.0));
    assert!((orbit.state().yaw_velocity - 1.0).abs() < 1e-5);

    let mut ticks = 0;
    while orbit.state().yaw_velocity != 0.0 {
        orbit.tick(DT, None);
        ticks += 1;
        assert!(ticks < 200, "velocity did not reach zero in a bounded number of ticks");
    }
    let rotation = orbit.rotation();
    for _ in 0..10 {
        orbit.tick(DT, None);
    }
    assert_eq!(orbit.state().yaw_velocity, 0.0);
    assert_eq!(orbit.rotation(), rotation, "no drift once at rest");
}

#[test]
fn impulse_feeds_velocity_once() {
    let mut orbit = OrbitIntegrator::new();
    orbit.tick(DT, Some(0.05));
    assert!((orbit.rotation() - 0.05).abs() < 1e-6);
    assert!((orbit.state().yaw_velocity - 0.05 * YAW_DAMPING).abs() < 1e-6);
}

#[test]
fn auto_rotate_discards_impulses() {
    let mut orbit = OrbitIntegrator::new();
    orbit.apply_drag_delta(Vec2::new(500.0, 0.0));
    orbit.set_auto_rotate(true);
    assert_eq!(orbit.state().yaw_velocity, 0.0, "auto-rotate starts from rest");

    orbit.tick(DT, Some(3.0));
    assert_eq!(orbit.state().yaw_velocity, 0.0, "impulse must not be queued");
    assert!((orbit.rotation() - AUTO_ROTATE_RATE * DT).abs() < 1e-6);

    orbit.set_auto_rotate(false);
    let r = orbit.rotation();
    orbit.tick(DT, None);
    assert_eq!(orbit.rotation(), r, "no inertia leaks when auto-rotate ends");
}

#[test]
fn drag_only_applies_between_down_and_up() {
    let mut orbit = OrbitIntegrator::new();
    orbit.drag_to(Vec2::new(50.0, 0.0));
    assert_eq!(orbit.state().yaw_velocity, 0.0, "moves without a drag are ignored");
    orbit.begin_drag(Vec2::ZERO);
    orbit.drag_to(Vec2::new(100.0, 0.0));
    assert!((orbit.state().yaw_velocity - 100.0 * DRAG_YAW_GAIN).abs() < 1e-6);
    orbit.end_drag();
    assert!(!orbit.dragging());
    orbit.drag_to(Vec2::new(300.0, 0.0));
    assert!((orbit.state().yaw_velocity - 100.0 * DRAG_YAW_GAIN).abs() < 1e-6);
}

#[test]
fn camera_eases_toward_the_orbit_goal() {
    let mut rig = CameraRig::new(16.0 / 9.0);
    let state = OrbitState::default();
    let goal = rig.goal(&state);
    assert!((goal.y - (CAMERA_CENTER_HEIGHT + INITIAL_DISTANCE * INITIAL_POLAR.cos())).abs() < 1e-4);
    assert!((goal.z - INITIAL_DISTANCE * INITIAL_POLAR.sin()).abs() < 1e-4);

    let start = rig.camera().eye.distance(goal);
    rig.update(DT, &state);
    let after_one = rig.camera().eye.distance(goal);
    assert!(after_one < start && after_one > 0.0, "one tick moves part of the way");
    for _ in 0..600 {
        rig.update(DT, &state);
    }
    assert!(rig.camera().eye.distance(goal) < 1e-3);
    assert_eq!(rig.camera().target.y, CAMERA_CENTER_HEIGHT);
}

fn ticks_until(reveal: &mut RevealProgress, shown: bool, done: impl Fn(f32) -> bool) -> usize {
    let mut n = 0;
    while !done(reveal.value()) {
        reveal.update(shown, DT);
        n += 1;
        assert!(n < 100_000, "reveal never converged");
    }
    n
}

#[test]
fn reveal_is_monotonic_toward_its_target() {
    let mut reveal = RevealProgress::new();
    let mut last = reveal.value();
    for _ in 0..300 {
        let v = reveal.update(true, DT);
        assert!(v >= last && v <= 1.0, "reveal went backwards: {} -> {}", last, v);
        last = v;
    }
    for _ in 0..300 {
        let v = reveal.update(false, DT);
        assert!(v <= last && v >= 0.0, "hide went backwards: {} -> {}", last, v);
        last = v;
    }
}

#[test]
fn hiding_is_roughly_five_times_faster_than_revealing() {
    let mut reveal = RevealProgress::new();
    let up = ticks_until(&mut reveal, true, |v| v > 0.99);
    let down = ticks_until(&mut reveal, false, |v| v < 0.01);
    let ratio = up as f32 / down as f32;
    let expected = HIDE_RATE / REVEAL_RATE;
    assert!(
        (ratio - expected).abs() < 1.0,
        "reveal/hide tick ratio {} should be near {}",
        ratio,
        expected
    );
}
