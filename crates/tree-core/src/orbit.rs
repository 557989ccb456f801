//! Yaw spin, polar tilt and zoom distance driven by drag, wheel, gesture
//! impulses and auto-rotate.

use glam::Vec2;

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    pub yaw_velocity: f32,
    pub polar_angle: f32,
    pub distance: f32,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            yaw_velocity: 0.0,
            polar_angle: INITIAL_POLAR,
            distance: INITIAL_DISTANCE,
        }
    }
}

#[inline]
pub fn clamp_polar(angle: f32) -> f32 {
    angle.clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON)
}

#[inline]
pub fn clamp_distance(distance: f32) -> f32 {
    distance.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[derive(Clone, Debug, Default)]
pub struct OrbitIntegrator {
    state: OrbitState,
    rotation: f32,
    auto_rotate: bool,
    drag: Option<Vec2>,
}

impl OrbitIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OrbitState {
        self.state
    }

    /// Accumulated yaw of the tree group, radians.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Switching either way clears residual spin.
    pub fn set_auto_rotate(&mut self, on: bool) {
        if self.auto_rotate != on {
            log::info!("[orbit] auto-rotate {}", if on { "on" } else { "off" });
        }
        self.auto_rotate = on;
        self.state.yaw_velocity = 0.0;
    }

    pub fn begin_drag(&mut self, px: Vec2) {
        self.drag = Some(px);
    }

    /// Feed a pointer move. Does nothing unless a drag is active.
    pub fn drag_to(&mut self, px: Vec2) {
        if let Some(last) = self.drag {
            let d = px - last;
            self.drag = Some(px);
            self.apply_drag_delta(d);
        }
    }

    /// Pointer up or leave.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Horizontal pixels feed yaw velocity; vertical pixels tilt immediately.
    pub fn apply_drag_delta(&mut self, delta: Vec2) {
        self.state.yaw_velocity += delta.x * DRAG_YAW_GAIN;
        self.pitch(delta.y);
    }

    pub fn pitch(&mut self, delta_px: f32) {
        self.state.polar_angle = clamp_polar(self.state.polar_angle - delta_px * PITCH_GAIN);
    }

    pub fn zoom(&mut self, wheel_delta: f32) {
        self.state.distance = clamp_distance(self.state.distance + wheel_delta * ZOOM_GAIN);
    }

    /// Slider position 0..100, far to near.
    pub fn set_zoom_slider(&mut self, value: f32) {
        let v = value.clamp(0.0, 100.0) / 100.0;
        self.state.distance = clamp_distance(MAX_ZOOM - v * (MAX_ZOOM - MIN_ZOOM));
    }

    /// Forced framing used by the wallpaper export.
    pub fn set_framing(&mut self, distance: f32, polar_angle: f32) {
        self.state.distance = clamp_distance(distance);
        self.state.polar_angle = clamp_polar(polar_angle);
    }

    /// One frame of integration. `impulse` is the gesture spin consumed this
    /// tick; auto-rotate discards it.
    pub fn tick(&mut self, dt: f32, impulse: Option<f32>) {
        if self.auto_rotate {
            self.rotation += AUTO_ROTATE_RATE * dt;
            self.state.yaw_velocity = 0.0;
            return;
        }
        if let Some(i) = impulse {
            self.state.yaw_velocity += i;
        }
        self.rotation += self.state.yaw_velocity;
        self.state.yaw_velocity *= YAW_DAMPING;
        if self.state.yaw_velocity.abs() < YAW_EPSILON {
            self.state.yaw_velocity = 0.0;
        }
    }
}
