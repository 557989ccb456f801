use glam::Vec3;

use crate::constants::*;
use crate::orbit::OrbitState;
use crate::state::Camera;

/// Eases the camera toward the orbit's (distance, polar) goal and keeps it
/// looking at a fixed height on the tree axis.
#[derive(Clone, Debug)]
pub struct CameraRig {
    camera: Camera,
    center_height: f32,
    smoothing: f32,
}

impl CameraRig {
    pub fn new(aspect: f32) -> Self {
        let center = Vec3::new(0.0, CAMERA_CENTER_HEIGHT, 0.0);
        Self {
            camera: Camera {
                eye: CAMERA_INITIAL_POSITION,
                target: center,
                up: Vec3::Y,
                aspect,
                fovy_radians: CAMERA_FOV_DEGREES.to_radians(),
                znear: 0.1,
                zfar: 200.0,
            },
            center_height: CAMERA_CENTER_HEIGHT,
            smoothing: CAMERA_SMOOTHING,
        }
    }

    /// Where the eye is heading for a given orbit state.
    pub fn goal(&self, orbit: &OrbitState) -> Vec3 {
        Vec3::new(
            0.0,
            self.center_height + orbit.distance * orbit.polar_angle.cos(),
            orbit.distance * orbit.polar_angle.sin(),
        )
    }

    pub fn update(&mut self, dt: f32, orbit: &OrbitState) {
        let goal = self.goal(orbit);
        let step = (self.smoothing * dt).clamp(0.0, 1.0);
        self.camera.eye = self.camera.eye.lerp(goal, step);
        self.camera.target = Vec3::new(0.0, self.center_height, 0.0);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect.max(1e-3);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
