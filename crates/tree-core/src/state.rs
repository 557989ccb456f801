//! State types shared by every engine in the scene.
//!
//! Nothing here references a windowing or GPU API; the native front-end
//! reads these to build its uniforms, and the engines receive a
//! [`TickContext`] snapshot instead of reaching for globals.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// The two morph targets every particle system eases between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MorphState {
    #[default]
    Scattered,
    Assembled,
}

impl MorphState {
    pub fn toggled(self) -> Self {
        match self {
            MorphState::Scattered => MorphState::Assembled,
            MorphState::Assembled => MorphState::Scattered,
        }
    }

    #[inline]
    pub fn is_assembled(self) -> bool {
        matches!(self, MorphState::Assembled)
    }

    pub fn label(self) -> &'static str {
        match self {
            MorphState::Scattered => "SCATTERED",
            MorphState::Assembled => "ASSEMBLED",
        }
    }
}

/// Read-only snapshot handed to each engine's per-frame update.
#[derive(Clone, Copy, Debug)]
pub struct TickContext {
    pub morph: MorphState,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the scene started.
    pub elapsed: f32,
}

impl TickContext {
    pub fn new(morph: MorphState, dt: f32, elapsed: f32) -> Self {
        Self { morph, dt, elapsed }
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a normalized device coordinate (x, y in [-1, 1], z in [0, 1]) back to world space.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        let inv = self.view_proj().inverse();
        let p = inv * Vec4::new(ndc.x, ndc.y, ndc.z, 1.0);
        p.truncate() / p.w
    }

    /// World-space ray through a point in normalized device coordinates.
    ///
    /// Returns `(ray_origin, ray_direction)` with a unit direction.
    pub fn screen_ray(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let far = self.unproject(ndc.extend(1.0));
        let dir = (far - self.eye).normalize_or_zero();
        (self.eye, dir)
    }
}

/// Convert a pixel position (origin top-left) into normalized device coordinates.
#[inline]
pub fn pixel_to_ndc(px: Vec2, viewport: Vec2) -> Vec2 {
    let w = viewport.x.max(1.0);
    let h = viewport.y.max(1.0);
    Vec2::new((2.0 * px.x / w) - 1.0, 1.0 - (2.0 * px.y / h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: std::f32::consts::FRAC_PI_4,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    #[test]
    fn centre_ray_points_at_target() {
        let (o, d) = camera().screen_ray(Vec2::ZERO);
        assert_eq!(o, Vec3::new(0.0, 0.0, 10.0));
        assert!((d - Vec3::NEG_Z).length() < 1e-4, "dir was {:?}", d);
    }

    #[test]
    fn pixel_corners_map_to_ndc_corners() {
        let vp = Vec2::new(800.0, 600.0);
        assert_eq!(pixel_to_ndc(Vec2::ZERO, vp), Vec2::new(-1.0, 1.0));
        assert_eq!(pixel_to_ndc(vp, vp), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn morph_toggle_round_trips() {
        let s = MorphState::default();
        assert_eq!(s, MorphState::Scattered);
        assert_eq!(s.toggled(), MorphState::Assembled);
        assert_eq!(s.toggled().toggled(), s);
    }
}
