use glam::{Vec2, Vec3};

use crate::constants::{CLICK_SLOP_PX, DOUBLE_CLICK_SECS};

/// Latest pointer position in NDC plus button state.
#[derive(Default, Clone, Copy, Debug)]
pub struct PointerState {
    pub ndc: Vec2,
    pub down: bool,
    /// Cleared when the pointer leaves the window.
    pub inside: bool,
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// Classifies consecutive clicks by their timestamps and positions.
#[derive(Default, Clone, Copy, Debug)]
pub struct ClickTracker {
    last: Option<(f64, Vec2)>,
}

impl ClickTracker {
    /// `now` in seconds, `at` in window pixels. A click within the window
    /// and slop of the previous single click is a double; the pair is then
    /// consumed.
    pub fn click(&mut self, now: f64, at: Vec2) -> ClickKind {
        match self.last {
            Some((prev, from))
                if now - prev <= DOUBLE_CLICK_SECS as f64 && from.distance(at) <= CLICK_SLOP_PX =>
            {
                self.last = None;
                ClickKind::Double
            }
            _ => {
                self.last = Some((now, at));
                ClickKind::Single
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_sphere_in_front() {
        let t = ray_sphere(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert_eq!(t, Some(9.0));
        assert!(ray_sphere(Vec3::new(0.0, 0.0, 10.0), Vec3::Z, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn third_click_starts_a_new_pair() {
        let mut c = ClickTracker::default();
        let at = Vec2::new(200.0, 150.0);
        assert_eq!(c.click(0.0, at), ClickKind::Single);
        assert_eq!(c.click(0.2, at), ClickKind::Double);
        assert_eq!(c.click(0.3, at), ClickKind::Single);
        assert_eq!(c.click(1.0, at), ClickKind::Single);
    }

    #[test]
    fn quick_clicks_far_apart_stay_single() {
        let mut c = ClickTracker::default();
        assert_eq!(c.click(0.0, Vec2::new(100.0, 100.0)), ClickKind::Single);
        assert_eq!(c.click(0.1, Vec2::new(400.0, 100.0)), ClickKind::Single);
        // the second click becomes the new anchor
        assert_eq!(c.click(0.2, Vec2::new(403.0, 102.0)), ClickKind::Double);
    }
}
