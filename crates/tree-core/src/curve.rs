//! Tapering spiral shared by the ribbon mesh and the frame anchors.

use glam::Vec3;
use std::f32::consts::TAU;

use crate::constants::RIBBON_MIN_RADIUS;

/// Parametric spiral around the Y axis, centred vertically on the origin.
///
/// `t = 0` is the wide bottom, `t = 1` the narrow top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiralCurve {
    pub height: f32,
    pub base_radius: f32,
    pub turns: f32,
    pub min_radius: f32,
}

/// Orthonormal-ish basis at a curve sample.
#[derive(Clone, Copy, Debug)]
pub struct CurveFrame {
    pub point: Vec3,
    pub tangent: Vec3,
    /// Horizontal direction from the tree axis to the point.
    pub normal: Vec3,
    /// `tangent x normal`, the across-ribbon direction.
    pub binormal: Vec3,
}

impl SpiralCurve {
    pub fn new(height: f32, base_radius: f32, turns: f32) -> Self {
        Self::with_min_radius(height, base_radius, turns, RIBBON_MIN_RADIUS)
    }

    pub fn with_min_radius(height: f32, base_radius: f32, turns: f32, min_radius: f32) -> Self {
        assert!(height > 0.0, "curve height must be positive");
        assert!(base_radius >= 0.0, "curve radius must be non-negative");
        assert!(turns > 0.0, "curve needs a positive turn count");
        assert!(min_radius > 0.0, "curve must stay off the axis");
        Self {
            height,
            base_radius,
            turns,
            min_radius,
        }
    }

    #[inline]
    fn radius_at(&self, t: f32) -> f32 {
        self.base_radius * (1.0 - t) + self.min_radius
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        let y = (t - 0.5) * self.height;
        let r = self.radius_at(t);
        let a = t * TAU * self.turns;
        Vec3::new(a.cos() * r, y, a.sin() * r)
    }

    /// Analytic derivative of [`Self::point_at`] with respect to `t`.
    pub fn derivative_at(&self, t: f32) -> Vec3 {
        let r = self.radius_at(t);
        let dr = -self.base_radius;
        let a = t * TAU * self.turns;
        let da = TAU * self.turns;
        let (s, c) = a.sin_cos();
        Vec3::new(dr * c - r * s * da, self.height, dr * s + r * c * da)
    }

    pub fn tangent_at(&self, t: f32) -> Vec3 {
        self.derivative_at(t).normalize()
    }

    pub fn frame_at(&self, t: f32) -> CurveFrame {
        let point = self.point_at(t);
        let tangent = self.tangent_at(t);
        let normal = Vec3::new(point.x, 0.0, point.z).normalize();
        let binormal = tangent.cross(normal).normalize();
        CurveFrame {
            point,
            tangent,
            normal,
            binormal,
        }
    }

    /// `segments + 1` evenly spaced frames from `t = 0` to `t = 1`.
    pub fn sample(&self, segments: usize) -> impl Iterator<Item = (f32, CurveFrame)> + '_ {
        let n = segments.max(1);
        (0..=n).map(move |i| {
            let t = i as f32 / n as f32;
            (t, self.frame_at(t))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytic_derivative_matches_finite_difference() {
        let c = SpiralCurve::new(15.0, 6.2, 4.0);
        let h = 1e-3;
        for i in 1..20 {
            let t = i as f32 / 20.0;
            let fd = (c.point_at(t + h) - c.point_at(t - h)) / (2.0 * h);
            let an = c.derivative_at(t);
            assert!(
                (fd - an).length() / an.length() < 1e-2,
                "t={} fd={:?} analytic={:?}",
                t,
                fd,
                an
            );
        }
    }
}
