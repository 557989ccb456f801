//! Photo frames hung along the ribbon.
//!
//! Anchors come from the same [`SpiralCurve`] as the ribbon mesh so a frame
//! sits flush on the strip when assembled. Scattered frames drift around a
//! private chaos point instead.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
use rand::Rng;

use crate::constants::*;
use crate::curve::SpiralCurve;
use crate::input::{ray_sphere, ClickKind};
use crate::mesh::{InstanceRaw, PhotoInstance};
use crate::state::TickContext;

#[derive(Clone, Copy, Debug)]
pub struct FrameAnchor {
    pub t: f32,
    pub position: Vec3,
    pub tangent: Vec3,
    pub binormal: Vec3,
    pub normal: Vec3,
    /// Local y follows the binormal, z faces outward; x completes a
    /// right-handed basis and runs against the tangent.
    pub orientation: Quat,
}

/// Sparse anchors at `t = start + span * i / count`, pushed off the curve by
/// `offset` along the outward normal.
pub fn frame_anchors(curve: &SpiralCurve, count: usize, offset: f32) -> Vec<FrameAnchor> {
    (0..count)
        .map(|i| {
            let t = FRAME_T_START + FRAME_T_SPAN * (i as f32 / count as f32);
            let f = curve.frame_at(t);
            // binormal is orthogonal to tangent and normal; rebuild x from it
            let z = f.normal;
            let y = f.binormal;
            let x = y.cross(z).normalize();
            FrameAnchor {
                t,
                position: f.point + f.normal * offset,
                tangent: f.tangent,
                binormal: f.binormal,
                normal: f.normal,
                orientation: Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize(),
            }
        })
        .collect()
}

/// What a click on a frame should trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAction {
    RequestUpload(usize),
    OpenViewer(usize),
}

/// Empty frames take single clicks, filled frames take double clicks.
pub fn frame_click(index: usize, has_image: bool, click: ClickKind) -> Option<FrameAction> {
    match (has_image, click) {
        (false, ClickKind::Single) => Some(FrameAction::RequestUpload(index)),
        (true, ClickKind::Double) => Some(FrameAction::OpenViewer(index)),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct PhotoFrame {
    pub index: usize,
    pub anchor: FrameAnchor,
    pub chaos: Vec3,
    pub spin_rate: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub hover_scale: f32,
}

impl PhotoFrame {
    fn new<R: Rng + ?Sized>(rng: &mut R, index: usize, anchor: FrameAnchor) -> Self {
        let half = FRAME_CHAOS_EXTENT * 0.5;
        let spin = FRAME_CHAOS_SPIN * 0.5;
        Self {
            index,
            anchor,
            chaos: Vec3::new(
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            ),
            spin_rate: Vec3::new(
                rng.gen_range(-spin..spin),
                rng.gen_range(-spin..spin),
                rng.gen_range(-spin..spin),
            ),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            hover_scale: 1.0,
        }
    }

    pub fn update(&mut self, ctx: &TickContext, hovered: bool) {
        if ctx.morph.is_assembled() {
            let step = (ctx.dt * FRAME_ATTACH_RATE).clamp(0.0, 1.0);
            self.position = self.position.lerp(self.anchor.position, step);
            self.rotation = self.rotation.slerp(self.anchor.orientation, step);
        } else {
            let bob = FRAME_BOB_AMPLITUDE * (ctx.elapsed + self.index as f32).sin();
            let goal = self.chaos + Vec3::new(0.0, bob, 0.0);
            let step = (ctx.dt * FRAME_FLOAT_RATE).clamp(0.0, 1.0);
            self.position = self.position.lerp(goal, step);
            let spin = self.spin_rate * ctx.dt;
            self.rotation =
                (self.rotation * Quat::from_euler(EulerRot::XYZ, spin.x, spin.y, spin.z)).normalize();
        }
        let goal = if hovered { FRAME_HOVER_SCALE } else { 1.0 };
        let step = (ctx.dt * FRAME_HOVER_RATE).clamp(0.0, 1.0);
        self.hover_scale += (goal - self.hover_scale) * step;
    }

    /// Tree-local transform of the frame body.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.hover_scale), self.rotation, self.position)
    }
}

/// Texture coordinate for a photo-plane `corner` in `[-0.5, 0.5]^2`.
///
/// The plane's base mapping is mirrored on both axes, so the
/// half-turn offset in [`MediaSlot::texture_rotation`] shows an
/// unrotated photo upright. `photo.wgsl` mirrors this.
///
/// [`MediaSlot::texture_rotation`]: crate::media::MediaSlot::texture_rotation
pub fn photo_uv(corner: Vec2, rotation: f32) -> Vec2 {
    let base = Vec2::new(-corner.x, corner.y);
    let (s, c) = rotation.sin_cos();
    Vec2::new(c * base.x + s * base.y, c * base.y - s * base.x) + Vec2::splat(0.5)
}

/// The three stacked pieces of each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePart {
    Border,
    Backing,
    Photo,
}

pub struct FrameSet {
    frames: Vec<PhotoFrame>,
    hovered: Option<usize>,
    border: Vec<InstanceRaw>,
    backing: Vec<InstanceRaw>,
    photo: Vec<InstanceRaw>,
    planes: Vec<PhotoInstance>,
    plane_slots: Vec<usize>,
}

impl FrameSet {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, curve: &SpiralCurve, count: usize) -> Self {
        let frames: Vec<PhotoFrame> = frame_anchors(curve, count, FRAME_SURFACE_OFFSET)
            .into_iter()
            .enumerate()
            .map(|(i, a)| PhotoFrame::new(rng, i, a))
            .collect();
        let n = frames.len();
        Self {
            frames,
            hovered: None,
            border: vec![InstanceRaw::hidden(); n],
            backing: vec![InstanceRaw::hidden(); n],
            photo: vec![InstanceRaw::hidden(); n],
            planes: Vec::with_capacity(n),
            plane_slots: Vec::with_capacity(n),
        }
    }

    /// Advance every frame and rebuild the instance batches.
    /// `photo` returns the texture rotation of slot `i` when it holds a photo.
    pub fn update(&mut self, ctx: &TickContext, photo: impl Fn(usize) -> Option<f32>) {
        let hovered = self.hovered;
        for f in &mut self.frames {
            f.update(ctx, hovered == Some(f.index));
        }
        self.planes.clear();
        self.plane_slots.clear();
        for (slot, f) in self.frames.iter().enumerate() {
            let body = f.transform();
            let border_color = if hovered == Some(f.index) {
                Vec3::new(1.0, 0.929, 0.702)
            } else {
                palette(GOLD_HIGH)
            };
            self.border[slot] = InstanceRaw::new(
                body * Mat4::from_scale_rotation_translation(
                    Vec3::from(FRAME_BORDER_SIZE),
                    Quat::IDENTITY,
                    Vec3::new(0.0, 0.0, -0.05),
                ),
                border_color.extend(1.0),
            );
            self.backing[slot] = InstanceRaw::new(
                body * Mat4::from_scale_rotation_translation(
                    Vec3::from(FRAME_BACKING_SIZE),
                    Quat::IDENTITY,
                    Vec3::new(0.0, 0.0, -0.06),
                ),
                Vec4::new(0.067, 0.067, 0.067, 1.0),
            );
            let rotation = photo(f.index);
            let photo_color = if rotation.is_some() {
                Vec4::new(0.92, 0.9, 0.85, 1.0)
            } else {
                Vec4::new(0.133, 0.133, 0.133, 1.0)
            };
            self.photo[slot] = InstanceRaw::new(
                body * Mat4::from_scale_rotation_translation(
                    Vec3::new(FRAME_PHOTO_SIZE, FRAME_PHOTO_SIZE, 0.01),
                    Quat::IDENTITY,
                    Vec3::new(0.0, 0.0, 0.02),
                ),
                photo_color,
            );
            if let Some(rotation) = rotation {
                // just in front of the photo block's face
                let plane = body
                    * Mat4::from_scale_rotation_translation(
                        Vec3::new(FRAME_PHOTO_SIZE, FRAME_PHOTO_SIZE, 1.0),
                        Quat::IDENTITY,
                        Vec3::new(0.0, 0.0, 0.027),
                    );
                self.planes.push(PhotoInstance::new(plane, rotation));
                self.plane_slots.push(f.index);
            }
        }
    }

    /// Nearest frame under the ray. `tree` maps tree-local space to world.
    pub fn pick(&self, tree: Mat4, ray_origin: Vec3, ray_dir: Vec3) -> Option<usize> {
        self.frames
            .iter()
            .filter_map(|f| {
                let center = tree.transform_point3(f.position);
                ray_sphere(ray_origin, ray_dir, center, FRAME_PICK_RADIUS * f.hover_scale)
                    .map(|t| (t, f.index))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, i)| i)
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn frames(&self) -> &[PhotoFrame] {
        &self.frames
    }

    pub fn instances(&self, part: FramePart) -> &[InstanceRaw] {
        match part {
            FramePart::Border => &self.border,
            FramePart::Backing => &self.backing,
            FramePart::Photo => &self.photo,
        }
    }

    /// Planes for filled frames, parallel to [`FrameSet::plane_slots`].
    pub fn photo_planes(&self) -> &[PhotoInstance] {
        &self.planes
    }

    /// Frame index of each entry in [`FrameSet::photo_planes`].
    pub fn plane_slots(&self) -> &[usize] {
        &self.plane_slots
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn unrotated_photo_is_upright() {
        // corners are plane-local (x right, y up); uv has v growing downward
        assert!(close(photo_uv(Vec2::new(-0.5, 0.5), PI), Vec2::new(0.0, 0.0)));
        assert!(close(photo_uv(Vec2::new(0.5, 0.5), PI), Vec2::new(1.0, 0.0)));
        assert!(close(photo_uv(Vec2::new(0.5, -0.5), PI), Vec2::new(1.0, 1.0)));
        assert!(close(photo_uv(Vec2::ZERO, 1.234), Vec2::splat(0.5)), "centre is fixed");
    }

    #[test]
    fn quarter_turns_move_the_corners() {
        let top_left = Vec2::new(-0.5, 0.5);
        let upright = photo_uv(top_left, PI);
        let turned = photo_uv(top_left, PI - FRAC_PI_2);
        assert!(!close(upright, turned), "a quarter turn must change the mapping");
        assert!(close(turned, Vec2::new(1.0, 0.0)), "top-left shows {:?}", turned);
        let full = photo_uv(top_left, PI - 4.0 * FRAC_PI_2);
        assert!(close(full, upright), "four turns come back around");
    }
}
