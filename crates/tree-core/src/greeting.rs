//! The velvet-hat character that speaks a greeting when clicked.
//!
//! Audio is played by a collaborator: the scene emits play/stop events and
//! reports the voice's lifecycle back through [`GreetingCharacter::on_voice`].

use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::*;
use crate::input::ray_sphere;
use crate::layout::{velvet_cloud, VelvetShape};
use crate::mesh::SpriteInstance;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Greeting {
    pub text: &'static str,
    /// Asset name resolved by the voice player.
    pub audio: &'static str,
}

pub const GREETINGS: [Greeting; 6] = [
    Greeting {
        text: "May the magic of Christmas wrap you in warmth, and the carols of angels sing peace into your heart all year long.",
        audio: "greetings/warmth.mp3",
    },
    Greeting {
        text: "As the evergreen holds its color through winter, may hope and kindness remain evergreen in your heart.",
        audio: "greetings/evergreen.mp3",
    },
    Greeting {
        text: "Christmas is not a time nor a season, but a state of mind. To cherish peace and goodwill, to be plenteous in mercy, is to have the real spirit of Christmas.",
        audio: "greetings/state-of-mind.mp3",
    },
    Greeting {
        text: "Christmas is a season for kindling the fire of hospitality in the hall, the genial flame of charity in the heart",
        audio: "greetings/hospitality.mp3",
    },
    Greeting {
        text: "May the Christmas spirit of love and joy surround you and your family.",
        audio: "greetings/love-and-joy.mp3",
    },
    Greeting {
        text: "Wishing you a season where time slows like falling snow, allowing you to gather the love and light that truly matter.",
        audio: "greetings/falling-snow.mp3",
    },
];

/// Lifecycle callbacks from the voice player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceEvent {
    Started,
    Ended,
    Failed,
}

/// One point-cloud part of the hat, already placed in hat-local space.
pub struct HatPart {
    pub shape: VelvetShape,
    pub sprites: Vec<SpriteInstance>,
}

pub struct GreetingCharacter {
    rng: StdRng,
    focused: bool,
    hovered: bool,
    speaking: bool,
    current: Option<usize>,
    model: Mat4,
    outer_scale: f32,
    parts: Vec<HatPart>,
}

impl GreetingCharacter {
    /// `with_points` builds the three velvet clouds; without them the
    /// character is interactive but draws nothing.
    pub fn new(seed: u64, with_points: bool) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut parts = Vec::new();
        if with_points {
            let pompom = Mat4::from_translation(Vec3::new(0.0, 2.4, 0.0))
                * Mat4::from_rotation_z(-0.6)
                * Mat4::from_translation(Vec3::new(0.45, 0.0, 0.0));
            for (shape, local) in [
                (VelvetShape::Cone, Mat4::IDENTITY),
                (VelvetShape::Brim, Mat4::IDENTITY),
                (VelvetShape::PomPom, pompom),
            ] {
                let size = shape.point_size();
                let sprites = velvet_cloud(&mut rng, shape, shape.default_count())
                    .into_iter()
                    .map(|p| SpriteInstance {
                        position: local.transform_point3(p.position).to_array(),
                        size,
                        color: p.color.extend(1.0).to_array(),
                    })
                    .collect();
                parts.push(HatPart { shape, sprites });
            }
        }
        Self {
            rng,
            focused: false,
            hovered: false,
            speaking: false,
            current: None,
            model: Mat4::IDENTITY,
            outer_scale: 1.0,
            parts,
        }
    }

    /// Follow the anchor inside the spinning tree group.
    pub fn update(&mut self, elapsed: f32, tree: Mat4) {
        let position = tree.transform_point3(HAT_ANCHOR);
        self.outer_scale = if self.focused { HAT_FOCUSED_SCALE } else { 1.0 };
        let pulse = if self.speaking {
            (elapsed * HAT_SPEAK_FREQ).sin() * HAT_SPEAK_PULSE
        } else {
            0.0
        };
        let scale = self.outer_scale * (1.0 + pulse / self.outer_scale);
        self.model = Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::from_rotation_z(HAT_TILT),
            position,
        );
    }

    /// Distance along the ray to the click collider, if hit.
    pub fn hit(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let base = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.outer_scale),
            Quat::from_rotation_z(HAT_TILT),
            self.model.w_axis.truncate(),
        );
        let center = base.transform_point3(HAT_COLLIDER_OFFSET);
        ray_sphere(ray_origin, ray_dir, center, HAT_COLLIDER_RADIUS * self.outer_scale)
    }

    /// Focus and pick a greeting. Returns the greeting to play, or `None`
    /// if already focused.
    pub fn focus(&mut self) -> Option<Greeting> {
        if self.focused {
            return None;
        }
        self.focused = true;
        log::info!("[greeting] focused");
        Some(self.speak())
    }

    /// Returns true if focus was actually released; the caller stops the voice.
    pub fn unfocus(&mut self) -> bool {
        if !self.focused {
            return false;
        }
        self.focused = false;
        self.speaking = false;
        self.current = None;
        log::info!("[greeting] unfocused");
        true
    }

    /// Choose a random greeting and show its subtitle. The caller stops any
    /// current voice and starts the new one.
    pub fn speak(&mut self) -> Greeting {
        let i = self.rng.gen_range(0..GREETINGS.len());
        self.current = Some(i);
        self.speaking = false;
        GREETINGS[i]
    }

    pub fn on_voice(&mut self, event: VoiceEvent) {
        self.speaking = matches!(event, VoiceEvent::Started) && self.focused;
        if event == VoiceEvent::Failed {
            log::warn!("[greeting] voice failed to load");
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn speaking(&self) -> bool {
        self.speaking
    }

    pub fn subtitle(&self) -> Option<&'static str> {
        self.current.map(|i| GREETINGS[i].text)
    }

    /// Hat-to-world transform including the speaking pulse.
    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn parts(&self) -> &[HatPart] {
        &self.parts
    }
}
