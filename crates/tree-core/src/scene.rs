//! Top-level scene: owns the morph state and mode flags, runs every engine
//! once per tick and routes pointer input through the hit-test order
//! (greeting character, frames, then the orbit drag).

use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;
use std::time::Duration;

use crate::camera_rig::CameraRig;
use crate::config::SceneConfig;
use crate::constants::*;
use crate::curve::SpiralCurve;
use crate::dust::{DustField, DustInput};
use crate::error::{CollaboratorError, StatusBoard};
use crate::export::{ExportSession, ExportStep, FrameRecorder, SavedFraming};
use crate::foliage::FoliageField;
use crate::frames::{frame_click, FrameAction, FrameSet};
use crate::gesture::{
    GestureMailbox, GestureSession, GestureStatus, HandSource, MorphMirror,
};
use crate::greeting::{Greeting, GreetingCharacter, VoiceEvent};
use crate::input::{ClickKind, PointerState};
use crate::layout::{generate_ornaments, ConeShape, FoliageLayout, OrnamentMix};
use crate::media::{MediaLibrary, MediaStore};
use crate::orbit::OrbitIntegrator;
use crate::ornaments::OrnamentField;
use crate::ribbon::{build_ribbon, RevealProgress, RibbonMesh};
use crate::star::TopStar;
use crate::state::{Camera, MorphState, TickContext};

/// Notifications for the host, drained from every [`Scene::tick`].
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    MorphChanged(MorphState),
    RibbonToggled(bool),
    WallpaperMode(bool),
    RequestUpload(usize),
    OpenViewer(usize),
    PlayGreeting(Greeting),
    StopGreeting,
    /// A playback that was rejected earlier can be retried now.
    RetryPlayback(String),
    GestureStatus(GestureStatus),
    /// The gesture session was running before an export stopped it.
    ResumeGesture,
    Notice(String),
    StartRecording {
        mime: &'static str,
        fps: u32,
        bits_per_second: u32,
    },
    StopRecording,
}

pub type SceneEvents = SmallVec<[SceneEvent; 4]>;

struct ActiveExport {
    session: ExportSession,
    recorder: Box<dyn FrameRecorder>,
    recording: bool,
}

pub struct Scene {
    config: SceneConfig,
    morph: MorphState,
    ribbon_visible: bool,
    wallpaper: bool,
    elapsed: f32,

    foliage: FoliageField,
    ornaments: OrnamentField,
    dust: DustField,
    curve: SpiralCurve,
    ribbon: RibbonMesh,
    reveal: RevealProgress,
    frames: FrameSet,
    greeting: GreetingCharacter,
    star: TopStar,

    orbit: OrbitIntegrator,
    rig: CameraRig,
    pointer: PointerState,
    /// The press that closed the greeting overlay; its click goes nowhere.
    dismiss_click: bool,

    media: MediaLibrary,
    status: StatusBoard,

    mailbox: GestureMailbox,
    morph_mirror: MorphMirror,
    gesture: Option<GestureSession>,
    gesture_status: GestureStatus,
    gesture_pointer: Option<Vec2>,

    export: Option<ActiveExport>,
    events: SceneEvents,
}

impl Scene {
    pub fn new(config: SceneConfig, aspect: f32) -> Self {
        config.assert_valid();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let cone = ConeShape::new(config.tree_height, config.tree_radius);

        let foliage_layout =
            FoliageLayout::generate(&mut rng, config.foliage_count, cone, FOLIAGE_CHAOS_RADIUS);
        let foliage = FoliageField::new(&foliage_layout, config.tree_height);

        let mix = OrnamentMix {
            gift: config.gift_probability,
            light: config.light_probability,
        };
        let records = generate_ornaments(
            &mut rng,
            config.ornament_count,
            cone,
            ORNAMENT_CHAOS_RADIUS,
            mix,
        );
        let ornaments = OrnamentField::new(records);

        let curve = SpiralCurve::new(
            config.tree_height,
            config.tree_radius + RIBBON_RADIUS_PAD,
            config.ribbon_turns,
        );
        let ribbon = build_ribbon(&curve, config.ribbon_segments, config.ribbon_width);
        let frames = FrameSet::new(&mut rng, &curve, config.frame_count);

        let dust = DustField::new(config.dust_count, config.seed.wrapping_add(1));
        let greeting = GreetingCharacter::new(config.seed.wrapping_add(2), config.hat_points);

        log::info!(
            "[scene] built: {} shards, {} ornaments, {} motes, {} frames",
            foliage.len(),
            ornaments.len(),
            dust.motes().len(),
            frames.len()
        );

        Self {
            star: TopStar::new(config.tree_height),
            config,
            morph: MorphState::Scattered,
            ribbon_visible: true,
            wallpaper: false,
            elapsed: 0.0,
            foliage,
            ornaments,
            dust,
            curve,
            ribbon,
            reveal: RevealProgress::new(),
            frames,
            greeting,
            orbit: OrbitIntegrator::new(),
            rig: CameraRig::new(aspect),
            pointer: PointerState::default(),
            dismiss_click: false,
            media: MediaLibrary::new(),
            status: StatusBoard::default(),
            mailbox: GestureMailbox::new(),
            morph_mirror: MorphMirror::default(),
            gesture: None,
            gesture_status: GestureStatus::Off,
            gesture_pointer: None,
            export: None,
            events: SceneEvents::new(),
        }
    }

    /// Advance one frame and return what happened since the last tick.
    pub fn tick(&mut self, dt: Duration) -> SceneEvents {
        let dt = dt.as_secs_f32();
        self.elapsed += dt;

        let mut impulse = None;
        if let Some(frame) = self.mailbox.take() {
            if frame.status != self.gesture_status {
                self.gesture_status = frame.status;
                self.events.push(SceneEvent::GestureStatus(frame.status));
                if frame.status == GestureStatus::CameraError {
                    self.status.set_line(frame.status.label());
                }
            }
            if frame.status == GestureStatus::CameraError {
                self.drop_failed_gesture();
            }
            if !self.wallpaper {
                if let Some(p) = frame.pointer {
                    self.gesture_pointer = Some(p);
                }
                if let Some(pitch) = frame.pitch {
                    self.orbit.pitch(pitch);
                }
                if let Some(request) = frame.request {
                    self.set_morph(request);
                }
                impulse = frame.spin;
            }
        }
        self.orbit.tick(dt, impulse);
        self.rig.update(dt, &self.orbit.state());

        let ctx = TickContext::new(self.morph, dt, self.elapsed);
        let tree = self.tree_transform();

        self.foliage.update(&ctx);
        self.ornaments.update(&ctx);

        let pointer = match (self.gesture.is_some(), self.gesture_pointer) {
            (true, Some(p)) => p,
            _ => self.pointer.ndc,
        };
        let input = DustInput {
            pointer,
            gesture_active: self.gesture.is_some(),
            camera: self.rig.camera(),
        };
        self.dust.update(&ctx, &input);

        self.reveal
            .update(self.ribbon_visible && self.morph.is_assembled(), dt);
        if self.ribbon_visible {
            let media = &self.media;
            self.frames
                .update(&ctx, |i| media.slot(i).map(|slot| slot.texture_rotation()));
        }
        self.greeting.update(self.elapsed, tree);

        self.tick_export(dt);
        std::mem::take(&mut self.events)
    }

    fn tick_export(&mut self, dt: f32) {
        let Some(active) = self.export.as_mut() else {
            return;
        };
        match active.session.tick(active.recorder.as_ref(), dt) {
            Ok(ExportStep::Continue) => {}
            Ok(ExportStep::StartRecording {
                mime,
                fps,
                bits_per_second,
            }) => {
                active.recording = true;
                self.events.push(SceneEvent::StartRecording {
                    mime,
                    fps,
                    bits_per_second,
                });
            }
            Ok(ExportStep::Finished) => {
                self.events.push(SceneEvent::StopRecording);
                self.finish_export();
            }
            Err(e) => {
                self.report(&e);
                self.finish_export();
            }
        }
    }

    // ---------------- Morph / mode flags ----------------

    pub fn morph(&self) -> MorphState {
        self.morph
    }

    pub fn set_morph(&mut self, morph: MorphState) {
        if self.morph == morph {
            return;
        }
        self.morph = morph;
        self.morph_mirror.store(morph);
        log::info!("[scene] morph -> {}", morph.label());
        self.events.push(SceneEvent::MorphChanged(morph));
    }

    pub fn toggle_morph(&mut self) {
        self.set_morph(self.morph.toggled());
    }

    pub fn ribbon_visible(&self) -> bool {
        self.ribbon_visible
    }

    pub fn toggle_ribbon(&mut self) {
        self.ribbon_visible = !self.ribbon_visible;
        if !self.ribbon_visible {
            self.frames.set_hovered(None);
        }
        log::info!("[scene] ribbon {}", if self.ribbon_visible { "shown" } else { "hidden" });
        self.events.push(SceneEvent::RibbonToggled(self.ribbon_visible));
    }

    pub fn wallpaper(&self) -> bool {
        self.wallpaper
    }

    /// Wallpaper mode auto-rotates, hides the character and disables hit-testing.
    pub fn set_wallpaper(&mut self, on: bool) {
        if self.wallpaper == on {
            return;
        }
        if self.export.is_some() {
            log::warn!("[scene] wallpaper is locked while exporting");
            return;
        }
        self.wallpaper = on;
        self.orbit.set_auto_rotate(on);
        if on {
            self.orbit.end_drag();
            self.frames.set_hovered(None);
            self.greeting.set_hovered(false);
            if self.greeting.unfocus() {
                self.events.push(SceneEvent::StopGreeting);
            }
        }
        self.events.push(SceneEvent::WallpaperMode(on));
    }

    // ---------------- Pointer routing ----------------

    fn ray(&self, ndc: Vec2) -> (Vec3, Vec3) {
        self.rig.camera().screen_ray(ndc)
    }

    fn frames_interactive(&self) -> bool {
        self.ribbon_visible && !self.wallpaper && !self.greeting.focused() && !self.greeting.hovered()
    }

    fn pick_frame(&self, ndc: Vec2) -> Option<usize> {
        if !self.frames_interactive() {
            return None;
        }
        let (o, d) = self.ray(ndc);
        self.frames.pick(self.tree_transform(), o, d)
    }

    fn hat_hit(&self, ndc: Vec2) -> bool {
        if self.wallpaper {
            return false;
        }
        let (o, d) = self.ray(ndc);
        self.greeting.hit(o, d).is_some()
    }

    /// `ndc` for picking, `px` in window pixels for drag deltas.
    pub fn pointer_down(&mut self, ndc: Vec2, px: Vec2) {
        self.pointer.ndc = ndc;
        self.pointer.down = true;
        self.dismiss_click = false;
        if let Some(what) = self.status.take_pending_retry() {
            self.events.push(SceneEvent::RetryPlayback(what));
        }
        if self.wallpaper || self.media.viewing().is_some() {
            return;
        }
        if self.greeting.focused() {
            // overlay: clicking away from the character dismisses it
            if !self.hat_hit(ndc) {
                self.unfocus_greeting();
                self.dismiss_click = true;
            }
            return;
        }
        if self.hat_hit(ndc) {
            if let Some(g) = self.greeting.focus() {
                self.greeting.set_hovered(false);
                self.frames.set_hovered(None);
                self.events.push(SceneEvent::StopGreeting);
                self.events.push(SceneEvent::PlayGreeting(g));
            }
            return;
        }
        if self.pick_frame(ndc).is_some() {
            return;
        }
        self.orbit.begin_drag(px);
    }

    pub fn pointer_move(&mut self, ndc: Vec2, px: Vec2) {
        self.pointer.ndc = ndc;
        self.pointer.inside = true;
        if self.wallpaper {
            return;
        }
        self.orbit.drag_to(px);
        if self.greeting.focused() || self.media.viewing().is_some() {
            return;
        }
        let over_hat = self.hat_hit(ndc);
        self.greeting.set_hovered(over_hat);
        let hovered = self.pick_frame(ndc);
        self.frames.set_hovered(hovered);
    }

    pub fn pointer_up(&mut self) {
        self.pointer.down = false;
        self.orbit.end_drag();
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.down = false;
        self.pointer.inside = false;
        self.orbit.end_drag();
        self.frames.set_hovered(None);
        self.greeting.set_hovered(false);
    }

    /// Route a completed click. Returns the frame action taken, if any.
    pub fn click(&mut self, ndc: Vec2, kind: ClickKind) -> Option<FrameAction> {
        if std::mem::take(&mut self.dismiss_click) {
            return None;
        }
        if self.wallpaper || self.media.viewing().is_some() || self.greeting.focused() {
            return None;
        }
        if self.hat_hit(ndc) {
            return None;
        }
        let index = self.pick_frame(ndc)?;
        let action = frame_click(index, self.media.has_image(index), kind)?;
        match action {
            FrameAction::RequestUpload(i) => {
                log::info!("[scene] upload requested for frame {}", i);
                self.events.push(SceneEvent::RequestUpload(i));
            }
            FrameAction::OpenViewer(i) => {
                self.media.open_viewer(i);
                self.events.push(SceneEvent::OpenViewer(i));
            }
        }
        Some(action)
    }

    pub fn wheel(&mut self, delta: f32) {
        if self.wallpaper || self.media.viewing().is_some() {
            return;
        }
        self.orbit.zoom(delta);
    }

    pub fn set_zoom_slider(&mut self, value: f32) {
        if !self.wallpaper {
            self.orbit.set_zoom_slider(value);
        }
    }

    /// Escape: close the viewer first, then the greeting overlay.
    pub fn dismiss(&mut self) {
        if self.media.viewing().is_some() {
            self.media.close_viewer();
        } else {
            self.unfocus_greeting();
        }
    }

    // ---------------- Greeting ----------------

    pub fn unfocus_greeting(&mut self) {
        if self.greeting.unfocus() {
            self.events.push(SceneEvent::StopGreeting);
        }
    }

    /// Subtitle click: say something else.
    pub fn speak_again(&mut self) {
        if self.greeting.focused() {
            let g = self.greeting.speak();
            self.events.push(SceneEvent::StopGreeting);
            self.events.push(SceneEvent::PlayGreeting(g));
        }
    }

    pub fn on_voice(&mut self, event: VoiceEvent) {
        self.greeting.on_voice(event);
    }

    // ---------------- Gesture session ----------------

    pub fn gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture_status(&self) -> GestureStatus {
        self.gesture_status
    }

    pub fn start_gesture(&mut self, source: Box<dyn HandSource>) {
        if self.gesture.is_some() || self.wallpaper {
            return;
        }
        self.morph_mirror.store(self.morph);
        match GestureSession::start(source, self.mailbox.clone(), self.morph_mirror.clone()) {
            Ok(session) => self.gesture = Some(session),
            Err(e) => {
                log::error!("[gesture] failed to spawn session: {:#}", e);
                self.report(&CollaboratorError::resource("gesture session", e.to_string()));
            }
        }
    }

    /// Joins the session thread before returning.
    pub fn stop_gesture(&mut self) {
        if let Some(session) = self.gesture.take() {
            session.stop();
            self.mailbox.take();
            self.gesture_pointer = None;
            self.gesture_status = GestureStatus::Off;
            self.events.push(SceneEvent::GestureStatus(GestureStatus::Off));
        }
    }

    /// The source thread has already exited after reporting the camera failure.
    fn drop_failed_gesture(&mut self) {
        if let Some(session) = self.gesture.take() {
            session.stop();
            self.gesture_pointer = None;
            log::warn!("[gesture] session closed after camera failure");
        }
    }

    // ---------------- Media ----------------

    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    pub fn load_media(&mut self, store: &dyn MediaStore) {
        match MediaLibrary::load(store) {
            Ok(lib) => self.media = lib,
            Err(e) => self.report(&e),
        }
    }

    pub fn attach_photo(&mut self, store: &mut dyn MediaStore, index: usize, source: &str) {
        if let Err(e) = self.media.upload(store, index, source) {
            self.report(&e);
        }
    }

    pub fn rotate_photo(&mut self, index: usize) -> Option<u16> {
        self.media.rotate(index)
    }

    pub fn delete_photo(&mut self, store: &mut dyn MediaStore, index: usize) {
        if let Err(e) = self.media.delete(store, index) {
            self.report(&e);
        }
    }

    pub fn close_viewer(&mut self) {
        self.media.close_viewer();
    }

    // ---------------- Errors ----------------

    /// Fold a collaborator failure into the status board.
    pub fn report(&mut self, err: &CollaboratorError) {
        if let Some(msg) = self.status.report(err) {
            self.events.push(SceneEvent::Notice(msg));
        }
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status.line()
    }

    // ---------------- Export ----------------

    pub fn exporting(&self) -> bool {
        self.export.is_some()
    }

    /// Take over the framing for a wallpaper recording.
    pub fn begin_export(&mut self, recorder: Box<dyn FrameRecorder>) {
        if self.export.is_some() {
            return;
        }
        let state = self.orbit.state();
        let saved = SavedFraming {
            distance: state.distance,
            polar_angle: state.polar_angle,
            wallpaper: self.wallpaper,
            gesture_active: self.gesture.is_some(),
        };
        let session = match ExportSession::begin(recorder.as_ref(), saved) {
            Ok(s) => s,
            Err(e) => {
                self.report(&e);
                return;
            }
        };
        self.stop_gesture();
        self.set_wallpaper(true);
        self.orbit.set_framing(EXPORT_DISTANCE, INITIAL_POLAR);
        self.export = Some(ActiveExport {
            session,
            recorder,
            recording: false,
        });
    }

    /// The recorder failed after it was started.
    pub fn export_failed(&mut self, err: &CollaboratorError) {
        if let Some(active) = &self.export {
            if active.recording {
                self.events.push(SceneEvent::StopRecording);
            }
            self.report(err);
            self.finish_export();
        }
    }

    fn finish_export(&mut self) {
        let Some(active) = self.export.take() else {
            return;
        };
        let saved = active.session.saved();
        self.set_wallpaper(saved.wallpaper);
        self.orbit.set_framing(saved.distance, saved.polar_angle);
        if saved.gesture_active {
            self.events.push(SceneEvent::ResumeGesture);
        }
        log::info!("[export] framing restored");
    }

    // ---------------- Read access for renderers ----------------

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Tree-local to world: lift plus accumulated spin.
    pub fn tree_transform(&self) -> Mat4 {
        Mat4::from_translation(TREE_GROUP_OFFSET) * Mat4::from_rotation_y(self.orbit.rotation())
    }

    pub fn camera(&self) -> &Camera {
        self.rig.camera()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.rig.set_aspect(aspect);
    }

    pub fn orbit(&self) -> &OrbitIntegrator {
        &self.orbit
    }

    pub fn foliage(&self) -> &FoliageField {
        &self.foliage
    }

    pub fn ornaments(&self) -> &OrnamentField {
        &self.ornaments
    }

    pub fn dust(&self) -> &DustField {
        &self.dust
    }

    pub fn curve(&self) -> &SpiralCurve {
        &self.curve
    }

    pub fn ribbon(&self) -> &RibbonMesh {
        &self.ribbon
    }

    pub fn reveal(&self) -> &RevealProgress {
        &self.reveal
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Frames are neither drawn nor updated while the ribbon is hidden.
    pub fn frames_visible(&self) -> bool {
        self.ribbon_visible
    }

    pub fn greeting(&self) -> &GreetingCharacter {
        &self.greeting
    }

    pub fn greeting_visible(&self) -> bool {
        !self.wallpaper
    }

    pub fn star_transform(&self) -> Mat4 {
        self.star.transform(self.elapsed)
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.stop_gesture();
    }
}
