mod collaborators;
mod render;

use glam::Vec2;
use instant::Instant;
use std::time::Duration;
use winit::event::*;
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use collaborators::{NoCamera, NoCapture, PhotoFolder, SubtitleVoice};
use render::Renderer;
use tree_core::constants::CLICK_SLOP_PX;
use tree_core::input::ClickTracker;
use tree_core::media::MemoryMediaStore;
use tree_core::{pixel_to_ndc, Scene, SceneConfig, SceneEvent};

/// Upper bound on a single simulation step after a stall.
const MAX_FRAME_DT: Duration = Duration::from_millis(100);

struct App {
    scene: Scene,
    store: MemoryMediaStore,
    photos: PhotoFolder,
    voice: SubtitleVoice,
    clicks: ClickTracker,
    cursor: Vec2,
    pressed_at: Option<Vec2>,
    viewport: Vec2,
    start: Instant,
    last_frame: Instant,
    title: String,
}

impl App {
    fn new(scene: Scene, viewport: Vec2) -> Self {
        let photos = PhotoFolder::new(std::env::var("TREE_PHOTO_DIR").unwrap_or_else(|_| "photos".into()));
        log::info!("[app] photo uploads read from {}", photos.dir().display());
        let mut app = Self {
            scene,
            store: MemoryMediaStore::default(),
            photos,
            voice: SubtitleVoice::default(),
            clicks: ClickTracker::default(),
            cursor: Vec2::ZERO,
            pressed_at: None,
            viewport,
            start: Instant::now(),
            last_frame: Instant::now(),
            title: String::new(),
        };
        app.scene.load_media(&app.store);
        app
    }

    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn ndc(&self) -> Vec2 {
        pixel_to_ndc(self.cursor, self.viewport)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.scene.set_aspect(width as f32 / height as f32);
    }

    fn key(&mut self, key: &Key) {
        let viewing = self.scene.media().viewing();
        match key {
            Key::Named(NamedKey::Space) => self.scene.toggle_morph(),
            Key::Named(NamedKey::Escape) => self.scene.dismiss(),
            // subtitle click
            Key::Named(NamedKey::Enter) => self.scene.speak_again(),
            Key::Named(NamedKey::Delete) => {
                if let Some(i) = viewing {
                    self.scene.delete_photo(&mut self.store, i);
                    self.scene.close_viewer();
                }
            }
            Key::Character(c) => match c.as_str() {
                "r" | "R" => match viewing {
                    Some(i) => {
                        if let Some(deg) = self.scene.rotate_photo(i) {
                            log::info!("[viewer] frame {} rotated to {} degrees", i, deg);
                        }
                    }
                    None => self.scene.toggle_ribbon(),
                },
                "g" | "G" => {
                    if self.scene.gesture_active() {
                        self.scene.stop_gesture();
                    } else {
                        self.scene.start_gesture(Box::new(NoCamera));
                    }
                }
                "w" | "W" => {
                    if self.scene.exporting() {
                        log::info!("[app] wallpaper toggle ignored while exporting");
                    } else {
                        let on = !self.scene.wallpaper();
                        self.scene.set_wallpaper(on);
                    }
                }
                "e" | "E" => self.scene.begin_export(Box::new(NoCapture)),
                _ => {}
            },
            _ => {}
        }
    }

    fn mouse_button(&mut self, state: ElementState) {
        let ndc = self.ndc();
        match state {
            ElementState::Pressed => {
                self.pressed_at = Some(self.cursor);
                self.scene.pointer_down(ndc, self.cursor);
            }
            ElementState::Released => {
                self.scene.pointer_up();
                let Some(from) = self.pressed_at.take() else {
                    return;
                };
                if from.distance(self.cursor) <= CLICK_SLOP_PX {
                    let kind = self.clicks.click(self.now(), self.cursor);
                    if let Some(action) = self.scene.click(ndc, kind) {
                        log::debug!("[app] click -> {:?}", action);
                    }
                }
            }
        }
    }

    fn cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = Vec2::new(x as f32, y as f32);
        let ndc = self.ndc();
        self.scene.pointer_move(ndc, self.cursor);
    }

    fn wheel(&mut self, delta: MouseScrollDelta) {
        // scene zoom expects browser-style deltas: positive moves the camera out
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * 100.0,
            MouseScrollDelta::PixelDelta(p) => -p.y as f32,
        };
        self.scene.wheel(amount);
    }

    /// Advance the scene and act on what it reports.
    fn update(&mut self) {
        let frame_start = Instant::now();
        let dt = (frame_start - self.last_frame).min(MAX_FRAME_DT);
        self.last_frame = frame_start;

        let now = self.now();
        if let Some(event) = self.voice.poll(now) {
            self.scene.on_voice(event);
        }
        let events = self.scene.tick(dt);
        for event in events {
            self.dispatch(event, now);
        }
    }

    fn dispatch(&mut self, event: SceneEvent, now: f64) {
        match event {
            SceneEvent::RequestUpload(i) => match self.photos.find(i) {
                Ok(source) => self.scene.attach_photo(&mut self.store, i, &source),
                Err(e) => self.scene.report(&e),
            },
            SceneEvent::OpenViewer(i) => {
                if let Some(slot) = self.scene.media().slot(i) {
                    log::info!(
                        "[viewer] frame {}: {} (rotation {} degrees)",
                        i,
                        slot.handle.as_str(),
                        slot.rotation_degrees
                    );
                }
            }
            SceneEvent::PlayGreeting(greeting) => {
                let started = self.voice.play(&greeting, now);
                self.scene.on_voice(started);
            }
            SceneEvent::StopGreeting => self.voice.stop(),
            SceneEvent::RetryPlayback(what) => log::info!("[voice] retrying {}", what),
            SceneEvent::ResumeGesture => self.scene.start_gesture(Box::new(NoCamera)),
            SceneEvent::GestureStatus(status) => log::info!("[gesture] {}", status.label()),
            SceneEvent::Notice(msg) => log::warn!("[app] {}", msg),
            SceneEvent::MorphChanged(_)
            | SceneEvent::RibbonToggled(_)
            | SceneEvent::WallpaperMode(_) => {}
            SceneEvent::StartRecording { mime, .. } => log::info!("[export] recorder started ({})", mime),
            SceneEvent::StopRecording => log::info!("[export] recorder stopped"),
        }
    }

    /// Window title doubles as the status strip.
    fn status_title(&self) -> String {
        let mut title = format!("Particle Tree | {}", self.scene.morph().label());
        if self.scene.gesture_active() {
            title.push_str(&format!(" | {}", self.scene.gesture_status().label()));
        }
        if let Some(line) = self.scene.status_line() {
            title.push_str(&format!(" | {}", line));
        }
        if let Some(text) = self.scene.greeting().subtitle() {
            title.push_str(&format!(" | \"{}\"", text));
        }
        title
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Particle Tree")
        .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0))
        .build(&event_loop)?;

    let size = window.inner_size();
    let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
    let scene = Scene::new(SceneConfig::default(), aspect);
    let mut renderer = pollster::block_on(Renderer::new(&window, &scene))?;
    let mut app = App::new(scene, Vec2::new(size.width as f32, size.height as f32));
    let window = &window;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                app.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => app.key(&logical_key),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => app.mouse_button(state),
            WindowEvent::CursorMoved { position, .. } => app.cursor_moved(position.x, position.y),
            WindowEvent::CursorLeft { .. } => {
                app.pressed_at = None;
                app.scene.pointer_leave();
            }
            WindowEvent::MouseWheel { delta, .. } => app.wheel(delta),
            _ => {}
        },
        Event::AboutToWait => {
            app.update();
            let title = app.status_title();
            if title != app.title {
                window.set_title(&title);
                app.title = title;
            }
            match renderer.render(&app.scene) {
                Ok(_) => window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.resize(window.inner_size())
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("[render] out of memory");
                    elwt.exit()
                }
                Err(e) => log::warn!("[render] frame skipped: {:?}", e),
            }
        }
        _ => {}
    })?;
    Ok(())
}
