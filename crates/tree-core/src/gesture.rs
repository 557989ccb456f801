//! Hand gesture interpretation and the background session that feeds it.
//!
//! A [`HandSource`] (camera + landmark model, outside this crate) yields one
//! observation per detection frame. The session thread turns each into a
//! [`GestureFrame`] and posts it to a single-slot [`GestureMailbox`] that the
//! scene drains once per tick.

use glam::Vec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::constants::*;
use crate::error::CollaboratorError;
use crate::state::MorphState;

pub const LANDMARK_COUNT: usize = 21;

const WRIST: usize = 0;
const INDEX_TIP: usize = 8;
const MIDDLE_BASE: usize = 9;
// (tip, base) for index, middle, ring, pinky
const FINGERS: [(usize, usize); 4] = [(8, 5), (12, 9), (16, 13), (20, 17)];

/// 21 hand landmarks in image space, x and y in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLandmarks(pub [Vec2; LANDMARK_COUNT]);

impl HandLandmarks {
    /// Index fingertip mapped to NDC, mirrored horizontally.
    pub fn pointer(&self) -> Vec2 {
        let tip = self.0[INDEX_TIP];
        Vec2::new((1.0 - tip.x) * 2.0 - 1.0, -(tip.y * 2.0 - 1.0))
    }

    pub fn pose(&self) -> HandPose {
        let wrist = self.0[WRIST];
        let palm = self.0[MIDDLE_BASE].distance(wrist);
        let mut folded = 0u8;
        let mut total_tip = 0.0;
        for (tip, base) in FINGERS {
            let d_tip = self.0[tip].distance(wrist);
            let d_base = self.0[base].distance(wrist);
            total_tip += d_tip;
            if d_tip < d_base * GESTURE_FOLD_RATIO {
                folded += 1;
            }
        }
        let expansion = if palm > 0.0 {
            (total_tip / FINGERS.len() as f32) / palm
        } else {
            0.0
        };
        HandPose {
            folded,
            fist: folded >= 3,
            open: folded <= 1 || expansion > GESTURE_OPEN_EXPANSION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandPose {
    pub folded: u8,
    pub fist: bool,
    /// Can be true together with `fist` on a spread-but-curled hand; fist wins.
    pub open: bool,
}

/// Debounce phases for clench-to-assemble and release-to-scatter.
///
/// - `Idle`: nothing pending.
/// - `Locked`: a fist gathered the tree; no arming until the fist is released.
/// - `AssembledStable`: assembled and waiting for a clench.
/// - `Armed`: clenched while assembled; the next open hand scatters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    AssembledStable,
    Armed,
    Locked,
}

/// Human-readable indicator state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureStatus {
    #[default]
    Off,
    Loading,
    CameraError,
    NoHand,
    SwipeX,
    SwipeY,
    Folded(u8),
    Gathering,
    Holding,
    Armed,
    Scatter,
    Waiting,
    Idle,
}

impl GestureStatus {
    pub fn label(&self) -> String {
        match self {
            GestureStatus::Off => "Off".into(),
            GestureStatus::Loading => "Loading...".into(),
            GestureStatus::CameraError => "Camera Error".into(),
            GestureStatus::NoHand => "No Hand".into(),
            GestureStatus::SwipeX => "SWIPE X".into(),
            GestureStatus::SwipeY => "SWIPE Y".into(),
            GestureStatus::Folded(n) => format!("F:{}", n),
            GestureStatus::Gathering => "GATHERING".into(),
            GestureStatus::Holding => "HOLDING... (Release)".into(),
            GestureStatus::Armed => "ARMED (Ready)".into(),
            GestureStatus::Scatter => "SCATTER!".into(),
            GestureStatus::Waiting => "WAITING (Clench to Arm)".into(),
            GestureStatus::Idle => "IDLE".into(),
        }
    }
}

/// Output of one detection frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureFrame {
    pub spin: Option<f32>,
    /// Pixel-equivalent vertical drag for the polar handler.
    pub pitch: Option<f32>,
    pub pointer: Option<Vec2>,
    pub request: Option<MorphState>,
    pub status: GestureStatus,
}

#[derive(Clone, Debug, Default)]
pub struct GestureInterpreter {
    phase: GesturePhase,
    fist_frames: u32,
    last_pointer: Option<Vec2>,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Interpret one detection. `hand` is `None` when nothing was detected.
    pub fn interpret(&mut self, hand: Option<&HandLandmarks>, morph: MorphState) -> GestureFrame {
        let Some(hand) = hand else {
            self.last_pointer = None;
            return GestureFrame {
                status: GestureStatus::NoHand,
                ..GestureFrame::default()
            };
        };

        let mut frame = GestureFrame::default();
        let pointer = hand.pointer();
        frame.pointer = Some(pointer);

        let mut swipe = None;
        if let Some(last) = self.last_pointer {
            let d = pointer - last;
            let (ax, ay) = (d.x.abs(), d.y.abs());
            if ax > GESTURE_MOVE_THRESHOLD || ay > GESTURE_MOVE_THRESHOLD {
                if ax > ay {
                    frame.spin = Some(d.x * GESTURE_SPIN_GAIN);
                    swipe = Some(GestureStatus::SwipeX);
                } else {
                    frame.pitch = Some(-d.y * GESTURE_PITCH_GAIN);
                    swipe = Some(GestureStatus::SwipeY);
                }
            }
        }
        self.last_pointer = Some(pointer);

        let pose = hand.pose();
        let (request, status) = self.step(pose, morph);
        frame.request = request;
        frame.status = match (request, swipe) {
            (Some(MorphState::Scattered), _) => status,
            (_, Some(s)) => s,
            _ => status,
        };
        frame
    }

    fn step(&mut self, pose: HandPose, morph: MorphState) -> (Option<MorphState>, GestureStatus) {
        let assembled = morph.is_assembled();
        if pose.fist {
            if !assembled {
                self.phase = GesturePhase::Locked;
                self.fist_frames += 1;
                if self.fist_frames >= GESTURE_ASSEMBLE_FRAMES {
                    self.fist_frames = 0;
                    log::info!("[gesture] fist held, assembling");
                    return (Some(MorphState::Assembled), GestureStatus::Gathering);
                }
                return (None, GestureStatus::Gathering);
            }
            self.fist_frames = 0;
            if self.phase == GesturePhase::Locked {
                return (None, GestureStatus::Holding);
            }
            if self.phase != GesturePhase::Armed {
                log::debug!("[gesture] armed");
            }
            self.phase = GesturePhase::Armed;
            return (None, GestureStatus::Armed);
        }

        self.fist_frames = 0;
        if self.phase == GesturePhase::Locked {
            self.phase = if assembled {
                GesturePhase::AssembledStable
            } else {
                GesturePhase::Idle
            };
        }
        if !pose.open {
            return (None, GestureStatus::Folded(pose.folded));
        }
        if !assembled {
            return (None, GestureStatus::Idle);
        }
        if self.phase == GesturePhase::Armed {
            self.phase = GesturePhase::Idle;
            log::info!("[gesture] open hand, scattering");
            return (Some(MorphState::Scattered), GestureStatus::Scatter);
        }
        self.phase = GesturePhase::AssembledStable;
        (None, GestureStatus::Waiting)
    }
}

fn lock_ignoring_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Single-slot, latest-value-wins hand-off from the session to the scene.
///
/// A pending morph request survives being overwritten by a later frame that
/// carries none; spin and pitch do not accumulate.
#[derive(Clone, Debug, Default)]
pub struct GestureMailbox {
    slot: Arc<Mutex<Option<GestureFrame>>>,
}

impl GestureMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, mut frame: GestureFrame) {
        let mut slot = lock_ignoring_poison(&self.slot);
        if frame.request.is_none() {
            frame.request = slot.as_ref().and_then(|f| f.request);
        }
        *slot = Some(frame);
    }

    pub fn take(&self) -> Option<GestureFrame> {
        lock_ignoring_poison(&self.slot).take()
    }
}

/// Morph state mirrored for the session thread, written only by the scene.
#[derive(Clone, Debug, Default)]
pub struct MorphMirror(Arc<AtomicBool>);

impl MorphMirror {
    pub fn store(&self, morph: MorphState) {
        self.0.store(morph.is_assembled(), Ordering::Release);
    }

    pub fn load(&self) -> MorphState {
        if self.0.load(Ordering::Acquire) {
            MorphState::Assembled
        } else {
            MorphState::Scattered
        }
    }
}

/// Camera plus landmark model. Dropping it releases the device.
pub trait HandSource: Send {
    fn open(&mut self) -> Result<(), CollaboratorError>;
    /// Wait for the next detection frame; `Ok(None)` when no hand is visible.
    /// Must return periodically so the session can notice a stop request.
    fn next_observation(&mut self) -> Result<Option<HandLandmarks>, CollaboratorError>;
}

/// Owns the background detection loop.
pub struct GestureSession {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GestureSession {
    pub fn start(
        mut source: Box<dyn HandSource>,
        mailbox: GestureMailbox,
        morph: MorphMirror,
    ) -> anyhow::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        mailbox.post(GestureFrame {
            status: GestureStatus::Loading,
            ..GestureFrame::default()
        });
        let handle = thread::Builder::new()
            .name("gesture-session".into())
            .spawn(move || {
                if let Err(e) = source.open() {
                    log::warn!("[gesture] source failed to open: {}", e);
                    mailbox.post(GestureFrame {
                        status: GestureStatus::CameraError,
                        ..GestureFrame::default()
                    });
                    return;
                }
                log::info!("[gesture] session running");
                let mut interp = GestureInterpreter::new();
                while !stop_flag.load(Ordering::Acquire) {
                    match source.next_observation() {
                        Ok(hand) => {
                            let frame = interp.interpret(hand.as_ref(), morph.load());
                            mailbox.post(frame);
                        }
                        Err(e) => {
                            log::warn!("[gesture] source failed: {}", e);
                            mailbox.post(GestureFrame {
                                status: GestureStatus::CameraError,
                                ..GestureFrame::default()
                            });
                            break;
                        }
                    }
                }
                drop(source);
                log::info!("[gesture] session stopped");
            })?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signal the loop and wait for it; the source is released on return.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                log::error!("[gesture] session thread panicked");
            }
        }
    }
}

impl Drop for GestureSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
