// Host-side tests for hand pose interpretation, the mailbox and the session thread.

use glam::Vec2;
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};
use tree_core::constants::*;
use tree_core::gesture::*;
use tree_core::{CollaboratorError, MorphState};

const WRIST: Vec2 = Vec2::new(0.5, 0.9);
const BASES: [usize; 4] = [5, 9, 13, 17];
const TIPS: [usize; 4] = [8, 12, 16, 20];
const SPREAD: [f32; 4] = [-0.06, -0.02, 0.02, 0.06];

/// Hand with every fingertip at `tip_y`; index tip shifted by `index_shift`.
fn hand(tip_y: f32, index_shift: Vec2) -> HandLandmarks {
    let mut points = [WRIST; LANDMARK_COUNT];
    for i in 0..4 {
        points[BASES[i]] = Vec2::new(0.5 + SPREAD[i], 0.7);
        points[TIPS[i]] = Vec2::new(0.5 + SPREAD[i], tip_y);
    }
    points[TIPS[0]] += index_shift;
    HandLandmarks(points)
}

fn open_hand() -> HandLandmarks {
    hand(0.5, Vec2::ZERO)
}

fn fist() -> HandLandmarks {
    hand(0.8, Vec2::ZERO)
}

#[test]
fn poses_classify_open_and_fist() {
    let open = open_hand().pose();
    assert!(open.open && !open.fist, "open pose was {:?}", open);
    assert_eq!(open.folded, 0);
    let closed = fist().pose();
    assert!(closed.fist, "fist pose was {:?}", closed);
    assert_eq!(closed.folded, 4);
}

#[test]
fn pointer_is_mirrored_into_ndc() {
    let mut points = [WRIST; LANDMARK_COUNT];
    points[8] = Vec2::new(0.25, 0.25);
    let p = HandLandmarks(points).pointer();
    assert!((p - Vec2::new(0.5, 0.5)).length() < 1e-6, "pointer was {:?}", p);
}

#[test]
fn held_fist_assembles_after_three_frames() {
    let mut g = GestureInterpreter::new();
    let f = fist();
    for _ in 0..GESTURE_ASSEMBLE_FRAMES - 1 {
        let frame = g.interpret(Some(&f), MorphState::Scattered);
        assert_eq!(frame.request, None);
        assert_eq!(frame.status, GestureStatus::Gathering);
    }
    let frame = g.interpret(Some(&f), MorphState::Scattered);
    assert_eq!(frame.request, Some(MorphState::Assembled));
    assert_eq!(g.phase(), GesturePhase::Locked);
}

#[test]
fn gathering_fist_cannot_arm_until_released() {
    let mut g = GestureInterpreter::new();
    let f = fist();
    for _ in 0..GESTURE_ASSEMBLE_FRAMES {
        g.interpret(Some(&f), MorphState::Scattered);
    }
    // still clenched after the tree assembled
    let frame = g.interpret(Some(&f), MorphState::Assembled);
    assert_eq!(frame.status, GestureStatus::Holding);
    assert_eq!(g.phase(), GesturePhase::Locked);

    let frame = g.interpret(Some(&open_hand()), MorphState::Assembled);
    assert_eq!(frame.request, None, "releasing the gathering fist must not scatter");
    assert_eq!(g.phase(), GesturePhase::AssembledStable);
}

#[test]
fn clench_then_open_scatters_an_assembled_tree() {
    let mut g = GestureInterpreter::new();
    let open = open_hand();
    let f = fist();
    let frame = g.interpret(Some(&open), MorphState::Assembled);
    assert_eq!(frame.status, GestureStatus::Waiting);

    let frame = g.interpret(Some(&f), MorphState::Assembled);
    assert_eq!(g.phase(), GesturePhase::Armed);
    assert_eq!(frame.request, None);

    let frame = g.interpret(Some(&open), MorphState::Assembled);
    assert_eq!(frame.request, Some(MorphState::Scattered));
    assert_eq!(frame.status, GestureStatus::Scatter, "scatter outranks the swipe label");
    assert_eq!(g.phase(), GesturePhase::Idle);
}

#[test]
fn partly_folded_hand_reports_its_count() {
    // index and middle barely extended, ring and pinky curled
    let mut points = fist().0;
    points[8] = Vec2::new(0.44, 0.66);
    points[12] = Vec2::new(0.48, 0.66);
    let hand = HandLandmarks(points);
    let pose = hand.pose();
    assert_eq!(pose.folded, 2);
    assert!(!pose.open && !pose.fist, "pose was {:?}", pose);
    let mut g = GestureInterpreter::new();
    let frame = g.interpret(Some(&hand), MorphState::Scattered);
    assert_eq!(frame.status, GestureStatus::Folded(2));
}

#[test]
fn horizontal_motion_spins_and_vertical_motion_pitches() {
    let mut g = GestureInterpreter::new();
    g.interpret(Some(&open_hand()), MorphState::Scattered);
    let frame = g.interpret(Some(&hand(0.5, Vec2::new(0.1, 0.0))), MorphState::Scattered);
    // image x grows to the right, the mirrored pointer moves left
    let spin = frame.spin.expect("horizontal swipe spins");
    assert!((spin - (-0.2 * GESTURE_SPIN_GAIN)).abs() < 1e-5, "spin was {}", spin);
    assert_eq!(frame.pitch, None);
    assert_eq!(frame.status, GestureStatus::SwipeX);

    let frame = g.interpret(Some(&hand(0.5, Vec2::new(0.1, 0.05))), MorphState::Scattered);
    let pitch = frame.pitch.expect("vertical swipe pitches");
    assert!((pitch - 0.1 * GESTURE_PITCH_GAIN).abs() < 1e-3, "pitch was {}", pitch);
    assert_eq!(frame.spin, None);
    assert_eq!(frame.status, GestureStatus::SwipeY);

    let frame = g.interpret(Some(&hand(0.5, Vec2::new(0.1, 0.05))), MorphState::Scattered);
    assert_eq!(frame.spin, None, "a still hand produces no motion");
    assert_eq!(frame.status, GestureStatus::Idle);
}

#[test]
fn losing_the_hand_resets_motion_tracking() {
    let mut g = GestureInterpreter::new();
    g.interpret(Some(&open_hand()), MorphState::Scattered);
    let frame = g.interpret(None, MorphState::Scattered);
    assert_eq!(frame.status, GestureStatus::NoHand);
    assert_eq!(frame.pointer, None);
    let frame = g.interpret(Some(&hand(0.5, Vec2::new(0.3, 0.0))), MorphState::Scattered);
    assert_eq!(frame.spin, None, "first frame after a gap has no previous pointer");
}

#[test]
fn mailbox_keeps_a_pending_request_until_taken() {
    let mailbox = GestureMailbox::new();
    mailbox.post(GestureFrame {
        request: Some(MorphState::Assembled),
        spin: Some(0.3),
        ..GestureFrame::default()
    });
    mailbox.post(GestureFrame {
        status: GestureStatus::Idle,
        ..GestureFrame::default()
    });
    let frame = mailbox.take().expect("latest frame present");
    assert_eq!(frame.request, Some(MorphState::Assembled));
    assert_eq!(frame.spin, None, "spin is not carried over");
    assert_eq!(frame.status, GestureStatus::Idle);
    assert!(mailbox.take().is_none());
}

#[test]
fn status_labels_match_the_indicator_text() {
    assert_eq!(GestureStatus::Folded(3).label(), "F:3");
    assert_eq!(GestureStatus::Scatter.label(), "SCATTER!");
    assert_eq!(GestureStatus::CameraError.label(), "Camera Error");
}

struct ScriptedSource {
    frames: VecDeque<Option<HandLandmarks>>,
}

impl HandSource for ScriptedSource {
    fn open(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn next_observation(&mut self) -> Result<Option<HandLandmarks>, CollaboratorError> {
        match self.frames.pop_front() {
            Some(f) => Ok(f),
            None => {
                thread::sleep(Duration::from_millis(1));
                Ok(None)
            }
        }
    }
}

struct BrokenCamera;

impl HandSource for BrokenCamera {
    fn open(&mut self) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::resource("camera", "permission denied"))
    }

    fn next_observation(&mut self) -> Result<Option<HandLandmarks>, CollaboratorError> {
        Ok(None)
    }
}

fn wait_for(mailbox: &GestureMailbox, pred: impl Fn(&GestureFrame) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(frame) = mailbox.take() {
            if pred(&frame) {
                return true;
            }
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn session_delivers_an_assemble_request() {
    let f = fist();
    let source = ScriptedSource {
        frames: vec![Some(f); GESTURE_ASSEMBLE_FRAMES as usize].into(),
    };
    let mailbox = GestureMailbox::new();
    let session = GestureSession::start(Box::new(source), mailbox.clone(), MorphMirror::default())
        .expect("session thread spawns");
    assert!(
        wait_for(&mailbox, |f| f.request == Some(MorphState::Assembled)),
        "assemble request never arrived"
    );
    session.stop();
}

#[test]
fn session_reports_a_camera_that_fails_to_open() {
    let mailbox = GestureMailbox::new();
    let session = GestureSession::start(Box::new(BrokenCamera), mailbox.clone(), MorphMirror::default())
        .expect("session thread spawns");
    assert!(
        wait_for(&mailbox, |f| f.status == GestureStatus::CameraError),
        "camera error never surfaced"
    );
    session.stop();
}

#[test]
fn morph_mirror_reflects_the_last_store() {
    let mirror = MorphMirror::default();
    assert_eq!(mirror.load(), MorphState::Scattered);
    let shared = mirror.clone();
    shared.store(MorphState::Assembled);
    assert_eq!(mirror.load(), MorphState::Assembled);
}
