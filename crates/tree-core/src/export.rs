//! Wallpaper export: force a slow auto-rotating framing, record a loop, then
//! put everything back.
//!
//! The session only sequences the work. The recorder is a collaborator that
//! the front-end drives from [`ExportStep`]s.

use crate::constants::*;
use crate::error::CollaboratorError;

/// Containers tried in order of preference.
pub const SUPPORTED_CONTAINERS: [&str; 4] = [
    "video/webm;codecs=vp9",
    "video/webm;codecs=vp8",
    "video/webm",
    "video/mp4",
];

/// What the host can capture.
pub trait FrameRecorder {
    fn can_capture(&self) -> bool;
    fn supports(&self, mime: &str) -> bool;
}

/// Framing and mode flags captured before the export took over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedFraming {
    pub distance: f32,
    pub polar_angle: f32,
    pub wallpaper: bool,
    pub gesture_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExportPhase {
    Settling { remaining: f32 },
    Recording { remaining: f32 },
}

/// Instruction for the host produced by [`ExportSession::tick`].
#[derive(Clone, Debug, PartialEq)]
pub enum ExportStep {
    Continue,
    StartRecording {
        mime: &'static str,
        fps: u32,
        bits_per_second: u32,
    },
    Finished,
}

pub fn pick_container(recorder: &dyn FrameRecorder) -> Option<&'static str> {
    SUPPORTED_CONTAINERS
        .iter()
        .copied()
        .find(|m| recorder.supports(m))
}

#[derive(Debug)]
pub struct ExportSession {
    saved: SavedFraming,
    phase: ExportPhase,
}

impl ExportSession {
    /// Fails if the host cannot capture at all.
    pub fn begin(recorder: &dyn FrameRecorder, saved: SavedFraming) -> Result<Self, CollaboratorError> {
        if !recorder.can_capture() {
            return Err(CollaboratorError::unsupported("canvas capture"));
        }
        log::info!("[export] settling for {}s", EXPORT_SETTLE_SECS);
        Ok(Self {
            saved,
            phase: ExportPhase::Settling {
                remaining: EXPORT_SETTLE_SECS,
            },
        })
    }

    pub fn saved(&self) -> SavedFraming {
        self.saved
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, recorder: &dyn FrameRecorder, dt: f32) -> Result<ExportStep, CollaboratorError> {
        match &mut self.phase {
            ExportPhase::Settling { remaining } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return Ok(ExportStep::Continue);
                }
                let mime = pick_container(recorder)
                    .ok_or_else(|| CollaboratorError::unsupported("video container"))?;
                log::info!("[export] recording {} for {}s", mime, EXPORT_RECORD_SECS);
                self.phase = ExportPhase::Recording {
                    remaining: EXPORT_RECORD_SECS,
                };
                Ok(ExportStep::StartRecording {
                    mime,
                    fps: EXPORT_FPS,
                    bits_per_second: EXPORT_BITRATE,
                })
            }
            ExportPhase::Recording { remaining } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    Ok(ExportStep::Continue)
                } else {
                    log::info!("[export] finished");
                    Ok(ExportStep::Finished)
                }
            }
        }
    }
}
