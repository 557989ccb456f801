//! Desktop stand-ins for the scene's external collaborators.

use std::path::{Path, PathBuf};

use tree_core::export::FrameRecorder;
use tree_core::gesture::{HandLandmarks, HandSource};
use tree_core::greeting::{Greeting, VoiceEvent};
use tree_core::CollaboratorError;

/// The desktop build has no camera/landmark backend.
pub struct NoCamera;

impl HandSource for NoCamera {
    fn open(&mut self) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::resource(
            "camera",
            "no hand-tracking backend in the desktop build",
        ))
    }

    fn next_observation(&mut self) -> Result<Option<HandLandmarks>, CollaboratorError> {
        Ok(None)
    }
}

/// Window surfaces cannot be captured to video here.
pub struct NoCapture;

impl FrameRecorder for NoCapture {
    fn can_capture(&self) -> bool {
        false
    }

    fn supports(&self, _mime: &str) -> bool {
        false
    }
}

/// Shows the subtitle for a reading-time estimate instead of playing audio.
#[derive(Default)]
pub struct SubtitleVoice {
    ends_at: Option<f64>,
}

impl SubtitleVoice {
    const SECS_PER_CHAR: f64 = 0.06;

    pub fn play(&mut self, greeting: &Greeting, now: f64) -> VoiceEvent {
        log::info!("[voice] {} ({})", greeting.text, greeting.audio);
        self.ends_at = Some(now + 1.0 + greeting.text.len() as f64 * Self::SECS_PER_CHAR);
        VoiceEvent::Started
    }

    pub fn stop(&mut self) {
        self.ends_at = None;
    }

    pub fn poll(&mut self, now: f64) -> Option<VoiceEvent> {
        match self.ends_at {
            Some(t) if now >= t => {
                self.ends_at = None;
                Some(VoiceEvent::Ended)
            }
            _ => None,
        }
    }
}

const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Resolves upload requests against `<dir>/<index>.<ext>`.
pub struct PhotoFolder {
    dir: PathBuf,
}

impl PhotoFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn find(&self, index: usize) -> Result<String, CollaboratorError> {
        PHOTO_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{index}.{ext}")))
            .find(|p| p.is_file())
            .map(|p| p.display().to_string())
            .ok_or_else(|| {
                CollaboratorError::Storage(format!(
                    "no photo for frame {} in {}",
                    index,
                    self.dir.display()
                ))
            })
    }
}
