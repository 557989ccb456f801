//! Failures raised by the collaborators around the animation core.
//!
//! The core itself never fails once constructed; everything here comes from
//! I/O at the edges (camera, audio, storage, capture) and is folded into a
//! status line or a one-off notice instead of interrupting the frame loop.

use fnv::FnvHashSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{resource} unavailable: {reason}")]
    ResourceUnavailable { resource: String, reason: String },
    #[error("playback rejected for {what}")]
    PlaybackRejected { what: String },
    #[error("unsupported: {capability}")]
    Unsupported { capability: String },
    #[error("media storage error: {0}")]
    Storage(String),
}

/// How a failure is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Shown in the non-fatal status indicator; the core keeps running input-less.
    Status,
    /// Swallowed and retried on the next qualifying interaction.
    Silent,
    /// Shown once as a user-visible message.
    ReportOnce,
}

impl CollaboratorError {
    pub fn resource(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::ResourceUnavailable { .. } | Self::Storage(_) => Severity::Status,
            Self::PlaybackRejected { .. } => Severity::Silent,
            Self::Unsupported { .. } => Severity::ReportOnce,
        }
    }
}

/// Collects collaborator failures into a status line, pending retries and
/// de-duplicated notices.
#[derive(Debug, Default)]
pub struct StatusBoard {
    line: Option<String>,
    pending_retry: Option<String>,
    reported: FnvHashSet<String>,
}

impl StatusBoard {
    /// Record a failure. Returns the message to show the user, if any.
    pub fn report(&mut self, err: &CollaboratorError) -> Option<String> {
        match err.severity() {
            Severity::Status => {
                log::warn!("[status] {}", err);
                self.line = Some(err.to_string());
                None
            }
            Severity::Silent => {
                log::debug!("[status] deferred: {}", err);
                if let CollaboratorError::PlaybackRejected { what } = err {
                    self.pending_retry = Some(what.clone());
                }
                None
            }
            Severity::ReportOnce => {
                let msg = err.to_string();
                if self.reported.insert(msg.clone()) {
                    log::warn!("[status] {}", msg);
                    Some(msg)
                } else {
                    None
                }
            }
        }
    }

    pub fn set_line(&mut self, line: impl Into<String>) {
        self.line = Some(line.into());
    }

    pub fn clear_line(&mut self) {
        self.line = None;
    }

    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Hand back the deferred playback, consuming it.
    pub fn take_pending_retry(&mut self) -> Option<String> {
        self.pending_retry.take()
    }
}
