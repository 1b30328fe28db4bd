//! Client-side state for drafting a reply.
//!
//! [`ReplyForm`] owns the email fields, the selected tone and the generated
//! reply. It validates before submitting, keeps one request in flight at a
//! time, and supports editing and copying the result. Every user-facing
//! outcome is reported as a [`Notice`].

use std::{fmt, str::FromStr, time::Duration, time::Instant};

use crate::{
    backend::{BackendError, ReplyBackend},
    dto::ReplyRequest,
};

/// How long the "copied" confirmation stays visible.
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Formal,
    Friendly,
    Concise,
}

impl Tone {
    pub const ALL: [Self; 3] = [Self::Formal, Self::Friendly, Self::Concise];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Friendly => "friendly",
            Self::Concise => "concise",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tone '{0}'")]
pub struct UnknownTone(pub String);

impl FromStr for Tone {
    type Err = UnknownTone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTone(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Short, transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a reply is already being generated")]
    InFlight,

    #[error("Please fill in all fields before generating a reply.")]
    MissingFields,
}

impl SubmitError {
    /// Notice to show for a refused submission. An in-flight refusal is silent.
    pub fn notice(self) -> Option<Notice> {
        match self {
            Self::InFlight => None,
            Self::MissingFields => Some(Notice::destructive("Missing information", self.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Default)]
pub struct ReplyForm {
    sender: String,
    subject: String,
    body: String,
    tone: Tone,
    reply: String,
    edit_buffer: Option<String>,
    in_flight: bool,
    copied_at: Option<Instant>,
}

impl ReplyForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.sender = sender.into();
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub const fn tone(&self) -> Tone {
        self.tone
    }

    pub const fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    /// Generated (or saved edited) reply; empty until a generation succeeds.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub const fn is_generating(&self) -> bool {
        self.in_flight
    }

    pub const fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    /// Text currently on screen: the edit buffer while editing, the reply otherwise.
    pub fn visible_text(&self) -> &str {
        self.edit_buffer.as_deref().unwrap_or(&self.reply)
    }

    /// Validates the fields and marks a request as in flight.
    pub fn begin_submit(&mut self) -> Result<ReplyRequest, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }
        if [&self.sender, &self.subject, &self.body]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(SubmitError::MissingFields);
        }

        self.in_flight = true;
        Ok(ReplyRequest {
            sender: Some(self.sender.clone()),
            subject: Some(self.subject.clone()),
            body: Some(self.body.clone()),
            tone: Some(self.tone.as_str().to_string()),
        })
    }

    /// Records the backend outcome and clears the in-flight flag.
    pub fn complete_submit(&mut self, outcome: Result<String, BackendError>) -> Notice {
        self.in_flight = false;

        match outcome {
            Ok(reply) => {
                self.reply = reply;
                self.edit_buffer = None;
                self.copied_at = None;
                Notice::info("Reply generated", "Your AI-powered reply is ready!")
            }
            Err(e) => {
                tracing::error!("Error generating reply: {e}");
                let message = e.to_string();
                let description = if message.trim().is_empty() {
                    "Failed to generate reply. Please try again.".to_string()
                } else {
                    message
                };
                Notice::destructive("Generation failed", description)
            }
        }
    }

    /// Validates, calls the backend once and records the result.
    ///
    /// Returns `None` when a request is already in flight.
    pub async fn generate(&mut self, backend: &dyn ReplyBackend) -> Option<Notice> {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(e) => return e.notice(),
        };
        let outcome = backend.request_reply(&request).await;
        Some(self.complete_submit(outcome))
    }

    /// Opens the reply for editing. No-op without a reply.
    pub fn start_editing(&mut self) -> bool {
        if self.reply.is_empty() {
            return false;
        }
        self.edit_buffer = Some(self.reply.clone());
        true
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        if let Some(buffer) = self.edit_buffer.as_mut() {
            *buffer = text.into();
        }
    }

    pub fn save_edit(&mut self) {
        if let Some(buffer) = self.edit_buffer.take() {
            self.reply = buffer;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_buffer = None;
    }

    /// Copies the visible text. `None` when there is nothing to copy.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> Option<Notice> {
        if self.visible_text().is_empty() {
            return None;
        }

        match clipboard.write_text(self.visible_text()) {
            Ok(()) => {
                self.copied_at = Some(now);
                Some(Notice::info(
                    "Copied to clipboard",
                    "The reply has been copied to your clipboard.",
                ))
            }
            Err(e) => {
                tracing::warn!("Clipboard write failed: {e}");
                Some(Notice::destructive(
                    "Failed to copy",
                    "Could not copy to clipboard. Please try again.",
                ))
            }
        }
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_CONFIRMATION)
    }
}
