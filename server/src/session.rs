use crate::{
    clipboard::Clipboard,
    error::{EngineError, SessionError},
    models::{AnalyticsSnapshot, LinkRequest, QrDownload, ShortLink, Shortened},
    validator,
};
use serde::Serialize;

pub const QR_FILENAME: &str = "qr-code.png";

// ── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

/// What `reset` clears in addition to the derived result. Both default to
/// `false`: input text and the premium flag survive a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetPolicy {
    pub clear_inputs: bool,
    pub clear_premium: bool,
}

/// A submission that passed validation and is now in flight.
#[derive(Debug, Clone)]
pub struct Submission {
    pub generation: u64,
    pub request: LinkRequest,
    /// Premium flag captured when the submission started.
    pub premium: bool,
}

#[derive(Debug)]
pub enum BeginSubmit {
    Started(Submission),
    Rejected(SessionError),
    /// Another submission is already in flight; nothing changed.
    Busy,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    NoLink,
    Copied { text: String, token: u64 },
    Failed,
}

/// Serializable snapshot of a session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: Phase,
    pub is_loading: bool,
    pub url_input: String,
    pub alias_input: String,
    pub is_premium: bool,
    pub copied: bool,
    pub error: Option<SessionError>,
    pub link: Option<ShortLink>,
    pub analytics: Option<AnalyticsSnapshot>,
}

// ── State machine ──────────────────────────────────────────────────────────

/// All interaction state of one visitor.
///
/// Invariants:
/// - `link` is present iff the last completed submission succeeded.
/// - `analytics` is present only alongside `link`, and only if the session
///   was premium when that submission started.
///
/// `generation` increases on every started submission and every reset. A
/// completion carrying an older generation is discarded, which is how a
/// reset cancels an in-flight submission.
#[derive(Debug, Default)]
pub struct SessionState {
    phase: Phase,
    url_input: String,
    alias_input: String,
    link: Option<ShortLink>,
    analytics: Option<AnalyticsSnapshot>,
    error: Option<SessionError>,
    is_premium: bool,
    copied: bool,
    generation: u64,
    copy_token: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn copied(&self) -> bool {
        self.copied
    }

    pub fn error(&self) -> Option<SessionError> {
        self.error
    }

    pub fn link(&self) -> Option<&ShortLink> {
        self.link.as_ref()
    }

    pub fn analytics(&self) -> Option<&AnalyticsSnapshot> {
        self.analytics.as_ref()
    }

    /// Validate the request and, if it passes, enter `Submitting`.
    ///
    /// A rejection only records the error; phase and any existing result are
    /// left as they were.
    pub fn begin_submit(&mut self, request: LinkRequest) -> BeginSubmit {
        if self.phase == Phase::Submitting {
            tracing::debug!("submit ignored: a submission is already in flight");
            return BeginSubmit::Busy;
        }

        self.url_input = request.raw_url.clone();
        self.alias_input = request.custom_alias.clone().unwrap_or_default();

        let rejection = if request.raw_url.trim().is_empty() {
            Some(SessionError::EmptyInput)
        } else if !validator::validate(&request.raw_url) {
            Some(SessionError::InvalidUrl)
        } else {
            None
        };

        if let Some(err) = rejection {
            tracing::warn!("submit rejected ({}): {:?}", err.kind(), request.raw_url);
            self.error = Some(err);
            return BeginSubmit::Rejected(err);
        }

        self.generation += 1;
        self.phase = Phase::Submitting;
        self.error = None;
        tracing::debug!("submission {} started", self.generation);

        BeginSubmit::Started(Submission {
            generation: self.generation,
            request,
            premium: self.is_premium,
        })
    }

    /// Apply the result of `submission`. Returns `false` when the result was
    /// discarded because the session moved on (reset) in the meantime.
    pub fn complete_submit(
        &mut self,
        submission: &Submission,
        outcome: Result<Shortened, EngineError>,
    ) -> bool {
        if self.phase != Phase::Submitting || self.generation != submission.generation {
            tracing::debug!(
                "submission {} discarded (current generation {})",
                submission.generation,
                self.generation
            );
            return false;
        }

        match outcome {
            Ok(shortened) => {
                tracing::debug!(
                    "submission {} produced {}",
                    submission.generation,
                    shortened.link.short_url
                );
                self.link = Some(shortened.link);
                self.analytics = shortened.analytics.filter(|_| submission.premium);
                self.copied = false;
                self.phase = Phase::Success;
            }
            Err(e) => {
                tracing::error!("submission {} failed: {}", submission.generation, e);
                self.link = None;
                self.analytics = None;
                self.copied = false;
                self.error = Some(SessionError::AssemblyFailure);
                self.phase = Phase::Failed;
            }
        }

        true
    }

    /// Back to `Idle`. Also cancels any in-flight submission.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.generation += 1;
        self.phase = Phase::Idle;
        self.link = None;
        self.analytics = None;
        self.error = None;
        self.copied = false;

        if policy.clear_inputs {
            self.url_input.clear();
            self.alias_input.clear();
        }
        if policy.clear_premium {
            self.is_premium = false;
        }
    }

    /// No retroactive effect: analytics appear on the next submission.
    pub fn upgrade_to_premium(&mut self) {
        self.is_premium = true;
    }

    /// Copy the current short URL. On success `copied` is set and a token is
    /// returned for [`SessionState::clear_copied`].
    pub fn copy_short_url(&mut self, clipboard: &dyn Clipboard) -> CopyOutcome {
        let Some(link) = &self.link else {
            return CopyOutcome::NoLink;
        };

        match clipboard.write_text(&link.short_url) {
            Ok(()) => {
                self.copy_token += 1;
                self.copied = true;
                CopyOutcome::Copied {
                    text: link.short_url.clone(),
                    token: self.copy_token,
                }
            }
            Err(e) => {
                tracing::error!("Failed to copy {}: {}", link.short_url, e);
                CopyOutcome::Failed
            }
        }
    }

    /// Clear `copied`, unless a newer copy has happened since `token` was
    /// issued.
    pub fn clear_copied(&mut self, token: u64) {
        if token == self.copy_token {
            self.copied = false;
        }
    }

    pub fn qr_download(&self) -> Option<QrDownload> {
        self.link.as_ref().map(|link| QrDownload {
            href: link.qr_image_url.clone(),
            filename: QR_FILENAME,
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            is_loading: self.is_loading(),
            url_input: self.url_input.clone(),
            alias_input: self.alias_input.clone(),
            is_premium: self.is_premium(),
            copied: self.copied(),
            error: self.error(),
            link: self.link().cloned(),
            analytics: self.analytics().cloned(),
        }
    }
}
