use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::time::Duration;

/// Errors shown inline to the user. The `Display` text is the message the
/// presentation layer renders verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please enter a URL")]
    EmptyInput,

    #[error("Please enter a valid URL")]
    InvalidUrl,

    /// The cause is logged where it happens and never reaches the user.
    #[error("Failed to shorten URL. Please try again.")]
    AssemblyFailure,
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::EmptyInput => "emptyInput",
            SessionError::InvalidUrl => "invalidUrl",
            SessionError::AssemblyFailure => "assemblyFailure",
        }
    }
}

impl Serialize for SessionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SessionError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// Why a backend could not produce a link.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("submission exceeded {0:?}")]
    Timeout(Duration),

    #[error("backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    PermissionDenied,
}

// ── HTTP mapping ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NoLink,
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NoLink => (
                StatusCode::NOT_FOUND,
                "No shortened URL in this session".to_owned(),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
