use crate::{
    engine::SubmitOutcome,
    error::ApiError,
    models::LinkRequest,
    session::{CopyOutcome, SessionState, SessionView},
    AppState,
};
use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Serialize)]
pub struct CopyResponse {
    /// Text the browser should place on the clipboard; absent when the copy
    /// failed.
    text: Option<String>,
    view: SessionView,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /api/session
pub async fn show(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = attach(&state, jar);
    let view = session.lock().await.view();
    (jar, Json(view)).into_response()
}

/// POST /api/session/submit
///
/// Responds once the submission has settled. The submission runs in its own
/// task so a client hanging up mid-delay cannot strand the session in
/// `Submitting`.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LinkRequest>,
) -> Response {
    let (jar, session) = attach(&state, jar);

    let engine = state.engine.clone();
    let task_session = session.clone();
    let handle = tokio::spawn(async move { engine.submit(&task_session, request).await });

    match handle.await {
        Ok(SubmitOutcome::Completed(phase)) => tracing::debug!("submission settled: {:?}", phase),
        Ok(SubmitOutcome::Rejected(err)) => tracing::debug!("submission rejected: {}", err),
        Ok(SubmitOutcome::Ignored) => tracing::debug!("submission ignored while busy"),
        Ok(SubmitOutcome::Discarded) => tracing::debug!("submission discarded by reset"),
        Err(e) => tracing::error!("submission task failed: {:?}", e),
    }

    let view = session.lock().await.view();
    (jar, Json(view)).into_response()
}

/// POST /api/session/premium
pub async fn upgrade(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = attach(&state, jar);
    let view = {
        let mut guard = session.lock().await;
        guard.upgrade_to_premium();
        guard.view()
    };
    (jar, Json(view)).into_response()
}

/// POST /api/session/reset
pub async fn reset(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = attach(&state, jar);
    let view = {
        let mut guard = session.lock().await;
        guard.reset(state.config.reset_policy);
        guard.view()
    };
    (jar, Json(view)).into_response()
}

/// POST /api/session/copy
///
/// On success `copied` is set and a background task clears it again after
/// the configured delay.
pub async fn copy(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = attach(&state, jar);
    let mut guard = session.lock().await;

    let text = match guard.copy_short_url(state.clipboard.as_ref()) {
        CopyOutcome::NoLink => {
            return (jar, ApiError::Conflict("Nothing to copy yet".into())).into_response();
        }
        CopyOutcome::Copied { text, token } => {
            let delay = state.config.copied_reset;
            let session_bg = session.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                session_bg.lock().await.clear_copied(token);
            });
            Some(text)
        }
        CopyOutcome::Failed => None,
    };

    let view = guard.view();
    drop(guard);
    (jar, Json(CopyResponse { text, view })).into_response()
}

/// GET /api/session/qr
pub async fn qr(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, session) = attach(&state, jar);
    let download = session.lock().await.qr_download();
    match download {
        Some(download) => (jar, Json(download)).into_response(),
        None => (jar, ApiError::NoLink).into_response(),
    }
}

// ── Private helpers ────────────────────────────────────────────────────────

/// Resolve the caller's session from the `session_id` cookie, minting a new
/// one (and the cookie for it) when missing or expired.
fn attach(state: &AppState, jar: CookieJar) -> (CookieJar, Arc<Mutex<SessionState>>) {
    let presented = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());
    let (id, session) = state.sessions.get_or_create(presented.as_deref());

    if presented.as_deref() == Some(id.as_str()) {
        return (jar, session);
    }

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.sessions.idle_timeout.as_secs() as i64,
        ))
        .build();

    (jar.add(cookie), session)
}
