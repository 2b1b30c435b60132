use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analytics;
mod clipboard;
mod code;
mod config;
mod engine;
mod error;
mod handlers;
mod link;
mod models;
mod random;
mod session;
mod store;
mod validator;

use clipboard::{Clipboard, DeniedClipboard, MemoryClipboard};
use engine::{Engine, SimulatedBackend};
use random::{RandomSource, SeededRandom, ThreadRandom};
use store::SessionStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: config::AppConfig,
    pub sessions: SessionStore,
    pub engine: Engine,
    /// Destination of the copy action. Shared by every session.
    pub clipboard: Arc<dyn Clipboard>,
}

impl AppState {
    pub fn from_config(config: config::AppConfig) -> Self {
        let rng: Arc<dyn RandomSource> = match config.rng_seed {
            Some(seed) => {
                tracing::info!("Using seeded RNG ({})", seed);
                Arc::new(SeededRandom::new(seed))
            }
            None => Arc::new(ThreadRandom),
        };

        let backend = SimulatedBackend::from_config(&config, rng);
        let engine = Engine::new(Arc::new(backend), config.submit_timeout);
        let sessions = SessionStore::new(config.session_idle_hours);

        let clipboard: Arc<dyn Clipboard> = if config.clipboard_enabled {
            Arc::new(MemoryClipboard::new())
        } else {
            tracing::info!("Clipboard disabled; copy requests will be refused");
            Arc::new(DeniedClipboard)
        };

        Self {
            config,
            sessions,
            engine,
            clipboard,
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn app(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/session", get(handlers::api::show))
        .route("/session/submit", post(handlers::api::submit))
        .route("/session/premium", post(handlers::api::upgrade))
        .route("/session/reset", post(handlers::api::reset))
        .route("/session/copy", post(handlers::api::copy))
        .route("/session/qr", get(handlers::api::qr));

    Router::new()
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snaplink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting Snaplink on {}:{}", config.host, config.port);
    tracing::info!("Short links under {}/", config.short_base_url);

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
