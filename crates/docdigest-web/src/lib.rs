use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;
use tower_sessions::{MemoryStore, SessionManagerLayer};

pub mod error;
pub mod handlers;
pub mod session;
pub mod state;
pub mod template;
pub mod upload;

pub use session::SessionContext;
pub use state::AppState;

/// Build the application router with sessions, body limit and request
/// tracing installed.
pub fn router(state: Arc<AppState>) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_signed(session_key(state.config.secret_key.as_deref()));
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes());

    Router::new()
        .route("/", get(handlers::index::index))
        .route(
            "/settings",
            get(handlers::settings::show).post(handlers::settings::choose),
        )
        .route(
            "/configure/{service}",
            get(handlers::configure::show).post(handlers::configure::save_key),
        )
        .route(
            "/process",
            get(handlers::process::show).post(handlers::process::submit),
        )
        .layer(body_limit)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Cookie signing key: the configured secret when it is long enough,
/// otherwise a fresh random key (sessions then end with the process).
fn session_key(secret: Option<&str>) -> Key {
    match secret.map(|s| Key::try_from(s.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "DOCDIGEST_SECRET_KEY must be at least 64 bytes; using a random key");
            Key::generate()
        }
        None => {
            tracing::debug!("no session secret configured, using a random key");
            Key::generate()
        }
    }
}
