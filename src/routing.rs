use axum::Router;

use crate::controllers::{auth, users, AppState};

// ── Re-exports ─────────────────────────────────────────────────
// So callers can write `use warden::routing::get;` etc.
pub use axum::routing::{any, delete, get, head, on, options, patch, post, put, MethodRouter};

/// Build the application route table.
pub fn build_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/user", users::routes())
}
