//! Route definitions for backup and restore, mounted at `/backup`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::backup;
use crate::state::AppState;

/// ```text
/// GET  /          -> export_backup
/// POST /restore   -> restore_backup
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(backup::export_backup))
        .route("/restore", post(backup::restore_backup))
}
