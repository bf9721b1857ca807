//! Route definitions for the dialplan build, mounted at `/dialplan`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dialplan;
use crate::state::AppState;

/// ```text
/// GET  /         -> build_dialplan
/// GET  /conf     -> render_dialplan
/// GET  /status   -> dialplan_status
/// POST /apply    -> apply_dialplan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dialplan::build_dialplan))
        .route("/conf", get(dialplan::render_dialplan))
        .route("/status", get(dialplan::dialplan_status))
        .route("/apply", post(dialplan::apply_dialplan))
}
