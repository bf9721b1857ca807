pub mod backup;
pub mod dialplan;
pub mod health;
pub mod rules;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rules                      list, create
/// /rules/actions              form submission (POST), grid delete link (GET)
/// /rules/action-bar           buttons for the current page view
/// /rules/{id}                 get, update, delete
///
/// /dialplan                   compiled instructions (GET)
/// /dialplan/conf              rendered config text (GET)
/// /dialplan/status            pending reload flag (GET)
/// /dialplan/apply             write rendered config (POST)
///
/// /backup                     export snapshot (GET)
/// /backup/restore             replace rules from snapshot (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rules", rules::router())
        .nest("/dialplan", dialplan::router())
        .nest("/backup", backup::router())
}
