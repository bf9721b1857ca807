//! Route definitions for boss/secretary rules, mounted at `/rules`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{actions, rules};
use crate::state::AppState;

/// Rule routes.
///
/// ```text
/// GET    /              -> list_rules
/// POST   /              -> create_rule
/// GET    /actions       -> follow_action_link (grid delete link)
/// POST   /actions       -> submit_action (form post)
/// GET    /action-bar    -> action_bar
/// GET    /{id}          -> get_rule
/// PUT    /{id}          -> update_rule
/// DELETE /{id}          -> delete_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rules::list_rules).post(rules::create_rule))
        .route(
            "/actions",
            get(actions::follow_action_link).post(actions::submit_action),
        )
        .route("/action-bar", get(rules::action_bar))
        .route(
            "/{id}",
            get(rules::get_rule)
                .put(rules::update_rule)
                .delete(rules::delete_rule),
        )
}
