//! Form submission handler for the rule page.
//!
//! The admin page posts a single form with an `action` field (`add`,
//! `edit`, `delete`). Instead of stashing a toast in session state and
//! redirecting, the handler returns an [`ActionOutcome`] carrying the toast
//! and the page to go back to. Domain failures become error toasts; the
//! HTTP status is always 200.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Form, Json};
use bosssec_core::error::CoreError;
use bosssec_core::types::DbId;
use bosssec_db::models::rule::{CreateRule, UpdateRule};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::rules::{insert_rule, modify_rule, remove_rule, DUPLICATE_BOSS_MESSAGE};
use crate::response::DataResponse;
use crate::state::AppState;

/// Page identifier the admin UI is mounted under.
pub const MODULE_DISPLAY: &str = "bosssec";

const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing the request.";

/// Raw form fields as posted by the rule page.
///
/// Every field arrives as text; missing fields are treated like the page
/// treats them (empty id means "new rule", missing `enabled` means enabled).
#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub boss_name: String,
    #[serde(default)]
    pub boss_extension: String,
    #[serde(default)]
    pub secretary_extension: String,
    #[serde(default)]
    pub whitelist: String,
    pub enabled: Option<String>,
}

impl ActionRequest {
    /// The posted id, or `None` when absent or not a number.
    fn rule_id(&self) -> Option<DbId> {
        self.id.trim().parse::<DbId>().ok().filter(|id| *id > 0)
    }

    /// The page posts `1` or `0`; a missing field means enabled.
    fn enabled(&self) -> Result<bool, CoreError> {
        match self.enabled.as_deref().map(str::trim) {
            None | Some("1") => Ok(true),
            Some("0") => Ok(false),
            Some(other) => Err(CoreError::Validation(format!(
                "enabled must be 0 or 1, got '{other}'"
            ))),
        }
    }

    fn to_create(&self) -> Result<CreateRule, CoreError> {
        Ok(CreateRule {
            boss_name: self.boss_name.clone(),
            boss_extension: self.boss_extension.clone(),
            secretary_extension: self.secretary_extension.clone(),
            whitelist: self.whitelist.clone(),
            enabled: Some(self.enabled()?),
        })
    }

    fn to_update(&self) -> Result<UpdateRule, CoreError> {
        Ok(UpdateRule {
            boss_name: Some(self.boss_name.clone()),
            boss_extension: Some(self.boss_extension.clone()),
            secretary_extension: Some(self.secretary_extension.clone()),
            whitelist: Some(self.whitelist.clone()),
            enabled: Some(self.enabled()?),
        })
    }
}

/// Severity of a toast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A short status message shown to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub title: String,
    pub level: ToastLevel,
}

impl Toast {
    fn success(message: &str) -> Self {
        Self {
            message: message.to_string(),
            title: "Success".to_string(),
            level: ToastLevel::Success,
        }
    }

    fn error(title: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            title: title.to_string(),
            level: ToastLevel::Error,
        }
    }
}

/// Result of processing a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// `None` when the request carried no action.
    pub toast: Option<Toast>,
    /// Page the UI should navigate to next.
    pub redirect: String,
}

/// Run one form action against the store and describe the outcome.
pub async fn process_action(state: &AppState, request: &ActionRequest) -> ActionOutcome {
    let redirect = format!("config.php?display={MODULE_DISPLAY}");
    let action = request.action.trim();

    if action.is_empty() {
        return ActionOutcome {
            toast: None,
            redirect,
        };
    }

    let toast = match run_action(state, action, request).await {
        Ok(message) => Toast::success(message),
        Err(err) => failure_toast(action, err),
    };

    ActionOutcome {
        toast: Some(toast),
        redirect,
    }
}

/// Apply one action and return its success message.
async fn run_action(
    state: &AppState,
    action: &str,
    request: &ActionRequest,
) -> AppResult<&'static str> {
    match action {
        "add" => {
            insert_rule(state, request.to_create()?).await?;
            Ok("Rule added successfully!")
        }
        "edit" => {
            let id = request
                .rule_id()
                .ok_or_else(|| AppError::BadRequest("edit requires an id".to_string()))?;
            modify_rule(state, id, &request.to_update()?).await?;
            Ok("Rule successfully updated!")
        }
        "delete" => {
            let id = request
                .rule_id()
                .ok_or_else(|| AppError::BadRequest("delete requires an id".to_string()))?;
            remove_rule(state, id).await?;
            Ok("Rule successfully deleted!")
        }
        other => Err(AppError::BadRequest(format!("Unknown action '{other}'"))),
    }
}

/// Map a failed action to the toast the page shows.
fn failure_toast(action: &str, err: AppError) -> Toast {
    match err {
        AppError::Core(CoreError::Conflict(_)) => {
            Toast::error("Duplicate Boss", DUPLICATE_BOSS_MESSAGE)
        }
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Toast::error("Duplicate Boss", DUPLICATE_BOSS_MESSAGE)
        }
        AppError::Core(CoreError::Validation(msg)) => Toast::error("Invalid Rule", &msg),
        other => {
            tracing::warn!(action, error = %other, "Rule action failed");
            Toast::error("Error", GENERIC_ERROR_MESSAGE)
        }
    }
}

/// GET /api/v1/rules/actions?action=delete&id=
///
/// The grid's per-row delete link. Only `delete` is honoured over GET; any
/// other action is answered with an error toast and changes nothing.
pub async fn follow_action_link(
    State(state): State<AppState>,
    Query(request): Query<ActionRequest>,
) -> impl IntoResponse {
    let action = request.action.trim();
    let outcome = if action.is_empty() || action == "delete" {
        process_action(&state, &request).await
    } else {
        ActionOutcome {
            toast: Some(failure_toast(
                action,
                AppError::BadRequest(format!("'{action}' must be submitted as a form post")),
            )),
            redirect: format!("config.php?display={MODULE_DISPLAY}"),
        }
    };
    Json(DataResponse { data: outcome })
}

/// POST /api/v1/rules/actions
///
/// Accepts the rule page's url-encoded form.
pub async fn submit_action(
    State(state): State<AppState>,
    Form(request): Form<ActionRequest>,
) -> impl IntoResponse {
    let outcome = process_action(&state, &request).await;
    Json(DataResponse { data: outcome })
}
