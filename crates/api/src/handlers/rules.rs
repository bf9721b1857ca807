//! Handlers for boss/secretary rule CRUD.
//!
//! The write paths (`insert_rule`, `modify_rule`, `remove_rule`) are shared
//! with the form action handler so both surfaces apply the same validation
//! and duplicate-boss check before touching the store.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bosssec_core::error::CoreError;
use bosssec_core::rule::validate_rule_fields;
use bosssec_core::types::DbId;
use bosssec_db::models::rule::{BossSecRule, CreateRule, UpdateRule};
use bosssec_db::repositories::RuleRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// User-facing message for a boss extension already used by another rule.
pub const DUPLICATE_BOSS_MESSAGE: &str =
    "The selected boss extension is already in use by another rule.";

// ---------------------------------------------------------------------------
// Shared write paths
// ---------------------------------------------------------------------------

/// Trim the identifier fields; the whitelist is kept as entered.
fn normalize(mut input: CreateRule) -> CreateRule {
    input.boss_name = input.boss_name.trim().to_string();
    input.boss_extension = input.boss_extension.trim().to_string();
    input.secretary_extension = input.secretary_extension.trim().to_string();
    input
}

fn validate(state: &AppState, input: &CreateRule) -> Result<(), CoreError> {
    validate_rule_fields(
        &input.boss_name,
        &input.boss_extension,
        &input.secretary_extension,
        &input.whitelist,
        state.config.compiler.pattern_mode,
    )
}

async fn ensure_boss_available(
    state: &AppState,
    boss_extension: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if RuleRepo::boss_extension_taken(&state.pool, boss_extension, exclude_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            DUPLICATE_BOSS_MESSAGE.to_string(),
        )));
    }
    Ok(())
}

/// Validate and insert a rule, then mark the dialplan for reload.
pub(crate) async fn insert_rule(state: &AppState, input: CreateRule) -> AppResult<BossSecRule> {
    let input = normalize(input);
    validate(state, &input)?;
    ensure_boss_available(state, &input.boss_extension, None).await?;

    let rule = RuleRepo::create(&state.pool, &input).await?;
    state.reload.mark();

    tracing::info!(
        rule_id = rule.id,
        boss_extension = %rule.boss_extension,
        secretary_extension = %rule.secretary_extension,
        "Boss/secretary rule created",
    );
    Ok(rule)
}

/// Apply a partial update to an existing rule.
pub(crate) async fn modify_rule(
    state: &AppState,
    id: DbId,
    update: &UpdateRule,
) -> AppResult<BossSecRule> {
    let existing = RuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BossSecRule",
            id,
        }))?;

    let input = normalize(existing.merged(update));
    validate(state, &input)?;
    ensure_boss_available(state, &input.boss_extension, Some(id)).await?;

    let rule = RuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BossSecRule",
            id,
        }))?;
    state.reload.mark();

    tracing::info!(
        rule_id = id,
        boss_extension = %rule.boss_extension,
        enabled = rule.enabled,
        "Boss/secretary rule updated",
    );
    Ok(rule)
}

/// Delete a rule by id.
pub(crate) async fn remove_rule(state: &AppState, id: DbId) -> AppResult<()> {
    let deleted = RuleRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "BossSecRule",
            id,
        }));
    }
    state.reload.mark();

    tracing::info!(rule_id = id, "Boss/secretary rule deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// REST endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/rules
///
/// Grid listing: every rule without its whitelist.
pub async fn list_rules(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rules = RuleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<CreateRule>,
) -> AppResult<impl IntoResponse> {
    let rule = insert_rule(&state, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = RuleRepo::find_by_id(&state.pool, rule_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BossSecRule",
            id: rule_id,
        }))?;

    Ok(Json(DataResponse { data: rule }))
}

/// PUT /api/v1/rules/{id}
///
/// Partially update a rule. Absent fields keep their stored value.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
    Json(input): Json<UpdateRule>,
) -> AppResult<impl IntoResponse> {
    let rule = modify_rule(&state, rule_id, &input).await?;
    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /api/v1/rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    remove_rule(&state, rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Action bar
// ---------------------------------------------------------------------------

/// Query parameters for the action bar (`?view=&id=`).
#[derive(Debug, Deserialize)]
pub struct ActionBarParams {
    pub view: Option<String>,
    pub id: Option<String>,
}

/// A button shown in the page's action bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub name: &'static str,
    pub id: &'static str,
    pub value: &'static str,
}

/// Buttons for a page view: none on the grid, submit/reset on the form and
/// delete only when editing an existing rule.
pub fn action_buttons(view: Option<&str>, id: Option<&str>) -> Vec<ActionButton> {
    if view != Some("form") {
        return Vec::new();
    }

    let mut buttons = Vec::with_capacity(3);
    if id.is_some_and(|id| !id.trim().is_empty()) {
        buttons.push(ActionButton {
            name: "delete",
            id: "delete",
            value: "Delete",
        });
    }
    buttons.push(ActionButton {
        name: "reset",
        id: "reset",
        value: "Reset",
    });
    buttons.push(ActionButton {
        name: "submit",
        id: "submit",
        value: "Submit",
    });
    buttons
}

/// GET /api/v1/rules/action-bar
pub async fn action_bar(Query(params): Query<ActionBarParams>) -> impl IntoResponse {
    Json(DataResponse {
        data: action_buttons(params.view.as_deref(), params.id.as_deref()),
    })
}
