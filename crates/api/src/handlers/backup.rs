//! Handlers for rule backup and restore.
//!
//! The export is a full snapshot of the rule table. Restore replaces the
//! table inside one transaction after validating the whole snapshot.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bosssec_core::backup::{BackupRule, RulesBackup};
use bosssec_db::models::rule::CreateRule;
use bosssec_db::repositories::RuleRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Summary returned after a restore.
#[derive(Debug, Serialize)]
pub struct RestoreReport {
    pub restored: u64,
}

/// GET /api/v1/backup
pub async fn export_backup(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rules: Vec<BackupRule> = RuleRepo::list_full(&state.pool)
        .await?
        .into_iter()
        .map(BackupRule::from)
        .collect();

    let backup = RulesBackup::new(rules, chrono::Utc::now());
    tracing::info!(rules = backup.rules.len(), "Rules exported");

    Ok(Json(DataResponse { data: backup }))
}

/// POST /api/v1/backup/restore
///
/// Replace every rule with the snapshot's rules.
pub async fn restore_backup(
    State(state): State<AppState>,
    Json(backup): Json<RulesBackup>,
) -> AppResult<impl IntoResponse> {
    backup.validate(state.config.compiler.pattern_mode)?;

    let rules: Vec<CreateRule> = backup.rules.into_iter().map(CreateRule::from).collect();
    let restored = RuleRepo::replace_all(&state.pool, &rules).await?;
    state.reload.mark();

    tracing::info!(
        restored,
        exported_at = %backup.exported_at,
        "Rules restored from backup",
    );

    Ok(Json(DataResponse {
        data: RestoreReport { restored },
    }))
}
