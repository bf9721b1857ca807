//! Handlers for the dialplan build.
//!
//! The build reads a snapshot of enabled rules, runs the compiler and either
//! returns the result or writes the rendered config for the PBX to load.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use bosssec_core::compiler::{compile, Compilation, SkippedRule};
use bosssec_core::rule::ScreeningRule;
use bosssec_db::repositories::RuleRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Compile every enabled rule currently in the store.
pub(crate) async fn compile_enabled(state: &AppState) -> AppResult<Compilation> {
    let rules: Vec<ScreeningRule> = RuleRepo::list_enabled(&state.pool)
        .await?
        .into_iter()
        .map(ScreeningRule::from)
        .collect();

    Ok(compile(&rules, &state.config.compiler))
}

/// Compile the enabled rules and write the rendered config to disk.
async fn write_dialplan(state: &AppState) -> AppResult<Compilation> {
    let compilation = compile_enabled(state).await?;
    tokio::fs::write(
        &state.config.dialplan_output_path,
        compilation.dialplan.render_conf(),
    )
    .await?;
    Ok(compilation)
}

/// Reload status payload.
#[derive(Debug, Serialize)]
pub struct DialplanStatus {
    pub reload_needed: bool,
}

/// Summary returned after writing the dialplan.
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub path: String,
    pub compiled: usize,
    pub instructions: usize,
    pub skipped: Vec<SkippedRule>,
}

/// GET /api/v1/dialplan
///
/// Compiled instructions plus the list of skipped rules.
pub async fn build_dialplan(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let compilation = compile_enabled(&state).await?;
    Ok(Json(DataResponse { data: compilation }))
}

/// GET /api/v1/dialplan/conf
///
/// The compiled dialplan rendered as config text.
pub async fn render_dialplan(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let compilation = compile_enabled(&state).await?;
    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        compilation.dialplan.render_conf(),
    ))
}

/// GET /api/v1/dialplan/status
pub async fn dialplan_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: DialplanStatus {
            reload_needed: state.reload.is_pending(),
        },
    })
}

/// POST /api/v1/dialplan/apply
///
/// Clear the pending-reload flag, then compile and write the rendered config
/// to the configured path. Rule changes made while the build runs mark the
/// flag again. On failure the flag is restored.
pub async fn apply_dialplan(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let was_pending = state.reload.take();
    let path = &state.config.dialplan_output_path;

    let compilation = match write_dialplan(&state).await {
        Ok(compilation) => compilation,
        Err(err) => {
            if was_pending {
                state.reload.mark();
            }
            return Err(err);
        }
    };

    tracing::info!(
        path = %path.display(),
        compiled = compilation.compiled,
        skipped = compilation.skipped.len(),
        "Dialplan written",
    );

    Ok(Json(DataResponse {
        data: ApplyReport {
            path: path.display().to_string(),
            compiled: compilation.compiled,
            instructions: compilation.dialplan.len(),
            skipped: compilation.skipped,
        },
    }))
}
