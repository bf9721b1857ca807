//! Boss/secretary rule models and DTOs.
//!
//! Covers the full `bosssec_config` row, the trimmed grid listing row, the
//! compiler's enabled-rule projection and the create/update payloads.

use bosssec_core::backup::BackupRule;
use bosssec_core::rule::ScreeningRule;
use bosssec_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `bosssec_config` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BossSecRule {
    pub id: DbId,
    pub boss_name: String,
    pub boss_extension: String,
    pub secretary_extension: String,
    pub whitelist: String,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Grid listing row (no whitelist, no timestamps).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleSummary {
    pub id: DbId,
    pub boss_name: String,
    pub boss_extension: String,
    pub secretary_extension: String,
    pub enabled: bool,
}

/// Columns the dialplan build reads for each enabled rule.
#[derive(Debug, Clone, FromRow)]
pub struct EnabledRule {
    pub id: DbId,
    pub boss_extension: String,
    pub secretary_extension: String,
    pub whitelist: String,
}

impl From<EnabledRule> for ScreeningRule {
    fn from(row: EnabledRule) -> Self {
        ScreeningRule {
            id: Some(row.id),
            boss_extension: row.boss_extension,
            secretary_extension: row.secretary_extension,
            whitelist: row.whitelist,
            enabled: true,
        }
    }
}

impl From<&BossSecRule> for ScreeningRule {
    fn from(row: &BossSecRule) -> Self {
        ScreeningRule {
            id: Some(row.id),
            boss_extension: row.boss_extension.clone(),
            secretary_extension: row.secretary_extension.clone(),
            whitelist: row.whitelist.clone(),
            enabled: row.enabled,
        }
    }
}

impl From<BossSecRule> for BackupRule {
    fn from(row: BossSecRule) -> Self {
        BackupRule {
            boss_name: row.boss_name,
            boss_extension: row.boss_extension,
            secretary_extension: row.secretary_extension,
            whitelist: row.whitelist,
            enabled: row.enabled,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a new rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRule {
    #[serde(default)]
    pub boss_name: String,
    pub boss_extension: String,
    pub secretary_extension: String,
    #[serde(default)]
    pub whitelist: String,
    pub enabled: Option<bool>,
}

impl From<BackupRule> for CreateRule {
    fn from(rule: BackupRule) -> Self {
        CreateRule {
            boss_name: rule.boss_name,
            boss_extension: rule.boss_extension,
            secretary_extension: rule.secretary_extension,
            whitelist: rule.whitelist,
            enabled: Some(rule.enabled),
        }
    }
}

/// DTO for partially updating a rule. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRule {
    pub boss_name: Option<String>,
    pub boss_extension: Option<String>,
    pub secretary_extension: Option<String>,
    pub whitelist: Option<String>,
    pub enabled: Option<bool>,
}

impl BossSecRule {
    /// The row as it would look after applying `update`.
    pub fn merged(&self, update: &UpdateRule) -> CreateRule {
        CreateRule {
            boss_name: update
                .boss_name
                .clone()
                .unwrap_or_else(|| self.boss_name.clone()),
            boss_extension: update
                .boss_extension
                .clone()
                .unwrap_or_else(|| self.boss_extension.clone()),
            secretary_extension: update
                .secretary_extension
                .clone()
                .unwrap_or_else(|| self.secretary_extension.clone()),
            whitelist: update
                .whitelist
                .clone()
                .unwrap_or_else(|| self.whitelist.clone()),
            enabled: Some(update.enabled.unwrap_or(self.enabled)),
        }
    }
}
