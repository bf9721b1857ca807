//! Repository for the `bosssec_config` table.
//!
//! Provides CRUD for boss/secretary rules, the enabled-rule read used by the
//! dialplan build, and a transactional replace used by backup restore.

use bosssec_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::rule::{BossSecRule, CreateRule, EnabledRule, RuleSummary};

/// Column list for full `bosssec_config` queries.
const COLUMNS: &str = "\
    id, boss_name, boss_extension, secretary_extension, whitelist, enabled, \
    created_at, updated_at";

/// Column list for grid listings.
const SUMMARY_COLUMNS: &str = "id, boss_name, boss_extension, secretary_extension, enabled";

/// Provides data access for boss/secretary rules.
pub struct RuleRepo;

impl RuleRepo {
    /// List every rule for the grid view, ordered by id.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<RuleSummary>, sqlx::Error> {
        let query = format!("SELECT {SUMMARY_COLUMNS} FROM bosssec_config ORDER BY id");
        sqlx::query_as::<_, RuleSummary>(&query)
            .fetch_all(pool)
            .await
    }

    /// List every rule with all columns, ordered by id.
    pub async fn list_full(pool: &SqlitePool) -> Result<Vec<BossSecRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bosssec_config ORDER BY id");
        sqlx::query_as::<_, BossSecRule>(&query)
            .fetch_all(pool)
            .await
    }

    /// Rules with `enabled = 1`, as read by the dialplan build.
    pub async fn list_enabled(pool: &SqlitePool) -> Result<Vec<EnabledRule>, sqlx::Error> {
        sqlx::query_as::<_, EnabledRule>(
            "SELECT id, boss_extension, secretary_extension, whitelist \
             FROM bosssec_config WHERE enabled = 1 ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    /// Find a rule by its ID.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<BossSecRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bosssec_config WHERE id = ?1");
        sqlx::query_as::<_, BossSecRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another rule already uses `boss_extension`.
    ///
    /// `exclude_id` skips the rule being edited.
    pub async fn boss_extension_taken(
        pool: &SqlitePool,
        boss_extension: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM bosssec_config \
             WHERE boss_extension = ?1 AND (?2 IS NULL OR id != ?2) \
             LIMIT 1",
        )
        .bind(boss_extension)
        .bind(exclude_id)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// Insert a new rule. `enabled` defaults to true.
    pub async fn create(pool: &SqlitePool, dto: &CreateRule) -> Result<BossSecRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO bosssec_config \
                 (boss_name, boss_extension, secretary_extension, whitelist, enabled) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BossSecRule>(&query)
            .bind(&dto.boss_name)
            .bind(&dto.boss_extension)
            .bind(&dto.secretary_extension)
            .bind(&dto.whitelist)
            .bind(dto.enabled.unwrap_or(true))
            .fetch_one(pool)
            .await
    }

    /// Overwrite every editable column of a rule.
    ///
    /// Returns `None` when no rule has this id.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        dto: &CreateRule,
    ) -> Result<Option<BossSecRule>, sqlx::Error> {
        let query = format!(
            "UPDATE bosssec_config SET \
                 boss_name = ?2, \
                 boss_extension = ?3, \
                 secretary_extension = ?4, \
                 whitelist = ?5, \
                 enabled = COALESCE(?6, enabled), \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BossSecRule>(&query)
            .bind(id)
            .bind(&dto.boss_name)
            .bind(&dto.boss_extension)
            .bind(&dto.secretary_extension)
            .bind(&dto.whitelist)
            .bind(dto.enabled)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule by ID.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bosssec_config WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the whole table with `rules` in a single transaction.
    ///
    /// Returns the number of rules inserted. Nothing changes if any insert
    /// fails.
    pub async fn replace_all(pool: &SqlitePool, rules: &[CreateRule]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM bosssec_config")
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for dto in rules {
            sqlx::query(
                "INSERT INTO bosssec_config \
                     (boss_name, boss_extension, secretary_extension, whitelist, enabled) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&dto.boss_name)
            .bind(&dto.boss_extension)
            .bind(&dto.secretary_extension)
            .bind(&dto.whitelist)
            .bind(dto.enabled.unwrap_or(true))
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        tracing::debug!(inserted, "Replaced all boss/secretary rules");
        Ok(inserted)
    }
}
