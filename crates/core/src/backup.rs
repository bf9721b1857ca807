//! Portable backup snapshot of all boss/secretary rules.
//!
//! The snapshot carries the `bosssec_config` table contents without store
//! ids or timestamps so it can be restored into an empty or existing store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rule::validate_rule_fields;
use crate::types::Timestamp;
use crate::whitelist::PatternMode;

/// Current snapshot format version. Bumped on incompatible changes.
pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Table the snapshot was taken from.
pub const BACKUP_TABLE: &str = "bosssec_config";

/// A full export of the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesBackup {
    pub format_version: u32,
    /// Crate version that produced the export.
    pub app_version: String,
    pub exported_at: Timestamp,
    pub table: String,
    pub rules: Vec<BackupRule>,
}

/// One rule as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRule {
    pub boss_name: String,
    pub boss_extension: String,
    pub secretary_extension: String,
    #[serde(default)]
    pub whitelist: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RulesBackup {
    pub fn new(rules: Vec<BackupRule>, exported_at: Timestamp) -> Self {
        Self {
            format_version: BACKUP_FORMAT_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at,
            table: BACKUP_TABLE.to_string(),
            rules,
        }
    }

    /// Check a snapshot before restoring it.
    ///
    /// Every rule must pass field validation and boss extensions must be
    /// unique within the snapshot, since restoring replaces the whole table.
    pub fn validate(&self, mode: PatternMode) -> Result<(), CoreError> {
        if self.format_version != BACKUP_FORMAT_VERSION {
            return Err(CoreError::Validation(format!(
                "Unsupported backup format version {} (expected {BACKUP_FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.table != BACKUP_TABLE {
            return Err(CoreError::Validation(format!(
                "Backup is for table '{}', expected '{BACKUP_TABLE}'",
                self.table
            )));
        }

        let mut bosses = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            validate_rule_fields(
                &rule.boss_name,
                &rule.boss_extension,
                &rule.secretary_extension,
                &rule.whitelist,
                mode,
            )
            .map_err(|e| match e {
                CoreError::Validation(msg) => {
                    CoreError::Validation(format!("rule #{}: {msg}", index + 1))
                }
                other => other,
            })?;

            if !bosses.insert(rule.boss_extension.as_str()) {
                return Err(CoreError::Conflict(format!(
                    "boss extension {} appears more than once in the backup",
                    rule.boss_extension
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn backup_rule(boss: &str, secretary: &str) -> BackupRule {
        BackupRule {
            boss_name: format!("Boss {boss}"),
            boss_extension: boss.to_string(),
            secretary_extension: secretary.to_string(),
            whitelist: String::new(),
            enabled: true,
        }
    }

    #[test]
    fn valid_snapshot_passes() {
        let backup = RulesBackup::new(
            vec![backup_rule("200", "201"), backup_rule("300", "201")],
            Utc::now(),
        );
        assert!(backup.validate(PatternMode::Literal).is_ok());
        assert_eq!(backup.table, "bosssec_config");
    }

    #[test]
    fn duplicate_boss_is_a_conflict() {
        let backup = RulesBackup::new(
            vec![backup_rule("200", "201"), backup_rule("200", "202")],
            Utc::now(),
        );
        assert_matches!(backup.validate(PatternMode::Literal), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn invalid_rule_reports_its_position() {
        let backup = RulesBackup::new(
            vec![backup_rule("200", "201"), backup_rule("", "202")],
            Utc::now(),
        );
        assert_matches!(
            backup.validate(PatternMode::Literal),
            Err(CoreError::Validation(msg)) if msg.starts_with("rule #2:")
        );
    }

    #[test]
    fn unknown_format_version_is_rejected() {
        let mut backup = RulesBackup::new(vec![], Utc::now());
        backup.format_version = 99;
        assert!(backup.validate(PatternMode::Literal).is_err());
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let rule: BackupRule = serde_json::from_value(serde_json::json!({
            "boss_name": "Ana",
            "boss_extension": "200",
            "secretary_extension": "201"
        }))
        .unwrap();
        assert_eq!(rule.whitelist, "");
        assert!(rule.enabled);
    }
}
