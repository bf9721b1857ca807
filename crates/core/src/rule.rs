//! Boss/secretary rule type and field validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::whitelist::{validate_whitelist, PatternMode};

/// Maximum length of an extension identifier.
pub const MAX_EXTENSION_LEN: usize = 40;

/// Maximum length of the boss's display name.
pub const MAX_BOSS_NAME_LEN: usize = 100;

/// Non-alphanumeric characters allowed in an extension identifier.
const EXTENSION_SYMBOLS: &[char] = &['*', '#', '+'];

/// The fields of a rule that take part in dialplan compilation.
///
/// The store's row type converts into this; the compiler never sees
/// display-only fields or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningRule {
    /// Store id, when the rule came from the store. Only used for reporting.
    pub id: Option<DbId>,
    pub boss_extension: String,
    pub secretary_extension: String,
    pub whitelist: String,
    pub enabled: bool,
}

impl ScreeningRule {
    /// Name of the dialplan context generated for this rule.
    pub fn subroutine_context(&self) -> String {
        subroutine_context(&self.boss_extension)
    }
}

/// Deterministic context name for a boss extension.
///
/// ```
/// assert_eq!(bosssec_core::rule::subroutine_context("200"), "boss-secretary-200");
/// ```
pub fn subroutine_context(boss_extension: &str) -> String {
    format!("boss-secretary-{boss_extension}")
}

/// Validate a single extension identifier.
///
/// `field` names the offending input in the error message.
pub fn validate_extension(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_EXTENSION_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_EXTENSION_LEN} characters"
        )));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !EXTENSION_SYMBOLS.contains(c))
    {
        return Err(CoreError::Validation(format!(
            "{field} contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

/// Validate every user-supplied field of a rule before it is written.
///
/// Duplicate boss extensions are a store-level concern and are checked by
/// the caller against the repository.
pub fn validate_rule_fields(
    boss_name: &str,
    boss_extension: &str,
    secretary_extension: &str,
    whitelist: &str,
    mode: PatternMode,
) -> Result<(), CoreError> {
    if boss_name.chars().count() > MAX_BOSS_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "boss_name must be at most {MAX_BOSS_NAME_LEN} characters"
        )));
    }
    validate_extension("boss_extension", boss_extension)?;
    validate_extension("secretary_extension", secretary_extension)?;
    if boss_extension == secretary_extension {
        return Err(CoreError::Validation(
            "boss_extension and secretary_extension must differ".to_string(),
        ));
    }
    validate_whitelist(whitelist, mode)
}
