//! Whitelist parsing and caller-ID pattern construction.
//!
//! The whitelist is free text entered by an administrator: entries are
//! separated by any mix of whitespace, newlines and commas. Parsing yields a
//! deduplicated, order-preserving set of patterns to which the secretary's
//! extension is always appended, so the secretary can reach the boss.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How whitelist entries are embedded into the caller-ID match expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Every entry is a literal caller-ID; regex metacharacters are escaped.
    #[default]
    Literal,
    /// Entries are regular expressions authored by the administrator.
    AdminRegex,
}

impl PatternMode {
    /// Parse a mode name as used in configuration (`literal` or `regex`).
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "regex" | "admin_regex" => Ok(Self::AdminRegex),
            other => Err(CoreError::Validation(format!(
                "Invalid whitelist mode '{other}'. Must be one of: literal, regex"
            ))),
        }
    }
}

/// Characters with special meaning in a POSIX extended regex.
///
/// Braces are absent: they are rejected outright (see [`FORBIDDEN_SEQUENCES`]).
const REGEX_METACHARACTERS: &[char] = &['.', '*', '+', '?', '(', ')', '[', '|', '$'];

/// Character sequences that would break out of the generated dialplan line.
///
/// The engine closes `${...}` at the first unmatched `}` regardless of
/// quoting, so braces are forbidden in every mode.
const FORBIDDEN_SEQUENCES: &[&str] = &["\"", ";", "{", "}", "${", "$["];

/// Split raw whitelist text into trimmed, non-empty, deduplicated entries.
///
/// The first occurrence of an entry wins; later duplicates are dropped.
///
/// # Examples
///
/// ```
/// use bosssec_core::whitelist::split_entries;
///
/// assert_eq!(split_entries("100, 101\n102,,100"), vec!["100", "101", "102"]);
/// assert!(split_entries("  \n , ").is_empty());
/// ```
pub fn split_entries(raw: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() || entries.iter().any(|e| e == token) {
            continue;
        }
        entries.push(token.to_string());
    }
    entries
}

/// Build the full pattern set for a rule: the whitelist entries followed by
/// the secretary's extension.
///
/// The secretary is not appended twice when the whitelist already lists it,
/// and an empty secretary extension is never added.
pub fn pattern_set(whitelist: &str, secretary_extension: &str) -> Vec<String> {
    let mut patterns = split_entries(whitelist);
    let secretary = secretary_extension.trim();
    if !secretary.is_empty() && !patterns.iter().any(|p| p == secretary) {
        patterns.push(secretary.to_string());
    }
    patterns
}

/// Escape an entry so a regex engine matches it literally.
///
/// Metacharacters become single-character bracket expressions (`+` becomes
/// `[+]`), which keeps backslashes out of the dialplan. `^` and `\` cannot be
/// bracketed safely and are backslash-escaped instead.
pub fn escape_literal(entry: &str) -> String {
    let mut escaped = String::with_capacity(entry.len());
    for c in entry.chars() {
        match c {
            '^' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if REGEX_METACHARACTERS.contains(&c) => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Join a pattern set into a single alternation expression.
///
/// In [`PatternMode::Literal`] every pattern is escaped. In
/// [`PatternMode::AdminRegex`] only the secretary's extension is escaped,
/// since it is always an extension number rather than an authored pattern.
pub fn alternation(patterns: &[String], secretary_extension: &str, mode: PatternMode) -> String {
    patterns
        .iter()
        .map(|p| match mode {
            PatternMode::AdminRegex if p != secretary_extension => p.clone(),
            _ => escape_literal(p),
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Validate raw whitelist text before it is stored.
///
/// Rejects entries that would corrupt the generated dialplan line and, in
/// [`PatternMode::AdminRegex`], entries that do not compile as a regex.
pub fn validate_whitelist(raw: &str, mode: PatternMode) -> Result<(), CoreError> {
    for entry in split_entries(raw) {
        if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|s| entry.contains(**s)) {
            return Err(CoreError::Validation(format!(
                "Whitelist entry '{entry}' contains forbidden sequence '{seq}'"
            )));
        }
        if mode == PatternMode::AdminRegex {
            regex::Regex::new(&entry).map_err(|e| {
                CoreError::Validation(format!("Whitelist entry '{entry}' is not a valid regex: {e}"))
            })?;
        }
    }
    Ok(())
}
