//! Rule compiler: turns enabled boss/secretary rules into dialplan
//! instructions.
//!
//! Every rule compiles independently into:
//!
//! ```text
//! [ext-local]          <boss>,1          Goto(boss-secretary-<boss>,s,1)   (splice)
//! [boss-secretary-<boss>]
//!   s,1                    NoOp(Call to Boss ...)
//!   s,n                    Set(CS_RESULT=${REGEX("<alternation>" ${CALLERID(num)})})
//!   s,n                    GotoIf($["${CS_RESULT}" = "1"]?route-to-boss:route-to-secretary)
//!   s,n(route-to-boss)     NoOp(...)
//!   s,n                    Goto(ext-local,<boss>,<resume>)
//!   s,n(route-to-secretary) NoOp(...)
//!   s,n                    Goto(ext-local,<secretary>,1)
//! ```
//!
//! Compilation never fails as a whole. Rules that are malformed, or that
//! reuse a boss extension already compiled in the same pass, are skipped,
//! logged and reported in [`Compilation::skipped`].

use std::collections::HashSet;

use serde::Serialize;

use crate::dialplan::{
    Application, Dialplan, GotoTarget, Instruction, Priority, CALLERID_EXPR, HOST_CONTEXT,
    LABEL_ROUTE_TO_BOSS, LABEL_ROUTE_TO_SECRETARY, RESULT_VARIABLE, SUBROUTINE_EXTENSION,
};
use crate::error::CoreError;
use crate::rule::{subroutine_context, validate_extension, ScreeningRule};
use crate::types::DbId;
use crate::whitelist::{alternation, pattern_set, validate_whitelist, PatternMode};

/// Knobs controlling how rules are compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Context holding the boss extensions to intercept.
    pub host_context: String,
    /// Priority at which the interception `Goto` is spliced in.
    pub interception_priority: u32,
    /// Priority at which a whitelisted call resumes the boss's own routing.
    pub resume_priority: u32,
    pub pattern_mode: PatternMode,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            host_context: HOST_CONTEXT.to_string(),
            interception_priority: 1,
            resume_priority: 2,
            pattern_mode: PatternMode::Literal,
        }
    }
}

impl CompilerOptions {
    /// Resuming at or before the interception point would loop the call back
    /// into the subroutine.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interception_priority == 0 {
            return Err(CoreError::Validation(
                "interception priority must be at least 1".to_string(),
            ));
        }
        if self.resume_priority <= self.interception_priority {
            return Err(CoreError::Validation(format!(
                "resume priority {} must be greater than interception priority {}",
                self.resume_priority, self.interception_priority
            )));
        }
        Ok(())
    }
}

/// Why a rule was left out of the compiled dialplan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// A field failed validation.
    Invalid(String),
    /// Another rule in the same pass already intercepts this boss extension.
    DuplicateBoss,
}

/// A rule the compiler refused to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub rule_id: Option<DbId>,
    pub boss_extension: String,
    pub reason: SkipReason,
}

/// Result of a compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Compilation {
    pub dialplan: Dialplan,
    /// Number of rules that produced a subroutine.
    pub compiled: usize,
    pub skipped: Vec<SkippedRule>,
}

/// Compile every enabled rule in `rules`.
///
/// Disabled rules are ignored without being reported. Rule order is kept in
/// the output, and the first rule seen for a boss extension wins.
pub fn compile(rules: &[ScreeningRule], options: &CompilerOptions) -> Compilation {
    let mut result = Compilation::default();
    let mut seen_bosses: HashSet<&str> = HashSet::new();

    for rule in rules.iter().filter(|r| r.enabled) {
        if let Err(err) = check_rule(rule, options.pattern_mode) {
            let reason = match err {
                CoreError::Validation(msg) => msg,
                other => other.to_string(),
            };
            tracing::warn!(
                rule_id = ?rule.id,
                boss_extension = %rule.boss_extension,
                reason = %reason,
                "Skipping malformed boss/secretary rule",
            );
            result.skipped.push(SkippedRule {
                rule_id: rule.id,
                boss_extension: rule.boss_extension.clone(),
                reason: SkipReason::Invalid(reason),
            });
            continue;
        }

        if !seen_bosses.insert(rule.boss_extension.as_str()) {
            tracing::warn!(
                rule_id = ?rule.id,
                boss_extension = %rule.boss_extension,
                "Skipping rule for already intercepted boss extension",
            );
            result.skipped.push(SkippedRule {
                rule_id: rule.id,
                boss_extension: rule.boss_extension.clone(),
                reason: SkipReason::DuplicateBoss,
            });
            continue;
        }

        result.dialplan.extend(compile_rule(rule, options));
        result.compiled += 1;
    }

    tracing::debug!(
        compiled = result.compiled,
        skipped = result.skipped.len(),
        instructions = result.dialplan.len(),
        "Compiled boss/secretary rules",
    );
    result
}

/// Compile a single rule without validating it.
///
/// Callers outside [`compile`] are expected to have validated the rule.
pub fn compile_rule(rule: &ScreeningRule, options: &CompilerOptions) -> Vec<Instruction> {
    let patterns = pattern_set(&rule.whitelist, &rule.secretary_extension);
    emit_subroutine(
        &rule.boss_extension,
        &rule.secretary_extension,
        &patterns,
        options,
    )
}

fn check_rule(rule: &ScreeningRule, mode: PatternMode) -> Result<(), CoreError> {
    validate_extension("boss_extension", &rule.boss_extension)?;
    validate_extension("secretary_extension", &rule.secretary_extension)?;
    validate_whitelist(&rule.whitelist, mode)
}

fn emit_subroutine(
    boss: &str,
    secretary: &str,
    patterns: &[String],
    options: &CompilerOptions,
) -> Vec<Instruction> {
    let context = subroutine_context(boss);
    let host = options.host_context.as_str();
    let step = |application: Application| {
        Instruction::append(&context, SUBROUTINE_EXTENSION, Priority::Next, application)
    };

    let mut out = Vec::with_capacity(9);

    out.push(Instruction::splice(
        host,
        boss,
        options.interception_priority,
        Application::Goto {
            target: GotoTarget::location(&context, SUBROUTINE_EXTENSION, 1),
        },
    ));
    out.push(Instruction::append(
        &context,
        SUBROUTINE_EXTENSION,
        Priority::Number(1),
        Application::NoOp {
            text: format!("Call to Boss {boss}. Checking CallerID: {CALLERID_EXPR}"),
        },
    ));

    if patterns.is_empty() {
        out.push(step(Application::Goto {
            target: GotoTarget::label(LABEL_ROUTE_TO_SECRETARY),
        }));
    } else {
        let regex = alternation(patterns, secretary, options.pattern_mode);
        out.push(step(Application::Set {
            variable: RESULT_VARIABLE.to_string(),
            value: format!("${{REGEX(\"{regex}\" {CALLERID_EXPR})}}"),
        }));
        out.push(step(Application::GotoIf {
            condition: format!("$[\"${{{RESULT_VARIABLE}}}\" = \"1\"]"),
            if_true: GotoTarget::label(LABEL_ROUTE_TO_BOSS),
            if_false: GotoTarget::label(LABEL_ROUTE_TO_SECRETARY),
        }));
    }

    out.push(
        step(Application::NoOp {
            text: format!(
                "Whitelist OK. Returning call to {host},{boss},{}",
                options.resume_priority
            ),
        })
        .labelled(LABEL_ROUTE_TO_BOSS),
    );
    out.push(step(Application::Goto {
        target: GotoTarget::location(host, boss, options.resume_priority),
    }));
    out.push(
        step(Application::NoOp {
            text: format!("Forwarding call to {host},{secretary},1"),
        })
        .labelled(LABEL_ROUTE_TO_SECRETARY),
    );
    out.push(step(Application::Goto {
        target: GotoTarget::location(host, secretary, 1),
    }));

    out
}
