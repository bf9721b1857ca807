//! Dialplan instruction model and text rendering.
//!
//! The compiler produces a [`Dialplan`]: an ordered list of [`Instruction`]
//! records the host engine merges into its extension table. Each record is
//! either a splice into an existing extension or a new instruction appended
//! to a freshly generated context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host context holding the local extensions that get intercepted.
pub const HOST_CONTEXT: &str = "ext-local";

/// Extension used inside generated subroutine contexts.
pub const SUBROUTINE_EXTENSION: &str = "s";

/// Priority label of the branch that hands the call back to the boss.
pub const LABEL_ROUTE_TO_BOSS: &str = "route-to-boss";

/// Priority label of the branch that forwards the call to the secretary.
pub const LABEL_ROUTE_TO_SECRETARY: &str = "route-to-secretary";

/// Channel variable holding the whitelist match result.
pub const RESULT_VARIABLE: &str = "CS_RESULT";

/// Caller-ID expression evaluated by the engine at call time.
pub const CALLERID_EXPR: &str = "${CALLERID(num)}";

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Position of an instruction within its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// An explicit priority number.
    Number(u32),
    /// The priority following the previous instruction (`n`).
    Next,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Number(n) => write!(f, "{n}"),
            Priority::Next => f.write_str("n"),
        }
    }
}

/// Destination of a `Goto` / `GotoIf` branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GotoTarget {
    /// A priority label within the current extension.
    Label(String),
    /// A fully qualified `context,extension,priority` location.
    Location {
        context: String,
        extension: String,
        priority: u32,
    },
}

impl GotoTarget {
    pub fn label(label: &str) -> Self {
        GotoTarget::Label(label.to_string())
    }

    pub fn location(context: &str, extension: &str, priority: u32) -> Self {
        GotoTarget::Location {
            context: context.to_string(),
            extension: extension.to_string(),
            priority,
        }
    }
}

impl fmt::Display for GotoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GotoTarget::Label(label) => f.write_str(label),
            GotoTarget::Location {
                context,
                extension,
                priority,
            } => write!(f, "{context},{extension},{priority}"),
        }
    }
}

/// A dialplan application together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Application {
    NoOp {
        text: String,
    },
    Set {
        variable: String,
        value: String,
    },
    Goto {
        target: GotoTarget,
    },
    GotoIf {
        condition: String,
        if_true: GotoTarget,
        if_false: GotoTarget,
    },
}

impl Application {
    /// The application name as the engine knows it.
    pub fn name(&self) -> &'static str {
        match self {
            Application::NoOp { .. } => "NoOp",
            Application::Set { .. } => "Set",
            Application::Goto { .. } => "Goto",
            Application::GotoIf { .. } => "GotoIf",
        }
    }

    /// The raw argument string (without the surrounding parentheses).
    pub fn args(&self) -> String {
        match self {
            Application::NoOp { text } => text.clone(),
            Application::Set { variable, value } => format!("{variable}={value}"),
            Application::Goto { target } => target.to_string(),
            Application::GotoIf {
                condition,
                if_true,
                if_false,
            } => format!("{condition}?{if_true}:{if_false}"),
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.args())
    }
}

/// How an instruction is merged into the host's extension table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Inserted into an existing extension at `priority`, shifting the
    /// existing instructions down.
    Splice,
    /// Appended to a context generated by this crate.
    Append,
}

/// A single dialplan instruction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub context: String,
    pub extension: String,
    pub priority: Priority,
    pub label: Option<String>,
    pub application: Application,
    pub placement: Placement,
}

impl Instruction {
    /// An instruction appended to a generated context.
    pub fn append(context: &str, extension: &str, priority: Priority, application: Application) -> Self {
        Self {
            context: context.to_string(),
            extension: extension.to_string(),
            priority,
            label: None,
            application,
            placement: Placement::Append,
        }
    }

    /// An instruction spliced into an existing extension.
    pub fn splice(context: &str, extension: &str, priority: u32, application: Application) -> Self {
        Self {
            context: context.to_string(),
            extension: extension.to_string(),
            priority: Priority::Number(priority),
            label: None,
            application,
            placement: Placement::Splice,
        }
    }

    /// Attach a priority label (`n(label)`).
    pub fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// `priority` or `priority(label)` as written in a config line.
    fn priority_field(&self) -> String {
        match &self.label {
            Some(label) => format!("{}({label})", self.priority),
            None => self.priority.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dialplan
// ---------------------------------------------------------------------------

/// An ordered list of instructions produced by a compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialplan {
    instructions: Vec<Instruction>,
}

impl Dialplan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) {
        self.instructions.extend(instructions);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Instructions spliced into existing host extensions.
    pub fn splices(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .filter(|i| i.placement == Placement::Splice)
    }

    /// Names of generated contexts, in first-appearance order.
    pub fn contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for instruction in &self.instructions {
            if instruction.placement == Placement::Append
                && !names.contains(&instruction.context.as_str())
            {
                names.push(&instruction.context);
            }
        }
        names
    }

    /// Appended instructions belonging to `context`, in order.
    pub fn context_instructions<'a>(
        &'a self,
        context: &'a str,
    ) -> impl Iterator<Item = &'a Instruction> + 'a {
        self.instructions
            .iter()
            .filter(move |i| i.placement == Placement::Append && i.context == context)
    }

    /// Render the dialplan as `extensions.conf` text.
    ///
    /// Generated contexts become `[context]` blocks. Splices cannot be
    /// expressed in a standalone config file, so they are listed in a comment
    /// header for the host to apply to its own extension table.
    pub fn render_conf(&self) -> String {
        let mut out = String::from("; Generated by bosssec. Do not edit by hand.\n");

        let splices: Vec<&Instruction> = self.splices().collect();
        if !splices.is_empty() {
            out.push_str(";\n; Splices into existing extensions:\n");
            for splice in splices {
                out.push_str(&format!(
                    ";   {},{},{} => {}\n",
                    splice.context,
                    splice.extension,
                    splice.priority_field(),
                    splice.application
                ));
            }
        }

        for context in self.contexts() {
            out.push_str(&format!("\n[{context}]\n"));
            for instruction in self.context_instructions(context) {
                out.push_str(&format!(
                    "exten => {},{},{}({})\n",
                    instruction.extension,
                    instruction.priority_field(),
                    instruction.application.name(),
                    escape_conf_arg(&instruction.application.args())
                ));
            }
        }
        out
    }
}

/// Escape characters the config parser treats specially inside arguments.
fn escape_conf_arg(arg: &str) -> String {
    let mut escaped = String::with_capacity(arg.len());
    for c in arg.chars() {
        if c == '\\' || c == ';' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
