use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warning,
    Info,
}

/// Non-fatal finding reported while parsing a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    /// Byte offset in the source unit
    pub pos: usize,
}

impl Diagnostic {
    pub fn warning(code: impl Into<String>, message: impl Into<String>, pos: usize) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code: code.into(),
            message: message.into(),
            pos,
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, pos: usize) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            code: code.into(),
            message: message.into(),
            pos,
        }
    }

    /// A member line that did not match its grammar
    pub fn malformed_member(line: &str, pos: usize) -> Self {
        Self::info("malformed-member", format!("skipped '{}'", line.trim()), pos)
    }

    /// An `@optional` member of a protocol with no configured targets
    pub fn unmapped_optional_member(declaration: &str, member: &str, pos: usize) -> Self {
        Self::warning(
            "unmapped-optional-member",
            format!("optional member '{}.{}' has no target declaration", declaration, member),
            pos,
        )
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        };
        write!(f, "{}[{}]: {}", level, self.code, self.message)
    }
}
