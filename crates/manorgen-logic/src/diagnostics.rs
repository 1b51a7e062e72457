//! Recoverable problems recorded during generation.
//!
//! A skipped layout cell or a wall that fell back to a solid panel does not
//! abort a build; it leaves a `Diagnostic` behind instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Log through the `log` facade at the matching level.
    pub fn emit(&self) {
        match self.severity {
            Severity::Error => log::error!("[{}] {}", self.category, self.message),
            Severity::Warning => log::warn!("[{}] {}", self.category, self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} [{}]: {}", level, self.category, self.message)
    }
}

pub mod categories {
    pub const INVALID_LAYOUT: &str = "invalid_layout";
    pub const GEOMETRY_FAILURE: &str = "geometry_failure";
    pub const DOOR_SYMMETRY: &str = "door_symmetry";
    pub const DOOR_COUNT: &str = "door_count";
    pub const CONNECTIVITY: &str = "connectivity";
}
