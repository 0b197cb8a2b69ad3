//! Non-fatal diagnostics
//!
//! Warnings never change the emitted edits. They are collected per file and also
//! logged through `tracing` as they are raised.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// `function f(x = x)`: the default reads the parameter itself
    SelfReferentialDefault { name: String },
    /// The parameter list uses a shape this crate does not rewrite
    SkippedFunction { function: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub line: u32,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl Warning {
    pub fn message(&self) -> String {
        match &self.kind {
            WarningKind::SelfReferentialDefault { name } => format!(
                "parameter '{0}' has a default value referring to itself; the outer binding named '{0}' is shadowed",
                name
            ),
            WarningKind::SkippedFunction { function, reason } => {
                format!("function '{}' left unchanged: {}", function, reason)
            }
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message())
    }
}

/// Warning channel for one file
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, line: u32, kind: WarningKind) {
        let warning = Warning { line, kind };
        tracing::warn!(line, "{}", warning.message());
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_reference_message_names_parameter() {
        let warning = Warning {
            line: 3,
            kind: WarningKind::SelfReferentialDefault {
                name: "x".to_string(),
            },
        };
        assert_eq!(
            warning.to_string(),
            "line 3: parameter 'x' has a default value referring to itself; the outer binding named 'x' is shadowed"
        );
    }

    #[test]
    fn test_warnings_are_collected_in_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.warn(
            1,
            WarningKind::SelfReferentialDefault {
                name: "a".to_string(),
            },
        );
        diagnostics.warn(
            7,
            WarningKind::SkippedFunction {
                function: "g".to_string(),
                reason: "object rest element in a parameter pattern".to_string(),
            },
        );
        let lines: Vec<u32> = diagnostics.warnings().iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![1, 7]);
    }

    #[test]
    fn test_warning_json_shape() {
        let warning = Warning {
            line: 2,
            kind: WarningKind::SelfReferentialDefault {
                name: "x".to_string(),
            },
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["line"], 2);
        assert_eq!(json["kind"], "self_referential_default");
        assert_eq!(json["name"], "x");
    }
}
