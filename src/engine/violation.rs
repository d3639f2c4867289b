//! User input violations, reported as data by the validator.

use serde::Serialize;
use std::fmt;
use strum::{Display, IntoStaticStr};

/// Machine-distinguishable category of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[derive(Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Value has the wrong scalar type (e.g. a string for a boolean option)
    InvalidType,
    /// Value is not one of the option's allowed choices
    NotAllowed,
    /// Integer outside the option's bounds
    OutOfRange,
    /// String does not match the option's pattern
    PatternMismatch,
    /// A named cross-option rule is broken
    RuleViolated,
}

/// One detected inconsistency in the user's selections.
///
/// Carries every identifier involved so a caller can re-prompt exactly the
/// options at fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub options: Vec<String>,
    pub kind: ViolationKind,
    /// Name of the rule that fired, when one applies
    pub rule: Option<&'static str>,
    pub message: String,
}

impl Violation {
    pub fn new(option: &str, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            options: vec![option.to_string()],
            kind,
            rule: None,
            message: message.into(),
        }
    }

    /// Violation of a named cross-option rule
    pub fn rule(rule: &'static str, options: &[&str], message: impl Into<String>) -> Self {
        Self {
            options: options.iter().map(|o| o.to_string()).collect(),
            kind: ViolationKind::RuleViolated,
            rule: Some(rule),
            message: message.into(),
        }
    }

    /// Attach a rule name to a single-option violation
    pub fn with_rule(mut self, rule: &'static str) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn involves(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.options.join(", "), self.message)
    }
}
