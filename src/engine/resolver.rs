//! Resolver
//!
//! Turns validated selections into a [`ResolvedConfiguration`]:
//!
//! 1. Walk the catalog in order, taking the supplied value or the default and
//!    forcing irrelevant options to their inactive value
//! 2. Evaluate the derived flags (with a stability check)
//! 3. Re-check the catalog invariant on the result
//!
//! Resolution is deterministic. There is no clock, randomness or I/O in here.

use std::str::FromStr;

use super::catalog::Catalog;
use super::derive::derive;
use super::validator::assemble;
use super::values::Values;
use crate::error::EngineError;
use crate::selections::RawSelections;
use crate::value::Value;

/// Validated, fully defaulted configuration plus its derived flags.
///
/// Only [`resolve`] builds one; a changed selection needs a fresh resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    primary: Values,
    derived: Values,
}

impl ResolvedConfiguration {
    /// Value of a catalog option or derived flag
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.primary.get(id).or_else(|| self.derived.get(id))
    }

    pub fn flag(&self, id: &str) -> bool {
        self.get(id).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn text(&self, id: &str) -> &str {
        self.get(id).and_then(Value::as_str).unwrap_or("")
    }

    pub fn int(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(Value::as_int)
    }

    /// Typed value of a choice option
    pub fn choice<T: FromStr + Default>(&self, id: &str) -> T {
        self.primary.choice(id)
    }

    /// Catalog options in identifier order
    pub fn primary(&self) -> &Values {
        &self.primary
    }

    /// Derived flags in identifier order
    pub fn derived(&self) -> &Values {
        &self.derived
    }

    /// Every option and derived flag
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.primary.iter().chain(self.derived.iter())
    }
}

/// Resolve `raw` against `catalog`.
///
/// The selections must validate; otherwise this fails fast with
/// [`EngineError::PreconditionViolated`] instead of guessing.
pub fn resolve(raw: &RawSelections, catalog: &Catalog) -> Result<ResolvedConfiguration, EngineError> {
    let assembly = assemble(raw, catalog);
    let violations = assembly.all_violations();
    if !violations.is_empty() {
        tracing::debug!("Refusing to resolve: {} violation(s)", violations.len());
        return Err(EngineError::PreconditionViolated {
            violations: violations.len(),
        });
    }

    let primary = assembly.resolved;
    let derived = derive(&primary)?;
    check_invariants(catalog, &primary)?;

    tracing::debug!(
        "Resolved {} options and {} derived flags",
        primary.len(),
        derived.len()
    );
    Ok(ResolvedConfiguration { primary, derived })
}

/// Every option holds a value of its kind when relevant and exactly its
/// inactive value otherwise
fn check_invariants(catalog: &Catalog, primary: &Values) -> Result<(), EngineError> {
    for option in catalog.options() {
        let Some(value) = primary.get(option.id) else {
            return Err(EngineError::invariant(option.id, "no value after resolution"));
        };

        if option.relevant.evaluate(primary) {
            if let Some(violation) = option.check_value(value) {
                return Err(EngineError::invariant(option.id, violation.message));
            }
        } else if *value != option.inactive {
            return Err(EngineError::invariant(
                option.id,
                format!(
                    "irrelevant ({}) but holds '{}' instead of '{}'",
                    option.relevant, value, option.inactive
                ),
            ));
        }
    }
    Ok(())
}
