//! Constraint validator
//!
//! Walks the catalog once, in order, building two views of the selections:
//!
//! - the *effective* view: supplied value when well-typed, default otherwise.
//!   Named rules are evaluated on this view, so a contradiction the user typed
//!   is reported even when the resolver would later discard one side of it.
//! - the *resolved* view: the same walk with irrelevant options forced to
//!   their inactive value. Relevance is decided on this view, exactly as the
//!   resolver decides it, so every value the resolver will keep has been
//!   type-checked here.
//!
//! Nothing short-circuits: every relevant option and every rule is checked,
//! except that a rule reporting an option whose supplied value was rejected
//! is skipped. Its effective value is a default the user never chose.

use std::collections::BTreeSet;

use super::catalog::Catalog;
use super::rules::check_rules;
use super::values::Values;
use super::violation::Violation;
use crate::selections::RawSelections;

/// Output of the ordered walk shared by the validator and the resolver
#[derive(Debug)]
pub(crate) struct Assembly {
    pub(crate) effective: Values,
    pub(crate) resolved: Values,
    /// Kind violations of relevant, supplied values
    pub(crate) violations: Vec<Violation>,
    /// Options behind those kind violations
    rejected: BTreeSet<&'static str>,
}

impl Assembly {
    /// Kind violations followed by rule violations
    pub(crate) fn all_violations(&self) -> Vec<Violation> {
        let mut violations = self.violations.clone();
        for violation in check_rules(&self.effective) {
            match violation.options.iter().find(|o| self.rejected.contains(o.as_str())) {
                Some(option) => tracing::debug!(
                    "Skipping rule '{}': '{}' was already rejected",
                    violation.rule.unwrap_or_default(),
                    option
                ),
                None => violations.push(violation),
            }
        }
        violations
    }
}

pub(crate) fn assemble(raw: &RawSelections, catalog: &Catalog) -> Assembly {
    let mut effective = Values::new();
    let mut resolved = Values::new();
    let mut violations = Vec::new();
    let mut rejected = BTreeSet::new();

    for option in catalog.options() {
        let supplied = raw.get(option.id);
        let unsupported = raw.unsupported(option.id);
        let relevant = option.relevant.evaluate(&resolved);
        let problem = match unsupported {
            Some(found) => Some(option.wrong_type(found)),
            None => supplied.and_then(|v| option.check_value(v)),
        };
        let well_typed = match (supplied, &problem) {
            (Some(v), None) => Some(v.clone()),
            _ => None,
        };

        if let Some(violation) = problem {
            if relevant {
                rejected.insert(option.id);
                violations.push(violation);
            } else {
                tracing::debug!(
                    "Ignoring invalid '{}': option is irrelevant ({})",
                    option.id,
                    option.relevant
                );
            }
        }

        let effective_value = match &well_typed {
            Some(v) => v.clone(),
            None => option.default_value(&effective),
        };
        effective.insert(option.id, effective_value);

        let resolved_value = if !relevant {
            if supplied.is_some() || unsupported.is_some() {
                tracing::debug!(
                    "Ignoring supplied '{}': forced to inactive value '{}'",
                    option.id,
                    option.inactive
                );
            }
            option.inactive.clone()
        } else {
            well_typed.unwrap_or_else(|| option.default_value(&resolved))
        };
        resolved.insert(option.id, resolved_value);
    }

    for key in raw.keys().filter(|key| !catalog.contains(key)) {
        tracing::debug!("Ignoring unknown option '{}'", key);
    }

    Assembly {
        effective,
        resolved,
        violations,
        rejected,
    }
}

/// Check `raw` against the catalog and every named rule.
///
/// Returns every violation found; an empty vector means the selections are
/// consistent, even if they leave most options unset.
pub fn validate(raw: &RawSelections, catalog: &Catalog) -> Vec<Violation> {
    let violations = assemble(raw, catalog).all_violations();
    if violations.is_empty() {
        tracing::debug!("Selections valid ({} supplied)", raw.len());
    } else {
        tracing::debug!("Selections have {} violation(s)", violations.len());
    }
    violations
}
