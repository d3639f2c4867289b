//! Derived flags
//!
//! Derived flags are pure functions of the resolved primary options (and of
//! flags derived before them). They are not catalog options, so user input
//! can never set one directly.
//!
//! | Flag | Value |
//! |------|-------|
//! | `project_slug` | `project_name` with dashes as underscores |
//! | `use_database` | database is not `none` |
//! | `use_sql_database` | PostgreSQL or SQLite |
//! | `use_async_driver` | PostgreSQL or MongoDB |
//! | `use_jwt` | auth is `jwt` or `both` |
//! | `use_api_key` | auth is `api_key` or `both` |
//! | `use_auth` | `use_jwt` or `use_api_key` |
//! | `enable_oauth` | an OAuth provider is selected |
//! | `use_background_tasks` | a task backend is selected |
//! | `use_frontend` | a frontend is selected |

use std::collections::HashSet;

use super::catalog::Catalog;
use super::values::Values;
use crate::error::EngineError;
use crate::types::*;
use crate::value::Value;

/// One derivation rule
#[derive(Debug)]
pub struct Derivation {
    pub name: &'static str,
    /// Catalog options or earlier derived flags the rule reads
    pub reads: &'static [&'static str],
    derive: fn(&Values) -> Value,
}

impl Derivation {
    pub fn evaluate(&self, values: &Values) -> Value {
        (self.derive)(values)
    }
}

pub static DERIVATIONS: &[Derivation] = &[
    Derivation {
        name: "project_slug",
        reads: &["project_name"],
        derive: |v| Value::from(v.text("project_name").replace('-', "_")),
    },
    Derivation {
        name: "use_database",
        reads: &["database"],
        derive: |v| Value::from(!v.is("database", DatabaseType::None)),
    },
    Derivation {
        name: "use_sql_database",
        reads: &["database"],
        derive: |v| Value::from(v.choice::<DatabaseType>("database").is_sql()),
    },
    Derivation {
        name: "use_async_driver",
        reads: &["database"],
        derive: |v| Value::from(v.choice::<DatabaseType>("database").is_async()),
    },
    Derivation {
        name: "use_jwt",
        reads: &["auth"],
        derive: |v| Value::from(v.choice::<AuthType>("auth").uses_jwt()),
    },
    Derivation {
        name: "use_api_key",
        reads: &["auth"],
        derive: |v| Value::from(v.choice::<AuthType>("auth").uses_api_key()),
    },
    Derivation {
        name: "use_auth",
        reads: &["use_jwt", "use_api_key"],
        derive: |v| Value::from(v.flag("use_jwt") || v.flag("use_api_key")),
    },
    Derivation {
        name: "enable_oauth",
        reads: &["oauth_provider"],
        derive: |v| Value::from(!v.is("oauth_provider", OAuthProvider::None)),
    },
    Derivation {
        name: "use_background_tasks",
        reads: &["background_tasks"],
        derive: |v| Value::from(!v.is("background_tasks", BackgroundTaskType::None)),
    },
    Derivation {
        name: "use_frontend",
        reads: &["frontend"],
        derive: |v| Value::from(!v.is("frontend", FrontendType::None)),
    },
];

/// Names of every derived flag, in evaluation order
pub fn derived_names() -> impl Iterator<Item = &'static str> {
    DERIVATIONS.iter().map(|d| d.name)
}

/// Evaluate `rules` over `primary` in one pass, then once more over the
/// completed result. A flag that changes between the passes read something
/// computed after it.
pub(crate) fn derive_with(rules: &[Derivation], primary: &Values) -> Result<Values, EngineError> {
    let first = evaluate_pass(rules, primary, &Values::new());
    let second = evaluate_pass(rules, primary, &first);

    for rule in rules {
        if first.get(rule.name) != second.get(rule.name) {
            return Err(EngineError::UnstableDerivation {
                flag: rule.name.to_string(),
            });
        }
    }
    Ok(first)
}

/// Evaluate every derived flag of the built-in table
pub fn derive(primary: &Values) -> Result<Values, EngineError> {
    derive_with(DERIVATIONS, primary)
}

fn evaluate_pass(rules: &[Derivation], primary: &Values, previous: &Values) -> Values {
    let mut view = primary.clone();
    for (name, value) in previous.iter() {
        view.insert(name, value.clone());
    }

    let mut derived = Values::new();
    for rule in rules {
        let value = rule.evaluate(&view);
        tracing::trace!("Derived {} = {}", rule.name, value);
        view.insert(rule.name, value.clone());
        derived.insert(rule.name, value);
    }
    derived
}

/// Startup check: derived names are unique, never shadow a catalog option,
/// and only read options or flags that exist
pub fn check_derivations(catalog: &Catalog) -> Result<(), EngineError> {
    let mut known = HashSet::new();
    for rule in DERIVATIONS {
        if catalog.contains(rule.name) {
            return Err(EngineError::malformed_catalog(format!(
                "derived flag '{}' shadows a catalog option",
                rule.name
            )));
        }
        if let Some(missing) = rule
            .reads
            .iter()
            .find(|id| !catalog.contains(id) && !known.contains(*id))
        {
            return Err(EngineError::malformed_catalog(format!(
                "derived flag '{}' reads unknown value '{}'",
                rule.name, missing
            )));
        }
        if !known.insert(rule.name) {
            return Err(EngineError::malformed_catalog(format!(
                "derived flag '{}' is declared twice",
                rule.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary(pairs: &[(&'static str, &str)]) -> Values {
        let mut values = Values::new();
        values.insert("project_name", Value::from("my_project"));
        values.insert("database", Value::from("postgresql"));
        values.insert("auth", Value::from("jwt"));
        values.insert("oauth_provider", Value::from("none"));
        values.insert("background_tasks", Value::from("none"));
        values.insert("frontend", Value::from("none"));
        for (id, value) in pairs {
            values.insert(*id, Value::from(*value));
        }
        values
    }

    #[test]
    fn test_builtin_table_is_consistent() {
        assert!(check_derivations(Catalog::global().unwrap()).is_ok());
    }

    #[test]
    fn test_defaults() {
        let derived = derive(&primary(&[])).unwrap();
        assert_eq!(derived.text("project_slug"), "my_project");
        assert!(derived.flag("use_database"));
        assert!(derived.flag("use_sql_database"));
        assert!(derived.flag("use_async_driver"));
        assert!(derived.flag("use_jwt"));
        assert!(!derived.flag("use_api_key"));
        assert!(derived.flag("use_auth"));
        assert!(!derived.flag("enable_oauth"));
        assert!(!derived.flag("use_background_tasks"));
        assert!(!derived.flag("use_frontend"));
        assert_eq!(derived.len(), DERIVATIONS.len());
    }

    #[test]
    fn test_sqlite_has_no_async_driver() {
        let derived = derive(&primary(&[("database", "sqlite")])).unwrap();
        assert!(!derived.flag("use_async_driver"));
        assert!(derived.flag("use_sql_database"));
    }

    #[test]
    fn test_mongodb_is_async_but_not_sql() {
        let derived = derive(&primary(&[("database", "mongodb")])).unwrap();
        assert!(derived.flag("use_async_driver"));
        assert!(!derived.flag("use_sql_database"));
    }

    #[test]
    fn test_auth_flags() {
        let derived = derive(&primary(&[("auth", "none")])).unwrap();
        assert!(!derived.flag("use_auth"));

        let derived = derive(&primary(&[("auth", "both")])).unwrap();
        assert!(derived.flag("use_jwt"));
        assert!(derived.flag("use_api_key"));
        assert!(derived.flag("use_auth"));
    }

    #[test]
    fn test_slug_replaces_dashes() {
        let derived = derive(&primary(&[("project_name", "my-api")])).unwrap();
        assert_eq!(derived.text("project_slug"), "my_api");
    }

    #[test]
    fn test_rule_reading_a_later_flag_is_unstable() {
        let rules = [
            Derivation {
                name: "use_auth",
                reads: &["use_jwt"],
                derive: |v| Value::from(v.flag("use_jwt")),
            },
            Derivation {
                name: "use_jwt",
                reads: &["auth"],
                derive: |v| Value::from(v.is("auth", AuthType::Jwt)),
            },
        ];
        let err = derive_with(&rules, &primary(&[])).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnstableDerivation {
                flag: "use_auth".to_string()
            }
        );
    }
}
