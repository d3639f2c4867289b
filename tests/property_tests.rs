//! Property-Based Tests for stackgen
//!
//! Uses proptest over generated selections. Each generated selection sets a
//! random subset of catalog options, mostly to well-typed values and
//! occasionally to junk, so both valid and invalid inputs are covered.
//!
//! These tests verify:
//! - Resolution is deterministic
//! - Validation-clean selections always resolve and project
//! - Invalid selections are refused, never half-resolved
//! - Enum string round-trips

use proptest::prelude::*;

use stackgen::engine::{OptionKind, Projector};
use stackgen::{project, resolve, validate, Catalog, EngineError, RawSelections, Value};

// =============================================================================
// Selection Strategies
// =============================================================================

fn catalog() -> &'static Catalog {
    Catalog::global().expect("built-in catalog is consistent")
}

/// Well-typed value for an option kind (patterns and ranges may still fail)
fn typed_value(kind: &OptionKind) -> BoxedStrategy<Value> {
    match kind {
        OptionKind::Choice(allowed) => prop::sample::select(allowed.to_vec())
            .prop_map(Value::from)
            .boxed(),
        OptionKind::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        OptionKind::Int { min, max } => {
            let (min, max) = (*min, *max);
            prop_oneof![
                9 => (min..=max).prop_map(Value::Int),
                1 => any::<i64>().prop_map(Value::Int),
            ]
            .boxed()
        }
        OptionKind::Text => "[a-zA-Z ]{0,20}".prop_map(Value::Text).boxed(),
        OptionKind::Identifier => prop_oneof![
            9 => "[a-z][a-z0-9_]{0,12}",
            1 => "[A-Za-z0-9_-]{0,12}",
        ]
        .prop_map(Value::Text)
        .boxed(),
        OptionKind::Email => prop_oneof![
            9 => Just("dev@example.com".to_string()),
            1 => "[a-z@.]{0,12}",
        ]
        .prop_map(Value::Text)
        .boxed(),
    }
}

/// Any scalar, regardless of kind
fn junk_value() -> BoxedStrategy<Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-z]{0,8}".prop_map(Value::Text),
    ]
    .boxed()
}

/// Strategy for generating selections over the whole catalog
fn selections_strategy() -> impl Strategy<Value = RawSelections> {
    let per_option: Vec<BoxedStrategy<Option<(&'static str, Value)>>> = catalog()
        .options()
        .iter()
        .map(|option| {
            let id = option.id;
            let value = prop_oneof![19 => typed_value(&option.kind), 1 => junk_value()];
            proptest::option::weighted(0.15, value)
                .prop_map(move |v| v.map(|v| (id, v)))
                .boxed()
        })
        .collect();

    per_option.prop_map(|entries| entries.into_iter().flatten().collect())
}

// =============================================================================
// Engine Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_global_rejects: 4096,
        ..ProptestConfig::default()
    })]

    /// Resolving the same selections twice gives identical results
    #[test]
    fn resolve_is_deterministic(raw in selections_strategy()) {
        prop_assert_eq!(resolve(&raw, catalog()), resolve(&raw, catalog()));
    }

    /// Selections with no violations always resolve and project
    #[test]
    fn clean_selections_resolve(raw in selections_strategy()) {
        prop_assume!(validate(&raw, catalog()).is_empty());

        let config = resolve(&raw, catalog());
        prop_assert!(config.is_ok(), "resolve failed: {:?}", config);
        let context = project(&config.unwrap());
        prop_assert!(context.is_ok(), "project failed: {:?}", context);
    }

    /// Invalid selections are refused with the violation count
    #[test]
    fn invalid_selections_are_refused(raw in selections_strategy()) {
        let violations = validate(&raw, catalog());
        prop_assume!(!violations.is_empty());

        prop_assert_eq!(
            resolve(&raw, catalog()),
            Err(EngineError::PreconditionViolated { violations: violations.len() })
        );
    }

    /// Every projector key is present in the projected context
    #[test]
    fn projection_is_total(raw in selections_strategy()) {
        prop_assume!(validate(&raw, catalog()).is_empty());

        let context = project(&resolve(&raw, catalog()).unwrap()).unwrap();
        for key in Projector::global().unwrap().keys() {
            prop_assert!(context.contains_key(key), "missing key {}", key);
        }
    }

    /// Irrelevant options always hold their inactive value
    #[test]
    fn irrelevant_options_are_inactive(raw in selections_strategy()) {
        prop_assume!(validate(&raw, catalog()).is_empty());

        let config = resolve(&raw, catalog()).unwrap();
        for option in catalog().options() {
            if !option.relevant.evaluate(config.primary()) {
                prop_assert_eq!(config.get(option.id), Some(&option.inactive));
            }
        }
    }

    /// Validation is deterministic
    #[test]
    fn validate_is_deterministic(raw in selections_strategy()) {
        prop_assert_eq!(validate(&raw, catalog()), validate(&raw, catalog()));
    }
}

// =============================================================================
// Enum Property Tests
// =============================================================================

use stackgen::types::{AuthType, DatabaseType};

/// Strategy for generating valid DatabaseType variants
fn database_strategy() -> impl Strategy<Value = DatabaseType> {
    prop_oneof![
        Just(DatabaseType::Postgresql),
        Just(DatabaseType::Mongodb),
        Just(DatabaseType::Sqlite),
        Just(DatabaseType::None),
    ]
}

/// Strategy for generating valid AuthType variants
fn auth_strategy() -> impl Strategy<Value = AuthType> {
    prop_oneof![
        Just(AuthType::Jwt),
        Just(AuthType::ApiKey),
        Just(AuthType::Both),
        Just(AuthType::None),
    ]
}

proptest! {
    /// DatabaseType: to_string → parse round-trip is identity
    #[test]
    fn database_roundtrip(db in database_strategy()) {
        let parsed: DatabaseType = db.to_string().parse().expect("Should parse");
        prop_assert_eq!(db, parsed);
    }

    /// Async driver flag follows the database choice alone
    #[test]
    fn async_driver_follows_database(db in database_strategy(), claimed in any::<bool>()) {
        let mut raw = RawSelections::new();
        raw.set("database", db.to_string());
        raw.set("use_async_driver", claimed);

        let config = resolve(&raw, catalog()).unwrap();
        prop_assert_eq!(config.flag("use_async_driver"), db.is_async());
    }

    /// Auth flags are consistent with each other
    #[test]
    fn auth_flags_consistent(auth in auth_strategy()) {
        let mut raw = RawSelections::new();
        raw.set("auth", auth.to_string());

        let config = resolve(&raw, catalog()).unwrap();
        prop_assert_eq!(config.flag("use_jwt"), auth.uses_jwt());
        prop_assert_eq!(config.flag("use_api_key"), auth.uses_api_key());
        prop_assert_eq!(config.flag("use_auth"), auth != AuthType::None);
    }
}
