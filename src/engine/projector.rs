//! Context projector
//!
//! Flattens a [`ResolvedConfiguration`] into the [`RenderContext`] the
//! templates read. The projection is a table of rules:
//!
//! - [`Projection::Same`] copies an option or derived flag under its own key
//! - [`Projection::OneHot`] emits `true` when a choice option holds one value,
//!   so template conditionals never compare strings
//! - [`Projection::Constant`] emits generator metadata
//!
//! The table is checked against the catalog and the derivation table once per
//! process. An option nobody projects, a one-hot value its source can never
//! hold, or a key produced twice makes [`Projector::global`] fail with
//! [`EngineError::IncompleteProjection`].

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use super::catalog::{Catalog, OptionKind};
use super::derive::derived_names;
use super::resolver::ResolvedConfiguration;
use crate::error::EngineError;
use crate::value::Value;

static BUILTIN: LazyLock<Result<Projector, EngineError>> = LazyLock::new(|| {
    let catalog = Catalog::global()?;
    Projector::new(BUILTIN_RULES.to_vec(), catalog)
});

/// One row of the projection table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Same(&'static str),
    OneHot {
        key: &'static str,
        source: &'static str,
        value: &'static str,
    },
    Constant {
        key: &'static str,
        value: &'static str,
    },
}

impl Projection {
    /// Output key written by this rule
    pub fn key(&self) -> &'static str {
        match self {
            Self::Same(id) => *id,
            Self::OneHot { key, .. } | Self::Constant { key, .. } => *key,
        }
    }

    /// Option or derived flag read by this rule
    pub fn source(&self) -> Option<&'static str> {
        match self {
            Self::Same(id) => Some(*id),
            Self::OneHot { source, .. } => Some(*source),
            Self::Constant { .. } => None,
        }
    }

    fn apply(&self, config: &ResolvedConfiguration) -> Result<Value, EngineError> {
        match self {
            Self::Same(id) => config.get(id).cloned().ok_or_else(|| {
                EngineError::incomplete_projection(format!(
                    "'{}' is missing from the resolved configuration",
                    id
                ))
            }),
            Self::OneHot { source, value, .. } => Ok(Value::Bool(config.text(source) == *value)),
            Self::Constant { value, .. } => Ok(Value::from(*value)),
        }
    }
}

const fn one_hot(key: &'static str, source: &'static str, value: &'static str) -> Projection {
    Projection::OneHot { key, source, value }
}

use Projection::Same;

/// Name the generated project records as its generator
pub const GENERATOR_NAME: &str = "fastapi-fullstack";

static BUILTIN_RULES: &[Projection] = &[
    // Generator metadata
    Projection::Constant {
        key: "generator_name",
        value: GENERATOR_NAME,
    },
    Projection::Constant {
        key: "generator_version",
        value: env!("CARGO_PKG_VERSION"),
    },
    // Project
    Same("project_name"),
    Same("project_slug"),
    Same("project_description"),
    Same("author_name"),
    Same("author_email"),
    Same("python_version"),
    // Database
    Same("database"),
    one_hot("use_postgresql", "database", "postgresql"),
    one_hot("use_mongodb", "database", "mongodb"),
    one_hot("use_sqlite", "database", "sqlite"),
    Same("use_database"),
    Same("use_sql_database"),
    Same("use_async_driver"),
    Same("db_pool_size"),
    Same("db_max_overflow"),
    Same("db_pool_timeout"),
    // Auth
    Same("auth"),
    Same("use_jwt"),
    Same("use_api_key"),
    Same("use_auth"),
    Same("oauth_provider"),
    Same("enable_oauth"),
    one_hot("enable_oauth_google", "oauth_provider", "google"),
    Same("enable_session_management"),
    // Background tasks
    Same("background_tasks"),
    Same("use_background_tasks"),
    one_hot("use_celery", "background_tasks", "celery"),
    one_hot("use_taskiq", "background_tasks", "taskiq"),
    one_hot("use_arq", "background_tasks", "arq"),
    // Redis, caching, rate limiting
    Same("enable_redis"),
    Same("enable_caching"),
    Same("enable_rate_limiting"),
    Same("rate_limit_requests"),
    Same("rate_limit_period"),
    Same("rate_limit_storage"),
    one_hot("rate_limit_storage_memory", "rate_limit_storage", "memory"),
    one_hot("rate_limit_storage_redis", "rate_limit_storage", "redis"),
    // Observability
    Same("enable_logfire"),
    Same("logfire_fastapi"),
    Same("logfire_database"),
    Same("logfire_redis"),
    Same("logfire_celery"),
    Same("logfire_httpx"),
    Same("enable_sentry"),
    Same("enable_prometheus"),
    // Integrations
    Same("enable_pagination"),
    Same("enable_admin_panel"),
    Same("admin_environments"),
    one_hot("admin_env_all", "admin_environments", "all"),
    one_hot("admin_env_dev_only", "admin_environments", "dev_only"),
    one_hot("admin_env_dev_staging", "admin_environments", "dev_staging"),
    one_hot("admin_env_disabled", "admin_environments", "disabled"),
    Same("admin_require_auth"),
    Same("enable_websockets"),
    Same("enable_file_storage"),
    // AI agent
    Same("enable_ai_agent"),
    Same("ai_framework"),
    one_hot("use_pydantic_ai", "ai_framework", "pydantic_ai"),
    one_hot("use_langchain", "ai_framework", "langchain"),
    Same("llm_provider"),
    one_hot("use_openai", "llm_provider", "openai"),
    one_hot("use_anthropic", "llm_provider", "anthropic"),
    one_hot("use_openrouter", "llm_provider", "openrouter"),
    Same("websocket_auth"),
    one_hot("websocket_auth_jwt", "websocket_auth", "jwt"),
    one_hot("websocket_auth_api_key", "websocket_auth", "api_key"),
    one_hot("websocket_auth_none", "websocket_auth", "none"),
    Same("enable_conversation_persistence"),
    Same("enable_webhooks"),
    Same("enable_cors"),
    Same("enable_orjson"),
    Same("include_example_crud"),
    // Dev tools
    Same("enable_pytest"),
    Same("enable_precommit"),
    Same("enable_makefile"),
    Same("enable_docker"),
    Same("enable_kubernetes"),
    Same("ci_type"),
    one_hot("use_github_actions", "ci_type", "github"),
    one_hot("use_gitlab_ci", "ci_type", "gitlab"),
    Same("generate_env"),
    // Frontend
    Same("frontend"),
    Same("use_frontend"),
    one_hot("use_nextjs", "frontend", "nextjs"),
    Same("enable_i18n"),
    Same("frontend_port"),
    // Backend
    Same("backend_port"),
];

/// Flat scalar mapping handed to the templating engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    entries: BTreeMap<String, Value>,
}

impl RenderContext {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON with keys in sorted order
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Checked projection table
#[derive(Debug)]
pub struct Projector {
    rules: Vec<Projection>,
}

impl Projector {
    /// The process-wide built-in projector
    pub fn global() -> Result<&'static Projector, EngineError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Build a projector, checking `rules` for completeness against `catalog`
    /// and the derived flags
    pub fn new(rules: Vec<Projection>, catalog: &Catalog) -> Result<Self, EngineError> {
        let derived: HashSet<&str> = derived_names().collect();

        let mut keys = HashSet::new();
        for rule in &rules {
            if !keys.insert(rule.key()) {
                return Err(EngineError::incomplete_projection(format!(
                    "key '{}' is produced twice",
                    rule.key()
                )));
            }

            match rule {
                Projection::Same(id) if !catalog.contains(id) && !derived.contains(id) => {
                    return Err(EngineError::incomplete_projection(format!(
                        "'{}' is neither an option nor a derived flag",
                        id
                    )));
                }
                Projection::OneHot { key, source, value } => {
                    Self::check_one_hot(catalog, key, source, value)?;
                }
                _ => {}
            }
        }

        let sources: HashSet<&str> = rules.iter().filter_map(Projection::source).collect();
        if let Some(missing) = catalog
            .ids()
            .chain(derived_names())
            .find(|id| !sources.contains(id))
        {
            return Err(EngineError::incomplete_projection(format!(
                "'{}' has no projection rule",
                missing
            )));
        }

        tracing::debug!("Projector ready with {} rules", rules.len());
        Ok(Self { rules })
    }

    fn check_one_hot(
        catalog: &Catalog,
        key: &str,
        source: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        match catalog.get(source).map(|option| &option.kind) {
            Some(OptionKind::Choice(allowed)) if allowed.contains(&value) => Ok(()),
            Some(OptionKind::Choice(_)) => Err(EngineError::incomplete_projection(format!(
                "'{}' tests '{}' for '{}', which it never holds",
                key, source, value
            ))),
            _ => Err(EngineError::incomplete_projection(format!(
                "'{}' reads '{}', which is not a choice option",
                key, source
            ))),
        }
    }

    /// Output keys in table order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(Projection::key)
    }

    /// Project a resolved configuration; every table key is present in the result
    pub fn project(&self, config: &ResolvedConfiguration) -> Result<RenderContext, EngineError> {
        let mut entries = BTreeMap::new();
        for rule in &self.rules {
            entries.insert(rule.key().to_string(), rule.apply(config)?);
        }
        Ok(RenderContext { entries })
    }
}

/// Project with the built-in table
pub fn project(config: &ResolvedConfiguration) -> Result<RenderContext, EngineError> {
    Projector::global()?.project(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::resolve;
    use crate::selections::RawSelections;

    fn catalog() -> &'static Catalog {
        Catalog::global().unwrap()
    }

    fn context(pairs: &[(&str, Value)]) -> RenderContext {
        let raw: RawSelections = pairs.iter().cloned().collect();
        project(&resolve(&raw, catalog()).unwrap()).unwrap()
    }

    #[test]
    fn test_builtin_table_is_complete() {
        let projector = Projector::global().unwrap();
        assert_eq!(projector.keys().count(), BUILTIN_RULES.len());
    }

    #[test]
    fn test_every_key_is_present() {
        let ctx = context(&[]);
        for key in Projector::global().unwrap().keys() {
            assert!(ctx.contains_key(key), "missing {}", key);
        }
        assert_eq!(ctx.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn test_one_hot_flags() {
        let ctx = context(&[("database", "sqlite".into()), ("frontend", "nextjs".into())]);
        assert_eq!(ctx.get("use_sqlite"), Some(&Value::Bool(true)));
        assert_eq!(ctx.get("use_postgresql"), Some(&Value::Bool(false)));
        assert_eq!(ctx.get("use_mongodb"), Some(&Value::Bool(false)));
        assert_eq!(ctx.get("use_async_driver"), Some(&Value::Bool(false)));
        assert_eq!(ctx.get("use_nextjs"), Some(&Value::Bool(true)));
        assert_eq!(ctx.get("use_frontend"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_auth_projects_to_three_flags() {
        let ctx = context(&[("auth", "api_key".into())]);
        assert_eq!(ctx.get("auth"), Some(&Value::from("api_key")));
        assert_eq!(ctx.get("use_jwt"), Some(&Value::Bool(false)));
        assert_eq!(ctx.get("use_api_key"), Some(&Value::Bool(true)));
        assert_eq!(ctx.get("use_auth"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_generator_constants() {
        let ctx = context(&[]);
        assert_eq!(ctx.get("generator_name"), Some(&Value::from("fastapi-fullstack")));
        assert_eq!(
            ctx.get("generator_version"),
            Some(&Value::from(env!("CARGO_PKG_VERSION")))
        );
    }

    #[test]
    fn test_json_output_is_flat() {
        let json = context(&[]).to_json_pretty().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = parsed.as_object().unwrap();
        assert!(object.values().all(|v| !v.is_object() && !v.is_array()));
        assert_eq!(object["backend_port"], 8000);
    }

    #[test]
    fn test_missing_rule_detected() {
        let rules: Vec<Projection> = BUILTIN_RULES
            .iter()
            .copied()
            .filter(|rule| rule.key() != "enable_webhooks")
            .collect();
        let err = Projector::new(rules, catalog()).unwrap_err();
        assert_eq!(
            err,
            EngineError::incomplete_projection("'enable_webhooks' has no projection rule")
        );
    }

    #[test]
    fn test_duplicate_key_detected() {
        let mut rules = BUILTIN_RULES.to_vec();
        rules.push(one_hot("use_sqlite", "database", "sqlite"));
        let err = Projector::new(rules, catalog()).unwrap_err();
        assert!(err.to_string().contains("produced twice"));
    }

    #[test]
    fn test_impossible_one_hot_detected() {
        let mut rules = BUILTIN_RULES.to_vec();
        rules.push(one_hot("use_oracle", "database", "oracle"));
        let err = Projector::new(rules, catalog()).unwrap_err();
        assert!(err.to_string().contains("never holds"));

        let mut rules = BUILTIN_RULES.to_vec();
        rules.push(one_hot("redis_on", "enable_redis", "true"));
        let err = Projector::new(rules, catalog()).unwrap_err();
        assert!(err.to_string().contains("not a choice option"));
    }

    #[test]
    fn test_unknown_source_detected() {
        let mut rules = BUILTIN_RULES.to_vec();
        rules.push(Same("use_graphql"));
        let err = Projector::new(rules, catalog()).unwrap_err();
        assert!(err.to_string().contains("neither an option nor a derived flag"));
    }
}
