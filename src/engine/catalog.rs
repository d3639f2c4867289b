//! Option catalog
//!
//! The catalog declares every option the generator understands: its kind,
//! default, inactive value, and the predicate that makes it relevant. The
//! catalog order is also the resolution order, so a predicate may only read
//! options declared above it.
//!
//! # Lifecycle
//!
//! The built-in catalog is constructed once per process behind a `LazyLock`
//! and self-checked at that moment. A catalog that fails the check is a
//! programming error and every later call to [`Catalog::global`] returns the
//! same [`EngineError::MalformedCatalog`].

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::VariantNames;

use super::predicate::Predicate;
use super::values::Values;
use super::violation::{Violation, ViolationKind};
use crate::error::EngineError;
use crate::types::*;
use crate::value::Value;

/// Lowercase start, then lowercase alphanumerics and underscores
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("identifier pattern compiles"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

static BUILTIN: LazyLock<Result<Catalog, EngineError>> =
    LazyLock::new(|| Catalog::new(builtin_options()));

/// Rule name reported when `project_name` fails its pattern
pub const IDENTIFIER_RULE: &str = "identifier_pattern";
/// Rule name reported when `author_email` is not an email address
pub const EMAIL_RULE: &str = "email_format";

/// Declared type of an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
    Bool,
    /// Free-form string
    Text,
    /// Python package identifier
    Identifier,
    Email,
    /// Integer within inclusive bounds
    Int { min: i64, max: i64 },
}

impl OptionKind {
    /// Short label for listings and diagnostics
    pub fn label(&self) -> String {
        match self {
            Self::Choice(values) => format!("one of [{}]", values.join(", ")),
            Self::Bool => "boolean".to_string(),
            Self::Text => "string".to_string(),
            Self::Identifier => "identifier".to_string(),
            Self::Email => "email".to_string(),
            Self::Int { min, max } => format!("integer {}..={}", min, max),
        }
    }

    /// JSON type a supplied value must have
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Int { .. } => "an integer",
            Self::Choice(_) | Self::Text | Self::Identifier | Self::Email => "a string",
        }
    }
}

/// How an option's default is chosen when the user leaves it unset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultRule {
    Fixed(Value),
    /// Default depends on options declared earlier in the catalog
    When {
        condition: Predicate,
        then: Value,
        otherwise: Value,
    },
}

/// One configurable axis of the generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub id: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub default: DefaultRule,
    /// Value forced when `relevant` evaluates false
    pub inactive: Value,
    pub relevant: Predicate,
}

/// Text value of a choice enum variant
pub fn label(variant: impl Into<&'static str>) -> Value {
    Value::Text(variant.into().to_string())
}

impl OptionSpec {
    fn new(id: &'static str, kind: OptionKind, default: Value, description: &'static str) -> Self {
        Self {
            id,
            description,
            kind,
            inactive: default.clone(),
            default: DefaultRule::Fixed(default),
            relevant: Predicate::Always,
        }
    }

    pub fn flag(id: &'static str, default: bool, description: &'static str) -> Self {
        Self::new(id, OptionKind::Bool, Value::Bool(default), description)
    }

    pub fn choice<T>(id: &'static str, default: T, description: &'static str) -> Self
    where
        T: VariantNames + Into<&'static str>,
    {
        Self::new(id, OptionKind::Choice(T::VARIANTS), label(default), description)
    }

    pub fn int(
        id: &'static str,
        (min, max): (i64, i64),
        default: i64,
        description: &'static str,
    ) -> Self {
        Self::new(id, OptionKind::Int { min, max }, Value::Int(default), description)
    }

    pub fn text(id: &'static str, default: &str, description: &'static str) -> Self {
        Self::new(id, OptionKind::Text, Value::from(default), description)
    }

    pub fn identifier(id: &'static str, default: &str, description: &'static str) -> Self {
        Self::new(id, OptionKind::Identifier, Value::from(default), description)
    }

    pub fn email(id: &'static str, default: &str, description: &'static str) -> Self {
        Self::new(id, OptionKind::Email, Value::from(default), description)
    }

    /// Make the option relevant only when `relevant` holds, forcing `inactive` otherwise
    pub fn only_when(mut self, relevant: Predicate, inactive: impl Into<Value>) -> Self {
        self.relevant = relevant;
        self.inactive = inactive.into();
        self
    }

    /// Pick the default from earlier options instead of a fixed value
    pub fn default_when(
        mut self,
        condition: Predicate,
        then: impl Into<Value>,
        otherwise: impl Into<Value>,
    ) -> Self {
        self.default = DefaultRule::When {
            condition,
            then: then.into(),
            otherwise: otherwise.into(),
        };
        self
    }

    /// Default for this option given the values assembled so far
    pub fn default_value(&self, assembled: &Values) -> Value {
        match &self.default {
            DefaultRule::Fixed(v) => v.clone(),
            DefaultRule::When {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate(assembled) {
                    then.clone()
                } else {
                    otherwise.clone()
                }
            }
        }
    }

    /// Type violation for a supplied value described by `found`
    pub fn wrong_type(&self, found: &str) -> Violation {
        Violation::new(
            self.id,
            ViolationKind::InvalidType,
            format!("expected {}, got {}", self.kind.expected(), found),
        )
    }

    /// Check a value against this option's kind.
    ///
    /// Returns the violation a user would see for `value`, if any.
    pub fn check_value(&self, value: &Value) -> Option<Violation> {
        let id = self.id;
        let wrong_type = || Some(self.wrong_type(&format!("{} '{}'", value.type_name(), value)));

        match (&self.kind, value) {
            (OptionKind::Bool, Value::Bool(_)) => None,
            (OptionKind::Bool, _) => wrong_type(),

            (OptionKind::Int { min, max }, Value::Int(i)) => {
                if (*min..=*max).contains(i) {
                    None
                } else {
                    Some(Violation::new(
                        id,
                        ViolationKind::OutOfRange,
                        format!("{} is outside the allowed range {}..={}", i, min, max),
                    ))
                }
            }
            (OptionKind::Int { .. }, _) => wrong_type(),

            (OptionKind::Choice(allowed), Value::Text(s)) => {
                if allowed.contains(&s.as_str()) {
                    None
                } else {
                    Some(Violation::new(
                        id,
                        ViolationKind::NotAllowed,
                        format!("'{}' is not one of: {}", s, allowed.join(", ")),
                    ))
                }
            }
            (OptionKind::Choice(_), _) => wrong_type(),

            (OptionKind::Text, Value::Text(_)) => None,
            (OptionKind::Text, _) => wrong_type(),

            (OptionKind::Identifier, Value::Text(s)) => {
                if IDENTIFIER_RE.is_match(s) {
                    None
                } else {
                    Some(
                        Violation::new(
                            id,
                            ViolationKind::PatternMismatch,
                            format!(
                                "'{}' must start with a lowercase letter and contain only \
                                 lowercase letters, digits and underscores",
                                s
                            ),
                        )
                        .with_rule(IDENTIFIER_RULE),
                    )
                }
            }
            (OptionKind::Identifier, _) => wrong_type(),

            (OptionKind::Email, Value::Text(s)) => {
                if EMAIL_RE.is_match(s) {
                    None
                } else {
                    Some(
                        Violation::new(
                            id,
                            ViolationKind::PatternMismatch,
                            format!("'{}' is not a valid email address", s),
                        )
                        .with_rule(EMAIL_RULE),
                    )
                }
            }
            (OptionKind::Email, _) => wrong_type(),
        }
    }

    /// Every value this option may legitimately end up holding by default
    fn declared_values(&self) -> Vec<&Value> {
        let mut values = vec![&self.inactive];
        match &self.default {
            DefaultRule::Fixed(v) => values.push(v),
            DefaultRule::When { then, otherwise, .. } => {
                values.push(then);
                values.push(otherwise);
            }
        }
        values
    }

    fn predicates(&self) -> Vec<&Predicate> {
        let mut predicates = vec![&self.relevant];
        if let DefaultRule::When { condition, .. } = &self.default {
            predicates.push(condition);
        }
        predicates
    }
}

/// Ordered, self-checked set of options
#[derive(Debug)]
pub struct Catalog {
    options: Vec<OptionSpec>,
    index: HashMap<&'static str, usize>,
}

impl Catalog {
    /// The process-wide built-in catalog
    pub fn global() -> Result<&'static Catalog, EngineError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Build a catalog from `options`, running the consistency check
    pub fn new(options: Vec<OptionSpec>) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(options.len());
        for (position, option) in options.iter().enumerate() {
            if index.insert(option.id, position).is_some() {
                return Err(EngineError::malformed_catalog(format!(
                    "option '{}' is declared twice",
                    option.id
                )));
            }
        }

        let catalog = Self { options, index };
        catalog.check_consistency()?;
        tracing::debug!("Option catalog ready with {} options", catalog.len());
        Ok(catalog)
    }

    fn check_consistency(&self) -> Result<(), EngineError> {
        for (position, option) in self.options.iter().enumerate() {
            if let OptionKind::Choice(allowed) = &option.kind {
                if allowed.is_empty() {
                    return Err(EngineError::malformed_catalog(format!(
                        "choice option '{}' has no allowed values",
                        option.id
                    )));
                }
            }

            for predicate in option.predicates() {
                for (referenced, compared) in predicate.references() {
                    self.check_reference(option.id, position, referenced, compared)?;
                }
            }

            for value in option.declared_values() {
                if let Some(violation) = option.check_value(value) {
                    return Err(EngineError::malformed_catalog(format!(
                        "declared value of '{}' fails its own kind: {}",
                        option.id, violation.message
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_reference(
        &self,
        owner: &str,
        owner_position: usize,
        referenced: &str,
        compared: Option<&str>,
    ) -> Result<(), EngineError> {
        let Some(&position) = self.index.get(referenced) else {
            return Err(EngineError::malformed_catalog(format!(
                "predicate of '{}' references unknown option '{}'",
                owner, referenced
            )));
        };
        if position >= owner_position {
            return Err(EngineError::malformed_catalog(format!(
                "predicate of '{}' references '{}', which is not declared before it",
                owner, referenced
            )));
        }

        let target = &self.options[position];
        match (compared, &target.kind) {
            (None, OptionKind::Bool) => Ok(()),
            (None, kind) => Err(EngineError::malformed_catalog(format!(
                "predicate of '{}' tests '{}' as a boolean but it is {}",
                owner,
                referenced,
                kind.label()
            ))),
            (Some(value), OptionKind::Choice(allowed)) if allowed.contains(&value) => Ok(()),
            (Some(value), kind) => Err(EngineError::malformed_catalog(format!(
                "predicate of '{}' compares '{}' with '{}', which {} never holds",
                owner,
                referenced,
                value,
                kind.label()
            ))),
        }
    }

    pub fn get(&self, id: &str) -> Option<&OptionSpec> {
        self.index.get(id).map(|&i| &self.options[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Options in resolution order
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.options.iter().map(|o| o.id)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Lowercase a free-form project name and turn spaces and dashes into underscores
pub fn normalize_project_name(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// The generator's full option set, in resolution order
fn builtin_options() -> Vec<OptionSpec> {
    use Predicate as P;

    let has_database = || P::is_not("database", DatabaseType::None);
    let uses_jwt = || P::one_of("auth", [AuthType::Jwt, AuthType::Both]);
    let admin_supported = || {
        P::all([
            P::enabled("enable_admin_panel"),
            P::one_of("database", [DatabaseType::Postgresql, DatabaseType::Sqlite]),
        ])
    };

    vec![
        // Project
        OptionSpec::identifier("project_name", "my_project", "Python package name of the project"),
        OptionSpec::text("project_description", "A FastAPI project", "One-line project description"),
        OptionSpec::text("author_name", "Your Name", "Author shown in pyproject.toml"),
        OptionSpec::email("author_email", "your@email.com", "Author contact address"),
        OptionSpec::choice("python_version", PythonVersion::Py312, "Python version of the backend"),
        // Database
        OptionSpec::choice("database", DatabaseType::Postgresql, "Database engine"),
        OptionSpec::int("db_pool_size", (1, 100), 5, "Connection pool size")
            .only_when(P::is("database", DatabaseType::Postgresql), 5),
        OptionSpec::int("db_max_overflow", (0, 100), 10, "Connections allowed above the pool size")
            .only_when(P::is("database", DatabaseType::Postgresql), 10),
        OptionSpec::int("db_pool_timeout", (1, 3600), 30, "Seconds to wait for a pooled connection")
            .only_when(P::is("database", DatabaseType::Postgresql), 30),
        // Authentication
        OptionSpec::choice("auth", AuthType::Jwt, "Authentication scheme"),
        OptionSpec::choice("oauth_provider", OAuthProvider::None, "OAuth2 social login provider")
            .only_when(uses_jwt(), label(OAuthProvider::None)),
        OptionSpec::flag(
            "enable_session_management",
            false,
            "Track active sessions and allow logout from other devices",
        )
        .only_when(P::all([uses_jwt(), has_database()]), false),
        // Background tasks and brokers
        OptionSpec::choice("background_tasks", BackgroundTaskType::None, "Background task system"),
        OptionSpec::flag("enable_redis", false, "Redis for caching, sessions and task brokering")
            .default_when(
                P::is_not("background_tasks", BackgroundTaskType::None),
                true,
                false,
            ),
        OptionSpec::flag("enable_caching", false, "Response caching (fastapi-cache2)"),
        OptionSpec::flag("enable_rate_limiting", false, "Rate limiting (slowapi)"),
        OptionSpec::int("rate_limit_requests", (1, 1_000_000), 100, "Requests allowed per period")
            .only_when(P::enabled("enable_rate_limiting"), 100),
        OptionSpec::int("rate_limit_period", (1, 86_400), 60, "Rate limit period in seconds")
            .only_when(P::enabled("enable_rate_limiting"), 60),
        OptionSpec::choice("rate_limit_storage", RateLimitStorage::Memory, "Rate limiter storage")
            .only_when(P::enabled("enable_rate_limiting"), label(RateLimitStorage::Memory)),
        // Observability
        OptionSpec::flag("enable_logfire", true, "Logfire observability"),
        OptionSpec::flag("logfire_fastapi", true, "Logfire FastAPI instrumentation")
            .only_when(P::enabled("enable_logfire"), false),
        OptionSpec::flag("logfire_database", true, "Logfire database instrumentation")
            .only_when(P::all([P::enabled("enable_logfire"), has_database()]), false),
        OptionSpec::flag("logfire_redis", false, "Logfire Redis instrumentation")
            .only_when(P::all([P::enabled("enable_logfire"), P::enabled("enable_redis")]), false),
        OptionSpec::flag("logfire_celery", false, "Logfire task queue instrumentation").only_when(
            P::all([
                P::enabled("enable_logfire"),
                P::is_not("background_tasks", BackgroundTaskType::None),
            ]),
            false,
        ),
        OptionSpec::flag("logfire_httpx", false, "Logfire HTTPX instrumentation")
            .only_when(P::enabled("enable_logfire"), false),
        OptionSpec::flag("enable_sentry", false, "Sentry error tracking"),
        OptionSpec::flag("enable_prometheus", false, "Prometheus metrics endpoint"),
        // Integrations
        OptionSpec::flag("enable_pagination", true, "Pagination (fastapi-pagination)"),
        OptionSpec::flag("enable_admin_panel", false, "SQLAdmin admin panel"),
        OptionSpec::choice(
            "admin_environments",
            AdminEnvironment::DevStaging,
            "Environments in which the admin panel is mounted",
        )
        .only_when(admin_supported(), label(AdminEnvironment::DevStaging)),
        OptionSpec::flag("admin_require_auth", true, "Require superuser login for the admin panel")
            .only_when(
                P::all([
                    admin_supported(),
                    P::is_not("admin_environments", AdminEnvironment::Disabled),
                ]),
                false,
            ),
        OptionSpec::flag("enable_websockets", false, "WebSocket endpoints"),
        OptionSpec::flag("enable_file_storage", false, "File storage (S3/MinIO)"),
        // AI agent
        OptionSpec::flag("enable_ai_agent", false, "AI agent with streaming WebSocket endpoint"),
        OptionSpec::choice("ai_framework", AiFramework::PydanticAi, "AI agent framework")
            .only_when(P::enabled("enable_ai_agent"), label(AiFramework::PydanticAi)),
        OptionSpec::choice("llm_provider", LlmProvider::Openai, "LLM provider")
            .only_when(P::enabled("enable_ai_agent"), label(LlmProvider::Openai)),
        OptionSpec::choice("websocket_auth", WebSocketAuthType::None, "AI agent WebSocket auth")
            .only_when(P::enabled("enable_ai_agent"), label(WebSocketAuthType::None)),
        OptionSpec::flag(
            "enable_conversation_persistence",
            false,
            "Save AI agent chat history to the database",
        )
        .only_when(P::all([P::enabled("enable_ai_agent"), has_database()]), false),
        OptionSpec::flag("enable_webhooks", false, "Outbound webhooks"),
        OptionSpec::flag("enable_cors", true, "CORS middleware"),
        OptionSpec::flag("enable_orjson", true, "orjson response serialization"),
        OptionSpec::flag("include_example_crud", true, "Example Item CRUD module"),
        // Dev tools
        OptionSpec::flag("enable_pytest", true, "pytest setup with fixtures"),
        OptionSpec::flag("enable_precommit", true, "pre-commit hooks"),
        OptionSpec::flag("enable_makefile", true, "Makefile with common tasks"),
        OptionSpec::flag("enable_docker", true, "Dockerfile and docker-compose"),
        OptionSpec::flag("enable_kubernetes", false, "Kubernetes manifests"),
        OptionSpec::choice("ci_type", CiType::Github, "CI/CD system"),
        OptionSpec::flag("generate_env", true, "Generate a .env file"),
        // Frontend
        OptionSpec::choice("frontend", FrontendType::None, "Frontend framework"),
        OptionSpec::flag("enable_i18n", false, "Frontend internationalization (next-intl)")
            .only_when(P::is_not("frontend", FrontendType::None), false),
        OptionSpec::int("frontend_port", (1024, 65_535), 3000, "Frontend dev server port")
            .only_when(P::is_not("frontend", FrontendType::None), 3000),
        OptionSpec::int("backend_port", (1024, 65_535), 8000, "Backend server port"),
    ]
}
