//! Named cross-option rules
//!
//! Each rule names the identifiers it reports and a pure test over the
//! effective values (supplied value when well-typed, default otherwise).
//! The validator runs every rule; none of them short-circuits another.
//!
//! | Rule | Fires when |
//! |------|------------|
//! | `oauth_requires_jwt` | OAuth provider chosen without JWT auth |
//! | `background_tasks_require_broker` | task backend chosen with Redis off |
//! | `sqlite_async_auth` | OAuth login (async-only) on SQLite |
//! | `caching_requires_redis` | caching on, Redis off |
//! | `rate_limit_redis_requires_redis` | Redis-backed rate limiter, Redis off |
//! | `admin_panel_requires_database` | admin panel with no database |
//! | `admin_panel_requires_sql` | admin panel on MongoDB |
//! | `session_management_requires_database` | session tracking with no database |
//! | `conversation_persistence_requires_database` | chat history with no database |
//! | `openrouter_requires_pydantic_ai` | OpenRouter with LangChain |

use super::catalog::Catalog;
use super::values::Values;
use super::violation::Violation;
use crate::error::EngineError;
use crate::types::*;

/// A named cross-option constraint
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    /// Identifiers reported when the rule fires
    pub options: &'static [&'static str],
    /// Plain-language statement of the rule
    pub message: &'static str,
    violated: fn(&Values) -> bool,
}

impl Rule {
    pub fn is_violated(&self, values: &Values) -> bool {
        (self.violated)(values)
    }

    fn violation(&self) -> Violation {
        Violation::rule(self.name, self.options, self.message)
    }
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "oauth_requires_jwt",
        options: &["oauth_provider", "auth"],
        message: "OAuth social login requires JWT authentication (auth must be 'jwt' or 'both')",
        violated: |v| {
            !v.is("oauth_provider", OAuthProvider::None)
                && !(v.is("auth", AuthType::Jwt) || v.is("auth", AuthType::Both))
        },
    },
    Rule {
        name: "background_tasks_require_broker",
        options: &["background_tasks", "enable_redis"],
        message: "Celery, Taskiq and ARQ use Redis as their broker; enable Redis or choose 'none'",
        violated: |v| {
            !v.is("background_tasks", BackgroundTaskType::None) && !v.flag("enable_redis")
        },
    },
    Rule {
        name: "sqlite_async_auth",
        options: &["database", "oauth_provider"],
        message: "OAuth login needs an async database driver; SQLite is only available as a sync driver",
        violated: |v| {
            v.is("database", DatabaseType::Sqlite) && !v.is("oauth_provider", OAuthProvider::None)
        },
    },
    Rule {
        name: "caching_requires_redis",
        options: &["enable_caching", "enable_redis"],
        message: "Caching requires Redis to be enabled",
        violated: |v| v.flag("enable_caching") && !v.flag("enable_redis"),
    },
    Rule {
        name: "rate_limit_redis_requires_redis",
        options: &["rate_limit_storage", "enable_redis"],
        message: "Rate limiting with Redis storage requires Redis to be enabled",
        violated: |v| {
            v.flag("enable_rate_limiting")
                && v.is("rate_limit_storage", RateLimitStorage::Redis)
                && !v.flag("enable_redis")
        },
    },
    Rule {
        name: "admin_panel_requires_database",
        options: &["enable_admin_panel", "database"],
        message: "The admin panel requires a database",
        violated: |v| v.flag("enable_admin_panel") && v.is("database", DatabaseType::None),
    },
    Rule {
        name: "admin_panel_requires_sql",
        options: &["enable_admin_panel", "database"],
        message: "The admin panel (SQLAdmin) requires PostgreSQL or SQLite",
        violated: |v| v.flag("enable_admin_panel") && v.is("database", DatabaseType::Mongodb),
    },
    Rule {
        name: "session_management_requires_database",
        options: &["enable_session_management", "database"],
        message: "Session management requires a database",
        violated: |v| v.flag("enable_session_management") && v.is("database", DatabaseType::None),
    },
    Rule {
        name: "conversation_persistence_requires_database",
        options: &["enable_conversation_persistence", "database"],
        message: "Conversation persistence requires a database",
        violated: |v| {
            v.flag("enable_conversation_persistence") && v.is("database", DatabaseType::None)
        },
    },
    Rule {
        name: "openrouter_requires_pydantic_ai",
        options: &["ai_framework", "llm_provider"],
        message: "OpenRouter is not supported with LangChain; use PydanticAI or another provider",
        violated: |v| {
            v.flag("enable_ai_agent")
                && v.is("ai_framework", AiFramework::Langchain)
                && v.is("llm_provider", LlmProvider::Openrouter)
        },
    },
];

/// Run every rule against `values`, collecting one violation per broken rule
pub fn check_rules(values: &Values) -> Vec<Violation> {
    RULES
        .iter()
        .filter(|rule| rule.is_violated(values))
        .map(Rule::violation)
        .collect()
}

/// Startup check: rule names are unique and every reported identifier exists
pub fn check_rule_table(catalog: &Catalog) -> Result<(), EngineError> {
    let mut seen = std::collections::HashSet::new();
    for rule in RULES {
        if !seen.insert(rule.name) {
            return Err(EngineError::malformed_catalog(format!(
                "rule '{}' is declared twice",
                rule.name
            )));
        }
        if let Some(missing) = rule.options.iter().find(|id| !catalog.contains(id)) {
            return Err(EngineError::malformed_catalog(format!(
                "rule '{}' reports unknown option '{}'",
                rule.name, missing
            )));
        }
    }
    Ok(())
}
