//! Type-safe value sets for the generator's choice options
//!
//! Every choice option in the catalog takes its allowed values from one of
//! these enums, so the catalog, the rules, and the projector all agree on the
//! exact spelling of each value.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Database engine for the generated backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// Async via asyncpg
    #[default]
    Postgresql,
    /// Async via motor
    Mongodb,
    /// Sync driver only
    Sqlite,
    None,
}

impl DatabaseType {
    /// Check if this engine is reached through an async driver
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Postgresql | Self::Mongodb)
    }

    /// Check if this engine is a SQL database (SQLAlchemy, SQLAdmin)
    pub fn is_sql(&self) -> bool {
        matches!(self, Self::Postgresql | Self::Sqlite)
    }
}

/// Authentication scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    Jwt,
    ApiKey,
    Both,
    None,
}

impl AuthType {
    /// Check if this scheme issues JWTs
    pub fn uses_jwt(&self) -> bool {
        matches!(self, Self::Jwt | Self::Both)
    }

    /// Check if this scheme accepts API keys
    pub fn uses_api_key(&self) -> bool {
        matches!(self, Self::ApiKey | Self::Both)
    }
}

/// OAuth2 social login provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    #[default]
    None,
    Google,
}

/// Background task system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackgroundTaskType {
    /// FastAPI's built-in BackgroundTasks
    #[default]
    None,
    Celery,
    Taskiq,
    Arq,
}

/// CI/CD system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CiType {
    #[default]
    Github,
    Gitlab,
    None,
}

/// Frontend framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FrontendType {
    #[default]
    None,
    Nextjs,
}

/// WebSocket authentication for the AI agent endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WebSocketAuthType {
    #[default]
    None,
    Jwt,
    ApiKey,
}

/// Environments in which the admin panel is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdminEnvironment {
    All,
    DevOnly,
    #[default]
    DevStaging,
    Disabled,
}

/// AI agent framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AiFramework {
    #[default]
    PydanticAi,
    Langchain,
}

/// LLM provider for the AI agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Openai,
    Anthropic,
    /// Only wired up for PydanticAI
    Openrouter,
}

/// Rate limiter storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RateLimitStorage {
    #[default]
    Memory,
    Redis,
}

/// Python version of the generated backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr, VariantNames)]
pub enum PythonVersion {
    #[strum(serialize = "3.11")]
    #[serde(rename = "3.11")]
    Py311,
    #[default]
    #[strum(serialize = "3.12")]
    #[serde(rename = "3.12")]
    Py312,
    #[strum(serialize = "3.13")]
    #[serde(rename = "3.13")]
    Py313,
}
