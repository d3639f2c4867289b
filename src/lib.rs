//! stackgen Library
//!
//! Configuration resolution engine for a full-stack FastAPI project generator:
//! the option catalog, the constraint validator, the resolver and the context
//! projector that feeds the templates.

pub mod cli;
pub mod engine;
pub mod error;
pub mod selections;
pub mod summary;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use engine::{
    normalize_project_name, project, render_context, resolve, startup_check, validate, Catalog,
    Projector, RenderContext, ResolvedConfiguration, Violation, ViolationKind,
};
pub use error::{EngineError, StackgenError};
pub use selections::RawSelections;
pub use summary::summarize;
pub use types::{
    AdminEnvironment, AiFramework, AuthType, BackgroundTaskType, CiType, DatabaseType,
    FrontendType, LlmProvider, OAuthProvider, PythonVersion, RateLimitStorage, WebSocketAuthType,
};
pub use value::Value;
