//! Error handling module for stackgen
//!
//! Two taxonomies live here and are never mixed:
//!
//! - [`EngineError`]: defects in the engine's own declarative data (catalog,
//!   derivations, projection table) or misuse of its contract. Always fatal.
//! - [`StackgenError`]: everything around the engine (I/O, JSON, input
//!   parsing) plus a wrapped [`EngineError`].
//!
//! User input mistakes are neither: they are returned as
//! [`Violation`](crate::engine::Violation) data by the validator.

use thiserror::Error;

/// Internal contract failure of the resolution engine.
///
/// Seeing one of these means the generated project would be structurally
/// broken; the input cannot fix it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The option catalog failed its startup self-check
    #[error("Malformed option catalog: {reason}")]
    MalformedCatalog { reason: String },

    /// `resolve` was called with selections that do not validate
    #[error("Resolver precondition violated: selections have {violations} validation violation(s)")]
    PreconditionViolated { violations: usize },

    /// A derivation rule read a flag computed after it
    #[error("Derived flag '{flag}' did not stabilize after one pass")]
    UnstableDerivation { flag: String },

    /// A resolved value breaks the catalog invariant
    #[error("Resolved option '{option}' breaks the catalog invariant: {reason}")]
    InvariantBreached { option: String, reason: String },

    /// The projector table does not cover the configuration
    #[error("Incomplete projection: {reason}")]
    IncompleteProjection { reason: String },
}

impl EngineError {
    /// Create a malformed catalog error
    pub fn malformed_catalog(reason: impl Into<String>) -> Self {
        Self::MalformedCatalog {
            reason: reason.into(),
        }
    }

    /// Create an invariant breach error
    pub fn invariant(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvariantBreached {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create an incomplete projection error
    pub fn incomplete_projection(reason: impl Into<String>) -> Self {
        Self::IncompleteProjection {
            reason: reason.into(),
        }
    }
}

/// Main error type for stackgen
#[derive(Error, Debug)]
pub enum StackgenError {
    /// IO errors (reading selections, writing contexts)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed `key=value` assignment or similar input problems
    #[error("Input error: {0}")]
    Input(String),

    /// Engine contract failure
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type alias for stackgen operations
pub type Result<T> = std::result::Result<T, StackgenError>;

impl StackgenError {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}

/// Exit status for bad input, unreadable files and other user-side failures
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for a defect in the engine rather than in the input
pub const EXIT_ENGINE_DEFECT: i32 = 70;

/// First [`EngineError`] anywhere in the error chain, however deeply wrapped
pub fn engine_defect(err: &anyhow::Error) -> Option<&EngineError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
}

/// Process exit status for a failed run
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match engine_defect(err) {
        Some(_) => EXIT_ENGINE_DEFECT,
        None => EXIT_FAILURE,
    }
}
