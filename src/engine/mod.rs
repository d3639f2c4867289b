//! Engine modules: the pipeline that turns raw selections into a render context.
//!
//! ```text
//! RawSelections ──validate──▶ Vec<Violation>          (user errors, as data)
//!        │
//!        └──resolve──▶ ResolvedConfiguration ──project──▶ RenderContext
//! ```
//!
//! Each stage reads only the previous stage's output. Everything here is pure;
//! file I/O lives in [`crate::selections`] and the binary.

pub mod catalog;
pub mod derive;
pub mod predicate;
pub mod projector;
pub mod resolver;
pub mod rules;
pub mod validator;
pub mod values;
pub mod violation;

pub use catalog::{normalize_project_name, Catalog, DefaultRule, OptionKind, OptionSpec};
pub use predicate::Predicate;
pub use projector::{project, Projection, Projector, RenderContext};
pub use resolver::{resolve, ResolvedConfiguration};
pub use validator::validate;
pub use values::Values;
pub use violation::{Violation, ViolationKind};

use crate::error::EngineError;
use crate::selections::RawSelections;

/// Force and self-check every built-in table: catalog, rules, derivations
/// and projector. Binaries call this before touching user input so a broken
/// table fails the same way on every invocation.
pub fn startup_check() -> Result<&'static Catalog, EngineError> {
    let catalog = Catalog::global()?;
    rules::check_rule_table(catalog)?;
    derive::check_derivations(catalog)?;
    Projector::global()?;
    tracing::debug!("Engine tables passed startup check");
    Ok(catalog)
}

/// Resolve and project in one call.
///
/// Selections that do not validate are an [`EngineError::PreconditionViolated`];
/// call [`validate`] first to get the violations themselves.
pub fn render_context(raw: &RawSelections, catalog: &Catalog) -> Result<RenderContext, EngineError> {
    let config = resolve(raw, catalog)?;
    let context = project(&config)?;
    tracing::info!("Render context ready with {} keys", context.len());
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_startup_check_passes() {
        let catalog = startup_check().unwrap();
        assert!(std::ptr::eq(catalog, Catalog::global().unwrap()));
    }

    #[test]
    fn test_render_context_pipeline() {
        let catalog = startup_check().unwrap();
        let mut raw = RawSelections::new();
        raw.set("project_name", "shop_api");
        raw.set("database", "mongodb");

        let context = render_context(&raw, catalog).unwrap();
        assert_eq!(context.get("project_slug"), Some(&Value::from("shop_api")));
        assert_eq!(context.get("use_mongodb"), Some(&Value::Bool(true)));
        assert_eq!(context.get("use_sql_database"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_render_context_refuses_invalid_input() {
        let catalog = startup_check().unwrap();
        let mut raw = RawSelections::new();
        raw.set("enable_admin_panel", true);
        raw.set("database", "none");
        assert!(matches!(
            render_context(&raw, catalog),
            Err(EngineError::PreconditionViolated { .. })
        ));
    }
}
