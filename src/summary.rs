//! Human-readable summary of a resolved configuration.

use crate::engine::ResolvedConfiguration;
use crate::types::{
    AdminEnvironment, AiFramework, AuthType, BackgroundTaskType, DatabaseType, FrontendType,
    LlmProvider, OAuthProvider,
};

/// Summary lines, one `Label: value` pair per line, features last
pub fn summarize(config: &ResolvedConfiguration) -> Vec<String> {
    let mut auth = config.choice::<AuthType>("auth").to_string();
    let oauth = config.choice::<OAuthProvider>("oauth_provider");
    if oauth != OAuthProvider::None {
        auth.push_str(&format!(" + {} OAuth", oauth));
    }

    let mut lines = vec![
        format!("Project: {}", config.text("project_name")),
        format!("Database: {}", config.choice::<DatabaseType>("database")),
        format!("Auth: {}", auth),
        format!(
            "Logfire: {}",
            if config.flag("enable_logfire") { "enabled" } else { "disabled" }
        ),
        format!(
            "Background Tasks: {}",
            config.choice::<BackgroundTaskType>("background_tasks")
        ),
        format!("Frontend: {}", config.choice::<FrontendType>("frontend")),
    ];

    let features = enabled_features(config);
    if !features.is_empty() {
        lines.push(format!("Features: {}", features.join(", ")));
    }
    lines
}

fn enabled_features(config: &ResolvedConfiguration) -> Vec<String> {
    let mut features = Vec::new();
    let mut add = |id: &str, name: &str| {
        if config.flag(id) {
            features.push(name.to_string());
        }
    };
    add("enable_redis", "Redis");
    add("enable_caching", "Caching");
    add("enable_rate_limiting", "Rate Limiting");

    if config.flag("enable_admin_panel") {
        let mut admin = "Admin Panel".to_string();
        let environments = config.choice::<AdminEnvironment>("admin_environments");
        if environments != AdminEnvironment::All {
            admin.push_str(&format!(" ({})", environments));
        }
        if config.flag("admin_require_auth") {
            admin.push_str(" [auth]");
        }
        features.push(admin);
    }
    if config.flag("enable_websockets") {
        features.push("WebSockets".to_string());
    }
    if config.flag("enable_ai_agent") {
        features.push(format!(
            "AI Agent ({}, {})",
            config.choice::<AiFramework>("ai_framework"),
            config.choice::<LlmProvider>("llm_provider")
        ));
    }

    for (id, name) in [
        ("enable_webhooks", "Webhooks"),
        ("enable_i18n", "i18n"),
        ("include_example_crud", "Example CRUD"),
        ("enable_docker", "Docker"),
    ] {
        if config.flag(id) {
            features.push(name.to_string());
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{resolve, Catalog};
    use crate::selections::RawSelections;
    use crate::value::Value;

    fn summary(pairs: &[(&str, Value)]) -> Vec<String> {
        let raw: RawSelections = pairs.iter().cloned().collect();
        summarize(&resolve(&raw, Catalog::global().unwrap()).unwrap())
    }

    #[test]
    fn test_default_summary() {
        let lines = summary(&[]);
        assert_eq!(lines[0], "Project: my_project");
        assert_eq!(lines[1], "Database: postgresql");
        assert_eq!(lines[2], "Auth: jwt");
        assert_eq!(lines[3], "Logfire: enabled");
        assert_eq!(lines[4], "Background Tasks: none");
        assert_eq!(lines[5], "Frontend: none");
        assert_eq!(lines[6], "Features: Example CRUD, Docker");
    }

    #[test]
    fn test_oauth_and_admin_details() {
        let lines = summary(&[
            ("oauth_provider", "google".into()),
            ("enable_admin_panel", true.into()),
            ("enable_docker", false.into()),
            ("include_example_crud", false.into()),
        ]);
        assert_eq!(lines[2], "Auth: jwt + google OAuth");
        assert_eq!(lines[6], "Features: Admin Panel (dev_staging) [auth]");
    }

    #[test]
    fn test_ai_agent_feature() {
        let lines = summary(&[
            ("enable_ai_agent", true.into()),
            ("llm_provider", "anthropic".into()),
            ("enable_docker", false.into()),
            ("include_example_crud", false.into()),
        ]);
        assert_eq!(lines[6], "Features: AI Agent (pydantic_ai, anthropic)");
    }

    #[test]
    fn test_no_features_line_when_nothing_enabled() {
        let lines = summary(&[
            ("enable_docker", false.into()),
            ("include_example_crud", false.into()),
        ]);
        assert_eq!(lines.len(), 6);
    }
}
