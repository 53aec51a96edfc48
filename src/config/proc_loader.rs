use std::path::Path;
use crate::config::page::ServiceConfig;
use crate::config::proc_validator;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::observability::metrics::get_metrics;
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .await
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replaces `${VAR}` and `${VAR:default}` with the environment value
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn expands_env_vars_with_defaults() {
        std::env::set_var("CSRF_TEST_ORIGIN", "http://admin.local:5000");
        std::env::remove_var("CSRF_TEST_MISSING");
        let out = expand_env_vars("a: ${CSRF_TEST_ORIGIN}\nb: ${CSRF_TEST_MISSING:fallback}\nc: ${CSRF_TEST_MISSING}").unwrap();
        assert_eq!(out, "a: http://admin.local:5000\nb: fallback\nc: ");
        std::env::remove_var("CSRF_TEST_ORIGIN");
    }

    #[tokio::test]
    async fn applies_page_defaults() {
        let cfg = parse_config("page:\n  origin: http://127.0.0.1:5000\n".to_owned()).await.unwrap();
        assert_eq!(cfg.page.endpoint_path, "/api/csrf-token");
        assert_eq!(cfg.page.token_field, "csrf_token");
        assert!(!cfg.page.require_success_status);
        assert!(cfg.page.session_cookie.is_none());
        assert_eq!(cfg.settings.logging.unwrap().level, "info");
        assert!(!cfg.settings.metrics.is_enabled);
        assert_eq!(cfg.settings.metrics.path, "/metrics");
    }
}
