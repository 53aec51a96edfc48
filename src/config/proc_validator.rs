//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates:
//!   * page origin is a bare http(s) origin
//!   * token endpoint stays on that origin (path only)
//!   * logging level / metrics path / server port

use reqwest::Url;
use tracing::{error, info};

use crate::config::page::{CredentialValue, PageConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::LOG_LEVELS;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_page(&cfg.page, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled {
        if !settings.metrics.path.starts_with('/') {
            errors.push(format!(
                "settings.metrics.path '{}' must start with '/'",
                settings.metrics.path
            ));
        }
        if settings.server.port.parse::<u16>().is_err() {
            errors.push(format!(
                "settings.server.port '{}' is not a valid port",
                settings.server.port
            ));
        }
        if settings.server.host.trim().is_empty() {
            errors.push("settings.server.host must not be empty".to_string());
        }
    }
}

fn validate_page(page: &PageConfig, errors: &mut Vec<String>) {
    match Url::parse(&page.origin) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(format!(
                    "page.origin '{}' must use http or https",
                    page.origin
                ));
            }
            if url.host_str().is_none() {
                errors.push(format!("page.origin '{}' has no host", page.origin));
            }
            if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
                errors.push(format!(
                    "page.origin '{}' must not carry a path, query or fragment",
                    page.origin
                ));
            }
        }
        Err(e) => errors.push(format!("page.origin '{}' is not a valid url: {}", page.origin, e)),
    }

    let path = page.endpoint_path.as_str();
    if !path.starts_with('/') || path.starts_with("//") {
        errors.push(format!(
            "page.endpoint_path '{}' must be a same-origin path starting with a single '/'",
            path
        ));
    }

    if page.token_field.trim().is_empty() {
        errors.push("page.token_field must not be empty".to_string());
    }

    if let Some(cookie) = &page.session_cookie {
        let empty = match cookie {
            CredentialValue::Literal { value } => value.trim().is_empty(),
            CredentialValue::FromEnv { from_env } => from_env.trim().is_empty(),
            CredentialValue::FromFile { path } => path.trim().is_empty(),
        };
        if empty {
            errors.push("page.session_cookie must not be empty".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{LogFormat, LoggingConfig};

    fn config(page: PageConfig) -> ServiceConfig {
        ServiceConfig { settings: SettingsConfig::default(), page }
    }

    #[tokio::test]
    async fn accepts_plain_origin() {
        let cfg = config(PageConfig::new("https://admin.example.com:8443"));
        assert!(validate_service_config(&cfg).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_cross_origin_endpoint() {
        for endpoint in ["https://evil.example.com/api/csrf-token", "//evil.example.com/api/csrf-token", "api/csrf-token"] {
            let mut page = PageConfig::new("http://127.0.0.1:5000");
            page.endpoint_path = endpoint.to_string();
            let errors = validate_service_config(&config(page)).await.unwrap_err();
            assert_eq!(errors.len(), 1, "{endpoint}: {errors:?}");
            assert!(errors[0].contains("page.endpoint_path"));
        }
    }

    #[tokio::test]
    async fn accepts_url_in_endpoint_query() {
        let mut page = PageConfig::new("http://127.0.0.1:5000");
        page.endpoint_path = "/api/csrf-token?next=http://127.0.0.1:5000/admin".to_string();
        assert!(validate_service_config(&config(page)).await.is_ok());
    }

    #[tokio::test]
    async fn aggregates_all_issues() {
        let mut page = PageConfig::new("ftp://127.0.0.1/admin");
        page.token_field = " ".to_string();
        page.session_cookie = Some(CredentialValue::FromEnv { from_env: String::new() });
        let mut cfg = config(page);
        cfg.settings.logging = Some(LoggingConfig::new("loud".into(), LogFormat::Json));
        cfg.settings.metrics.is_enabled = true;
        cfg.settings.metrics.path = "metrics".into();
        cfg.settings.server.port = "99999".into();

        let errors = validate_service_config(&cfg).await.unwrap_err();
        // scheme, path, token field, cookie, level, metrics path, port
        assert_eq!(errors.len(), 7, "{errors:?}");
    }
}
