use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{CSRF_TOKEN_FIELD, CSRF_TOKEN_PATH};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub page: PageConfig,
}

/// ================================
/// Page - the origin the admin panel is served from
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    /// scheme://host[:port], no path
    pub origin: String,
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    #[serde(default = "default_token_field")]
    pub token_field: String,
    /// non-2xx responses are parsed like any other unless this is set
    #[serde(default)]
    pub require_success_status: bool,
    /// session credential sent to the page origin only
    pub session_cookie: Option<CredentialValue>,
}

impl PageConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            endpoint_path: default_endpoint_path(),
            token_field: default_token_field(),
            require_success_status: false,
            session_cookie: None,
        }
    }
}

/// Credential value sources
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CredentialValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

fn default_endpoint_path() -> String {
    CSRF_TOKEN_PATH.to_string()
}

fn default_token_field() -> String {
    CSRF_TOKEN_FIELD.to_string()
}
