use anyhow::{anyhow, Context, Result};
use reqwest::cookie::Jar;
use reqwest::{redirect, Client, Url};
use std::env;
use std::sync::Arc;

use crate::config::page::CredentialValue;

const MAX_REDIRECTS: usize = 10;

pub async fn resolve_credential(value: &CredentialValue) -> Result<String> {
    match value {
        CredentialValue::Literal { value } => Ok(value.to_owned()),
        CredentialValue::FromEnv { from_env } => env::var(from_env)
            .with_context(|| format!("env var '{}' for session cookie is not set", from_env)),
        CredentialValue::FromFile { path } => tokio::fs::read_to_string(path)
            .await
            .map(|content| content.trim().to_string())
            .with_context(|| format!("failed to read session cookie from '{}'", path)),
    }
}

/// Client whose credentials never leave `origin`.
///
/// The session cookie is stored host-only for the origin, and redirects are
/// followed only while they stay on that exact origin (scheme, host, port);
/// cookies are not port-scoped, so a redirect to another port on the same host
/// is refused as well.
pub fn build_same_origin_client(origin: &Url, session_cookie: Option<&str>) -> Result<Client> {
    let jar = Arc::new(Jar::default());
    if let Some(cookie) = session_cookie {
        for pair in cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            if !pair.contains('=') {
                return Err(anyhow!("session cookie entry '{}' is not name=value", pair));
            }
            jar.add_cookie_str(pair, origin);
        }
    }

    let page_origin = origin.origin();
    let policy = redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if attempt.url().origin() == page_origin {
            attempt.follow()
        } else {
            let target = attempt.url().to_string();
            attempt.error(format!("cross-origin redirect to {} refused", target))
        }
    });

    Client::builder()
        .cookie_provider(jar)
        .redirect(policy)
        .build()
        .context("failed to build HTTP client")
}
