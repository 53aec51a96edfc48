use std::fmt;

use anyhow::{anyhow, Context, Error, Result};
use reqwest::{Client, StatusCode, Url};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::token::Token;
use crate::cache::token_state::TokenState;
use crate::config::page::PageConfig;
use crate::observability::metrics::get_metrics;
use crate::parser::token_field::extract_token;
use crate::sources::credentials::{build_same_origin_client, resolve_credential};
use crate::sources::FetchToken;
use crate::utils::constants::FETCH_FAILURE_MSG;

static REASON_NETWORK: &str = "network";
static REASON_REDIRECT: &str = "redirect";
static REASON_STATUS: &str = "status";
static REASON_PARSE: &str = "parse";

/// Raised only when `require_success_status` is enabled
#[derive(Debug)]
pub struct UnexpectedStatus(pub StatusCode);

impl fmt::Display for UnexpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "csrf token endpoint answered {}", self.0)
    }
}

impl std::error::Error for UnexpectedStatus {}

/// Fetches the CSRF token from `{origin}{endpoint_path}` once and stores it.
#[derive(Debug, Clone)]
pub struct TokenBootstrapper {
    client: Client,
    endpoint: Url,
    token_field: String,
    require_success_status: bool,
    state: TokenState,
}

impl TokenBootstrapper {
    pub async fn new(page: &PageConfig, state: TokenState) -> Result<Self> {
        let origin = Url::parse(&page.origin)
            .with_context(|| format!("invalid page origin '{}'", page.origin))?;
        let endpoint = origin
            .join(&page.endpoint_path)
            .with_context(|| format!("invalid endpoint path '{}'", page.endpoint_path))?;
        if endpoint.origin() != origin.origin() {
            return Err(anyhow!(
                "endpoint '{}' is not on page origin '{}'",
                endpoint,
                page.origin
            ));
        }

        // an unresolvable cookie must not cancel the bootstrap
        let session_cookie = match &page.session_cookie {
            Some(value) => match resolve_credential(value).await {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    warn!("session cookie unavailable, fetching csrf token without it: {:#}", e);
                    None
                }
            },
            None => None,
        };
        let client = build_same_origin_client(&origin, session_cookie.as_deref())?;

        Ok(Self {
            client,
            endpoint,
            token_field: page.token_field.to_owned(),
            require_success_status: page.require_success_status,
            state,
        })
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn request_token(&self) -> Result<Token> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            if self.require_success_status {
                return Err(UnexpectedStatus(status).into());
            }
            warn!(%status, "csrf token endpoint answered a non-success status; parsing body anyway");
        }

        let body = response
            .text()
            .await
            .context("failed to read csrf token response body")?;
        debug!(bytes = body.len(), "csrf token response received");
        extract_token(&body, &self.token_field)
    }
}

impl FetchToken for TokenBootstrapper {
    async fn fetch_token(&self) {
        let metrics = get_metrics().await;
        let start = Instant::now();
        metrics.token_fetch_requests.inc();

        match self.request_token().await {
            Ok(token) => {
                metrics.token_fetch_duration.observe(start.elapsed().as_secs_f64());
                match &token {
                    Token::Value(_) => info!(endpoint = %self.endpoint, "csrf token stored"),
                    Token::Absent => warn!(endpoint = %self.endpoint, field = %self.token_field, "csrf token response has no token field"),
                    Token::Unset => {
                        warn!(endpoint = %self.endpoint, field = %self.token_field, "csrf token field is null; token stays unset");
                        return;
                    }
                }
                metrics.token_state.set(token.as_gauge());
                if let Err(e) = self.state.set(token).await {
                    warn!("csrf token not replaced: {}", e);
                }
            }
            Err(e) => {
                metrics.token_fetch_duration.observe(start.elapsed().as_secs_f64());
                metrics.token_fetch_failures.with_label_values(&[failure_reason(&e)]).inc();
                error!("{} {:#}", FETCH_FAILURE_MSG, e);
            }
        }
    }
}

fn failure_reason(err: &Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
            return if e.is_redirect() { REASON_REDIRECT } else { REASON_NETWORK };
        }
        if cause.downcast_ref::<UnexpectedStatus>().is_some() {
            return REASON_STATUS;
        }
    }
    REASON_PARSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn endpoint_is_joined_onto_origin() {
        let page = PageConfig::new("http://127.0.0.1:5000");
        let bootstrapper = TokenBootstrapper::new(&page, TokenState::new()).await.unwrap();
        assert_eq!(bootstrapper.endpoint().as_str(), "http://127.0.0.1:5000/api/csrf-token");
    }

    #[tokio::test]
    async fn refuses_endpoint_on_other_origin() {
        let mut page = PageConfig::new("http://127.0.0.1:5000");
        page.endpoint_path = "//evil.example.com/api/csrf-token".into();
        let err = TokenBootstrapper::new(&page, TokenState::new()).await.unwrap_err();
        assert!(err.to_string().contains("is not on page origin"));
    }

    #[test]
    fn classifies_failures() {
        let status: Error = UnexpectedStatus(StatusCode::FORBIDDEN).into();
        assert_eq!(failure_reason(&status), "status");

        let parse = extract_token("not json", "csrf_token").unwrap_err();
        assert_eq!(failure_reason(&parse), "parse");
    }
}
