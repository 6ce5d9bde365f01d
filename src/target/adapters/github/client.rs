//! REST client for calls made with a caller-supplied credential.

use super::http::{ensure_success, read_json, scope_url};
use crate::target::{
    domain::{PlatformHost, Scope},
    ports::{PlatformClient, PlatformError, PlatformResult, RegisteredRunner},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const RUNNERS_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct RunnerPage {
    runners: Vec<RegisteredRunner>,
}

/// Platform client authenticating with `Authorization: token <credential>`.
#[derive(Debug, Clone)]
pub struct GitHubPlatformClient {
    http: reqwest::Client,
}

impl GitHubPlatformClient {
    /// Wraps a shared HTTP client.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

/// Builds the `Authorization` header for a long-lived credential.
///
/// # Errors
///
/// Returns [`PlatformError::Client`] when the credential contains bytes that
/// cannot appear in a header.
pub(super) fn token_header(credential: &SecretString) -> PlatformResult<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("token {}", credential.expose_secret()))
        .map_err(|_| PlatformError::Client("credential is not a valid header value".to_owned()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl PlatformClient for GitHubPlatformClient {
    async fn check_scope_exists(
        &self,
        endpoint: &Url,
        credential: &SecretString,
    ) -> PlatformResult<()> {
        let authorization = token_header(credential)?;
        let response = self
            .http
            .get(endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(PlatformError::transport)?;

        let status = response.status();
        debug!(%endpoint, status = status.as_u16(), "scope existence check answered");
        if status == StatusCode::OK {
            return Ok(());
        }
        ensure_success(response)?;
        Err(PlatformError::UnexpectedStatus {
            status: status.as_u16(),
        })
    }

    async fn list_runners(
        &self,
        host: &PlatformHost,
        scope: &Scope,
        credential: &SecretString,
    ) -> PlatformResult<Vec<RegisteredRunner>> {
        let authorization = token_header(credential)?;
        let mut url = scope_url(host, scope, &["actions", "runners"])?;
        url.query_pairs_mut().append_pair("per_page", RUNNERS_PAGE_SIZE);

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(PlatformError::transport)?;
        let page: RunnerPage = read_json(response).await?;
        Ok(page.runners)
    }
}
