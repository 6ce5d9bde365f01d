//! Shared HTTP plumbing for the hosting-platform REST API.

use crate::target::{
    domain::{PlatformHost, Scope},
    ports::{PlatformError, PlatformResult},
};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("runner-registrar/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by the platform adapters.
///
/// Every request carries the REST media type and API version headers, and is
/// bounded by `timeout`.
///
/// # Errors
///
/// Returns [`PlatformError::Client`] when the TLS backend cannot be
/// initialised.
pub fn build_http_client(timeout: Duration) -> PlatformResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
    headers.insert(
        HeaderName::from_static(API_VERSION_HEADER),
        HeaderValue::from_static(API_VERSION),
    );

    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|err| PlatformError::Client(err.to_string()))
}

/// Maps a response status onto the platform error vocabulary.
pub(super) fn ensure_success(response: reqwest::Response) -> PlatformResult<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(PlatformError::NotFound);
    }
    if !status.is_success() {
        return Err(PlatformError::UnexpectedStatus {
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Decodes a successful JSON response body.
pub(super) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> PlatformResult<T> {
    ensure_success(response)?
        .json::<T>()
        .await
        .map_err(PlatformError::transport)
}

/// Builds `<api root>/{repos|orgs}/<scope>/<suffix...>`.
pub(super) fn scope_url(
    host: &PlatformHost,
    scope: &Scope,
    suffix: &[&str],
) -> PlatformResult<Url> {
    let segment = scope
        .kind()
        .api_segment()
        .ok_or_else(|| PlatformError::Client(format!("invalid scope {scope}")))?;
    let mut segments = vec![segment];
    segments.extend(scope.as_str().split('/'));
    segments.extend_from_slice(suffix);
    host.api_url(&segments)
        .map_err(|err| PlatformError::Client(err.to_string()))
}
