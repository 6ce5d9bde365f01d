//! App-authenticated calls: installation lookup and token exchange.

use super::http::{read_json, scope_url};
use crate::target::{
    domain::{InstallationId, InstallationToken, PlatformHost, Scope},
    ports::{AppInstallations, PlatformError, PlatformResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use mockable::Clock;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Seconds the JWT issue time is backdated to absorb clock drift.
const JWT_BACKDATE_SECS: i64 = 60;

/// Lifetime of an App JWT; the platform rejects anything above ten minutes.
const JWT_LIFETIME_SECS: i64 = 600;

#[derive(Debug, Serialize, Deserialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Deserialize)]
struct InstallationRecord {
    id: i64,
    #[serde(default)]
    suspended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    repositories: Option<Vec<String>>,
}

impl AccessTokenRequest {
    fn for_scope(scope: &Scope) -> Self {
        Self {
            repositories: scope.repository().map(|name| vec![name.to_owned()]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Hosting-platform App identity used to locate installations and mint
/// installation access tokens.
pub struct GitHubApp<C>
where
    C: Clock + Send + Sync,
{
    app_id: String,
    private_key: SecretString,
    host: PlatformHost,
    http: reqwest::Client,
    clock: Arc<C>,
}

impl<C> GitHubApp<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an App client for the configured platform host.
    #[must_use]
    pub fn new(
        app_id: impl Into<String>,
        private_key: SecretString,
        host: PlatformHost,
        http: reqwest::Client,
        clock: Arc<C>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            private_key,
            host,
            http,
            clock,
        }
    }

    /// Signs a short-lived RS256 JWT identifying the App.
    fn app_jwt(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = self.clock.utc().timestamp();
        let claims = AppClaims {
            iat: now - JWT_BACKDATE_SECS,
            exp: now + JWT_LIFETIME_SECS,
            iss: self.app_id.clone(),
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
    }

    fn installation_url(
        &self,
        installation: InstallationId,
        suffix: Option<&str>,
    ) -> PlatformResult<Url> {
        let id = installation.to_string();
        let mut segments = vec!["app", "installations", id.as_str()];
        segments.extend(suffix);
        self.host
            .api_url(&segments)
            .map_err(|err| PlatformError::Client(err.to_string()))
    }
}

#[async_trait]
impl<C> AppInstallations for GitHubApp<C>
where
    C: Clock + Send + Sync,
{
    async fn find_installation(&self, scope: &Scope) -> PlatformResult<InstallationId> {
        let jwt = self
            .app_jwt()
            .map_err(|err| PlatformError::Client(format!("failed to sign app JWT: {err}")))?;
        let url = scope_url(&self.host, scope, &["installation"])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(jwt)
            .send()
            .await
            .map_err(PlatformError::transport)?;
        let record: InstallationRecord = read_json(response).await?;
        debug!(%scope, installation = record.id, "located app installation");
        Ok(InstallationId::new(record.id))
    }

    async fn check_installation_trust(&self, installation: InstallationId) -> PlatformResult<()> {
        let jwt = self
            .app_jwt()
            .map_err(|err| PlatformError::InstallationInvalid {
                installation,
                reason: format!("app private key rejected: {err}"),
            })?;
        let url = self.installation_url(installation, None)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(jwt)
            .send()
            .await
            .map_err(PlatformError::transport)?;
        let record: InstallationRecord = match read_json(response).await {
            Ok(record) => record,
            Err(PlatformError::NotFound) => {
                return Err(PlatformError::InstallationInvalid {
                    installation,
                    reason: "installation does not exist".to_owned(),
                });
            }
            Err(err) => return Err(err),
        };

        if record.id != installation.value() {
            return Err(PlatformError::InstallationInvalid {
                installation,
                reason: format!("platform answered for installation {}", record.id),
            });
        }
        if let Some(suspended_at) = record.suspended_at {
            warn!(%installation, %suspended_at, "app installation is suspended");
            return Err(PlatformError::InstallationInvalid {
                installation,
                reason: format!("installation suspended at {suspended_at}"),
            });
        }
        Ok(())
    }

    async fn issue_installation_token(
        &self,
        installation: InstallationId,
        scope: &Scope,
    ) -> PlatformResult<InstallationToken> {
        let jwt = self
            .app_jwt()
            .map_err(|err| PlatformError::Client(format!("failed to sign app JWT: {err}")))?;
        let url = self.installation_url(installation, Some("access_tokens"))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(jwt)
            .json(&AccessTokenRequest::for_scope(scope))
            .send()
            .await
            .map_err(PlatformError::transport)?;
        let issued: AccessTokenResponse = read_json(response).await?;
        debug!(%installation, expires_at = %issued.expires_at, "issued installation token");
        Ok(InstallationToken::new(
            SecretString::from(issued.token),
            issued.expires_at,
        ))
    }
}
