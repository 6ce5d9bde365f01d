//! Credential issuer: App installation lookup, trust check, and token
//! exchange.

use crate::target::{
    domain::{InstallationId, InstallationToken, Scope},
    ports::{AppInstallations, PlatformError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while issuing an installation credential.
#[derive(Debug, Clone, Error)]
pub enum IssuerError {
    /// The App is not installed for the scope.
    #[error("app is not installed for scope {scope}: {source}")]
    NotInstalled {
        /// Scope that was looked up.
        scope: Scope,
        /// Platform failure.
        #[source]
        source: PlatformError,
    },

    /// The installation exists but cannot be trusted. Terminal for the
    /// request.
    #[error("installation {installation} is invalid: {source}")]
    InstallationInvalid {
        /// Installation identifier.
        installation: InstallationId,
        /// Platform failure.
        #[source]
        source: PlatformError,
    },

    /// The token exchange failed.
    #[error("failed to issue installation token for {scope}: {source}")]
    IssuanceFailed {
        /// Scope the token was requested for.
        scope: Scope,
        /// Platform failure.
        #[source]
        source: PlatformError,
    },
}

/// Stateless wrapper around [`AppInstallations`] that classifies failures.
#[derive(Clone)]
pub struct CredentialIssuer<A>
where
    A: AppInstallations,
{
    installations: Arc<A>,
}

impl<A> CredentialIssuer<A>
where
    A: AppInstallations,
{
    /// Creates a new issuer.
    #[must_use]
    pub const fn new(installations: Arc<A>) -> Self {
        Self { installations }
    }

    /// Resolves the App installation for a scope.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::NotInstalled`] on any failure.
    pub async fn locate_installation(&self, scope: &Scope) -> Result<InstallationId, IssuerError> {
        self.installations
            .find_installation(scope)
            .await
            .map_err(|source| IssuerError::NotInstalled {
                scope: scope.clone(),
                source,
            })
    }

    /// Verifies the installation is trusted.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::InstallationInvalid`] on any failure.
    pub async fn check_installation_trust(
        &self,
        installation: InstallationId,
    ) -> Result<(), IssuerError> {
        self.installations
            .check_installation_trust(installation)
            .await
            .map_err(|source| IssuerError::InstallationInvalid {
                installation,
                source,
            })
    }

    /// Requests a short-lived token for the installation.
    ///
    /// The returned expiry is authoritative; no renewal happens here.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::IssuanceFailed`] on any failure.
    pub async fn issue_installation_token(
        &self,
        installation: InstallationId,
        scope: &Scope,
    ) -> Result<InstallationToken, IssuerError> {
        let token = self
            .installations
            .issue_installation_token(installation, scope)
            .await
            .map_err(|source| IssuerError::IssuanceFailed {
                scope: scope.clone(),
                source,
            })?;
        debug!(
            %scope,
            installation_id = %installation,
            expires_at = %token.expires_at(),
            "issued installation token"
        );
        Ok(token)
    }
}
