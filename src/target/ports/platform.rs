//! Hosting-platform ports: scope checks, worker listing, and App
//! installations.

use crate::target::domain::{InstallationId, InstallationToken, PlatformHost, Scope};
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// A worker agent currently registered against a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredRunner {
    /// Platform-assigned runner identifier.
    pub id: i64,
    /// Runner name.
    pub name: String,
    /// Reported status, for example `online`.
    pub status: String,
    /// Whether the runner is executing a job.
    pub busy: bool,
}

/// Platform calls made with a caller-supplied long-lived credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Performs an authenticated `GET` against a scope endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotFound`] for a 404 and
    /// [`PlatformError::UnexpectedStatus`] for other non-success statuses.
    async fn check_scope_exists(
        &self,
        endpoint: &Url,
        credential: &SecretString,
    ) -> PlatformResult<()>;

    /// Lists runners registered for the scope.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Client`] when no client can be built from the
    /// credential, or any other variant when the listing fails.
    async fn list_runners(
        &self,
        host: &PlatformHost,
        scope: &Scope,
        credential: &SecretString,
    ) -> PlatformResult<Vec<RegisteredRunner>>;
}

/// App-level calls authenticated with the App's own identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppInstallations: Send + Sync {
    /// Resolves the installation of the App for a scope.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotFound`] when the App is not installed.
    async fn find_installation(&self, scope: &Scope) -> PlatformResult<InstallationId>;

    /// Verifies an installation can be trusted by building an
    /// installation-scoped transport for it.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InstallationInvalid`] for malformed keys or
    /// unknown installations.
    async fn check_installation_trust(&self, installation: InstallationId) -> PlatformResult<()>;

    /// Exchanges an installation for a short-lived access token.
    ///
    /// # Errors
    ///
    /// Returns any [`PlatformError`] raised by the exchange.
    async fn issue_installation_token(
        &self,
        installation: InstallationId,
        scope: &Scope,
    ) -> PlatformResult<InstallationToken>;
}

/// Errors returned by platform adapters.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The requested resource does not exist.
    #[error("resource not found on platform")]
    NotFound,

    /// The platform answered with a non-success status.
    #[error("platform returned status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The App installation could not be trusted.
    #[error("installation {installation} is invalid: {reason}")]
    InstallationInvalid {
        /// Installation identifier.
        installation: InstallationId,
        /// Diagnostic.
        reason: String,
    },

    /// A client could not be constructed from the supplied credential.
    #[error("failed to build platform client: {0}")]
    Client(String),

    /// Transport or decoding failure.
    #[error("platform transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl PlatformError {
    /// Wraps a transport-level failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Returns the HTTP status code carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::UnexpectedStatus { status } => Some(*status),
            Self::InstallationInvalid { .. } | Self::Client(_) | Self::Transport(_) => None,
        }
    }
}
