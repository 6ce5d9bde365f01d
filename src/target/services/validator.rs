//! Scope validator: proves a caller credential can see the scope and manage
//! its workers.

use crate::target::{
    domain::{PlatformHost, Scope},
    ports::{PlatformClient, PlatformError},
};
use secrecy::SecretString;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Reasons a scope/credential pair fails validation.
#[derive(Debug, Clone, Error)]
pub enum ScopeValidationError {
    /// The existence check returned 404.
    #[error("scope {scope} was not found")]
    ScopeNotFound {
        /// Scope that was checked.
        scope: Scope,
    },

    /// The existence check failed for another reason.
    #[error("credential was rejected for scope {scope}: {source}")]
    CredentialRejected {
        /// Scope that was checked.
        scope: Scope,
        /// Platform failure.
        #[source]
        source: PlatformError,
    },

    /// The worker listing probe failed.
    #[error("failed to list workers for scope {scope}: {source}")]
    ListingFailed {
        /// Scope that was probed.
        scope: Scope,
        /// Platform failure.
        #[source]
        source: PlatformError,
    },
}

impl ScopeValidationError {
    /// Returns the platform status code attached to the failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ScopeNotFound { .. } => Some(404),
            Self::CredentialRejected { source, .. } | Self::ListingFailed { source, .. } => {
                source.status()
            }
        }
    }
}

/// Fail-closed validator for caller-supplied credentials.
#[derive(Clone)]
pub struct ScopeValidator<P>
where
    P: PlatformClient,
{
    platform: Arc<P>,
}

impl<P> ScopeValidator<P>
where
    P: PlatformClient,
{
    /// Creates a new validator.
    #[must_use]
    pub const fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Checks that the scope exists and that its workers can be listed with
    /// the credential. Both checks must pass.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeValidationError`] describing the first failing check.
    pub async fn validate(
        &self,
        host: &PlatformHost,
        scope: &Scope,
        endpoint: &Url,
        credential: &SecretString,
    ) -> Result<(), ScopeValidationError> {
        self.platform
            .check_scope_exists(endpoint, credential)
            .await
            .map_err(|source| {
                warn!(%scope, %endpoint, error = %source, "scope existence check failed");
                match source {
                    PlatformError::NotFound => ScopeValidationError::ScopeNotFound {
                        scope: scope.clone(),
                    },
                    other => ScopeValidationError::CredentialRejected {
                        scope: scope.clone(),
                        source: other,
                    },
                }
            })?;

        self.platform
            .list_runners(host, scope, credential)
            .await
            .map_err(|source| {
                warn!(%scope, error = %source, "worker listing probe failed");
                ScopeValidationError::ListingFailed {
                    scope: scope.clone(),
                    source,
                }
            })?;
        Ok(())
    }
}
