//! Error taxonomy for target registration.

use super::{IssuerError, ScopeValidationError};
use crate::target::{
    domain::{Scope, ScopeResolveError, TargetDomainError, TargetId, TargetStatus},
    ports::TargetRepositoryError,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a registration failure.
///
/// Each error maps to exactly one kind before crossing the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationErrorKind {
    /// Malformed or missing input. Caller's fault.
    Validation,
    /// The scope does not resolve or does not exist.
    ScopeInvalid,
    /// The App is not installed, or its installation is not trusted.
    AppNotInstalled,
    /// The caller credential cannot see the scope or manage its workers.
    CredentialRejected,
    /// A live record already exists for the scope.
    Conflict,
    /// The platform was unavailable or misbehaved. Safe to retry later.
    Upstream,
    /// The store failed.
    Storage,
}

impl RegistrationErrorKind {
    /// Returns whether the caller can correct the failure by changing the
    /// request.
    #[must_use]
    pub const fn is_caller_error(self) -> bool {
        !matches!(self, Self::Upstream | Self::Storage)
    }
}

/// Registration step at which a storage failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStep {
    /// Looking up an existing record by scope.
    Lookup,
    /// Creating a new record.
    Create,
    /// Resurrecting a deleted record.
    Resurrect,
    /// Re-reading the canonical record.
    Refetch,
}

impl fmt::Display for StorageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lookup => "lookup",
            Self::Create => "create",
            Self::Resurrect => "resurrect",
            Self::Refetch => "refetch",
        })
    }
}

/// Service-level errors for target registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Request validation failed.
    #[error(transparent)]
    Domain(#[from] TargetDomainError),

    /// The scope endpoint could not be derived.
    #[error(transparent)]
    Resolve(#[from] ScopeResolveError),

    /// The App installation could not be located or trusted.
    #[error("app installation check failed: {0}")]
    AppInstallation(#[source] IssuerError),

    /// Issuing the installation token failed.
    #[error("credential issuance failed: {0}")]
    Issuance(#[source] IssuerError),

    /// The caller credential failed validation.
    #[error(transparent)]
    ScopeValidation(#[from] ScopeValidationError),

    /// A live record already holds the scope.
    #[error("{scope} is already registered, current status is {status}.")]
    Conflict {
        /// Contested scope.
        scope: Scope,
        /// Status of the existing record.
        status: TargetStatus,
    },

    /// A storage call failed.
    #[error("storage {step} failed for {scope}: {source}")]
    Storage {
        /// Step that failed.
        step: StorageStep,
        /// Scope being registered.
        scope: Scope,
        /// Repository failure.
        #[source]
        source: TargetRepositoryError,
    },

    /// Reading a record by identifier failed.
    #[error("storage lookup failed for target {id}: {source}")]
    Lookup {
        /// Requested identifier.
        id: TargetId,
        /// Repository failure.
        #[source]
        source: TargetRepositoryError,
    },

    /// The request deadline elapsed before registration finished.
    #[error("registration did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

impl RegistrationError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> RegistrationErrorKind {
        match self {
            Self::Domain(_) => RegistrationErrorKind::Validation,
            Self::Resolve(_) => RegistrationErrorKind::ScopeInvalid,
            Self::AppInstallation(_) => RegistrationErrorKind::AppNotInstalled,
            Self::Issuance(_) | Self::DeadlineExceeded(_) => RegistrationErrorKind::Upstream,
            Self::ScopeValidation(ScopeValidationError::ScopeNotFound { .. }) => {
                RegistrationErrorKind::ScopeInvalid
            }
            Self::ScopeValidation(_) => RegistrationErrorKind::CredentialRejected,
            Self::Conflict { .. } => RegistrationErrorKind::Conflict,
            Self::Storage { .. } | Self::Lookup { .. } => RegistrationErrorKind::Storage,
        }
    }

    /// Returns the message safe to show to API callers.
    ///
    /// Upstream error text is never included; at most the status code class
    /// reported by the platform.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Domain(err) => err.to_string(),
            Self::Resolve(err) => err.to_string(),
            Self::AppInstallation(_) => {
                "failed to check the App installation. Is the App installed for this scope?"
                    .to_owned()
            }
            Self::Issuance(_) => "failed to generate an App installation token".to_owned(),
            Self::ScopeValidation(err) => scope_validation_message(err),
            Self::Conflict { .. } => self.to_string(),
            Self::Storage { step, .. } => format!("datastore {step} error"),
            Self::Lookup { .. } => "datastore get error".to_owned(),
            Self::DeadlineExceeded(_) => "registration timed out".to_owned(),
        }
    }
}

fn scope_validation_message(err: &ScopeValidationError) -> String {
    let class = err
        .status()
        .and_then(|status| status.checked_div(100))
        .map(|class| format!(" (platform status {class}xx)"))
        .unwrap_or_default();
    match err {
        ScopeValidationError::ScopeNotFound { .. } => {
            format!("scope is invalid (repository or organization not found){class}")
        }
        ScopeValidationError::CredentialRejected { .. } => {
            format!("scope is invalid (credential was rejected){class}")
        }
        ScopeValidationError::ListingFailed { .. } => {
            format!("failed to list workers (bad scope or credential){class}")
        }
    }
}
