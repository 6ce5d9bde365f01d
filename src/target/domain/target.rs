//! Autoscaling target aggregate root.

use super::{
    InstallationToken, PlatformHost, ProvisioningParams, Scope, TargetDomainError, TargetId,
    TargetStatus,
};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Persisted registration record for an autoscaling target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    id: TargetId,
    scope: Scope,
    enterprise_host: Option<String>,
    credential: InstallationToken,
    params: ProvisioningParams,
    runner_user: Option<String>,
    status: TargetStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a brand-new target.
#[derive(Debug, Clone)]
pub struct NewTarget {
    /// Validated scope.
    pub scope: Scope,
    /// Platform the service is configured against.
    pub platform: PlatformHost,
    /// Installation token issued for the scope.
    pub credential: InstallationToken,
    /// Requested provisioning parameters.
    pub params: ProvisioningParams,
    /// Optional worker agent identity.
    pub runner_user: Option<String>,
}

/// Parameter object for reconstructing a persisted target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTargetData {
    /// Persisted identifier.
    pub id: TargetId,
    /// Persisted scope.
    pub scope: Scope,
    /// Persisted enterprise host, absent for the public platform.
    pub enterprise_host: Option<String>,
    /// Persisted access credential.
    pub credential: InstallationToken,
    /// Persisted provisioning parameters.
    pub params: ProvisioningParams,
    /// Persisted runner user.
    pub runner_user: Option<String>,
    /// Persisted lifecycle status.
    pub status: TargetStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Target {
    /// Creates a new `Active` target with a fresh identifier.
    ///
    /// The enterprise host is recorded only when the configured platform is
    /// not the public default.
    #[must_use]
    pub fn new(data: NewTarget, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let enterprise_host = data.platform.enterprise_url().map(|_| data.platform.to_string());
        Self {
            id: TargetId::new(),
            scope: data.scope,
            enterprise_host,
            credential: data.credential,
            params: data.params,
            runner_user: data.runner_user,
            status: TargetStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a target from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTargetData) -> Self {
        Self {
            id: data.id,
            scope: data.scope,
            enterprise_host: data.enterprise_host,
            credential: data.credential,
            params: data.params,
            runner_user: data.runner_user,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the target identifier.
    #[must_use]
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Returns the scope.
    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the enterprise host, or `None` for the public platform.
    #[must_use]
    pub fn enterprise_host(&self) -> Option<&str> {
        self.enterprise_host.as_deref()
    }

    /// Returns the stored access credential.
    #[must_use]
    pub const fn credential(&self) -> &InstallationToken {
        &self.credential
    }

    /// Returns the provisioning parameters.
    #[must_use]
    pub const fn params(&self) -> &ProvisioningParams {
        &self.params
    }

    /// Returns the runner user, if any.
    #[must_use]
    pub fn runner_user(&self) -> Option<&str> {
        self.runner_user.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TargetStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reactivates a deleted target in place.
    ///
    /// The identifier, creation timestamp, and runner user are kept; the
    /// credential and provisioning parameters are replaced.
    ///
    /// # Errors
    ///
    /// Returns [`TargetDomainError::NotDeleted`] if the target is still live.
    pub fn resurrect(
        &mut self,
        credential: InstallationToken,
        params: ProvisioningParams,
        updated_at: DateTime<Utc>,
    ) -> Result<(), TargetDomainError> {
        if self.status.is_live() {
            return Err(TargetDomainError::NotDeleted(self.id));
        }
        self.status = TargetStatus::Active;
        self.credential = credential;
        self.params = params;
        self.updated_at = updated_at;
        Ok(())
    }
}
