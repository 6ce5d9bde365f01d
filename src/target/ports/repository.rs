//! Repository port for target registration persistence.

use crate::target::domain::{
    InstallationToken, ProvisioningParams, Scope, Target, TargetId, TargetStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for target repository operations.
pub type TargetRepositoryResult<T> = Result<T, TargetRepositoryError>;

/// Target persistence contract.
///
/// Implementations must enforce that at most one non-deleted record exists
/// per scope and report a violation as
/// [`TargetRepositoryError::DuplicateScope`].
#[async_trait]
pub trait TargetRepository: Send + Sync {
    /// Finds the record for a scope.
    ///
    /// When several records share the scope the live one is preferred.
    /// Returns `None` when the scope was never registered.
    async fn find_by_scope(&self, scope: &Scope) -> TargetRepositoryResult<Option<Target>>;

    /// Finds a record by identifier.
    async fn find_by_id(&self, id: TargetId) -> TargetRepositoryResult<Option<Target>>;

    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`TargetRepositoryError::DuplicateTarget`] when the identifier
    /// already exists or [`TargetRepositoryError::DuplicateScope`] when a live
    /// record already holds the scope.
    async fn create(&self, target: &Target) -> TargetRepositoryResult<()>;

    /// Sets the lifecycle status of a record.
    ///
    /// # Errors
    ///
    /// Returns [`TargetRepositoryError::NotFound`] when the record does not
    /// exist, or [`TargetRepositoryError::DuplicateScope`] when activating it
    /// would create a second live record for its scope.
    async fn update_status(
        &self,
        id: TargetId,
        status: TargetStatus,
        updated_at: DateTime<Utc>,
    ) -> TargetRepositoryResult<()>;

    /// Reactivates a deleted record in one write, storing a fresh credential
    /// and the merged provisioning parameters.
    ///
    /// The deleted status is checked by the same write that activates the
    /// record, so two racing resurrections cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`TargetRepositoryError::NotFound`] when the record does not
    /// exist, [`TargetRepositoryError::NotDeleted`] when it is already live,
    /// or [`TargetRepositoryError::DuplicateScope`] when another live record
    /// holds its scope.
    async fn resurrect(
        &self,
        id: TargetId,
        credential: &InstallationToken,
        params: &ProvisioningParams,
        updated_at: DateTime<Utc>,
    ) -> TargetRepositoryResult<()>;
}

/// Errors returned by target repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TargetRepositoryError {
    /// A record with the same identifier already exists.
    #[error("duplicate target identifier: {0}")]
    DuplicateTarget(TargetId),

    /// A live record for the scope already exists.
    #[error("a live target already exists for scope {0}")]
    DuplicateScope(Scope),

    /// The record is live, so it cannot be resurrected.
    #[error("target {0} is not deleted")]
    NotDeleted(TargetId),

    /// The record was not found.
    #[error("target not found: {0}")]
    NotFound(TargetId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted target data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TargetRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
