//! In-memory target repository for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::target::{
    domain::{
        InstallationToken, PersistedTargetData, ProvisioningParams, Scope, Target, TargetId,
        TargetStatus,
    },
    ports::{TargetRepository, TargetRepositoryError, TargetRepositoryResult},
};

/// Thread-safe in-memory target repository.
///
/// Enforces the same live-scope uniqueness rule as the `PostgreSQL` partial
/// unique index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTargetRepository {
    state: Arc<RwLock<InMemoryTargetState>>,
}

#[derive(Debug, Default)]
struct InMemoryTargetState {
    targets: HashMap<TargetId, Target>,
}

impl InMemoryTargetState {
    fn live_holder(&self, scope: &Scope) -> Option<TargetId> {
        self.targets
            .values()
            .find(|target| target.scope() == scope && target.status().is_live())
            .map(Target::id)
    }
}

impl InMemoryTargetRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the lock is poisoned.
    pub fn len(&self) -> TargetRepositoryResult<usize> {
        let state = self.state.read().map_err(|err| {
            TargetRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.targets.len())
    }

    /// Returns whether the repository holds no records.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the lock is poisoned.
    pub fn is_empty(&self) -> TargetRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn rewrite<F>(&self, id: TargetId, f: F) -> TargetRepositoryResult<()>
    where
        F: FnOnce(Target) -> TargetRepositoryResult<Target>,
    {
        let mut state = self.state.write().map_err(|err| {
            TargetRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let current = state
            .targets
            .get(&id)
            .ok_or(TargetRepositoryError::NotFound(id))?;
        let rewritten = f(current.clone())?;

        if rewritten.status().is_live()
            && let Some(holder) = state.live_holder(rewritten.scope())
            && holder != id
        {
            return Err(TargetRepositoryError::DuplicateScope(
                rewritten.scope().clone(),
            ));
        }

        state.targets.insert(id, rewritten);
        Ok(())
    }
}

#[async_trait]
impl TargetRepository for InMemoryTargetRepository {
    async fn find_by_scope(&self, scope: &Scope) -> TargetRepositoryResult<Option<Target>> {
        let state = self.state.read().map_err(|err| {
            TargetRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let found = state
            .targets
            .values()
            .filter(|target| target.scope() == scope)
            .max_by_key(|target| (target.status().is_live(), target.updated_at()))
            .cloned();
        Ok(found)
    }

    async fn find_by_id(&self, id: TargetId) -> TargetRepositoryResult<Option<Target>> {
        let state = self.state.read().map_err(|err| {
            TargetRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.targets.get(&id).cloned())
    }

    async fn create(&self, target: &Target) -> TargetRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TargetRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;

        if state.targets.contains_key(&target.id()) {
            return Err(TargetRepositoryError::DuplicateTarget(target.id()));
        }
        if target.status().is_live() && state.live_holder(target.scope()).is_some() {
            return Err(TargetRepositoryError::DuplicateScope(target.scope().clone()));
        }

        state.targets.insert(target.id(), target.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        id: TargetId,
        status: TargetStatus,
        updated_at: DateTime<Utc>,
    ) -> TargetRepositoryResult<()> {
        self.rewrite(id, |current| {
            Ok(Target::from_persisted(PersistedTargetData {
                status,
                updated_at,
                ..to_persisted(&current)
            }))
        })
    }

    async fn resurrect(
        &self,
        id: TargetId,
        credential: &InstallationToken,
        params: &ProvisioningParams,
        updated_at: DateTime<Utc>,
    ) -> TargetRepositoryResult<()> {
        let token = credential.clone();
        let replacement = params.clone();
        self.rewrite(id, |mut current| {
            current
                .resurrect(token, replacement, updated_at)
                .map_err(|_| TargetRepositoryError::NotDeleted(id))?;
            Ok(current)
        })
    }
}

fn to_persisted(target: &Target) -> PersistedTargetData {
    PersistedTargetData {
        id: target.id(),
        scope: target.scope().clone(),
        enterprise_host: target.enterprise_host().map(str::to_owned),
        credential: target.credential().clone(),
        params: target.params().clone(),
        runner_user: target.runner_user().map(str::to_owned),
        status: target.status(),
        created_at: target.created_at(),
        updated_at: target.updated_at(),
    }
}
