//! Caller-facing projection of a target with the credential removed.

use super::{ResourceType, Target, TargetId, TargetStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sanitized target record returned across the API boundary.
///
/// The type has no credential field at all, so no serialization path can
/// leak the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetView {
    /// Target identifier.
    pub id: TargetId,
    /// Organization or repository scope.
    pub scope: String,
    /// Enterprise host, absent for the public platform.
    pub enterprise_host: Option<String>,
    /// Expiry of the stored credential.
    pub credential_expires_at: DateTime<Utc>,
    /// Requested worker size.
    pub resource_type: Option<ResourceType>,
    /// Compute backend endpoint.
    #[serde(rename = "providerURL")]
    pub provider_url: Option<String>,
    /// Identity the worker agent runs under.
    pub runner_user: Option<String>,
    /// Lifecycle status.
    pub status: TargetStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Target> for TargetView {
    fn from(target: &Target) -> Self {
        Self {
            id: target.id(),
            scope: target.scope().as_str().to_owned(),
            enterprise_host: target.enterprise_host().map(str::to_owned),
            credential_expires_at: target.credential().expires_at(),
            resource_type: target.params().resource_type(),
            provider_url: target.params().provider_url().map(str::to_owned),
            runner_user: target.runner_user().map(str::to_owned),
            status: target.status(),
            created_at: target.created_at(),
            updated_at: target.updated_at(),
        }
    }
}
