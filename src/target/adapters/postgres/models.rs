//! Diesel row models for target registration persistence.

use super::schema::targets;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for target records.
#[derive(Clone, Queryable, Selectable)]
#[diesel(table_name = targets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TargetRow {
    /// Internal target identifier.
    pub id: uuid::Uuid,
    /// Organisation or repository scope.
    pub scope: String,
    /// Enterprise host, if any.
    pub enterprise_host: Option<String>,
    /// Installation access token.
    pub credential: String,
    /// Token expiry.
    pub credential_expires_at: DateTime<Utc>,
    /// Requested machine size.
    pub resource_type: Option<String>,
    /// Provisioning provider endpoint.
    pub provider_url: Option<String>,
    /// Worker agent identity.
    pub runner_user: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for target records.
#[derive(Clone, Insertable)]
#[diesel(table_name = targets)]
pub struct NewTargetRow {
    /// Internal target identifier.
    pub id: uuid::Uuid,
    /// Organisation or repository scope.
    pub scope: String,
    /// Enterprise host, if any.
    pub enterprise_host: Option<String>,
    /// Installation access token.
    pub credential: String,
    /// Token expiry.
    pub credential_expires_at: DateTime<Utc>,
    /// Requested machine size.
    pub resource_type: Option<String>,
    /// Provisioning provider endpoint.
    pub provider_url: Option<String>,
    /// Worker agent identity.
    pub runner_user: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}
