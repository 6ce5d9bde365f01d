//! `PostgreSQL` repository implementation for target registration.

use super::{
    models::{NewTargetRow, TargetRow},
    schema::targets,
};
use crate::target::{
    domain::{
        InstallationToken, PersistedTargetData, ProvisioningParams, ResourceType, Scope, Target,
        TargetId, TargetStatus,
    },
    ports::{TargetRepository, TargetRepositoryError, TargetRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use secrecy::{ExposeSecret, SecretString};

/// `PostgreSQL` connection pool type used by the target repository.
pub type TargetPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema applied by [`PostgresTargetRepository::ensure_schema`].
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_targets/up.sql");

/// Name of the partial unique index that keeps one live record per scope.
const LIVE_SCOPE_INDEX: &str = "idx_targets_scope_live";

/// Builds the connection pool owned by the running service.
///
/// # Errors
///
/// Returns [`TargetRepositoryError::Persistence`] when the pool cannot
/// establish its initial connections.
pub fn build_pool(database_url: &str) -> TargetRepositoryResult<TargetPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .map_err(TargetRepositoryError::persistence)
}

/// `PostgreSQL`-backed target repository.
#[derive(Debug, Clone)]
pub struct PostgresTargetRepository {
    pool: TargetPgPool,
}

impl PostgresTargetRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TargetPgPool) -> Self {
        Self { pool }
    }

    /// Creates the `targets` table and its indexes when they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`TargetRepositoryError::Persistence`] when the statements
    /// fail.
    pub async fn ensure_schema(&self) -> TargetRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(TargetRepositoryError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> TargetRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TargetRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TargetRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TargetRepositoryError::persistence)?
    }
}

#[async_trait]
impl TargetRepository for PostgresTargetRepository {
    async fn find_by_scope(&self, scope: &Scope) -> TargetRepositoryResult<Option<Target>> {
        let scope_str = scope.as_str().to_owned();
        self.run_blocking(move |connection| {
            let live = targets::table
                .filter(targets::scope.eq(&scope_str))
                .filter(targets::status.ne(TargetStatus::Deleted.as_str()))
                .select(TargetRow::as_select())
                .first::<TargetRow>(connection)
                .optional()
                .map_err(TargetRepositoryError::persistence)?;

            let row = match live {
                Some(row) => Some(row),
                None => targets::table
                    .filter(targets::scope.eq(&scope_str))
                    .order(targets::updated_at.desc())
                    .select(TargetRow::as_select())
                    .first::<TargetRow>(connection)
                    .optional()
                    .map_err(TargetRepositoryError::persistence)?,
            };
            row.map(row_to_target).transpose()
        })
        .await
    }

    async fn find_by_id(&self, id: TargetId) -> TargetRepositoryResult<Option<Target>> {
        self.run_blocking(move |connection| {
            let row = targets::table
                .filter(targets::id.eq(id.into_inner()))
                .select(TargetRow::as_select())
                .first::<TargetRow>(connection)
                .optional()
                .map_err(TargetRepositoryError::persistence)?;
            row.map(row_to_target).transpose()
        })
        .await
    }

    async fn create(&self, target: &Target) -> TargetRepositoryResult<()> {
        let target_id = target.id();
        let target_scope = target.scope().clone();
        let new_row = to_new_row(target);

        self.run_blocking(move |connection| {
            diesel::insert_into(targets::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_live_scope_violation(info.as_ref()) =>
                    {
                        TargetRepositoryError::DuplicateScope(target_scope.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TargetRepositoryError::DuplicateTarget(target_id)
                    }
                    _ => TargetRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_status(
        &self,
        id: TargetId,
        status: TargetStatus,
        updated_at: DateTime<Utc>,
    ) -> TargetRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let scope_str = scope_of(connection, id)?;
            diesel::update(targets::table.filter(targets::id.eq(id.into_inner())))
                .set((
                    targets::status.eq(status.as_str()),
                    targets::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(|err| activation_error(err, &scope_str))?;
            Ok(())
        })
        .await
    }

    async fn resurrect(
        &self,
        id: TargetId,
        credential: &InstallationToken,
        params: &ProvisioningParams,
        updated_at: DateTime<Utc>,
    ) -> TargetRepositoryResult<()> {
        let token = credential.token().expose_secret().to_owned();
        let expires_at = credential.expires_at();
        let resource_type = params.resource_type().map(|kind| kind.as_str().to_owned());
        let provider_url = params.provider_url().map(str::to_owned);

        self.run_blocking(move |connection| {
            let scope_str = scope_of(connection, id)?;
            let still_deleted = targets::table
                .filter(targets::id.eq(id.into_inner()))
                .filter(targets::status.eq(TargetStatus::Deleted.as_str()));
            let updated_count = diesel::update(still_deleted)
                .set((
                    targets::status.eq(TargetStatus::Active.as_str()),
                    targets::credential.eq(token),
                    targets::credential_expires_at.eq(expires_at),
                    targets::resource_type.eq(resource_type),
                    targets::provider_url.eq(provider_url),
                    targets::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(|err| activation_error(err, &scope_str))?;

            if updated_count == 0 {
                return Err(TargetRepositoryError::NotDeleted(id));
            }
            Ok(())
        })
        .await
    }
}

fn scope_of(connection: &mut PgConnection, id: TargetId) -> TargetRepositoryResult<String> {
    targets::table
        .filter(targets::id.eq(id.into_inner()))
        .select(targets::scope)
        .first::<String>(connection)
        .optional()
        .map_err(TargetRepositoryError::persistence)?
        .ok_or(TargetRepositoryError::NotFound(id))
}

/// Maps a failed activating write, reporting a live-scope index violation as
/// [`TargetRepositoryError::DuplicateScope`].
fn activation_error(err: DieselError, scope: &str) -> TargetRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_live_scope_violation(info.as_ref()) =>
        {
            Scope::new(scope).map_or_else(
                TargetRepositoryError::invalid_persisted_data,
                TargetRepositoryError::DuplicateScope,
            )
        }
        _ => TargetRepositoryError::persistence(err),
    }
}

fn to_new_row(target: &Target) -> NewTargetRow {
    NewTargetRow {
        id: target.id().into_inner(),
        scope: target.scope().as_str().to_owned(),
        enterprise_host: target.enterprise_host().map(str::to_owned),
        credential: target.credential().token().expose_secret().to_owned(),
        credential_expires_at: target.credential().expires_at(),
        resource_type: target
            .params()
            .resource_type()
            .map(|kind| kind.as_str().to_owned()),
        provider_url: target.params().provider_url().map(str::to_owned),
        runner_user: target.runner_user().map(str::to_owned),
        status: target.status().as_str().to_owned(),
        created_at: target.created_at(),
        updated_at: target.updated_at(),
    }
}

fn row_to_target(row: TargetRow) -> TargetRepositoryResult<Target> {
    let TargetRow {
        id,
        scope,
        enterprise_host,
        credential,
        credential_expires_at,
        resource_type,
        provider_url,
        runner_user,
        status,
        created_at,
        updated_at,
    } = row;

    let parsed_scope = Scope::new(scope).map_err(TargetRepositoryError::invalid_persisted_data)?;
    let parsed_status = TargetStatus::try_from(status.as_str())
        .map_err(TargetRepositoryError::invalid_persisted_data)?;
    let parsed_type = resource_type
        .as_deref()
        .map(ResourceType::try_from)
        .transpose()
        .map_err(TargetRepositoryError::invalid_persisted_data)?;

    let data = PersistedTargetData {
        id: TargetId::from_uuid(id),
        scope: parsed_scope,
        enterprise_host,
        credential: InstallationToken::new(SecretString::from(credential), credential_expires_at),
        params: ProvisioningParams::new(parsed_type, provider_url),
        runner_user,
        status: parsed_status,
        created_at,
        updated_at,
    };
    Ok(Target::from_persisted(data))
}

fn is_live_scope_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == LIVE_SCOPE_INDEX)
}
