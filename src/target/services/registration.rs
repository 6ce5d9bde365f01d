//! Registration state machine for autoscaling targets.
//!
//! Provides [`TargetRegistrationService`], which admits a new target or
//! transitions an existing one:
//!
//! - no record: create a new `Active` record
//! - `Active` record: reject as a conflict, no mutation
//! - `Deleted` record: resurrect in place, keeping its identifier

use super::{CredentialIssuer, RegistrationError, ScopeValidator, StorageStep};
use crate::target::{
    domain::{
        InstallationToken, NewTarget, ParamMergePolicy, PlatformHost, ProvisioningParams, Scope,
        Target, TargetDomainError, TargetId, TargetStatus, TargetView, endpoint_on, resolve_host,
    },
    ports::{AppInstallations, PlatformClient, TargetRepository, TargetRepositoryError},
};
use mockable::Clock;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

/// Request payload for registering an autoscaling target.
#[derive(Debug, Clone)]
pub struct RegisterTargetRequest {
    scope: String,
    credential: SecretString,
    enterprise_host: Option<String>,
    is_enterprise: bool,
    resource_type: Option<String>,
    provider_url: Option<String>,
    runner_user: Option<String>,
}

impl RegisterTargetRequest {
    /// Creates a request with the required scope and caller credential.
    #[must_use]
    pub fn new(scope: impl Into<String>, credential: SecretString) -> Self {
        Self {
            scope: scope.into(),
            credential,
            enterprise_host: None,
            is_enterprise: false,
            resource_type: None,
            provider_url: None,
            runner_user: None,
        }
    }

    /// Targets an enterprise deployment. `None` falls back to the configured
    /// enterprise host.
    #[must_use]
    pub fn with_enterprise(mut self, host: Option<String>) -> Self {
        self.is_enterprise = true;
        self.enterprise_host = host;
        self
    }

    /// Sets the requested resource type.
    #[must_use]
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Sets the requested provider URL.
    #[must_use]
    pub fn with_provider_url(mut self, provider_url: impl Into<String>) -> Self {
        self.provider_url = Some(provider_url.into());
        self
    }

    /// Sets the runner user.
    #[must_use]
    pub fn with_runner_user(mut self, runner_user: impl Into<String>) -> Self {
        self.runner_user = Some(runner_user.into());
        self
    }
}

/// Static settings of the registration service.
#[derive(Debug, Clone, Default)]
pub struct RegistrationSettings {
    /// Platform the deployment is configured against.
    pub platform: PlatformHost,
    /// Merge policy applied when resurrecting a deleted target.
    pub merge_policy: ParamMergePolicy,
}

/// Result type for registration service operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// A request that passed structural validation.
struct Admission {
    scope: Scope,
    host: PlatformHost,
    endpoint: Url,
    credential: SecretString,
    params: ProvisioningParams,
    runner_user: Option<String>,
}

/// Target registration orchestration service.
#[derive(Clone)]
pub struct TargetRegistrationService<R, P, A, C>
where
    R: TargetRepository,
    P: PlatformClient,
    A: AppInstallations,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    validator: ScopeValidator<P>,
    issuer: CredentialIssuer<A>,
    clock: Arc<C>,
    settings: RegistrationSettings,
}

impl<R, P, A, C> TargetRegistrationService<R, P, A, C>
where
    R: TargetRepository,
    P: PlatformClient,
    A: AppInstallations,
    C: Clock + Send + Sync,
{
    /// Creates a new registration service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        platform: Arc<P>,
        installations: Arc<A>,
        clock: Arc<C>,
        settings: RegistrationSettings,
    ) -> Self {
        Self {
            repository,
            validator: ScopeValidator::new(platform),
            issuer: CredentialIssuer::new(installations),
            clock,
            settings,
        }
    }

    /// Registers a target and returns the sanitized canonical record.
    ///
    /// Malformed input is rejected before any platform call. Platform calls
    /// are not retried. A resurrection stores the freshly issued token and
    /// the merged parameters in a single write.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`]; use [`RegistrationError::kind`] to
    /// classify it.
    pub async fn register(&self, request: RegisterTargetRequest) -> RegistrationResult<TargetView> {
        let admission = self.admit(request)?;
        let scope = &admission.scope;

        let installation = self
            .issuer
            .locate_installation(scope)
            .await
            .map_err(RegistrationError::AppInstallation)?;
        self.issuer
            .check_installation_trust(installation)
            .await
            .map_err(RegistrationError::AppInstallation)?;

        let token = self
            .issuer
            .issue_installation_token(installation, scope)
            .await
            .map_err(RegistrationError::Issuance)?;

        self.validator
            .validate(
                &admission.host,
                scope,
                &admission.endpoint,
                &admission.credential,
            )
            .await?;

        let existing = self
            .repository
            .find_by_scope(scope)
            .await
            .map_err(|source| storage_error(StorageStep::Lookup, scope, source))?;

        let target_id = match existing {
            None => self.create(&admission, token).await?,
            Some(current) if current.status().is_live() => {
                warn!(%scope, status = %current.status(), "scope is already registered");
                return Err(RegistrationError::Conflict {
                    scope: scope.clone(),
                    status: current.status(),
                });
            }
            Some(deleted) => self.resurrect(&deleted, &admission.params, token).await?,
        };

        let stored = self
            .repository
            .find_by_id(target_id)
            .await
            .and_then(|found| found.ok_or(TargetRepositoryError::NotFound(target_id)))
            .map_err(|source| storage_error(StorageStep::Refetch, scope, source))?;

        info!(%scope, target_id = %stored.id(), "target registered");
        Ok(TargetView::from(&stored))
    }

    /// Finds the sanitized record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Lookup`] when the store fails.
    pub async fn find(&self, id: TargetId) -> RegistrationResult<Option<TargetView>> {
        let found = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|source| RegistrationError::Lookup { id, source })?;
        Ok(found.as_ref().map(TargetView::from))
    }

    fn admit(&self, request: RegisterTargetRequest) -> RegistrationResult<Admission> {
        let RegisterTargetRequest {
            scope,
            credential,
            enterprise_host,
            is_enterprise,
            resource_type,
            provider_url,
            runner_user,
        } = request;

        let parsed_scope = Scope::new(scope)?;
        if credential.expose_secret().trim().is_empty() {
            return Err(TargetDomainError::EmptyCredential.into());
        }
        let params = ProvisioningParams::parse(resource_type.as_deref(), provider_url.as_deref())?;
        let parsed_runner_user = runner_user
            .map(|user| {
                let trimmed = user.trim();
                if trimmed.is_empty() {
                    Err(TargetDomainError::BlankRunnerUser)
                } else {
                    Ok(trimmed.to_owned())
                }
            })
            .transpose()?;

        let supplied_host = enterprise_host.or_else(|| {
            self.settings
                .platform
                .enterprise_url()
                .map(ToString::to_string)
        });
        let host = resolve_host(supplied_host.as_deref(), is_enterprise)?;
        let endpoint = endpoint_on(&host, parsed_scope.as_str())?;

        Ok(Admission {
            scope: parsed_scope,
            host,
            endpoint,
            credential,
            params,
            runner_user: parsed_runner_user,
        })
    }

    async fn create(
        &self,
        admission: &Admission,
        token: InstallationToken,
    ) -> RegistrationResult<TargetId> {
        let target = Target::new(
            NewTarget {
                scope: admission.scope.clone(),
                platform: self.settings.platform.clone(),
                credential: token,
                params: admission.params.clone(),
                runner_user: admission.runner_user.clone(),
            },
            &*self.clock,
        );

        match self.repository.create(&target).await {
            Ok(()) => {
                info!(scope = %admission.scope, target_id = %target.id(), "created target");
                Ok(target.id())
            }
            Err(TargetRepositoryError::DuplicateScope(scope)) => {
                warn!(%scope, "concurrent registration created the scope first");
                Err(RegistrationError::Conflict {
                    scope,
                    status: TargetStatus::Active,
                })
            }
            Err(source) => Err(storage_error(StorageStep::Create, &admission.scope, source)),
        }
    }

    async fn resurrect(
        &self,
        deleted: &Target,
        requested: &ProvisioningParams,
        token: InstallationToken,
    ) -> RegistrationResult<TargetId> {
        let scope = deleted.scope();
        let merged = deleted
            .params()
            .merged_with(requested, self.settings.merge_policy);

        self.repository
            .resurrect(deleted.id(), &token, &merged, self.clock.utc())
            .await
            .map_err(|source| match source {
                TargetRepositoryError::NotDeleted(id) => {
                    warn!(%scope, target_id = %id, "target was resurrected concurrently");
                    RegistrationError::Conflict {
                        scope: scope.clone(),
                        status: TargetStatus::Active,
                    }
                }
                TargetRepositoryError::DuplicateScope(contested) => RegistrationError::Conflict {
                    scope: contested,
                    status: TargetStatus::Active,
                },
                other => storage_error(StorageStep::Resurrect, scope, other),
            })?;

        info!(
            %scope,
            target_id = %deleted.id(),
            merge_policy = %self.settings.merge_policy,
            "resurrected deleted target"
        );
        Ok(deleted.id())
    }
}

fn storage_error(
    step: StorageStep,
    scope: &Scope,
    source: TargetRepositoryError,
) -> RegistrationError {
    error!(%scope, %step, error = %source, "storage call failed");
    RegistrationError::Storage {
        step,
        scope: scope.clone(),
        source,
    }
}
