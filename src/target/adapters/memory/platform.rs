//! In-memory hosting platform for registration tests.
//!
//! Implements both [`PlatformClient`] and [`AppInstallations`] against a
//! configurable set of scopes and installations, and counts every call so
//! tests can assert that malformed requests never reach the network.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::{Clock, DefaultClock};
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use url::Url;

use crate::target::{
    domain::{InstallationId, InstallationToken, PlatformHost, Scope},
    ports::{AppInstallations, PlatformClient, PlatformError, PlatformResult, RegisteredRunner},
};

/// Counters for calls made against an [`InMemoryPlatform`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCalls {
    /// Installation lookups.
    pub find_installation: usize,
    /// Installation trust checks.
    pub check_installation_trust: usize,
    /// Token exchanges.
    pub issue_installation_token: usize,
    /// Scope existence checks.
    pub check_scope_exists: usize,
    /// Runner listings.
    pub list_runners: usize,
}

impl PlatformCalls {
    /// Returns the total number of calls.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.find_installation
            + self.check_installation_trust
            + self.issue_installation_token
            + self.check_scope_exists
            + self.list_runners
    }
}

#[derive(Debug, Default)]
struct PlatformState {
    scopes: HashSet<String>,
    installations: HashMap<String, InstallationId>,
    untrusted: HashSet<InstallationId>,
    runners: HashMap<String, Vec<RegisteredRunner>>,
    existence_status: Option<u16>,
    listing_failure: Option<PlatformError>,
    issuance_failure: Option<PlatformError>,
    issued: usize,
    calls: PlatformCalls,
}

/// Thread-safe in-memory platform double.
#[derive(Debug, Clone)]
pub struct InMemoryPlatform {
    state: Arc<RwLock<PlatformState>>,
    token_expires_at: DateTime<Utc>,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    /// Creates a platform with no scopes and no installations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            token_expires_at: DefaultClock.utc() + Duration::hours(1),
        }
    }

    /// Registers a scope that exists and has the App installed.
    #[must_use]
    pub fn with_installed_scope(self, scope: &str, installation: InstallationId) -> Self {
        self.mutate(|state| {
            state.scopes.insert(scope.to_owned());
            state.installations.insert(scope.to_owned(), installation);
        });
        self
    }

    /// Registers a scope that exists but has no App installation.
    #[must_use]
    pub fn with_uninstalled_scope(self, scope: &str) -> Self {
        self.mutate(|state| {
            state.scopes.insert(scope.to_owned());
        });
        self
    }

    /// Records an App installation for a scope the platform does not know.
    #[must_use]
    pub fn with_installation_only(self, scope: &str, installation: InstallationId) -> Self {
        self.mutate(|state| {
            state.installations.insert(scope.to_owned(), installation);
        });
        self
    }

    /// Marks an installation as untrusted.
    #[must_use]
    pub fn with_untrusted_installation(self, installation: InstallationId) -> Self {
        self.mutate(|state| {
            state.untrusted.insert(installation);
        });
        self
    }

    /// Sets the runners listed for a scope.
    #[must_use]
    pub fn with_runners(self, scope: &str, runners: Vec<RegisteredRunner>) -> Self {
        self.mutate(|state| {
            state.runners.insert(scope.to_owned(), runners);
        });
        self
    }

    /// Forces every existence check to answer with `status`.
    #[must_use]
    pub fn with_existence_status(self, status: u16) -> Self {
        self.mutate(|state| state.existence_status = Some(status));
        self
    }

    /// Forces runner listings to fail.
    #[must_use]
    pub fn with_listing_failure(self, error: PlatformError) -> Self {
        self.mutate(|state| state.listing_failure = Some(error));
        self
    }

    /// Forces token exchanges to fail.
    #[must_use]
    pub fn with_issuance_failure(self, error: PlatformError) -> Self {
        self.mutate(|state| state.issuance_failure = Some(error));
        self
    }

    /// Returns a snapshot of the call counters.
    #[must_use]
    pub fn calls(&self) -> PlatformCalls {
        self.state
            .read()
            .map(|state| state.calls)
            .unwrap_or_default()
    }

    fn mutate(&self, f: impl FnOnce(&mut PlatformState)) {
        if let Ok(mut state) = self.state.write() {
            f(&mut state);
        }
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut PlatformState) -> PlatformResult<T>,
    ) -> PlatformResult<T> {
        let mut state = self
            .state
            .write()
            .map_err(|err| PlatformError::Client(err.to_string()))?;
        f(&mut state)
    }
}

fn scope_of(endpoint: &Url) -> Option<String> {
    let collected: Vec<&str> = endpoint
        .path_segments()?
        .skip_while(|segment| *segment != "repos" && *segment != "orgs")
        .skip(1)
        .collect();
    (!collected.is_empty()).then(|| collected.join("/"))
}

#[async_trait]
impl PlatformClient for InMemoryPlatform {
    async fn check_scope_exists(
        &self,
        endpoint: &Url,
        _credential: &SecretString,
    ) -> PlatformResult<()> {
        self.with_state(|state| {
            state.calls.check_scope_exists += 1;
            if let Some(status) = state.existence_status {
                return Err(PlatformError::UnexpectedStatus { status });
            }
            match scope_of(endpoint) {
                Some(scope) if state.scopes.contains(&scope) => Ok(()),
                _ => Err(PlatformError::NotFound),
            }
        })
    }

    async fn list_runners(
        &self,
        _host: &PlatformHost,
        scope: &Scope,
        _credential: &SecretString,
    ) -> PlatformResult<Vec<RegisteredRunner>> {
        self.with_state(|state| {
            state.calls.list_runners += 1;
            if let Some(error) = state.listing_failure.clone() {
                return Err(error);
            }
            Ok(state
                .runners
                .get(scope.as_str())
                .cloned()
                .unwrap_or_default())
        })
    }
}

#[async_trait]
impl AppInstallations for InMemoryPlatform {
    async fn find_installation(&self, scope: &Scope) -> PlatformResult<InstallationId> {
        self.with_state(|state| {
            state.calls.find_installation += 1;
            state
                .installations
                .get(scope.as_str())
                .copied()
                .ok_or(PlatformError::NotFound)
        })
    }

    async fn check_installation_trust(&self, installation: InstallationId) -> PlatformResult<()> {
        self.with_state(|state| {
            state.calls.check_installation_trust += 1;
            if state.untrusted.contains(&installation) {
                return Err(PlatformError::InstallationInvalid {
                    installation,
                    reason: "installation is not trusted".to_owned(),
                });
            }
            Ok(())
        })
    }

    async fn issue_installation_token(
        &self,
        installation: InstallationId,
        _scope: &Scope,
    ) -> PlatformResult<InstallationToken> {
        let expires_at = self.token_expires_at;
        self.with_state(|state| {
            state.calls.issue_installation_token += 1;
            if let Some(error) = state.issuance_failure.clone() {
                return Err(error);
            }
            state.issued += 1;
            let token = format!("ghs_memory_{installation}_{}", state.issued);
            Ok(InstallationToken::new(SecretString::from(token), expires_at))
        })
    }
}
