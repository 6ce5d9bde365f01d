//! Shared world state for target registration BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use runner_registrar::target::{
    adapters::memory::{InMemoryPlatform, InMemoryTargetRepository},
    domain::{TargetId, TargetView},
    services::{
        RegisterTargetRequest, RegistrationError, RegistrationSettings, TargetRegistrationService,
    },
};
use secrecy::SecretString;

/// Service type used by the BDD world.
pub type TestRegistrationService = TargetRegistrationService<
    InMemoryTargetRepository,
    InMemoryPlatform,
    InMemoryPlatform,
    DefaultClock,
>;

/// Scenario world for target registration behaviour tests.
pub struct RegistrationWorld {
    /// Platform double the service is wired to once built.
    pub platform: InMemoryPlatform,
    /// Backing repository.
    pub repository: Arc<InMemoryTargetRepository>,
    /// Identifier of a record seeded by a given step.
    pub seeded_id: Option<TargetId>,
    /// Result of the last registration attempt.
    pub last_result: Option<Result<TargetView, RegistrationError>>,
}

impl RegistrationWorld {
    /// Creates a world with an empty platform and store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            platform: InMemoryPlatform::new(),
            repository: Arc::new(InMemoryTargetRepository::new()),
            seeded_id: None,
            last_result: None,
        }
    }

    /// Builds a service over the world's current platform and store.
    ///
    /// The platform double shares its state across clones, so call counters
    /// stay visible through [`RegistrationWorld::platform`].
    #[must_use]
    pub fn service(&self) -> TestRegistrationService {
        let platform = Arc::new(self.platform.clone());
        TargetRegistrationService::new(
            Arc::clone(&self.repository),
            Arc::clone(&platform),
            platform,
            Arc::new(DefaultClock),
            RegistrationSettings::default(),
        )
    }

    /// Returns the last registration result or an error if none ran.
    ///
    /// # Errors
    ///
    /// Returns an error when no registration was attempted.
    pub fn last_result(&self) -> Result<&Result<TargetView, RegistrationError>, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing registration result in scenario world"))
    }
}

impl Default for RegistrationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RegistrationWorld {
    RegistrationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds a request for `scope` with a fixed caller credential.
pub fn build_request(scope: &str) -> RegisterTargetRequest {
    RegisterTargetRequest::new(scope, SecretString::from("ghp_scenario".to_owned()))
}
