//! Shared fixtures for in-memory registration integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use runner_registrar::target::{
    adapters::memory::{InMemoryPlatform, InMemoryTargetRepository},
    domain::InstallationId,
    services::{RegisterTargetRequest, RegistrationSettings, TargetRegistrationService},
};
use secrecy::SecretString;

/// Service type wired entirely to in-memory adapters.
pub type TestService = TargetRegistrationService<
    InMemoryTargetRepository,
    InMemoryPlatform,
    InMemoryPlatform,
    DefaultClock,
>;

/// Service plus handles on the adapters it was built from.
pub struct Registrar {
    /// Service under test.
    pub service: TestService,
    /// Backing repository.
    pub repository: Arc<InMemoryTargetRepository>,
    /// Backing platform double.
    pub platform: Arc<InMemoryPlatform>,
}

/// Builds a service over `platform` with the given settings.
#[must_use]
pub fn registrar_with(platform: InMemoryPlatform, settings: RegistrationSettings) -> Registrar {
    let repository = Arc::new(InMemoryTargetRepository::new());
    let shared_platform = Arc::new(platform);
    let service = TargetRegistrationService::new(
        Arc::clone(&repository),
        Arc::clone(&shared_platform),
        Arc::clone(&shared_platform),
        Arc::new(DefaultClock),
        settings,
    );
    Registrar {
        service,
        repository,
        platform: shared_platform,
    }
}

/// Platform where `octo/app` and `octo` exist and have the App installed.
#[must_use]
pub fn installed_platform() -> InMemoryPlatform {
    InMemoryPlatform::new()
        .with_installed_scope("octo/app", InstallationId::new(41))
        .with_installed_scope("octo", InstallationId::new(42))
}

/// Provides a registrar over [`installed_platform`] with default settings.
#[fixture]
pub fn registrar() -> Registrar {
    registrar_with(installed_platform(), RegistrationSettings::default())
}

/// Builds a request for `scope` with a fixed caller credential.
#[must_use]
pub fn request(scope: &str) -> RegisterTargetRequest {
    RegisterTargetRequest::new(scope, SecretString::from("ghp_integration".to_owned()))
}
