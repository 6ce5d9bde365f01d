//! Port contracts for target registration.
//!
//! Ports define infrastructure-agnostic interfaces used by the registration
//! services.

mod platform;
pub mod repository;

#[cfg(test)]
pub use platform::{MockAppInstallations, MockPlatformClient};
pub use platform::{
    AppInstallations, PlatformClient, PlatformError, PlatformResult, RegisteredRunner,
};
pub use repository::{TargetRepository, TargetRepositoryError, TargetRepositoryResult};
