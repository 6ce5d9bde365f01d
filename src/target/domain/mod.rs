//! Domain model for autoscaling target registration.
//!
//! The target domain models scope classification and endpoint derivation,
//! the persisted registration record, and its lifecycle status. All
//! infrastructure concerns are kept outside the domain boundary.

mod credential;
mod endpoint;
mod error;
mod ids;
mod params;
mod scope;
mod status;
mod target;
mod view;

pub use credential::InstallationToken;
pub use endpoint::{
    PUBLIC_API_URL, PUBLIC_PLATFORM_URL, PlatformHost, endpoint_for, endpoint_on, resolve_host,
};
pub use error::{ParseTargetStatusError, ScopeResolveError, TargetDomainError};
pub use ids::{InstallationId, TargetId};
pub use params::{ParamMergePolicy, ProvisioningParams, ResourceType};
pub use scope::{Scope, ScopeKind};
pub use status::TargetStatus;
pub use target::{NewTarget, PersistedTargetData, Target};
pub use view::TargetView;
