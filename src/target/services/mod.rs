//! Application services for target registration.

mod error;
mod issuer;
mod registration;
mod validator;

pub use error::{RegistrationError, RegistrationErrorKind, StorageStep};
pub use issuer::{CredentialIssuer, IssuerError};
pub use registration::{
    RegisterTargetRequest, RegistrationResult, RegistrationSettings, TargetRegistrationService,
};
pub use validator::{ScopeValidationError, ScopeValidator};
