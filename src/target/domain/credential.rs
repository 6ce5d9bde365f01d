//! Short-lived access credential stored with a target.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

/// An installation access token and its authoritative expiry.
///
/// The token is held as a [`SecretString`], so `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct InstallationToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl InstallationToken {
    /// Wraps a token issued by the platform.
    #[must_use]
    pub const fn new(token: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Returns the secret token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// Returns the expiry reported by the platform.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl PartialEq for InstallationToken {
    fn eq(&self, other: &Self) -> bool {
        self.expires_at == other.expires_at
            && self.token.expose_secret() == other.token.expose_secret()
    }
}

impl Eq for InstallationToken {}
