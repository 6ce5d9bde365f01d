//! Scope classification for autoscaling targets.
//!
//! A scope is either an organization (`owner`) or a repository
//! (`owner/name`). Classification depends only on the number of slashes.

use super::TargetDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a raw scope string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Zero slashes: an organization name.
    Organization,
    /// Exactly one slash: an `owner/name` repository.
    Repository,
    /// Two or more slashes.
    Invalid,
}

impl ScopeKind {
    /// Classifies a raw scope string by slash count.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.matches('/').count() {
            0 => Self::Organization,
            1 => Self::Repository,
            _ => Self::Invalid,
        }
    }

    /// Returns the REST collection segment used by the platform API, or
    /// `None` for [`ScopeKind::Invalid`].
    #[must_use]
    pub const fn api_segment(self) -> Option<&'static str> {
        match self {
            Self::Organization => Some("orgs"),
            Self::Repository => Some("repos"),
            Self::Invalid => None,
        }
    }
}

/// Validated scope naming an organization or a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(String);

impl Scope {
    /// Creates a validated scope.
    ///
    /// Surrounding whitespace is trimmed. Scopes with more than one slash,
    /// with empty segments, or with characters outside `[A-Za-z0-9._-]` in
    /// a segment are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`TargetDomainError::EmptyScope`] for blank input,
    /// [`TargetDomainError::InvalidScope`] when the scope classifies as
    /// [`ScopeKind::Invalid`], or [`TargetDomainError::EmptyScopeSegment`]
    /// when either side of the slash is empty, or
    /// [`TargetDomainError::InvalidScopeCharacter`] for any other character.
    pub fn new(value: impl Into<String>) -> Result<Self, TargetDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TargetDomainError::EmptyScope);
        }
        if ScopeKind::classify(trimmed) == ScopeKind::Invalid {
            return Err(TargetDomainError::InvalidScope(raw));
        }
        if trimmed.split('/').any(|segment| segment.trim().is_empty()) {
            return Err(TargetDomainError::EmptyScopeSegment(raw));
        }
        if !trimmed
            .chars()
            .all(|c| c == '/' || is_name_character(c))
        {
            return Err(TargetDomainError::InvalidScopeCharacter(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the scope classification. Never [`ScopeKind::Invalid`].
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        ScopeKind::classify(&self.0)
    }

    /// Returns the owning organization or user.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(owner, _)| owner)
    }

    /// Returns the repository name for repository scopes.
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, name)| name)
    }

    /// Returns the scope as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const fn is_name_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

impl TryFrom<String> for Scope {
    type Error = TargetDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.0
    }
}

impl AsRef<str> for Scope {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
