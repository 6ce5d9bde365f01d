//! Error types for target domain validation, parsing, and scope resolution.

use super::TargetId;
use thiserror::Error;

/// Errors returned while constructing target domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetDomainError {
    /// The scope is empty after trimming.
    #[error("scope must not be empty")]
    EmptyScope,

    /// The scope has more than one slash.
    #[error("invalid scope '{0}', expected owner or owner/repo")]
    InvalidScope(String),

    /// One of the scope segments is empty (for example `owner/`).
    #[error("scope '{0}' contains an empty segment")]
    EmptyScopeSegment(String),

    /// A scope segment contains a character outside `[A-Za-z0-9._-]`.
    #[error("scope {0:?} may only contain letters, digits, '.', '_' and '-'")]
    InvalidScopeCharacter(String),

    /// The caller-supplied credential is empty.
    #[error("credential must not be empty")]
    EmptyCredential,

    /// The resource type is not one of the supported sizes.
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    /// The provider URL was supplied but is blank.
    #[error("provider URL must not be blank when supplied")]
    BlankProviderUrl,

    /// The runner user was supplied but is blank.
    #[error("runner user must not be blank when supplied")]
    BlankRunnerUser,

    /// Only a deleted target can be resurrected.
    #[error("target {0} is not deleted")]
    NotDeleted(TargetId),
}

/// Errors returned while deriving the platform endpoint for a scope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScopeResolveError {
    /// The scope does not classify as an organization or a repository.
    #[error("failed to detect a valid scope from '{0}'")]
    InvalidScope(String),

    /// The enterprise host is missing or does not parse as a URL.
    #[error("malformed enterprise host '{host}': {reason}")]
    MalformedHost {
        /// Host value as supplied.
        host: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Error returned while parsing a target status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown target status: {0}")]
pub struct ParseTargetStatusError(pub String);
