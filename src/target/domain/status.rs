//! Target lifecycle status.

use super::ParseTargetStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a registered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// The target is live; workers may be provisioned for it.
    Active,
    /// The target was soft-deleted and may be resurrected in place.
    Deleted,
}

impl TargetStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    /// Returns whether the status counts towards the one-live-record-per-scope
    /// invariant.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TargetStatus {
    type Error = ParseTargetStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseTargetStatusError(value.to_owned())),
        }
    }
}
