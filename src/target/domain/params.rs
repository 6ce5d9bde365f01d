//! Provisioning parameters attached to a target and their merge policy.

use super::TargetDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute size requested for workers provisioned against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// Smallest size.
    #[serde(rename = "nano")]
    Nano,
    /// Micro size.
    #[serde(rename = "micro")]
    Micro,
    /// Small size.
    #[serde(rename = "small")]
    Small,
    /// Medium size.
    #[serde(rename = "medium")]
    Medium,
    /// Large size.
    #[serde(rename = "large")]
    Large,
    /// Extra large size.
    #[serde(rename = "xlarge")]
    XLarge,
    /// Twice extra large.
    #[serde(rename = "2xlarge")]
    XLarge2,
    /// Three times extra large.
    #[serde(rename = "3xlarge")]
    XLarge3,
    /// Four times extra large.
    #[serde(rename = "4xlarge")]
    XLarge4,
}

impl ResourceType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Micro => "micro",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::XLarge => "xlarge",
            Self::XLarge2 => "2xlarge",
            Self::XLarge3 => "3xlarge",
            Self::XLarge4 => "4xlarge",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ResourceType {
    type Error = TargetDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "nano" => Ok(Self::Nano),
            "micro" => Ok(Self::Micro),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "xlarge" => Ok(Self::XLarge),
            "2xlarge" => Ok(Self::XLarge2),
            "3xlarge" => Ok(Self::XLarge3),
            "4xlarge" => Ok(Self::XLarge4),
            _ => Err(TargetDomainError::UnknownResourceType(value.to_owned())),
        }
    }
}

/// Opaque configuration naming the compute backend for a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningParams {
    resource_type: Option<ResourceType>,
    provider_url: Option<String>,
}

impl ProvisioningParams {
    /// Creates parameters from already validated parts.
    #[must_use]
    pub const fn new(resource_type: Option<ResourceType>, provider_url: Option<String>) -> Self {
        Self {
            resource_type,
            provider_url,
        }
    }

    /// Parses raw request values.
    ///
    /// `None` means "not supplied". A supplied but blank value is rejected
    /// rather than read as "clear".
    ///
    /// # Errors
    ///
    /// Returns [`TargetDomainError::UnknownResourceType`] or
    /// [`TargetDomainError::BlankProviderUrl`].
    pub fn parse(
        resource_type: Option<&str>,
        provider_url: Option<&str>,
    ) -> Result<Self, TargetDomainError> {
        let parsed_type = resource_type.map(ResourceType::try_from).transpose()?;
        let parsed_url = provider_url
            .map(|raw| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Err(TargetDomainError::BlankProviderUrl)
                } else {
                    Ok(trimmed.to_owned())
                }
            })
            .transpose()?;
        Ok(Self::new(parsed_type, parsed_url))
    }

    /// Returns the resource type, if set.
    #[must_use]
    pub const fn resource_type(&self) -> Option<ResourceType> {
        self.resource_type
    }

    /// Returns the provider URL, if set.
    #[must_use]
    pub fn provider_url(&self) -> Option<&str> {
        self.provider_url.as_deref()
    }

    /// Computes the parameters to apply when resurrecting a target.
    #[must_use]
    pub fn merged_with(&self, requested: &Self, policy: ParamMergePolicy) -> Self {
        match policy {
            ParamMergePolicy::KeepWhenAbsent => Self {
                resource_type: requested.resource_type.or(self.resource_type),
                provider_url: requested
                    .provider_url
                    .clone()
                    .or_else(|| self.provider_url.clone()),
            },
            ParamMergePolicy::Replace => requested.clone(),
        }
    }
}

/// How requested provisioning parameters combine with stored ones when a
/// deleted target is resurrected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParamMergePolicy {
    /// Supplied values win; fields not supplied keep their stored value.
    #[default]
    KeepWhenAbsent,
    /// The requested parameters replace the stored ones wholesale, including
    /// absent fields.
    Replace,
}

impl ParamMergePolicy {
    /// Returns the configuration spelling of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepWhenAbsent => "keep-when-absent",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for ParamMergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
