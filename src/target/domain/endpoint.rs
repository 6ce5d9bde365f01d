//! Platform host selection and API endpoint derivation.

use super::{ScopeKind, ScopeResolveError};
use std::fmt;
use url::Url;

/// Web address of the public hosting platform.
pub const PUBLIC_PLATFORM_URL: &str = "https://github.com";

/// REST API root of the public hosting platform.
pub const PUBLIC_API_URL: &str = "https://api.github.com";

/// The hosting platform a target lives on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlatformHost {
    /// The public cloud platform.
    #[default]
    Public,
    /// A self-hosted enterprise deployment reachable at the given URL.
    Enterprise(Url),
}

impl PlatformHost {
    /// Parses a configured platform URL.
    ///
    /// The public default (with or without a trailing slash) maps to
    /// [`PlatformHost::Public`]; anything else is an enterprise host.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeResolveError::MalformedHost`] when the value is not a URL.
    pub fn parse(raw: &str) -> Result<Self, ScopeResolveError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed == PUBLIC_PLATFORM_URL {
            return Ok(Self::Public);
        }
        Url::parse(trimmed)
            .map(Self::Enterprise)
            .map_err(|err| ScopeResolveError::MalformedHost {
                host: raw.to_owned(),
                reason: err.to_string(),
            })
    }

    /// Returns whether this is the public platform.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    /// Returns the enterprise host URL, or `None` for the public platform.
    #[must_use]
    pub const fn enterprise_url(&self) -> Option<&Url> {
        match self {
            Self::Public => None,
            Self::Enterprise(url) => Some(url),
        }
    }

    /// Returns the root of the versioned REST API used for App calls.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeResolveError::MalformedHost`] if the enterprise URL
    /// cannot carry a path.
    pub fn rest_api_root(&self) -> Result<Url, ScopeResolveError> {
        match self {
            Self::Public => Url::parse(PUBLIC_API_URL).map_err(|err| {
                ScopeResolveError::MalformedHost {
                    host: PUBLIC_API_URL.to_owned(),
                    reason: err.to_string(),
                }
            }),
            Self::Enterprise(url) => join_path(url, &["api", "v3"]),
        }
    }

    /// Appends path segments to [`PlatformHost::rest_api_root`].
    ///
    /// # Errors
    ///
    /// Returns [`ScopeResolveError::MalformedHost`] if the enterprise URL
    /// cannot carry a path.
    pub fn api_url(&self, segments: &[&str]) -> Result<Url, ScopeResolveError> {
        join_path(&self.rest_api_root()?, segments)
    }
}

impl fmt::Display for PlatformHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str(PUBLIC_PLATFORM_URL),
            Self::Enterprise(url) => f.write_str(url.as_str().trim_end_matches('/')),
        }
    }
}

/// Builds the API URL used to check that a scope exists.
///
/// - public: `https://api.github.com/{repos|orgs}/<scope>`
/// - enterprise: `<enterprise_host>/api/{repos|orgs}/<scope>`
///
/// # Errors
///
/// Returns [`ScopeResolveError::InvalidScope`] when the scope classifies as
/// invalid and [`ScopeResolveError::MalformedHost`] when enterprise mode is
/// requested with a missing or unparseable host.
pub fn endpoint_for(
    scope: &str,
    enterprise_host: Option<&str>,
    is_enterprise: bool,
) -> Result<Url, ScopeResolveError> {
    let host = resolve_host(enterprise_host, is_enterprise)?;
    endpoint_on(&host, scope)
}

/// Selects the platform host named by a request.
///
/// # Errors
///
/// Returns [`ScopeResolveError::MalformedHost`] when enterprise mode is
/// requested with a missing or unparseable host.
pub fn resolve_host(
    enterprise_host: Option<&str>,
    is_enterprise: bool,
) -> Result<PlatformHost, ScopeResolveError> {
    if !is_enterprise {
        return Ok(PlatformHost::Public);
    }
    let raw = enterprise_host.unwrap_or_default();
    Url::parse(raw.trim())
        .map(PlatformHost::Enterprise)
        .map_err(|err| ScopeResolveError::MalformedHost {
            host: raw.to_owned(),
            reason: err.to_string(),
        })
}

/// Builds the existence-check URL for a scope on an already resolved host.
///
/// # Errors
///
/// See [`endpoint_for`].
pub fn endpoint_on(host: &PlatformHost, scope: &str) -> Result<Url, ScopeResolveError> {
    let segment = ScopeKind::classify(scope)
        .api_segment()
        .ok_or_else(|| ScopeResolveError::InvalidScope(scope.to_owned()))?;
    let scope_segments: Vec<&str> = scope.split('/').collect();

    match host {
        PlatformHost::Public => {
            let base = Url::parse(PUBLIC_API_URL).map_err(|err| {
                ScopeResolveError::MalformedHost {
                    host: PUBLIC_API_URL.to_owned(),
                    reason: err.to_string(),
                }
            })?;
            let mut segments = vec![segment];
            segments.extend(scope_segments);
            join_path(&base, &segments)
        }
        PlatformHost::Enterprise(base) => {
            let mut segments = vec!["api", segment];
            segments.extend(scope_segments);
            join_path(base, &segments)
        }
    }
}

fn join_path(base: &Url, segments: &[&str]) -> Result<Url, ScopeResolveError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ScopeResolveError::MalformedHost {
            host: base.to_string(),
            reason: "URL cannot be a base".to_owned(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
