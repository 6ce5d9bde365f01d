//! Process configuration: command-line flags with environment fallbacks.

use crate::target::domain::{
    PUBLIC_PLATFORM_URL, ParamMergePolicy, PlatformHost, ScopeResolveError,
};
use crate::telemetry::LogFormat;
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Merge policy spelling accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MergePolicyArg {
    /// Keep stored values for fields the request omits.
    #[default]
    KeepWhenAbsent,
    /// Replace stored values wholesale.
    Replace,
}

impl From<MergePolicyArg> for ParamMergePolicy {
    fn from(value: MergePolicyArg) -> Self {
        match value {
            MergePolicyArg::KeepWhenAbsent => Self::KeepWhenAbsent,
            MergePolicyArg::Replace => Self::Replace,
        }
    }
}

/// Command-line arguments of `registrard`.
#[derive(Debug, Clone, Parser)]
#[command(name = "registrard", about = "Autoscaling target registration service")]
pub struct Args {
    /// Socket address to listen on.
    #[arg(long, env = "REGISTRAR_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Hosting platform URL; anything but the public default is an
    /// enterprise deployment.
    #[arg(long, env = "GITHUB_URL", default_value = PUBLIC_PLATFORM_URL)]
    pub github_url: String,

    /// App identifier.
    #[arg(long, env = "GITHUB_APP_ID")]
    pub app_id: String,

    /// PEM file holding the App private key.
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY_PATH")]
    pub app_private_key_path: PathBuf,

    /// `PostgreSQL` connection URL. Targets are kept in memory when absent.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Deadline for one registration request, in seconds.
    #[arg(long, env = "REGISTRAR_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// How stored parameters merge with a resurrecting request.
    #[arg(long, env = "REGISTRAR_PARAM_MERGE", value_enum, default_value_t)]
    pub param_merge: MergePolicyArg,

    /// Log output format.
    #[arg(long, env = "REGISTRAR_LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,
}

/// Errors raised while validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform URL does not parse.
    #[error("invalid platform URL: {0}")]
    PlatformUrl(#[from] ScopeResolveError),

    /// The App identifier is blank.
    #[error("app id must not be empty")]
    EmptyAppId,

    /// The App private key file could not be read.
    #[error("failed to read app private key from {path}: {source}")]
    UnreadablePrivateKey {
        /// Configured key path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The App private key file is empty.
    #[error("app private key at {0} is empty")]
    EmptyPrivateKey(PathBuf),

    /// The request deadline is zero.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    /// Socket address to listen on.
    pub listen: SocketAddr,
    /// Configured hosting platform.
    pub platform: PlatformHost,
    /// App identifier.
    pub app_id: String,
    /// App private key in PEM form.
    pub app_private_key: SecretString,
    /// `PostgreSQL` URL, or `None` for the in-memory store.
    pub database_url: Option<SecretString>,
    /// Deadline for one registration request.
    pub request_timeout: Duration,
    /// Merge policy for resurrection.
    pub merge_policy: ParamMergePolicy,
    /// Log output format.
    pub log_format: LogFormat,
}

impl RegistrarConfig {
    /// Validates arguments and reads the App private key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable platform URL, a blank App
    /// id, an unreadable or empty key file, or a zero timeout.
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let Args {
            listen,
            github_url,
            app_id,
            app_private_key_path,
            database_url,
            request_timeout_secs,
            param_merge,
            log_format,
        } = args;

        let platform = PlatformHost::parse(&github_url)?;
        let trimmed_app_id = app_id.trim();
        if trimmed_app_id.is_empty() {
            return Err(ConfigError::EmptyAppId);
        }
        if request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let app_private_key = read_private_key(app_private_key_path)?;

        Ok(Self {
            listen,
            platform,
            app_id: trimmed_app_id.to_owned(),
            app_private_key,
            database_url: database_url.map(SecretString::from),
            request_timeout: Duration::from_secs(request_timeout_secs),
            merge_policy: param_merge.into(),
            log_format,
        })
    }
}

fn read_private_key(path: PathBuf) -> Result<SecretString, ConfigError> {
    let key = match std::fs::read_to_string(&path) {
        Ok(contents) => SecretString::from(contents),
        Err(source) => return Err(ConfigError::UnreadablePrivateKey { path, source }),
    };
    if key.expose_secret().trim().is_empty() {
        return Err(ConfigError::EmptyPrivateKey(path));
    }
    Ok(key)
}
