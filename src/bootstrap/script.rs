//! Worker-host bootstrap script rendering.

use super::shell::shell_quote;
use crate::target::domain::{Scope, Target};
use minijinja::{Environment, context};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const RUNNER_SETUP_TEMPLATE: &str = include_str!("runner_setup.sh.j2");

/// Errors raised while rendering a bootstrap script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BootstrapError {
    /// The template engine rejected the template or its context.
    #[error("failed to render bootstrap script: {0}")]
    Render(String),
}

/// Values substituted into the worker-host bootstrap script.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Scope the worker registers against.
    pub scope: Scope,
    /// Enterprise host, or `None` for the public platform.
    pub enterprise_host: Option<String>,
    /// Token used to request a worker registration token.
    pub credential: SecretString,
    /// Account the worker runs as when the script executes as root.
    pub runner_user: Option<String>,
}

impl BootstrapConfig {
    /// Collects the bootstrap values stored on a target.
    #[must_use]
    pub fn from_target(target: &Target) -> Self {
        Self {
            scope: target.scope().clone(),
            enterprise_host: target.enterprise_host().map(str::to_owned),
            credential: target.credential().token().clone(),
            runner_user: target.runner_user().map(str::to_owned),
        }
    }
}

/// Renders the shell script that installs the latest worker agent, registers
/// it once against the scope, and runs a single job.
///
/// Every substituted value is shell-quoted. The output embeds the
/// credential and must be handled as a secret.
///
/// # Errors
///
/// Returns [`BootstrapError::Render`] if the template fails to render.
pub fn render_bootstrap_script(config: &BootstrapConfig) -> Result<String, BootstrapError> {
    let environment = Environment::new();
    let enterprise_host = config
        .enterprise_host
        .as_deref()
        .map(|host| host.trim_end_matches('/'))
        .unwrap_or_default();

    environment
        .render_str(
            RUNNER_SETUP_TEMPLATE,
            context! {
                scope => shell_quote(config.scope.as_str()),
                enterprise_host => shell_quote(enterprise_host),
                credential => shell_quote(config.credential.expose_secret()),
                runner_user => shell_quote(config.runner_user.as_deref().unwrap_or_default()),
            },
        )
        .map_err(|err| BootstrapError::Render(err.to_string()))
}
