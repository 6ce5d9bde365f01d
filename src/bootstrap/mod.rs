//! Worker-host bootstrap script generation.
//!
//! Rendering is a pure function of a [`BootstrapConfig`]: values are
//! substituted into a fixed template and nothing else branches on them.

mod script;
mod shell;

pub use script::{BootstrapConfig, BootstrapError, render_bootstrap_script};
pub use shell::shell_quote;
