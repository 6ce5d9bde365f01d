//! Runner registrar: admission control plane for autoscaling CI targets.
//!
//! A target is an organization or repository on the hosting platform for
//! which ephemeral workers may later be provisioned. This crate validates
//! registration requests against the platform, issues installation tokens
//! through the platform App, and persists one live record per scope.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`target`]: Target registration domain, ports, adapters, and services
//! - [`bootstrap`]: Worker-host bootstrap script rendering
//! - [`api`]: HTTP router
//! - [`config`]: Process configuration
//! - [`telemetry`]: Structured logging

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod target;
pub mod telemetry;
