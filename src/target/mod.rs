//! Autoscaling target registration.
//!
//! A target names an organization or repository on the hosting platform for
//! which ephemeral workers may be provisioned. This module admits new
//! targets, rejects duplicates, and resurrects soft-deleted ones in place.
//! It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
