//! Adapter implementations for target registration ports.

pub mod github;
pub mod memory;
pub mod postgres;
