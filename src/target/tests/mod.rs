//! Unit tests for the target module.

mod clock;
mod domain_tests;
