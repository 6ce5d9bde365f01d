//! In-memory registration integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `registration_tests`: Create, conflict, resurrection, and concurrency

mod in_memory {
    pub mod helpers;

    mod registration_tests;
}
