//! `PostgreSQL` adapters for target registration persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTargetRepository, SCHEMA_SQL, TargetPgPool, build_pool};
