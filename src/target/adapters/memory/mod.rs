//! In-memory adapters for target registration.

mod platform;
mod repository;

pub use platform::{InMemoryPlatform, PlatformCalls};
pub use repository::InMemoryTargetRepository;
