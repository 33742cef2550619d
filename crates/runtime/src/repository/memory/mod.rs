//! In-memory repository implementations for testing and development.

mod profile;

pub use profile::InMemoryProfileRepo;
