//! Repository layer for data kept on the local device.
//!
//! The shared session document lives in the document store; the only thing a
//! client persists locally is which sessions it has joined and under which
//! identity, so it can pick a session back up after a restart.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileProfileRepository;
pub use memory::InMemoryProfileRepo;
pub use traits::{JoinedSession, ProfileRepository};
