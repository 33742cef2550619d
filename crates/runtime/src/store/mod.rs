//! Store adapter layer.
//!
//! The session layer only talks to [`DocumentStore`]. The substrate behind it
//! is a replicated key-value store with whole-document subscriptions and
//! disconnect hooks; [`memory`] provides an in-process one with an explicit
//! liveness supervisor.

mod error;
pub mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{ConnectionId, LivenessSupervisor, MemoryConnection, MemoryStore};
pub use traits::{CleanupAction, DocumentStore, Snapshot, Subscription};
