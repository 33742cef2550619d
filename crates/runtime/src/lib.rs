//! Async coordination layer for shared slip sessions.
//!
//! `game-core` decides what a command does; this crate gets it to every
//! participant. It defines the document store contract the session layer is
//! written against, an in-process substrate that implements it, the per-client
//! context that creates and joins sessions, and the background workers that
//! keep a session healthy.
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes [`SessionClient`] and [`SessionHandle`]
//! - [`store`] holds the [`DocumentStore`] trait and the in-memory substrate
//! - [`repository`] persists the local profile of joined sessions
//! - [`config`] loads tunables from the environment
//! - `workers` runs the host watcher and heartbeat behind each handle
pub mod api;
pub mod config;
pub mod repository;
pub mod store;

mod workers;

pub use api::{ClientError, Result, SessionClient, SessionHandle, SessionUpdates};
pub use config::{ClientConfig, StoreConfig};
pub use repository::{
    FileProfileRepository, InMemoryProfileRepo, JoinedSession, ProfileRepository,
    RepositoryError,
};
pub use store::{
    CleanupAction, ConnectionId, DocumentStore, LivenessSupervisor, MemoryConnection,
    MemoryStore, Snapshot, StoreError, StoreResult, Subscription,
};
