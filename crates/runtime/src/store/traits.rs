//! Document store contract consumed by the session layer.

use async_trait::async_trait;
use game_core::Patch;
use serde_json::Value;
use tokio::sync::watch;

use super::error::StoreResult;

/// Full document at a path, or `None` when absent.
pub type Snapshot = Option<Value>;

/// Action the substrate runs on its own once the registering connection is
/// lost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CleanupAction {
    /// Delete one field (a `/`-separated path) inside the document.
    RemoveField(String),
    /// Delete the whole document.
    RemoveDocument,
}

/// One client's connection to a replicated key-value store with
/// last-writer-wins field updates.
///
/// Every method is a suspension point. Implementations must apply each
/// `create`/`patch` atomically and deliver documents to subscribers in the
/// order writes were applied.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write an entire document at `path`, replacing whatever was there.
    async fn create(&self, path: &str, document: Value) -> StoreResult<()>;

    /// Apply all field updates of `patch` to the document at `path` in one
    /// step. Fails with `DocumentMissing` if the document does not exist.
    async fn patch(&self, path: &str, patch: &Patch) -> StoreResult<()>;

    /// Point-in-time fetch.
    async fn read(&self, path: &str) -> StoreResult<Snapshot>;

    /// Follow the document at `path`. The first [`Subscription::recv`]
    /// returns the current state immediately.
    async fn subscribe(&self, path: &str) -> StoreResult<Subscription>;

    /// Register `action` against `path` to run when this connection is lost.
    async fn register_disconnect_cleanup(
        &self,
        path: &str,
        action: CleanupAction,
    ) -> StoreResult<()>;

    /// Drop every cleanup this connection registered for `path`.
    async fn cancel_disconnect_cleanups(&self, path: &str) -> StoreResult<()>;

    /// Liveness keep-alive.
    async fn heartbeat(&self) -> StoreResult<()>;
}

/// Live view of one document.
///
/// Dropping the subscription, or calling [`unsubscribe`](Self::unsubscribe),
/// stops delivery.
pub struct Subscription {
    path: String,
    receiver: watch::Receiver<Snapshot>,
    primed: bool,
}

impl Subscription {
    pub fn new(path: impl Into<String>, receiver: watch::Receiver<Snapshot>) -> Self {
        Self {
            path: path.into(),
            receiver,
            primed: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next document state.
    ///
    /// The first call resolves immediately with the current state; later calls
    /// wait for a change. Intermediate states may be skipped under load, but
    /// the latest is always delivered. Returns `None` once the store has shut
    /// down. Cancel safe.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.receiver.borrow_and_update().clone());
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}
