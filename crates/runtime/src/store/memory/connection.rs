use async_trait::async_trait;
use game_core::Patch;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{Cleanup, ConnectionId, ConnectionStatus, MemoryStore};
use crate::store::{
    CleanupAction, DocumentStore, Snapshot, StoreError, StoreResult, Subscription,
};

/// One client's view of a [`MemoryStore`].
///
/// Clones share the connection identity, so a handle and its background
/// workers all count as the same client for liveness.
#[derive(Clone)]
pub struct MemoryConnection {
    id: ConnectionId,
    store: MemoryStore,
}

impl MemoryConnection {
    pub(super) fn new(id: ConnectionId, store: MemoryStore) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn is_live(&self) -> bool {
        self.store.ensure_live(self.id).is_ok()
    }

    /// Graceful close: the store runs this connection's cleanups now.
    pub fn disconnect(&self) {
        info!(id = %self.id, "connection closed");
        self.store.expire(self.id);
    }

    /// Simulates an abrupt network loss. Every call fails with
    /// [`StoreError::Disconnected`] from now on, and the cleanups only run
    /// once the liveness supervisor notices the silence.
    pub fn sever(&self) {
        let severed = self.store.with_connection(self.id, |state| {
            if state.status == ConnectionStatus::Live {
                state.status = ConnectionStatus::Severed;
            }
            Ok(())
        });
        if severed.is_ok() {
            info!(id = %self.id, "connection severed");
        }
    }

    fn begin_write(&self) -> StoreResult<()> {
        self.store.ensure_live(self.id)?;
        if self.store.take_injected_failure() {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryConnection {
    async fn create(&self, path: &str, document: Value) -> StoreResult<()> {
        self.begin_write()?;
        let tx = self.store.document(path)?;
        tx.send_replace(Some(document));
        debug!(id = %self.id, path, "document created");
        Ok(())
    }

    async fn patch(&self, path: &str, patch: &Patch) -> StoreResult<()> {
        self.begin_write()?;
        patch.validate()?;
        if patch.is_empty() {
            return Ok(());
        }

        let tx = self
            .store
            .existing_document(path)
            .ok_or_else(|| StoreError::DocumentMissing(path.to_string()))?;

        let mut outcome = Ok(());
        tx.send_if_modified(|snapshot| match snapshot {
            Some(document) => match patch.apply(document) {
                Ok(()) => true,
                Err(err) => {
                    outcome = Err(StoreError::from(err));
                    false
                }
            },
            None => {
                outcome = Err(StoreError::DocumentMissing(path.to_string()));
                false
            }
        });
        outcome?;

        debug!(id = %self.id, path, updates = patch.len(), "document patched");
        Ok(())
    }

    async fn read(&self, path: &str) -> StoreResult<Snapshot> {
        self.store.ensure_live(self.id)?;
        Ok(self
            .store
            .existing_document(path)
            .and_then(|tx| tx.borrow().clone()))
    }

    async fn subscribe(&self, path: &str) -> StoreResult<Subscription> {
        self.store.ensure_live(self.id)?;
        let tx = self.store.document(path)?;
        Ok(Subscription::new(path, tx.subscribe()))
    }

    async fn register_disconnect_cleanup(
        &self,
        path: &str,
        action: CleanupAction,
    ) -> StoreResult<()> {
        self.store.with_connection(self.id, |state| {
            if state.status != ConnectionStatus::Live {
                return Err(StoreError::Disconnected);
            }
            state.cleanups.push(Cleanup {
                path: path.to_string(),
                action,
            });
            Ok(())
        })
    }

    async fn cancel_disconnect_cleanups(&self, path: &str) -> StoreResult<()> {
        self.store.with_connection(self.id, |state| {
            if state.status != ConnectionStatus::Live {
                return Err(StoreError::Disconnected);
            }
            state.cleanups.retain(|cleanup| cleanup.path != path);
            Ok(())
        })
    }

    async fn heartbeat(&self) -> StoreResult<()> {
        self.store.with_connection(self.id, |state| {
            if state.status != ConnectionStatus::Live {
                return Err(StoreError::Disconnected);
            }
            state.last_seen = Instant::now();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::config::StoreConfig;

    fn store() -> MemoryStore {
        MemoryStore::new(StoreConfig {
            liveness_timeout: Duration::from_millis(500),
            sweep_interval: Duration::from_millis(100),
        })
    }

    #[tokio::test]
    async fn patch_applies_every_update_atomically() {
        let store = store();
        let conn = store.connect().unwrap();
        conn.create("doc", json!({ "a": 1 })).await.unwrap();

        let patch = Patch::new().set("a", 2).set("b/c", "x");
        conn.patch("doc", &patch).await.unwrap();

        assert_eq!(
            conn.read("doc").await.unwrap(),
            Some(json!({ "a": 2, "b": { "c": "x" } }))
        );
    }

    #[tokio::test]
    async fn patch_on_missing_document_fails() {
        let store = store();
        let conn = store.connect().unwrap();

        let err = conn
            .patch("nowhere", &Patch::new().set("a", 1))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DocumentMissing("nowhere".into()));
        assert_eq!(conn.read("nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscription_delivers_current_state_first() {
        let store = store();
        let conn = store.connect().unwrap();
        conn.create("doc", json!({ "n": 0 })).await.unwrap();

        let mut sub = conn.subscribe("doc").await.unwrap();
        assert_eq!(sub.recv().await, Some(Some(json!({ "n": 0 }))));

        conn.patch("doc", &Patch::new().set("n", 1)).await.unwrap();
        assert_eq!(sub.recv().await, Some(Some(json!({ "n": 1 }))));
    }

    #[tokio::test]
    async fn subscription_to_absent_document_sees_later_create() {
        let store = store();
        let conn = store.connect().unwrap();

        let mut sub = conn.subscribe("doc").await.unwrap();
        assert_eq!(sub.recv().await, Some(None));

        conn.create("doc", json!({})).await.unwrap();
        assert_eq!(sub.recv().await, Some(Some(json!({}))));
    }

    #[tokio::test]
    async fn graceful_disconnect_runs_cleanups_immediately() {
        let store = store();
        let alice = store.connect().unwrap();
        let bob = store.connect().unwrap();
        bob.create("doc", json!({ "players": { "a": 1, "b": 2 } }))
            .await
            .unwrap();

        alice
            .register_disconnect_cleanup("doc", CleanupAction::RemoveField("players/a".into()))
            .await
            .unwrap();
        alice.disconnect();

        assert_eq!(
            bob.read("doc").await.unwrap(),
            Some(json!({ "players": { "b": 2 } }))
        );
        assert_eq!(alice.heartbeat().await, Err(StoreError::Disconnected));
        assert!(!alice.is_live());
        assert_eq!(store.live_connections(), 1);
    }

    #[tokio::test]
    async fn sweep_drops_unwatched_absent_documents() {
        let store = store();
        let conn = store.connect().unwrap();
        conn.create("kept", json!({})).await.unwrap();
        let watched = conn.subscribe("watched").await.unwrap();
        drop(conn.subscribe("dropped").await.unwrap());

        assert_eq!(store.sweep(), 0);
        assert_eq!(store.document_slots(), 2);

        drop(watched);
        store.sweep();
        assert_eq!(store.document_slots(), 1);
        assert_eq!(store.peek("kept"), Some(json!({})));
    }

    #[tokio::test]
    async fn cancelled_cleanups_do_not_run() {
        let store = store();
        let conn = store.connect().unwrap();
        let other = store.connect().unwrap();
        other.create("doc", json!({ "x": 1 })).await.unwrap();

        conn.register_disconnect_cleanup("doc", CleanupAction::RemoveDocument)
            .await
            .unwrap();
        conn.cancel_disconnect_cleanups("doc").await.unwrap();
        conn.disconnect();

        assert_eq!(other.read("doc").await.unwrap(), Some(json!({ "x": 1 })));
    }

    #[tokio::test(start_paused = true)]
    async fn severed_connection_is_swept_after_timeout() {
        let store = store();
        let conn = store.connect().unwrap();
        let other = store.connect().unwrap();
        other.create("doc", json!({ "p": { "me": true } })).await.unwrap();
        conn.register_disconnect_cleanup("doc", CleanupAction::RemoveField("p/me".into()))
            .await
            .unwrap();

        conn.sever();
        assert_eq!(conn.read("doc").await, Err(StoreError::Disconnected));

        // Still within the timeout: nothing happens.
        tokio::time::advance(Duration::from_millis(300)).await;
        other.heartbeat().await.unwrap();
        assert_eq!(store.sweep(), 0);

        tokio::time::advance(Duration::from_millis(300)).await;
        other.heartbeat().await.unwrap();
        assert_eq!(store.sweep(), 1);
        assert_eq!(other.read("doc").await.unwrap(), Some(json!({ "p": {} })));
        assert_eq!(store.live_connections(), 1);
    }

    #[tokio::test]
    async fn injected_failures_affect_only_the_requested_writes() {
        let store = store();
        let conn = store.connect().unwrap();
        conn.create("doc", json!({})).await.unwrap();

        store.fail_next_writes(1);
        let err = conn.patch("doc", &Patch::new().set("a", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        conn.patch("doc", &Patch::new().set("a", 1)).await.unwrap();
        assert_eq!(store.peek("doc"), Some(json!({ "a": 1 })));
    }
}
