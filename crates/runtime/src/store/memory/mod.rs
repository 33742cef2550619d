//! In-process document substrate.
//!
//! Documents live in `watch` channels, one per path, so every write is
//! delivered to subscribers as a full snapshot in application order. Each
//! client talks to the store through its own [`MemoryConnection`]; the store
//! tracks when each connection was last heard from and, once the
//! [`LivenessSupervisor`] declares one lost, runs the cleanups it registered
//! and forgets the connection.

mod connection;
mod supervisor;

pub use connection::MemoryConnection;
pub use supervisor::LivenessSupervisor;

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use game_core::Patch;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{CleanupAction, Snapshot, StoreError, StoreResult};
use crate::config::StoreConfig;

/// Identifies one client connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConnectionStatus {
    /// Heartbeats accepted, writes allowed.
    Live,
    /// Network gone from the client's side; the store has not noticed yet.
    Severed,
}

#[derive(Clone, Debug)]
struct Cleanup {
    path: String,
    action: CleanupAction,
}

#[derive(Debug)]
struct ConnectionState {
    status: ConnectionStatus,
    last_seen: Instant,
    cleanups: Vec<Cleanup>,
}

struct Inner {
    config: StoreConfig,
    documents: RwLock<HashMap<String, Arc<watch::Sender<Snapshot>>>>,
    connections: RwLock<HashMap<ConnectionId, ConnectionState>>,
    next_connection: AtomicU64,
    injected_failures: AtomicUsize,
}

/// Shared substrate. Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                documents: RwLock::new(HashMap::new()),
                connections: RwLock::new(HashMap::new()),
                next_connection: AtomicU64::new(1),
                injected_failures: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Opens a new live connection.
    pub fn connect(&self) -> StoreResult<MemoryConnection> {
        let id = ConnectionId(self.inner.next_connection.fetch_add(1, Ordering::Relaxed));
        let mut connections = self
            .inner
            .connections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        connections.insert(
            id,
            ConnectionState {
                status: ConnectionStatus::Live,
                last_seen: Instant::now(),
                cleanups: Vec::new(),
            },
        );
        debug!(%id, "connection opened");
        Ok(MemoryConnection::new(id, self.clone()))
    }

    /// Spawns the background task that expires silent connections.
    pub fn start_supervisor(&self) -> LivenessSupervisor {
        LivenessSupervisor::spawn(self.clone())
    }

    /// Makes the next `count` client writes fail with
    /// [`StoreError::Unavailable`]. Cleanups run by the store are unaffected.
    pub fn fail_next_writes(&self, count: usize) {
        self.inner.injected_failures.store(count, Ordering::SeqCst);
    }

    /// Number of connections not yet declared lost.
    pub fn live_connections(&self) -> usize {
        self.inner
            .connections
            .read()
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    /// Number of document slots held, including absent documents that still
    /// have subscribers.
    pub fn document_slots(&self) -> usize {
        self.inner
            .documents
            .read()
            .map(|documents| documents.len())
            .unwrap_or(0)
    }

    /// Current content of `path`, bypassing any connection.
    pub fn peek(&self, path: &str) -> Snapshot {
        let documents = self.inner.documents.read().ok()?;
        documents.get(path).and_then(|tx| tx.borrow().clone())
    }

    /// Declares every connection silent for longer than the liveness timeout
    /// lost and runs its cleanups, then drops slots of absent documents nobody
    /// watches. Returns how many connections were expired.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let timeout = self.inner.config.liveness_timeout;
        let expired: Vec<ConnectionId> = match self.inner.connections.read() {
            Ok(connections) => connections
                .iter()
                .filter(|(_, state)| now.saturating_duration_since(state.last_seen) > timeout)
                .map(|(id, _)| *id)
                .collect(),
            Err(_) => {
                warn!("liveness sweep skipped: connection table lock poisoned");
                return 0;
            }
        };

        for id in &expired {
            warn!(%id, ?timeout, "connection timed out");
            self.expire(*id);
        }
        self.prune_documents();
        expired.len()
    }

    /// Forgets `id` and runs its cleanups.
    pub(crate) fn expire(&self, id: ConnectionId) {
        let cleanups = match self.inner.connections.write() {
            Ok(mut connections) => match connections.remove(&id) {
                Some(state) => state.cleanups,
                None => return,
            },
            Err(_) => {
                warn!(%id, "cannot expire connection: lock poisoned");
                return;
            }
        };

        info!(%id, cleanups = cleanups.len(), "connection lost, running disconnect cleanups");
        for cleanup in cleanups {
            self.run_cleanup(&cleanup);
        }
    }

    fn run_cleanup(&self, cleanup: &Cleanup) {
        let Some(tx) = self.existing_document(&cleanup.path) else {
            return;
        };
        match &cleanup.action {
            CleanupAction::RemoveField(field) => {
                let patch = Patch::new().delete(field.as_str());
                tx.send_if_modified(|snapshot| match snapshot {
                    Some(document) => patch.apply(document).is_ok(),
                    None => false,
                });
                debug!(path = %cleanup.path, %field, "cleanup removed field");
            }
            CleanupAction::RemoveDocument => {
                tx.send_replace(None);
                debug!(path = %cleanup.path, "cleanup removed document");
            }
        }
    }

    /// Drops slots whose document is absent, that have no subscriber and that
    /// no in-flight call holds.
    fn prune_documents(&self) {
        let Ok(mut documents) = self.inner.documents.write() else {
            warn!("document prune skipped: document table lock poisoned");
            return;
        };
        let before = documents.len();
        documents.retain(|_, tx| {
            tx.borrow().is_some() || tx.receiver_count() > 0 || Arc::strong_count(tx) > 1
        });
        let pruned = before - documents.len();
        if pruned > 0 {
            debug!(pruned, "dropped unused document slots");
        }
    }

    fn existing_document(&self, path: &str) -> Option<Arc<watch::Sender<Snapshot>>> {
        let documents = self.inner.documents.read().ok()?;
        documents.get(path).cloned()
    }

    fn document(&self, path: &str) -> StoreResult<Arc<watch::Sender<Snapshot>>> {
        if let Some(tx) = self.existing_document(path) {
            return Ok(tx);
        }
        let mut documents = self
            .inner
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let tx = documents
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(watch::channel(None).0));
        Ok(Arc::clone(tx))
    }

    fn take_injected_failure(&self) -> bool {
        self.inner
            .injected_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn with_connection<T>(
        &self,
        id: ConnectionId,
        f: impl FnOnce(&mut ConnectionState) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut connections = self
            .inner
            .connections
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let state = connections.get_mut(&id).ok_or(StoreError::Disconnected)?;
        f(state)
    }

    fn ensure_live(&self, id: ConnectionId) -> StoreResult<()> {
        let connections = self
            .inner
            .connections
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        match connections.get(&id).map(|state| state.status) {
            Some(ConnectionStatus::Live) => Ok(()),
            _ => Err(StoreError::Disconnected),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
