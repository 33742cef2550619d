//! Host watcher.
//!
//! Runs in every client. On each roster snapshot it recomputes the host with
//! [`game_core::host::reconcile`] and writes the correction, if any. All
//! watchers compute the same result, so concurrent writes agree.

use std::time::Duration;

use game_core::{Session, host};
use serde_json::Value;
use tokio::time;
use tracing::{debug, info, warn};

use super::StopSignal;
use crate::store::{DocumentStore, StoreError, StoreResult, Subscription};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Settled,
    Retry,
    Disconnected,
}

impl Outcome {
    fn after_error(path: &str, err: StoreError) -> Self {
        if err == StoreError::Disconnected {
            debug!(path, "host watcher stopped: connection is gone");
            Self::Disconnected
        } else {
            warn!(path, %err, "host correction failed, will retry");
            Self::Retry
        }
    }
}

/// Keeps exactly one host in a session document.
pub(crate) struct HostWatcher<S> {
    store: S,
    path: String,
    subscription: Subscription,
    retry_delay: Duration,
    stop: StopSignal,
}

impl<S: DocumentStore> HostWatcher<S> {
    pub(crate) fn new(
        store: S,
        subscription: Subscription,
        retry_delay: Duration,
        stop: StopSignal,
    ) -> Self {
        Self {
            store,
            path: subscription.path().to_string(),
            subscription,
            retry_delay,
            stop,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(path = %self.path, "host watcher started");
        let mut outcome = Outcome::Settled;

        loop {
            tokio::select! {
                snapshot = self.subscription.recv() => {
                    let Some(snapshot) = snapshot else { break };
                    outcome = self.on_snapshot(snapshot).await;
                }
                _ = time::sleep(self.retry_delay), if outcome == Outcome::Retry => {
                    outcome = self.retry().await;
                }
                _ = self.stop.stopped() => break,
            }
            if outcome == Outcome::Disconnected {
                break;
            }
        }

        debug!(path = %self.path, "host watcher stopped");
    }

    async fn on_snapshot(&self, snapshot: Option<Value>) -> Outcome {
        let Some(document) = snapshot else {
            return Outcome::Settled;
        };
        match self.correct(&document).await {
            Ok(()) => Outcome::Settled,
            Err(err) => Outcome::after_error(&self.path, err),
        }
    }

    async fn retry(&self) -> Outcome {
        match self.store.read(&self.path).await {
            Ok(snapshot) => self.on_snapshot(snapshot).await,
            Err(err) => Outcome::after_error(&self.path, err),
        }
    }

    async fn correct(&self, document: &Value) -> StoreResult<()> {
        let session = match Session::from_document(document) {
            Ok(session) => session,
            Err(err) => {
                warn!(path = %self.path, %err, "ignoring undecodable session document");
                return Ok(());
            }
        };

        let Some(patch) = host::reconcile(&session.players) else {
            return Ok(());
        };

        let host = host::elect(&session.players).map(ToString::to_string);
        info!(path = %self.path, host = host.as_deref().unwrap_or("-"), "reassigning host");
        self.store.patch(&self.path, &patch).await
    }
}
