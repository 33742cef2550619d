//! Liveness keep-alive for one connection.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::StopSignal;
use crate::store::{DocumentStore, StoreError};

/// Periodically tells the store this client is still there.
pub(crate) struct HeartbeatWorker<S> {
    store: S,
    interval: Duration,
    stop: StopSignal,
}

impl<S: DocumentStore> HeartbeatWorker<S> {
    pub(crate) fn new(store: S, interval: Duration, stop: StopSignal) -> Self {
        Self {
            store,
            interval,
            stop,
        }
    }

    pub(crate) async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.store.heartbeat().await {
                        Ok(()) => {}
                        Err(StoreError::Disconnected) => {
                            debug!("heartbeat stopped: connection is gone");
                            break;
                        }
                        Err(err) => warn!(%err, "heartbeat failed"),
                    }
                }
                _ = self.stop.stopped() => break,
            }
        }
    }
}
