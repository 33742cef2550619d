use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::MemoryStore;

/// Background task that periodically sweeps the store for silent connections.
///
/// Dropping the supervisor aborts the task; [`shutdown`](Self::shutdown)
/// stops it cleanly.
pub struct LivenessSupervisor {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

struct SupervisorWorker {
    store: MemoryStore,
    shutdown_rx: oneshot::Receiver<()>,
}

impl LivenessSupervisor {
    pub(super) fn spawn(store: MemoryStore) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = SupervisorWorker { store, shutdown_rx };
        let handle = tokio::spawn(async move {
            worker.run().await;
        });
        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for LivenessSupervisor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl SupervisorWorker {
    async fn run(mut self) {
        let period = self.store.config().sweep_interval;
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?period, "liveness supervisor started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let expired = self.store.sweep();
                    if expired > 0 {
                        debug!(expired, "liveness sweep expired connections");
                    }
                }
                _ = &mut self.shutdown_rx => break,
            }
        }

        info!("liveness supervisor stopped");
    }
}
