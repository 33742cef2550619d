//! Background tasks owned by a joined session.
//!
//! Each [`SessionHandle`](crate::SessionHandle) spawns a host watcher, which
//! keeps exactly one host in the roster, and a heartbeat, which keeps its
//! connection live. Both stop when the handle leaves or is dropped.

mod heartbeat;
mod watcher;

pub(crate) use heartbeat::HeartbeatWorker;
pub(crate) use watcher::HostWatcher;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Stop flag shared by the workers of one handle.
#[derive(Clone)]
pub(crate) struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    pub(crate) fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self(rx))
    }

    /// Resolves once a stop was requested or the sender is gone.
    pub(crate) async fn stopped(&mut self) {
        while !*self.0.borrow_and_update() {
            if self.0.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Join handles of one session's workers.
pub(crate) struct WorkerSet {
    stop: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerSet {
    pub(crate) fn new(stop: watch::Sender<bool>, handles: Vec<JoinHandle<()>>) -> Self {
        Self { stop, handles }
    }

    /// Signals every worker and waits for them to finish.
    pub(crate) async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

impl Drop for WorkerSet {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
