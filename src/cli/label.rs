//! Status label kept in sync with the session controller.
//!
//! The updater subscribes once to state changes and forwards them over a
//! crossbeam channel to a worker thread. Each notification wakes the worker,
//! which renders the controller's current status; while a session is running
//! it re-reads the status on its own cadence.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::session::{SessionController, Subscription};
use crate::types::{SessionState, StatusSnapshot};

/// Keeps a label sink updated until stopped.
pub struct LabelUpdater {
    subscription: Subscription,
    worker: Option<JoinHandle<()>>,
}

impl LabelUpdater {
    /// Subscribes to `controller` and starts the label worker.
    ///
    /// `sink` receives a snapshot on every transition and every `refresh`
    /// while a session is running.
    pub fn spawn<W>(controller: &SessionController, refresh: Duration, sink: W) -> Self
    where
        W: FnMut(StatusSnapshot) + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        let subscription = controller.subscribe_state_change(move |state| {
            let _ = tx.send(state);
        });

        let source = controller.clone();
        let worker = thread::spawn(move || run_worker(rx, source, refresh, sink));

        Self {
            subscription,
            worker: Some(worker),
        }
    }

    /// Unsubscribes and waits for the worker to exit.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for LabelUpdater {
    fn drop(&mut self) {
        // Removing the observer drops the sender, which ends the worker loop.
        self.subscription.unsubscribe();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("label worker panicked");
            }
        }
    }
}

fn run_worker<W>(
    rx: Receiver<SessionState>,
    controller: SessionController,
    refresh: Duration,
    mut sink: W,
) where
    W: FnMut(StatusSnapshot),
{
    let mut running = false;
    loop {
        match rx.recv_timeout(refresh) {
            Ok(_) => {
                let status = controller.status();
                running = status.state.is_running();
                sink(status);
            }
            Err(RecvTimeoutError::Timeout) => {
                if running {
                    sink(controller.status());
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("label worker stopped");
}
