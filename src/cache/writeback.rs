//! Background population of the local tier
//!
//! Write-backs are fire-and-forget for the caller, but they run on a tracked,
//! bounded pool so shutdown and tests can wait for them to land.

use crate::config::WriteBackMode;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::debug;

/// Bounded pool of local-tier write-backs
#[derive(Clone)]
pub struct WriteBack {
    mode: WriteBackMode,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    shut_down: Arc<AtomicBool>,
}

impl WriteBack {
    /// Create a pool running at most `workers` write-backs at once
    pub fn new(mode: WriteBackMode, workers: usize) -> Self {
        Self {
            mode,
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(workers.max(1))),
            shut_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hand a write to the pool
    ///
    /// In deferred mode this returns as soon as the task is queued. In inline
    /// mode the write completes before this returns.
    pub async fn submit<F>(&self, write: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.mode {
            WriteBackMode::Inline => write.await,
            WriteBackMode::Deferred => {
                let permits = Arc::clone(&self.permits);
                self.tracker.spawn(async move {
                    // Only fails if the semaphore is closed, which never happens
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };
                    write.await;
                });
            }
        }
    }

    /// Number of write-backs queued or running
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until no write-backs are queued or running. The pool stays usable.
    ///
    /// This waits for the pool to go idle, including write-backs submitted
    /// while it waits, so under steady traffic it may not return. Meant for
    /// tests and quiesced callers. After [`shutdown`](Self::shutdown) the
    /// pool stays closed.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        if !self.shut_down.load(Ordering::SeqCst) {
            self.tracker.reopen();
        }
    }

    /// Wait for outstanding write-backs before the process exits
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        let pending = self.pending();
        if pending > 0 {
            debug!("Waiting for {} local cache write-backs", pending);
        }
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Scheduling mode of this pool
    pub fn mode(&self) -> WriteBackMode {
        self.mode
    }
}
