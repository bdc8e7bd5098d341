//! Background Worker Task Queue
//!
//! A single long-lived execution context for potentially slow operations
//! the interactive screen must not block on. Submitted units run strictly
//! one at a time in submission order; completion is signaled through each
//! unit's own mechanism (channel, callback), never through `submit`.
//!
//! Lifecycle is tied externally to the content screen: `start` on open,
//! `stop` on close. `stop` waits for the queue to drain before tearing the
//! context down.

pub mod error;

pub use error::{WorkerError, WorkerResult};

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

struct WorkerHandle {
    tx: mpsc::UnboundedSender<Task>,
    join: JoinHandle<()>,
}

/// Single FIFO background worker with explicit start/stop.
pub struct TaskWorker {
    inner: Mutex<Option<WorkerHandle>>,
}

impl Default for TaskWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskWorker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Start the worker context. Idempotent when already running.
    pub async fn start(&self) {
        let mut inner = self.inner.lock().await;
        if inner.is_some() {
            log::debug!("worker already running");
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();
        let join = tokio::spawn(async move {
            // One task at a time, in submission order.
            while let Some(task) = rx.recv().await {
                task.await;
            }
            log::debug!("worker drained, shutting down");
        });

        *inner = Some(WorkerHandle { tx, join });
        log::debug!("worker started");
    }

    /// True while the worker context is up
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    /// Submit a unit of work. Never blocks on the unit itself.
    pub async fn submit<F>(&self, task: F) -> WorkerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let inner = self.inner.lock().await;
        match inner.as_ref() {
            Some(handle) => handle
                .tx
                .send(Box::pin(task))
                .map_err(|_| WorkerError::Stopped),
            None => Err(WorkerError::NotRunning),
        }
    }

    /// Stop the worker, waiting for queued units to finish.
    ///
    /// No-op when never started. Closing the channel lets the loop drain
    /// whatever was already submitted, then exit.
    pub async fn stop(&self) {
        let handle = self.inner.lock().await.take();
        if let Some(WorkerHandle { tx, join }) = handle {
            drop(tx);
            if let Err(e) = join.await {
                log::error!("worker task panicked: {}", e);
            }
            log::debug!("worker stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_tasks_run_in_submission_order() {
        let worker = TaskWorker::new();
        worker.start().await;

        let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let order = Arc::clone(&order);
            worker
                .submit(async move {
                    // stagger so out-of-order execution would show up
                    if i % 2 == 0 {
                        tokio::time::sleep(Duration::from_millis(2)).await;
                    }
                    order.lock().await.push(i);
                })
                .await
                .unwrap();
        }

        worker.stop().await;
        let order = order.lock().await;
        assert_eq!(*order, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_task() {
        let worker = TaskWorker::new();
        worker.start().await;

        let done = Arc::new(Mutex::new(false));
        let done_clone = Arc::clone(&done);
        worker
            .submit(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                *done_clone.lock().await = true;
            })
            .await
            .unwrap();

        worker.stop().await;
        assert!(*done.lock().await);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let worker = TaskWorker::new();
        worker.start().await;
        worker.start().await;
        assert!(worker.is_running().await);
        worker.stop().await;
        assert!(!worker.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let worker = TaskWorker::new();
        worker.stop().await;
        assert!(!worker.is_running().await);
    }

    #[test]
    fn test_submit_before_start_fails() {
        tokio_test::block_on(async {
            let worker = TaskWorker::new();
            let result = worker.submit(async {}).await;
            assert_eq!(result, Err(WorkerError::NotRunning));
        });
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let worker = TaskWorker::new();
        worker.start().await;
        worker.stop().await;
        worker.start().await;

        let ran = Arc::new(Mutex::new(false));
        let ran_clone = Arc::clone(&ran);
        worker
            .submit(async move {
                *ran_clone.lock().await = true;
            })
            .await
            .unwrap();
        worker.stop().await;
        assert!(*ran.lock().await);
    }
}
