//! Fixed-size worker pool feeding jobs to a [`JobRunner`]

use super::JobRunner;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// A job waiting for a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTask {
    pub job_id: i64,
    pub url: String,
    pub selector: Option<String>,
}

/// Queue plus a fixed number of workers
///
/// Submitting never waits for a worker; the queue is unbounded and the
/// worker count caps how many renders run at once. Each task runs in its own
/// tokio task so a panicking run takes down neither its worker nor its
/// siblings.
pub struct WorkerPool {
    sender: Mutex<Option<UnboundedSender<ScrapeTask>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Starts `size` workers; must be called inside a tokio runtime
    pub fn new(runner: Arc<JobRunner>, size: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|worker_id| tokio::spawn(worker(worker_id, runner.clone(), receiver.clone())))
            .collect();

        tracing::debug!(size, "Worker pool started");

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Queues a task
    ///
    /// # Returns
    ///
    /// * `true` - The task was queued
    /// * `false` - The pool has been shut down
    pub fn submit(&self, task: ScrapeTask) -> bool {
        let sender = self.sender.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match sender.as_ref() {
            Some(sender) => sender.send(task).is_ok(),
            None => false,
        }
    }

    /// Closes the queue and waits for every queued task to finish
    pub async fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let workers = std::mem::take(
            &mut *self
                .workers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!("Worker exited abnormally: {}", e);
            }
        }

        tracing::debug!("Worker pool drained");
    }
}

async fn worker(
    worker_id: usize,
    runner: Arc<JobRunner>,
    receiver: Arc<tokio::sync::Mutex<UnboundedReceiver<ScrapeTask>>>,
) {
    loop {
        let task = { receiver.lock().await.recv().await };
        let Some(task) = task else {
            break;
        };

        tracing::debug!(worker_id, job_id = task.job_id, "Worker picked up job");

        let runner = runner.clone();
        let job_id = task.job_id;
        let run = tokio::spawn(async move {
            runner
                .run(task.job_id, &task.url, task.selector.as_deref())
                .await
        });

        if let Err(e) = run.await {
            tracing::error!(job_id, "Job run panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderError, RenderResult, Renderer};
    use crate::store::{JobStatus, JobStore, SqliteJobStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Tracks how many renders are in flight at once
    struct CountingRenderer {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Renderer for CountingRenderer {
        async fn render(&self, url: &str) -> Result<RenderResult, RenderError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            Ok(RenderResult {
                html: "<html><title>ok</title></html>".to_string(),
                final_url: url.to_string(),
                screenshot: None,
            })
        }
    }

    #[tokio::test]
    async fn test_pool_drains_and_caps_concurrency() {
        let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::new_in_memory().unwrap());
        let renderer = Arc::new(CountingRenderer {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let runner = Arc::new(JobRunner::new(store.clone(), renderer.clone()));
        let pool = WorkerPool::new(runner, 2);

        let mut ids = Vec::new();
        for i in 0..6 {
            let url = format!("https://example.com/{}", i);
            let job_id = store.create(&url).unwrap();
            ids.push(job_id);
            assert!(pool.submit(ScrapeTask {
                job_id,
                url,
                selector: None,
            }));
        }

        pool.shutdown().await;

        for id in ids {
            assert_eq!(store.get(id).unwrap().unwrap().status, JobStatus::Completed);
        }
        assert!(renderer.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let store: Arc<dyn JobStore> = Arc::new(SqliteJobStore::new_in_memory().unwrap());
        let renderer = Arc::new(CountingRenderer {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let pool = WorkerPool::new(Arc::new(JobRunner::new(store, renderer)), 1);

        pool.shutdown().await;

        assert!(!pool.submit(ScrapeTask {
            job_id: 1,
            url: "https://example.com/".to_string(),
            selector: None,
        }));
    }
}
