//! Job runner: drives one job through `pending -> running -> completed | failed`
//!
//! Every failure inside a run is caught here and written to the job row as a
//! structured error payload. Nothing a run does propagates back to the code
//! that triggered it.

mod pool;

pub use pool::{ScrapeTask, WorkerPool};

use crate::extract::{extract, ResultDocument};
use crate::render::{NavigationKind, RenderError, Renderer};
use crate::store::{JobStatus, JobStore};
use crate::{Result, ScrapeError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Signature of the extraction step, [`extract`] unless overridden
pub type ExtractFn = fn(&str, &Url, Option<&str>) -> ResultDocument;

/// Runs scrape jobs against a store and a renderer
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    renderer: Arc<dyn Renderer>,
    extractor: ExtractFn,
}

impl JobRunner {
    pub fn new(store: Arc<dyn JobStore>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            store,
            renderer,
            extractor: extract,
        }
    }

    /// Replaces the extraction step
    pub fn with_extractor(mut self, extractor: ExtractFn) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs a job to a terminal status
    ///
    /// # Arguments
    ///
    /// * `job_id` - The job row to drive; it should already exist as `pending`
    /// * `url` - The page to render
    /// * `selector` - Optional CSS selector for the selector facet
    ///
    /// A job that is missing or already terminal when the run starts is
    /// skipped. A row deleted while the run is in flight is not recreated.
    pub async fn run(&self, job_id: i64, url: &str, selector: Option<&str>) {
        let started = Instant::now();

        match self.store.get(job_id) {
            Ok(Some(job)) if job.status.is_terminal() => {
                tracing::warn!(job_id, status = %job.status, "Job already finished, skipping run");
                return;
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(job_id, "Job row missing, skipping run");
                return;
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to read job");
                return;
            }
        }

        match self.store.update(job_id, JobStatus::Running, None) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job_id, "Job row vanished before it started");
                return;
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to mark job running");
                return;
            }
        }

        tracing::info!(job_id, url, "Job running");

        let outcome = self.scrape(url, selector, started).await;
        let elapsed = round_seconds(started);

        let (status, payload) = match outcome {
            Ok(payload) => (JobStatus::Completed, payload),
            Err(e) => {
                tracing::warn!(
                    job_id,
                    url,
                    error_type = e.error_type(),
                    error = %e,
                    "Job failed"
                );
                let payload = json!({
                    "error": e.to_string(),
                    "error_type": e.error_type(),
                    "elapsed_seconds": elapsed,
                });
                (JobStatus::Failed, payload.to_string())
            }
        };

        match self.store.update(job_id, status, Some(&payload)) {
            Ok(true) => tracing::info!(job_id, %status, elapsed, "Job finished"),
            Ok(false) => tracing::warn!(job_id, %status, "Job row vanished before terminal update"),
            Err(e) => tracing::error!(job_id, %status, error = %e, "Failed to store job outcome"),
        }
    }

    /// Renders and extracts, returning the serialized result document
    async fn scrape(&self, url: &str, selector: Option<&str>, started: Instant) -> Result<String> {
        let base_url = Url::parse(url).map_err(|e| {
            RenderError::new(NavigationKind::Protocol, format!("invalid URL '{}': {}", url, e))
        })?;

        let rendered = self.renderer.render(url).await?;
        tracing::debug!(
            url,
            final_url = %rendered.final_url,
            bytes = rendered.html.len(),
            "Page rendered"
        );

        let html = rendered.html;
        let selector = selector.map(str::to_string);
        let extractor = self.extractor;
        let mut document: ResultDocument = tokio::task::spawn_blocking(move || {
            extractor(&html, &base_url, selector.as_deref())
        })
        .await
        .map_err(|e| ScrapeError::Extraction(format!("extraction task failed: {}", e)))?;

        document.meta.final_url = Some(rendered.final_url);
        document.screenshot = rendered.screenshot.map(|bytes| STANDARD.encode(bytes));
        document.stats.elapsed_seconds = round_seconds(started);

        Ok(serde_json::to_string(&document)?)
    }
}

/// Seconds since `started`, rounded to two decimals
fn round_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}
