//! Dispatcher: the operations a front end exposes over the job system
//!
//! Scrape requests are persisted and handed to the worker pool, returning
//! the job id right away. Queries, exports and the image proxy read the
//! stored rows and never touch the runner.

mod csv;
mod export;
mod images;

pub use export::{export_job, parse_document, to_csv, ExportFile, ExportFormat};
pub use images::{archive_images, build_client, fetch_image, FetchedImage};

use crate::config::Config;
use crate::extract::ResultDocument;
use crate::render::Renderer;
use crate::runner::{JobRunner, ScrapeTask, WorkerPool};
use crate::store::{Job, JobStore, JobSummary};
use crate::{Result, ScrapeError};
use reqwest::Client;
use std::sync::Arc;

/// Front door to the job system
pub struct Dispatcher {
    store: Arc<dyn JobStore>,
    pool: WorkerPool,
    client: Client,
}

impl Dispatcher {
    /// Creates a dispatcher and starts its worker pool
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `store` - Where jobs live
    /// * `renderer` - Shared by every job run
    /// * `config` - Pool size, and user agent plus timeout for image fetches
    pub fn new(
        store: Arc<dyn JobStore>,
        renderer: Arc<dyn Renderer>,
        config: &Config,
    ) -> Result<Self> {
        let client = build_client(&config.browser.user_agent, &config.fetch)?;
        let runner = Arc::new(JobRunner::new(store.clone(), renderer));
        let pool = WorkerPool::new(runner, config.runner.max_concurrent_jobs);

        Ok(Self {
            store,
            pool,
            client,
        })
    }

    /// Creates a job and queues it, returning its id without waiting for the run
    pub fn trigger_scrape(&self, url: &str, selector: Option<&str>) -> Result<i64> {
        let job_id = self.store.create(url)?;
        tracing::info!(job_id, url, selector, "Job created");

        let queued = self.pool.submit(ScrapeTask {
            job_id,
            url: url.to_string(),
            selector: selector.map(str::to_string),
        });
        if !queued {
            tracing::warn!(job_id, "Worker pool is closed, job stays pending");
        }

        Ok(job_id)
    }

    /// Most recent jobs first
    pub fn list_jobs(&self, limit: usize) -> Result<Vec<JobSummary>> {
        Ok(self
            .store
            .list(limit)?
            .iter()
            .map(Job::summary)
            .collect())
    }

    pub fn get_job(&self, job_id: i64) -> Result<Job> {
        self.store
            .get(job_id)?
            .ok_or(ScrapeError::NotFound(job_id))
    }

    pub fn delete_job(&self, job_id: i64) -> Result<()> {
        if self.store.delete(job_id)? {
            tracing::info!(job_id, "Job deleted");
            Ok(())
        } else {
            Err(ScrapeError::NotFound(job_id))
        }
    }

    /// Queues a fresh job for the URL of an existing one
    ///
    /// The source job is left untouched. Selectors are not stored, so the new
    /// job runs without one.
    pub fn rescrape(&self, job_id: i64) -> Result<i64> {
        let source = self.get_job(job_id)?;
        let new_id = self.trigger_scrape(&source.url, None)?;
        tracing::info!(job_id, new_job_id = new_id, "Job re-scraped");
        Ok(new_id)
    }

    pub fn export(&self, job_id: i64, format: ExportFormat) -> Result<ExportFile> {
        export_job(&self.get_job(job_id)?, format)
    }

    /// Fetches image `index` (zero-based) of a job's result document
    pub async fn fetch_image(&self, job_id: i64, index: usize) -> Result<FetchedImage> {
        let document = self.load_document(job_id)?;
        let image = document
            .images
            .get(index)
            .ok_or(ScrapeError::ImageNotFound { job_id, index })?;

        fetch_image(&self.client, &image.src).await
    }

    /// Fetches every image of a job into a ZIP archive
    ///
    /// Images that fail to download are logged and left out.
    pub async fn download_all_images(&self, job_id: i64) -> Result<ExportFile> {
        let document = self.load_document(job_id)?;
        let mut fetched = Vec::new();

        for (index, image) in document.images.iter().enumerate() {
            match fetch_image(&self.client, &image.src).await {
                Ok(bytes) => fetched.push((index, bytes)),
                Err(e) => {
                    tracing::warn!(job_id, index, src = %image.src, error = %e, "Skipping image")
                }
            }
        }

        tracing::info!(
            job_id,
            fetched = fetched.len(),
            total = document.images.len(),
            "Image archive built"
        );

        Ok(ExportFile {
            filename: format!("scrape_{}_images.zip", job_id),
            content_type: "application/zip",
            body: archive_images(&fetched)?,
        })
    }

    /// Stops accepting jobs and waits for queued and running ones to finish
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    fn load_document(&self, job_id: i64) -> Result<ResultDocument> {
        let job = self.get_job(job_id)?;
        let data = job.data.as_deref().ok_or(ScrapeError::NoData(job_id))?;
        parse_document(job_id, data)
    }
}
