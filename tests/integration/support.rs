//! Shared fixtures

use async_trait::async_trait;
use pagescope::render::{NavigationKind, RenderError, RenderResult, Renderer};
use pagescope::{Config, Dispatcher, JobStore, SqliteJobStore};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

/// Serves canned HTML per URL; unknown URLs fail like an unresolvable host
pub struct FakeRenderer {
    pages: HashMap<String, String>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, RenderError> {
        match self.pages.get(url) {
            Some(html) => Ok(RenderResult {
                html: html.clone(),
                final_url: url.to_string(),
                screenshot: Some(b"jpeg".to_vec()),
            }),
            None => Err(RenderError::new(
                NavigationKind::Network,
                format!("net::ERR_NAME_NOT_RESOLVED at {}", url),
            )),
        }
    }
}

/// A dispatcher over an on-disk database in a temp directory
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub store: Arc<dyn JobStore>,
    _dir: TempDir,
}

impl Harness {
    pub fn new(renderer: FakeRenderer) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("jobs").join("pagescope.db");

        let mut config = Config::default();
        config.storage.database_path = db_path.to_string_lossy().into_owned();
        config.runner.max_concurrent_jobs = 2;

        let store: Arc<dyn JobStore> = Arc::new(
            SqliteJobStore::new(&db_path).expect("Failed to open job store"),
        );
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(renderer), &config)
            .expect("Failed to build dispatcher");

        Self {
            dispatcher,
            store,
            _dir: dir,
        }
    }
}
