//! Headless Chromium renderer
//!
//! Every render launches its own browser with a throwaway profile directory
//! and tears it down before returning, success or not.

use crate::config::BrowserConfig;
use crate::render::{
    navigate_with_fallback, NavigationKind, RenderError, RenderResult, Renderer, WaitUntil,
};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, NavigateParams,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long the resource count must stay unchanged to call the network idle
const QUIET_PERIOD: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Renders pages in a fresh headless Chromium per call
pub struct ChromeRenderer {
    config: BrowserConfig,
}

impl ChromeRenderer {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Builds the launch configuration for one session
    fn launch_config(&self, profile_dir: &Path) -> Result<CdpBrowserConfig, RenderError> {
        let width = self.config.viewport_width;
        let height = self.config.viewport_height;

        let mut builder = CdpBrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Default::default()
            })
            .user_data_dir(profile_dir)
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg(format!("--user-agent={}", self.config.user_agent));

        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &self.config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(|e| {
            RenderError::new(NavigationKind::Launch, format!("Browser config error: {e}"))
        })
    }

    /// Everything that happens between launch and teardown
    async fn render_in_session(
        &self,
        browser: &Browser,
        url: &str,
    ) -> Result<RenderResult, RenderError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::classified(format!("Failed to open page: {e}")))?;

        self.apply_request_headers(&page).await;

        navigate_with_fallback(
            |wait| navigate(&page, url, wait),
            self.config.primary_timeout(),
            self.config.fallback_timeout(),
        )
        .await?;

        let screenshot = if self.config.screenshot {
            self.capture_screenshot(&page).await
        } else {
            None
        };

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::classified(format!("Failed to read content: {e}")))?;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(RenderResult {
            html,
            final_url,
            screenshot,
        })
    }

    /// Sends the headers a desktop browser would send on a top-level navigation
    async fn apply_request_headers(&self, page: &Page) {
        let headers = Headers::new(serde_json::json!({
            "Accept-Language": self.config.accept_language,
            "Accept": "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            "Sec-Fetch-Site": "none",
            "Sec-Fetch-Mode": "navigate",
            "Sec-Fetch-User": "?1",
            "Sec-Fetch-Dest": "document",
        }));

        if let Err(e) = page.execute(SetExtraHttpHeadersParams::new(headers)).await {
            tracing::debug!(error = %e, "Could not set extra request headers");
        }
    }

    /// Viewport JPEG; failures are logged and dropped
    async fn capture_screenshot(&self, page: &Page) -> Option<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(i64::from(self.config.screenshot_quality))
            .build();

        match page.screenshot(params).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "Screenshot capture failed");
                None
            }
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, RenderError> {
        let profile_dir = session_profile_dir();
        let launch_config = self.launch_config(&profile_dir)?;

        let (mut browser, mut handler) = Browser::launch(launch_config).await.map_err(|e| {
            RenderError::new(NavigationKind::Launch, format!("Browser launch failed: {e}"))
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "Browser handler error");
                }
            }
        });

        let result = self.render_in_session(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "Browser close error");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "Browser process wait error");
        }
        handler_task.abort();

        if let Err(e) = tokio::fs::remove_dir_all(&profile_dir).await {
            tracing::debug!(path = %profile_dir.display(), error = %e, "Profile cleanup failed");
        }

        result
    }
}

/// A profile directory no other concurrent session uses
fn session_profile_dir() -> PathBuf {
    let n = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("pagescope-session-{}-{}", std::process::id(), n))
}

/// One navigation attempt with the given completion criterion
async fn navigate(page: &Page, url: &str, wait: WaitUntil) -> Result<(), RenderError> {
    match wait {
        WaitUntil::NetworkIdle => {
            page.goto(url)
                .await
                .map_err(|e| RenderError::classified(format!("Failed to navigate: {e}")))?;
            wait_for_quiet_network(page).await;
            Ok(())
        }
        WaitUntil::DomContentLoaded => {
            let response = page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| RenderError::classified(format!("Failed to navigate: {e}")))?;

            if let Some(error_text) = &response.result.error_text {
                return Err(RenderError::classified(error_text.clone()));
            }

            wait_for_dom_ready(page).await;
            Ok(())
        }
    }
}

/// Polls until the resource count stops changing for [`QUIET_PERIOD`]
///
/// Runs until the caller's timeout cancels it if the page never settles.
async fn wait_for_quiet_network(page: &Page) {
    let mut last_count: Option<u64> = None;
    let mut stable_since = Instant::now();

    loop {
        let count = evaluate::<u64>(page, "performance.getEntriesByType('resource').length").await;

        if count.is_some() && count == last_count {
            if stable_since.elapsed() >= QUIET_PERIOD {
                return;
            }
        } else {
            last_count = count;
            stable_since = Instant::now();
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Polls until the new document has left the `loading` state
async fn wait_for_dom_ready(page: &Page) {
    loop {
        let ready = evaluate::<bool>(
            page,
            "document.readyState !== 'loading' && location.href !== 'about:blank'",
        )
        .await
        .unwrap_or(false);

        if ready {
            return;
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Evaluates an expression; `None` while the execution context is unavailable
async fn evaluate<T: DeserializeOwned>(page: &Page, expression: &str) -> Option<T> {
    page.evaluate(expression).await.ok()?.into_value().ok()
}
