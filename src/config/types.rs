use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Pagescope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Headless browser session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run Chromium without a visible window
    pub headless: bool,

    /// Timeout for the network-quiescent navigation attempt (milliseconds)
    #[serde(rename = "primary-timeout-ms")]
    pub primary_timeout_ms: u64,

    /// Timeout for the DOM-ready fallback attempt (milliseconds)
    #[serde(rename = "fallback-timeout-ms")]
    pub fallback_timeout_ms: u64,

    #[serde(rename = "viewport-width")]
    pub viewport_width: u32,

    #[serde(rename = "viewport-height")]
    pub viewport_height: u32,

    /// User agent presented to the target site
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Capture a viewport screenshot after navigation
    pub screenshot: bool,

    /// JPEG quality of the screenshot (1-100)
    #[serde(rename = "screenshot-quality")]
    pub screenshot_quality: u8,

    /// Explicit Chromium binary; auto-detected when absent
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            primary_timeout_ms: 30_000,
            fallback_timeout_ms: 15_000,
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            screenshot: true,
            screenshot_quality: 70,
            chrome_executable: None,
        }
    }
}

impl BrowserConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }
}

/// Job store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./data/pagescope.db".to_string(),
        }
    }
}

/// Job runner configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of workers draining the job queue; bounds concurrent browser sessions
    #[serde(rename = "max-concurrent-jobs")]
    pub max_concurrent_jobs: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
        }
    }
}

/// Plain HTTP fetch configuration (image proxy)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_ms: 20_000 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
