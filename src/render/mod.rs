//! Render client: turns a URL into rendered HTML
//!
//! This module contains:
//! - The [`Renderer`] trait the job runner depends on
//! - The navigation-with-fallback protocol shared by every renderer
//! - [`ChromeRenderer`], a headless Chromium implementation
//!
//! Navigation first waits for network quiescence. If that attempt fails for
//! any reason it is retried once with a DOM-ready criterion and a shorter
//! timeout. When both fail, the primary attempt's error is reported.

mod chrome;

pub use chrome::ChromeRenderer;

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Output of a successful render
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Fully rendered document markup
    pub html: String,

    /// URL after redirects
    pub final_url: String,

    /// Viewport screenshot (JPEG), when capture succeeded
    pub screenshot: Option<Vec<u8>>,
}

/// Classification of a failed render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The navigation did not finish within its timeout
    Timeout,

    /// DNS, connection, TLS or similar network failure
    Network,

    /// The browser protocol reported an error
    Protocol,

    /// The browser could not be started
    Launch,
}

impl NavigationKind {
    /// Name written into a failed job's `error_type`
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Timeout => "NavigationTimeout",
            Self::Network => "NavigationNetwork",
            Self::Protocol => "NavigationProtocol",
            Self::Launch => "BrowserLaunch",
        }
    }

    /// Best-effort classification of a browser error message
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("timeout") || lower.contains("timed out") {
            Self::Timeout
        } else if lower.contains("net::err_")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("name not resolved")
        {
            Self::Network
        } else {
            Self::Protocol
        }
    }
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Protocol => "protocol",
            Self::Launch => "launch",
        };
        f.write_str(name)
    }
}

/// A render attempt that failed
#[derive(Debug, Clone, Error)]
#[error("{kind} error: {message}")]
pub struct RenderError {
    pub kind: NavigationKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: NavigationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error whose kind is inferred from the message
    pub fn classified(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: NavigationKind::classify(&message),
            message,
        }
    }
}

/// Completion criterion for one navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Wait for the load event and a quiet network
    NetworkIdle,

    /// Return as soon as the DOM has been parsed
    DomContentLoaded,
}

/// Renders pages for the job runner
///
/// Each call is an isolated session: implementations must release every
/// browser resource before returning, whatever the outcome.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderResult, RenderError>;
}

/// Runs one navigation attempt under `limit`, mapping expiry to a timeout error
async fn timed<T, Fut>(limit: Duration, attempt: Fut) -> Result<T, RenderError>
where
    Fut: Future<Output = Result<T, RenderError>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::new(
            NavigationKind::Timeout,
            format!("navigation timed out after {}ms", limit.as_millis()),
        )),
    }
}

/// Navigates with one DOM-ready fallback
///
/// `attempt` performs a single navigation with the given completion
/// criterion. The primary attempt runs under `primary`, the fallback under
/// `fallback`. If both fail the primary error is returned.
pub async fn navigate_with_fallback<T, F, Fut>(
    mut attempt: F,
    primary: Duration,
    fallback: Duration,
) -> Result<T, RenderError>
where
    F: FnMut(WaitUntil) -> Fut,
    Fut: Future<Output = Result<T, RenderError>>,
{
    let primary_error = match timed(primary, attempt(WaitUntil::NetworkIdle)).await {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    tracing::warn!(
        error = %primary_error,
        "Network-idle navigation failed, retrying with DOM-ready criterion"
    );

    match timed(fallback, attempt(WaitUntil::DomContentLoaded)).await {
        Ok(value) => Ok(value),
        Err(fallback_error) => {
            tracing::debug!(error = %fallback_error, "Fallback navigation failed too");
            Err(primary_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_classify_messages() {
        assert_eq!(
            NavigationKind::classify("net::ERR_NAME_NOT_RESOLVED"),
            NavigationKind::Network
        );
        assert_eq!(
            NavigationKind::classify("Request timed out."),
            NavigationKind::Timeout
        );
        assert_eq!(
            NavigationKind::classify("Cannot navigate to invalid URL"),
            NavigationKind::Protocol
        );
    }

    #[test]
    fn test_error_type_names() {
        assert_eq!(NavigationKind::Timeout.error_type(), "NavigationTimeout");
        assert_eq!(NavigationKind::Network.error_type(), "NavigationNetwork");
        assert_eq!(NavigationKind::Protocol.error_type(), "NavigationProtocol");
        assert_eq!(NavigationKind::Launch.error_type(), "BrowserLaunch");
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let calls = Mutex::new(Vec::new());
        let result = navigate_with_fallback(
            |wait| {
                calls.lock().unwrap().push(wait);
                async move { Ok::<_, RenderError>("page") }
            },
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(result.unwrap(), "page");
        assert_eq!(*calls.lock().unwrap(), vec![WaitUntil::NetworkIdle]);
    }

    #[tokio::test]
    async fn test_fallback_used_after_primary_failure() {
        let calls = Mutex::new(Vec::new());
        let result = navigate_with_fallback(
            |wait| {
                calls.lock().unwrap().push(wait);
                async move {
                    match wait {
                        WaitUntil::NetworkIdle => Err(RenderError::new(
                            NavigationKind::Network,
                            "net::ERR_CONNECTION_RESET",
                        )),
                        WaitUntil::DomContentLoaded => Ok("dom ready"),
                    }
                }
            },
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(result.unwrap(), "dom ready");
        assert_eq!(
            *calls.lock().unwrap(),
            vec![WaitUntil::NetworkIdle, WaitUntil::DomContentLoaded]
        );
    }

    #[tokio::test]
    async fn test_both_fail_reports_primary_error() {
        let result: Result<(), _> = navigate_with_fallback(
            |wait| async move {
                match wait {
                    WaitUntil::NetworkIdle => {
                        Err(RenderError::new(NavigationKind::Network, "primary"))
                    }
                    WaitUntil::DomContentLoaded => {
                        Err(RenderError::new(NavigationKind::Protocol, "fallback"))
                    }
                }
            },
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, NavigationKind::Network);
        assert_eq!(err.message, "primary");
    }

    #[tokio::test]
    async fn test_slow_attempts_time_out() {
        let attempts = AtomicUsize::new(0);
        let result: Result<(), _> = navigate_with_fallback(
            |_| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
            },
            Duration::from_millis(20),
            Duration::from_millis(10),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, NavigationKind::Timeout);
        assert!(err.message.contains("20ms"));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
