use crate::config::types::{BrowserConfig, Config, FetchConfig, RunnerConfig, StorageConfig};
use crate::ConfigError;

const MAX_VIEWPORT_DIMENSION: u32 = 7680;
const MAX_WORKERS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_config(&config.browser)?;
    validate_storage_config(&config.storage)?;
    validate_runner_config(&config.runner)?;
    validate_fetch_config(&config.fetch)?;
    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.primary_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "primary-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.fallback_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fallback-timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.fallback_timeout_ms > config.primary_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "fallback-timeout-ms ({}) must not exceed primary-timeout-ms ({})",
            config.fallback_timeout_ms, config.primary_timeout_ms
        )));
    }

    for (name, value) in [
        ("viewport-width", config.viewport_width),
        ("viewport-height", config.viewport_height),
    ] {
        if value == 0 || value > MAX_VIEWPORT_DIMENSION {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_VIEWPORT_DIMENSION, value
            )));
        }
    }

    if !(1..=100).contains(&config.screenshot_quality) {
        return Err(ConfigError::Validation(format!(
            "screenshot-quality must be between 1 and 100, got {}",
            config.screenshot_quality
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.chrome_executable {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chrome-executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates runner configuration
fn validate_runner_config(config: &RunnerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_jobs < 1 || config.max_concurrent_jobs > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-jobs must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_concurrent_jobs
        )));
    }
    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch timeout-ms must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_fallback_longer_than_primary_rejected() {
        let mut config = Config::default();
        config.browser.primary_timeout_ms = 5_000;
        config.browser.fallback_timeout_ms = 10_000;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_screenshot_quality() {
        let mut config = Config::default();
        config.browser.screenshot_quality = 0;
        assert!(validate(&config).is_err());

        config.browser.screenshot_quality = 100;
        assert!(validate(&config).is_ok());

        config.browser.screenshot_quality = 101;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_viewport() {
        let mut config = Config::default();
        config.browser.viewport_width = 0;
        assert!(validate(&config).is_err());

        config.browser.viewport_width = 8000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_worker_count() {
        let mut config = Config::default();
        config.runner.max_concurrent_jobs = 65;
        assert!(validate(&config).is_err());

        config.runner.max_concurrent_jobs = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let mut config = Config::default();
        config.storage.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
