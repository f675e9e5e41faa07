//! Configuration module for Pagescope
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to their defaults.
//!
//! # Example
//!
//! ```no_run
//! use pagescope::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagescope.toml")).unwrap();
//! println!("Primary navigation timeout: {}ms", config.browser.primary_timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, FetchConfig, RunnerConfig, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
