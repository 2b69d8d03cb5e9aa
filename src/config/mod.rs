//! Configuration module for Happyhour-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use happyhour_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("happyhour-scout.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserBackend, BrowserConfig, CacheConfig, Config, CrawlerConfig, OcrConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
