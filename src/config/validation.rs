use crate::config::types::{BrowserConfig, CacheConfig, Config, CrawlerConfig, OcrConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_ocr_config(&config.ocr)?;
    validate_cache_config(&config.cache)?;
    Ok(())
}

/// Validates crawler limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 32 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 32, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.work_budget == 0 {
        return Err(ConfigError::Validation(
            "work_budget must be at least 1".to_string(),
        ));
    }

    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    Ok(())
}

/// Validates browser settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    validate_http_url("webdriver_url", &config.webdriver_url)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates OCR service settings
fn validate_ocr_config(config: &OcrConfig) -> Result<(), ConfigError> {
    if config.bucket.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ocr bucket cannot be empty".to_string(),
        ));
    }

    if config.bucket.contains('/') {
        return Err(ConfigError::Validation(format!(
            "ocr bucket '{}' must be a bare bucket name",
            config.bucket
        )));
    }

    validate_http_url("vision_endpoint", &config.vision_endpoint)?;
    validate_http_url("storage_endpoint", &config.storage_endpoint)?;

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll_interval_ms must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks that a configured endpoint is an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("{} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}
