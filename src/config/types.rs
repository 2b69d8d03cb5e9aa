use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Happyhour-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub ocr: OcrConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Crawl traversal limits
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Deepest recursion level (from the seed at depth 0) that is still admitted
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of crawl tasks allowed to run at the same time
    #[serde(rename = "max-concurrent-tasks", default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: u32,

    /// Ceiling on heavy (fetch/OCR) task starts per crawl
    #[serde(rename = "work-budget", default = "default_work_budget")]
    pub work_budget: u32,

    /// Page navigation timeout (milliseconds); hitting it is a soft failure
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            work_budget: default_work_budget(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
        }
    }
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Concurrency as a slot count (never zero)
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_tasks.max(1) as usize
    }
}

/// Which page source drives HTML extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserBackend {
    /// Headless Chrome driven over the WebDriver protocol
    Webdriver,
    /// Plain HTTP fetch with a static HTML parse
    Http,
}

/// Browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_backend")]
    pub backend: BrowserBackend,

    /// WebDriver server (chromedriver / selenium) address
    #[serde(rename = "webdriver-url", default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent presented by both backends
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: default_user_agent(),
        }
    }
}

/// OCR and blob storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Blob storage bucket used for PDF uploads and OCR artifacts
    pub bucket: String,

    #[serde(rename = "vision-endpoint", default = "default_vision_endpoint")]
    pub vision_endpoint: String,

    #[serde(rename = "storage-endpoint", default = "default_storage_endpoint")]
    pub storage_endpoint: String,

    /// Environment variable holding an API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Environment variable holding an OAuth access token
    #[serde(rename = "access-token-env", default = "default_access_token_env")]
    pub access_token_env: String,

    /// Delay between polls of a running batch OCR operation (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Website text cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_concurrent_tasks() -> u32 {
    3
}

fn default_work_budget() -> u32 {
    25
}

fn default_navigation_timeout_ms() -> u64 {
    20_000
}

fn default_backend() -> BrowserBackend {
    BrowserBackend::Webdriver
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("happyhour-scout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_storage_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_access_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_database_path() -> String {
    "./website_text.db".to_string()
}
