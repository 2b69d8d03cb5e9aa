//! Headless browser page source
//!
//! Runs a fixed pool of Chrome sessions over WebDriver, one per concurrent
//! crawl slot. Each extraction leases a session, navigates, pulls text and
//! references out with a single script call, and resets the session to a
//! blank page before returning it to the pool.

use crate::config::BrowserConfig;
use crate::crawler::page::{PageContent, PageSource};
use crate::crawler::parser::resolve_all;
use crate::ScoutError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, error, info, warn};
use url::Url;

/// Collects everything the crawler needs from the rendered DOM
const EXTRACT_SCRIPT: &str = r#"
const attrs = (selector, name) =>
    Array.from(document.querySelectorAll(selector))
        .map((el) => el.getAttribute(name))
        .filter((value) => value);
return {
    base: document.baseURI,
    text: document.body ? document.body.innerText : "",
    hrefs: attrs("[href]", "href"),
    images: Array.from(document.images).map((img) => img.src).filter((src) => src),
    frames: Array.from(document.querySelectorAll("frame, iframe")).map((f) => f.src).filter((src) => src)
};
"#;

#[derive(Debug, Default, Deserialize)]
struct RawPage {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    hrefs: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    frames: Vec<String>,
}

/// [`PageSource`] backed by a pool of WebDriver sessions
pub struct WebDriverPages {
    sessions: Mutex<Vec<WebDriver>>,
    permits: Semaphore,
    navigation_timeout: Duration,
}

impl WebDriverPages {
    /// Starts `sessions` browser sessions
    ///
    /// Failing to start any of them is fatal to the crawl; sessions that did
    /// start are quit before the error is returned.
    pub async fn launch(
        config: &BrowserConfig,
        sessions: usize,
        navigation_timeout: Duration,
    ) -> Result<Self, ScoutError> {
        let mut drivers = Vec::with_capacity(sessions);

        for _ in 0..sessions {
            match start_session(config, navigation_timeout).await {
                Ok(driver) => drivers.push(driver),
                Err(e) => {
                    for driver in drivers {
                        if let Err(quit_err) = driver.quit().await {
                            warn!("Failed to quit browser session after launch error: {}", quit_err);
                        }
                    }
                    return Err(e);
                }
            }
        }

        info!(
            "Started {} browser session(s) at {}",
            drivers.len(),
            config.webdriver_url
        );

        Ok(Self {
            permits: Semaphore::new(drivers.len()),
            sessions: Mutex::new(drivers),
            navigation_timeout,
        })
    }

    async fn extract_with(&self, driver: &WebDriver, url: &Url) -> Result<PageContent, ScoutError> {
        match tokio::time::timeout(self.navigation_timeout, driver.goto(url.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if is_navigation_timeout(&e) => {
                warn!("Navigation to {} timed out; extracting what loaded", url);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(
                    "Navigation to {} exceeded {:?}; extracting what loaded",
                    url, self.navigation_timeout
                );
            }
        }

        let ret = driver.execute(EXTRACT_SCRIPT, Vec::new()).await?;
        let raw: RawPage = serde_json::from_value(ret.json().clone())?;

        let base = raw
            .base
            .as_deref()
            .and_then(|b| Url::parse(b).ok())
            .unwrap_or_else(|| url.clone());

        Ok(PageContent {
            text: raw.text.unwrap_or_default(),
            links: resolve_all(raw.hrefs.iter().map(String::as_str), &base),
            images: resolve_all(raw.images.iter().map(String::as_str), &base),
            frames: resolve_all(raw.frames.iter().map(String::as_str), &base),
        })
    }
}

#[async_trait]
impl PageSource for WebDriverPages {
    async fn extract(&self, url: &Url) -> Result<PageContent, ScoutError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ScoutError::BrowserClosed)?;

        let driver = self
            .sessions
            .lock()
            .await
            .pop()
            .ok_or(ScoutError::BrowserClosed)?;

        debug!("Extracting {}", url);
        let result = self.extract_with(&driver, url).await;

        if let Err(e) = driver.goto("about:blank").await {
            warn!("Failed to reset browser session after {}: {}", url, e);
        }
        self.sessions.lock().await.push(driver);

        result
    }

    async fn close(&self) -> Result<(), ScoutError> {
        self.permits.close();
        let drivers = std::mem::take(&mut *self.sessions.lock().await);
        let count = drivers.len();

        for driver in drivers {
            if let Err(e) = driver.quit().await {
                error!("Error closing browser session: {}", e);
            }
        }

        debug!("Closed {} browser session(s)", count);
        Ok(())
    }
}

async fn start_session(config: &BrowserConfig, navigation_timeout: Duration) -> Result<WebDriver, ScoutError> {
    let mut caps = DesiredCapabilities::chrome();
    caps.add_chrome_arg(&format!("--user-agent={}", config.user_agent))?;
    caps.add_chrome_arg("--disable-dev-shm-usage")?;
    if config.headless {
        caps.set_headless()?;
    }

    let driver = WebDriver::new(config.webdriver_url.as_str(), caps).await?;
    driver.set_page_load_timeout(navigation_timeout).await?;

    Ok(driver)
}

/// WebDriver reports page-load timeouts with the `timeout` error code
fn is_navigation_timeout(error: &WebDriverError) -> bool {
    error.to_string().to_ascii_lowercase().contains("timeout")
}
