//! Plain HTTP page source
//!
//! This module fetches pages without a browser:
//! - Building HTTP clients with the configured user agent
//! - GET requests bounded by the navigation timeout
//! - Status and Content-Type checks
//! - Handing the body to the HTML parser
//!
//! Pages that build their content with JavaScript come back mostly empty
//! here; the WebDriver source covers those.

use crate::config::BrowserConfig;
use crate::crawler::page::{PageContent, PageSource};
use crate::crawler::parser::parse_page;
use crate::ScoutError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Builds an HTTP client for page fetches
///
/// # Arguments
///
/// * `config` - The browser configuration (for the user agent)
/// * `timeout` - Whole-request timeout, normally the navigation timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &BrowserConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageSource`] backed by reqwest and the scraper-based parser
#[derive(Debug, Clone)]
pub struct HttpPages {
    client: Client,
}

impl HttpPages {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &BrowserConfig, navigation_timeout: Duration) -> Result<Self, ScoutError> {
        let client = build_http_client(config, navigation_timeout).map_err(ScoutError::HttpClient)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl PageSource for HttpPages {
    /// Fetches and parses one page
    ///
    /// # Response Handling
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout (connect, headers or body) | `Ok` with empty content |
    /// | Non-2xx status | `Err(Http)` |
    /// | Content-Type present and not HTML | `Err(ContentMismatch)` |
    /// | Otherwise | parsed page, references resolved against the final URL |
    async fn extract(&self, url: &Url) -> Result<PageContent, ScoutError> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("Navigation to {} timed out; continuing with an empty page", url);
                return Ok(PageContent::default());
            }
            Err(e) => return Err(ScoutError::http(url.as_str(), e)),
        };

        let response = response
            .error_for_status()
            .map_err(|e| ScoutError::http(url.as_str(), e))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = content_type {
            if !content_type.contains("html") {
                return Err(ScoutError::ContentMismatch {
                    url: url.to_string(),
                    content_type,
                });
            }
        }

        let final_url = response.url().clone();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                warn!("Reading {} timed out; continuing with an empty page", url);
                return Ok(PageContent::default());
            }
            Err(e) => return Err(ScoutError::http(url.as_str(), e)),
        };

        Ok(parse_page(&body, &final_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pages(timeout: Duration) -> HttpPages {
        HttpPages::from_config(&BrowserConfig::default(), timeout).unwrap()
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&BrowserConfig::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_extracts_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(
                r#"<html><body><p>Happy Hour 4-6</p><a href="/menu">Menu</a><img src="/hh.png"></body></html>"#,
            ))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let page = pages(Duration::from_secs(5)).extract(&url).await.unwrap();

        assert_eq!(page.text, "Happy Hour 4-6\nMenu");
        assert_eq!(page.links, vec![url.join("/menu").unwrap()]);
        assert_eq!(page.images, vec![url.join("/hh.png").unwrap()]);
    }

    #[tokio::test]
    async fn test_timeout_is_soft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html("<html><body>late</body></html>").set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let page = pages(Duration::from_millis(100)).extract(&url).await.unwrap();

        assert_eq!(page, PageContent::default());
    }

    #[tokio::test]
    async fn test_error_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let result = pages(Duration::from_secs(5)).extract(&url).await;

        assert!(matches!(result, Err(ScoutError::Http { .. })));
    }

    #[tokio::test]
    async fn test_non_html_is_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let result = pages(Duration::from_secs(5)).extract(&url).await;

        assert!(matches!(result, Err(ScoutError::ContentMismatch { .. })));
    }
}
