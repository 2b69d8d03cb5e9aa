//! OCR module for images and PDFs
//!
//! # Components
//!
//! - `ImageOcr` / `PdfOcr`: the seams the coordinator calls
//! - `VisionClient`: Cloud Vision REST client (image annotation, async PDF batches)
//! - `GcsBlobStore`: Cloud Storage JSON API client for staging PDFs and reading results
//! - `PdfOcrPipeline`: cache-aware PDF flow over a `BlobStore` and a `DocumentOcr`
//!
//! OCR errors never end a crawl; the coordinator logs them and moves on.

mod blob;
mod credentials;
mod image;
mod pdf;
mod vision;

pub use blob::{BlobStore, GcsBlobStore};
pub use credentials::Credentials;
pub use pdf::{PdfKeys, PdfOcrPipeline};
pub use vision::VisionClient;

use crate::config::{BrowserConfig, OcrConfig};
use crate::{ScoutError, UrlError};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Extracts text from an image URL
#[async_trait]
pub trait ImageOcr: Send + Sync {
    /// Returns the detected text, or `None` when the image holds none
    async fn ocr_image(&self, url: &Url) -> Result<Option<String>, ScoutError>;
}

/// Extracts text from a PDF URL
#[async_trait]
pub trait PdfOcr: Send + Sync {
    /// Returns the detected text of the first page, or `None` when there is none
    async fn ocr_pdf(&self, url: &Url) -> Result<Option<String>, ScoutError>;
}

/// Long-running document annotation between two blob locations
#[async_trait]
pub trait DocumentOcr: Send + Sync {
    /// Annotates the PDF at `source_uri` and writes JSON results under
    /// `destination_prefix`, returning once the operation is done
    async fn annotate_pdf(&self, source_uri: &str, destination_prefix: &str) -> Result<(), ScoutError>;
}

/// Builds the client used for Vision, Cloud Storage and PDF downloads
pub fn build_api_client(config: &BrowserConfig) -> Result<Client, ScoutError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
        .map_err(ScoutError::HttpClient)
}

/// OCR adapters wired from configuration
pub struct OcrServices {
    pub images: Arc<dyn ImageOcr>,
    pub pdfs: Arc<dyn PdfOcr>,
}

impl OcrServices {
    /// Builds the Vision and Cloud Storage clients and the PDF pipeline
    ///
    /// Credentials are read from the environment variables named in `config`.
    pub fn from_config(ocr: &OcrConfig, browser: &BrowserConfig) -> Result<Self, ScoutError> {
        let client = build_api_client(browser)?;
        let credentials = Credentials::from_env(ocr);
        if credentials.is_empty() {
            tracing::warn!(
                "Neither {} nor {} is set; OCR requests will be unauthenticated",
                ocr.access_token_env,
                ocr.api_key_env
            );
        }

        let vision = Arc::new(VisionClient::new(
            client.clone(),
            Url::parse(&ocr.vision_endpoint)?,
            credentials.clone(),
            Duration::from_millis(ocr.poll_interval_ms),
        ));
        let blobs = Arc::new(GcsBlobStore::new(
            client.clone(),
            Url::parse(&ocr.storage_endpoint)?,
            ocr.bucket.clone(),
            credentials,
        ));
        let pdfs = Arc::new(PdfOcrPipeline::new(client, blobs, vision.clone()));

        Ok(Self { images: vision, pdfs })
    }
}

/// Appends path segments to `base`, percent-encoding each one
pub(crate) fn endpoint_url<'a, I>(base: &Url, segments: I) -> Result<Url, ScoutError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| UrlError::Parse(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
