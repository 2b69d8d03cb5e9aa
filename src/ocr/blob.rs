//! Cloud Storage blob access
//!
//! PDF OCR reads and writes through a [`BlobStore`]: the source PDF is
//! uploaded there and the OCR service writes its JSON results beside it.

use crate::ocr::credentials::Credentials;
use crate::ocr::endpoint_url;
use crate::ScoutError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Object storage operations used by the PDF pipeline
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Names of every object whose name starts with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<String>, ScoutError>;

    /// Uploads the local file at `path` as object `name`
    async fn upload_file(&self, path: &Path, name: &str) -> Result<(), ScoutError>;

    /// Downloads object `name`
    async fn download(&self, name: &str) -> Result<Vec<u8>, ScoutError>;

    /// The `gs://` URI of object (or prefix) `name`
    fn uri(&self, name: &str) -> String;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectMeta>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectMeta {
    name: String,
}

/// [`BlobStore`] over the Cloud Storage JSON API
#[derive(Debug, Clone)]
pub struct GcsBlobStore {
    client: Client,
    endpoint: Url,
    bucket: String,
    credentials: Credentials,
}

impl GcsBlobStore {
    pub fn new(client: Client, endpoint: Url, bucket: String, credentials: Credentials) -> Self {
        Self {
            client,
            endpoint,
            bucket,
            credentials,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn storage_error(context: &str, name: &str, e: reqwest::Error) -> ScoutError {
        ScoutError::BlobStorage(format!("{} {}: {}", context, name, e))
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, ScoutError> {
        let url = endpoint_url(&self.endpoint, ["storage", "v1", "b", self.bucket.as_str(), "o"])?;
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(url.clone()).query(&[("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ObjectList = self
                .credentials
                .apply(request)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| Self::storage_error("listing", prefix, e))?
                .json()
                .await
                .map_err(|e| Self::storage_error("listing", prefix, e))?;

            names.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::trace!("Listed {} object(s) under {}", names.len(), prefix);
        Ok(names)
    }

    async fn upload_file(&self, path: &Path, name: &str) -> Result<(), ScoutError> {
        let bytes = tokio::fs::read(path).await?;
        let url = endpoint_url(&self.endpoint, ["upload", "storage", "v1", "b", self.bucket.as_str(), "o"])?;

        let request = self
            .client
            .post(url)
            .query(&[("uploadType", "media"), ("name", name)])
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(bytes);

        self.credentials
            .apply(request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::storage_error("uploading", name, e))?;

        tracing::debug!("Uploaded {} to gs://{}/{}", path.display(), self.bucket, name);
        Ok(())
    }

    async fn download(&self, name: &str) -> Result<Vec<u8>, ScoutError> {
        let url = endpoint_url(&self.endpoint, ["storage", "v1", "b", self.bucket.as_str(), "o", name])?;
        let request = self.client.get(url).query(&[("alt", "media")]);

        let bytes = self
            .credentials
            .apply(request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::storage_error("downloading", name, e))?
            .bytes()
            .await
            .map_err(|e| Self::storage_error("downloading", name, e))?;

        Ok(bytes.to_vec())
    }

    fn uri(&self, name: &str) -> String {
        format!("gs://{}/{}", self.bucket, name)
    }
}
