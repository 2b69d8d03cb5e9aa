//! Cloud Vision REST client
//!
//! Two calls are used:
//! - `images:annotate` with `DOCUMENT_TEXT_DETECTION` for images by URL
//! - `files:asyncBatchAnnotate` for PDFs already staged in Cloud Storage,
//!   followed by polling the returned long-running operation

use crate::ocr::credentials::Credentials;
use crate::ocr::{endpoint_url, DocumentOcr};
use crate::ScoutError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// One entry of an annotate response (also the shape of each entry in a
/// PDF result artifact)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    full_text_annotation: Option<TextAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<Status>,
}

/// Client for the Cloud Vision REST API
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
    poll_interval: Duration,
}

impl VisionClient {
    pub fn new(client: Client, endpoint: Url, credentials: Credentials, poll_interval: Duration) -> Self {
        Self {
            client,
            endpoint,
            credentials,
            poll_interval,
        }
    }

    /// Runs document text detection on the image at `image_uri`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(text))` - Full text of the image
    /// * `Ok(None)` - The image holds no text
    /// * `Err(ScoutError)` - Transport failure or an error reported by the API
    pub async fn annotate_image(&self, image_uri: &str) -> Result<Option<String>, ScoutError> {
        let url = endpoint_url(&self.endpoint, ["v1", "images:annotate"])?;
        let body = json!({
            "requests": [{
                "image": { "source": { "imageUri": image_uri } },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let batch: BatchResponse = self.send_json(self.client.post(url.clone()).json(&body), &url).await?;
        first_page_text(batch)
    }

    /// Starts an async batch annotation of a PDF and returns the operation name
    pub async fn submit_pdf(&self, source_uri: &str, destination_prefix: &str) -> Result<String, ScoutError> {
        let url = endpoint_url(&self.endpoint, ["v1", "files:asyncBatchAnnotate"])?;
        let body = json!({
            "requests": [{
                "inputConfig": {
                    "gcsSource": { "uri": source_uri },
                    "mimeType": "application/pdf"
                },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
                "outputConfig": {
                    "gcsDestination": { "uri": destination_prefix },
                    "batchSize": 100
                }
            }]
        });

        let operation: Operation = self.send_json(self.client.post(url.clone()).json(&body), &url).await?;
        tracing::debug!("Submitted PDF OCR for {} as {}", source_uri, operation.name);
        Ok(operation.name)
    }

    /// Polls a long-running operation until it reports `done`
    pub async fn wait_for_operation(&self, name: &str) -> Result<(), ScoutError> {
        let url = endpoint_url(&self.endpoint, std::iter::once("v1").chain(name.split('/')))?;

        loop {
            let operation: Operation = self.send_json(self.client.get(url.clone()), &url).await?;

            if operation.done {
                return match operation.error {
                    Some(status) => Err(ScoutError::Ocr(format!(
                        "operation {} failed ({}): {}",
                        name, status.code, status.message
                    ))),
                    None => Ok(()),
                };
            }

            tracing::trace!("Operation {} still running", name);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<T, ScoutError> {
        let response = self
            .credentials
            .apply(request)
            .send()
            .await
            .map_err(|e| ScoutError::http(url.as_str(), e))?
            .error_for_status()
            .map_err(|e| ScoutError::http(url.as_str(), e))?;

        response.json::<T>().await.map_err(|e| ScoutError::http(url.as_str(), e))
    }
}

#[async_trait]
impl DocumentOcr for VisionClient {
    async fn annotate_pdf(&self, source_uri: &str, destination_prefix: &str) -> Result<(), ScoutError> {
        let name = self.submit_pdf(source_uri, destination_prefix).await?;
        self.wait_for_operation(&name).await
    }
}

/// Reads the full text of the first page out of a PDF result artifact
pub fn artifact_text(bytes: &[u8]) -> Result<Option<String>, ScoutError> {
    let batch: BatchResponse = serde_json::from_slice(bytes)?;
    first_page_text(batch)
}

fn first_page_text(batch: BatchResponse) -> Result<Option<String>, ScoutError> {
    let Some(first) = batch.responses.into_iter().next() else {
        return Ok(None);
    };

    if let Some(status) = first.error {
        return Err(ScoutError::Ocr(format!("annotation failed ({}): {}", status.code, status.message)));
    }

    Ok(first
        .full_text_annotation
        .map(|annotation| annotation.text)
        .filter(|text| !text.trim().is_empty()))
}
