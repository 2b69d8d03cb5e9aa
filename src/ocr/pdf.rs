//! Cache-aware PDF OCR
//!
//! # Flow
//!
//! 1. Derive the blob names for the PDF from its URL
//! 2. If a JSON result already sits under the result prefix, read it and stop
//! 3. Download the PDF to a temporary file and upload it
//! 4. Run document OCR from the uploaded PDF into the result prefix
//! 5. List the prefix again and read the first JSON result
//!
//! Only the first page's text is returned. The temporary file is removed on
//! every path.

use crate::ocr::blob::BlobStore;
use crate::ocr::vision::artifact_text;
use crate::ocr::{DocumentOcr, PdfOcr};
use crate::{ScoutError, UrlError};
use async_trait::async_trait;
use reqwest::Client;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

/// Blob names derived from a PDF URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfKeys {
    /// Where the PDF itself is uploaded: `{host}/{flattened path}`
    pub object: String,

    /// Prefix the OCR results are written under: the object name with its
    /// `.pdf` extension removed
    pub artifact_prefix: String,
}

impl PdfKeys {
    /// Derives the blob names for `url`
    ///
    /// The path's separators become underscores and the leading one is
    /// dropped, so `https://bar.com/menus/hh.pdf` maps to object
    /// `bar.com/menus_hh.pdf` and prefix `bar.com/menus_hh`.
    pub fn derive(url: &Url) -> Result<Self, ScoutError> {
        let host = url.host_str().ok_or(UrlError::MissingHost)?;

        let flattened = url.path().replace('/', "_");
        let flat = flattened.strip_prefix('_').unwrap_or(&flattened);

        let stem = match flat.to_ascii_lowercase().rfind(".pdf") {
            Some(idx) => &flat[..idx],
            None => flat,
        };

        Ok(Self {
            object: format!("{}/{}", host, flat),
            artifact_prefix: format!("{}/{}", host, stem),
        })
    }

    fn is_artifact(&self, name: &str) -> bool {
        name.starts_with(&self.artifact_prefix) && name.ends_with(".json")
    }
}

/// [`PdfOcr`] that stages PDFs in blob storage and reuses earlier results
pub struct PdfOcrPipeline {
    client: Client,
    blobs: Arc<dyn BlobStore>,
    ocr: Arc<dyn DocumentOcr>,
}

impl PdfOcrPipeline {
    pub fn new(client: Client, blobs: Arc<dyn BlobStore>, ocr: Arc<dyn DocumentOcr>) -> Self {
        Self { client, blobs, ocr }
    }

    async fn find_artifact(&self, keys: &PdfKeys) -> Result<Option<String>, ScoutError> {
        let names = self.blobs.list(&keys.artifact_prefix).await?;
        Ok(names.into_iter().find(|name| keys.is_artifact(name)))
    }

    async fn read_artifact(&self, name: &str) -> Result<Option<String>, ScoutError> {
        let bytes = self.blobs.download(name).await?;
        artifact_text(&bytes)
    }

    /// Downloads the PDF into a temporary file and uploads it as `keys.object`
    async fn stage_pdf(&self, url: &Url, keys: &PdfKeys) -> Result<(), ScoutError> {
        let bytes = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ScoutError::http(url.as_str(), e))?
            .bytes()
            .await
            .map_err(|e| ScoutError::http(url.as_str(), e))?;

        let mut staged = NamedTempFile::new()?;
        staged.write_all(&bytes)?;
        staged.flush()?;

        self.blobs.upload_file(staged.path(), &keys.object).await?;

        if let Err(e) = staged.close() {
            warn!("Failed to remove staged copy of {}: {}", url, e);
        }
        Ok(())
    }
}

#[async_trait]
impl PdfOcr for PdfOcrPipeline {
    async fn ocr_pdf(&self, url: &Url) -> Result<Option<String>, ScoutError> {
        let keys = PdfKeys::derive(url)?;

        if let Some(name) = self.find_artifact(&keys).await? {
            debug!("Reusing OCR result {} for {}", name, url);
            return self.read_artifact(&name).await;
        }

        info!("Running PDF OCR for {}", url);
        self.stage_pdf(url, &keys).await?;
        self.ocr
            .annotate_pdf(&self.blobs.uri(&keys.object), &self.blobs.uri(&keys.artifact_prefix))
            .await?;

        let name = self.find_artifact(&keys).await?.ok_or_else(|| {
            ScoutError::Ocr(format!("no OCR output under {}", self.blobs.uri(&keys.artifact_prefix)))
        })?;
        self.read_artifact(&name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARTIFACT: &[u8] = br#"{"responses":[{"fullTextAnnotation":{"text":"Happy Hour 3-6pm"}}]}"#;

    #[derive(Default)]
    struct MemoryBlobs {
        objects: Mutex<BTreeMap<String, Vec<u8>>>,
        staged_paths: Mutex<Vec<PathBuf>>,
    }

    impl MemoryBlobs {
        fn insert(&self, name: &str, bytes: &[u8]) {
            self.objects.lock().unwrap().insert(name.to_string(), bytes.to_vec());
        }

        fn get(&self, name: &str) -> Option<Vec<u8>> {
            self.objects.lock().unwrap().get(name).cloned()
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobs {
        async fn list(&self, prefix: &str) -> Result<Vec<String>, ScoutError> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .keys()
                .filter(|name| name.starts_with(prefix))
                .cloned()
                .collect())
        }

        async fn upload_file(&self, path: &Path, name: &str) -> Result<(), ScoutError> {
            let bytes = std::fs::read(path)?;
            self.staged_paths.lock().unwrap().push(path.to_path_buf());
            self.insert(name, &bytes);
            Ok(())
        }

        async fn download(&self, name: &str) -> Result<Vec<u8>, ScoutError> {
            self.get(name)
                .ok_or_else(|| ScoutError::BlobStorage(format!("no such object {}", name)))
        }

        fn uri(&self, name: &str) -> String {
            format!("gs://test/{}", name)
        }
    }

    /// Writes `output` under the destination prefix when asked to annotate
    struct FakeVision {
        blobs: Arc<MemoryBlobs>,
        output: Option<&'static [u8]>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentOcr for FakeVision {
        async fn annotate_pdf(&self, source_uri: &str, destination_prefix: &str) -> Result<(), ScoutError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(self.blobs.get(source_uri.trim_start_matches("gs://test/")).is_some());
            if let Some(output) = self.output {
                let prefix = destination_prefix.trim_start_matches("gs://test/");
                self.blobs.insert(&format!("{}output-1-to-1.json", prefix), output);
            }
            Ok(())
        }
    }

    fn pipeline(blobs: &Arc<MemoryBlobs>, output: Option<&'static [u8]>) -> (PdfOcrPipeline, Arc<FakeVision>) {
        let vision = Arc::new(FakeVision {
            blobs: blobs.clone(),
            output,
            calls: AtomicUsize::new(0),
        });
        let pipeline = PdfOcrPipeline::new(Client::new(), blobs.clone(), vision.clone());
        (pipeline, vision)
    }

    async fn pdf_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menus/hh.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 fake".to_vec(), "application/pdf"))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_derive_keys() {
        let keys = PdfKeys::derive(&Url::parse("https://bar.com/menus/hh.pdf").unwrap()).unwrap();
        assert_eq!(keys.object, "bar.com/menus_hh.pdf");
        assert_eq!(keys.artifact_prefix, "bar.com/menus_hh");
    }

    #[test]
    fn test_derive_keys_uppercase_extension() {
        let keys = PdfKeys::derive(&Url::parse("https://bar.com/HH.PDF").unwrap()).unwrap();
        assert_eq!(keys.object, "bar.com/HH.PDF");
        assert_eq!(keys.artifact_prefix, "bar.com/HH");
    }

    #[test]
    fn test_artifact_match() {
        let keys = PdfKeys::derive(&Url::parse("https://bar.com/hh.pdf").unwrap()).unwrap();
        assert!(keys.is_artifact("bar.com/hhoutput-1-to-1.json"));
        assert!(!keys.is_artifact("bar.com/hh.pdf"));
        assert!(!keys.is_artifact("other.com/hhoutput-1-to-1.json"));
    }

    #[tokio::test]
    async fn test_cached_result_skips_upload_and_ocr() {
        let blobs = Arc::new(MemoryBlobs::default());
        blobs.insert("bar.com/menus_hhoutput-1-to-1.json", ARTIFACT);
        let (pipeline, vision) = pipeline(&blobs, None);

        let url = Url::parse("https://bar.com/menus/hh.pdf").unwrap();
        let text = pipeline.ocr_pdf(&url).await.unwrap();

        assert_eq!(text.as_deref(), Some("Happy Hour 3-6pm"));
        assert_eq!(vision.calls.load(Ordering::SeqCst), 0);
        assert!(blobs.staged_paths.lock().unwrap().is_empty());
        assert!(blobs.get("bar.com/menus_hh.pdf").is_none());
    }

    #[tokio::test]
    async fn test_miss_stages_pdf_and_runs_ocr() {
        let server = pdf_server().await;
        let blobs = Arc::new(MemoryBlobs::default());
        let (pipeline, vision) = pipeline(&blobs, Some(ARTIFACT));

        let url = Url::parse(&format!("{}/menus/hh.pdf", server.uri())).unwrap();
        let keys = PdfKeys::derive(&url).unwrap();
        let text = pipeline.ocr_pdf(&url).await.unwrap();

        assert_eq!(text.as_deref(), Some("Happy Hour 3-6pm"));
        assert_eq!(vision.calls.load(Ordering::SeqCst), 1);
        assert_eq!(blobs.get(&keys.object).as_deref(), Some(&b"%PDF-1.4 fake"[..]));

        let staged = blobs.staged_paths.lock().unwrap().clone();
        assert_eq!(staged.len(), 1);
        assert!(!staged[0].exists());
    }

    #[tokio::test]
    async fn test_second_lookup_uses_cache() {
        let server = pdf_server().await;
        let blobs = Arc::new(MemoryBlobs::default());
        let (pipeline, vision) = pipeline(&blobs, Some(ARTIFACT));

        let url = Url::parse(&format!("{}/menus/hh.pdf", server.uri())).unwrap();
        pipeline.ocr_pdf(&url).await.unwrap();
        pipeline.ocr_pdf(&url).await.unwrap();

        assert_eq!(vision.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_output_is_error() {
        let server = pdf_server().await;
        let blobs = Arc::new(MemoryBlobs::default());
        let (pipeline, _vision) = pipeline(&blobs, None);

        let url = Url::parse(&format!("{}/menus/hh.pdf", server.uri())).unwrap();
        let result = pipeline.ocr_pdf(&url).await;

        assert!(matches!(result, Err(ScoutError::Ocr(_))));
    }

    #[tokio::test]
    async fn test_cached_result_over_rest_apis() {
        use crate::ocr::{Credentials, GcsBlobStore, VisionClient};
        use serde_json::json;
        use std::time::Duration;
        use wiremock::matchers::query_param;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/menus/o"))
            .and(query_param("prefix", "bar.com/menus_hh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "name": "bar.com/menus_hh.pdf" },
                    { "name": "bar.com/menus_hhoutput-1-to-1.json" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/menus/o/bar.com%2Fmenus_hhoutput-1-to-1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(ARTIFACT.to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/menus/o"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/files:asyncBatchAnnotate"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&server.uri()).unwrap();
        let blobs = Arc::new(GcsBlobStore::new(
            Client::new(),
            endpoint.clone(),
            "menus".to_string(),
            Credentials::default(),
        ));
        let vision = Arc::new(VisionClient::new(
            Client::new(),
            endpoint,
            Credentials::default(),
            Duration::from_millis(10),
        ));
        let pipeline = PdfOcrPipeline::new(Client::new(), blobs, vision);

        let text = pipeline
            .ocr_pdf(&Url::parse("https://bar.com/menus/hh.pdf").unwrap())
            .await
            .unwrap();

        assert_eq!(text.as_deref(), Some("Happy Hour 3-6pm"));
    }

    #[tokio::test]
    async fn test_download_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let blobs = Arc::new(MemoryBlobs::default());
        let (pipeline, vision) = pipeline(&blobs, Some(ARTIFACT));

        let url = Url::parse(&format!("{}/menus/hh.pdf", server.uri())).unwrap();
        let result = pipeline.ocr_pdf(&url).await;

        assert!(matches!(result, Err(ScoutError::Http { .. })));
        assert_eq!(vision.calls.load(Ordering::SeqCst), 0);
    }
}
