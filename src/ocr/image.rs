use crate::ocr::vision::VisionClient;
use crate::ocr::ImageOcr;
use crate::ScoutError;
use async_trait::async_trait;
use url::Url;

#[async_trait]
impl ImageOcr for VisionClient {
    /// The image is fetched by the Vision service itself, straight from its URL
    async fn ocr_image(&self, url: &Url) -> Result<Option<String>, ScoutError> {
        let text = self.annotate_image(url.as_str()).await?;
        tracing::debug!(
            "OCR of {} found {} characters",
            url,
            text.as_ref().map_or(0, |t| t.len())
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::Credentials;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_image_without_text_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images:annotate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [{}] })))
            .mount(&server)
            .await;

        let vision = VisionClient::new(
            reqwest::Client::new(),
            Url::parse(&server.uri()).unwrap(),
            Credentials::default(),
            Duration::from_millis(10),
        );
        let text = vision
            .ocr_image(&Url::parse("https://bar.com/logo.png").unwrap())
            .await
            .unwrap();

        assert!(text.is_none());
    }
}
