use crate::config::OcrConfig;
use reqwest::RequestBuilder;
use std::fmt;

/// Credentials for the Vision and Cloud Storage REST APIs
///
/// An OAuth access token is sent as a bearer token; an API key is sent as
/// the `key` query parameter. Both may be present.
#[derive(Clone, Default)]
pub struct Credentials {
    access_token: Option<String>,
    api_key: Option<String>,
}

impl Credentials {
    pub fn new(access_token: Option<String>, api_key: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Reads credentials from the environment variables named in `config`
    pub fn from_env(config: &OcrConfig) -> Self {
        Self::new(
            std::env::var(&config.access_token_env).ok(),
            std::env::var(&config.api_key_env).ok(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.api_key.is_none()
    }

    /// Adds whatever credentials are present to `request`
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
