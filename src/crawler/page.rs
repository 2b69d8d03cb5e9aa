//! Page extraction seam
//!
//! The coordinator only sees [`PageSource`]; the headless browser and the
//! plain HTTP fetcher both sit behind it, as do test doubles.

use crate::ScoutError;
use async_trait::async_trait;
use url::Url;

/// What one page visit yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Visible text of the page body (may be empty)
    pub text: String,

    /// Every outbound `href`, absolute
    pub links: Vec<Url>,

    /// Image sources, absolute
    pub images: Vec<Url>,

    /// Frame and iframe sources, absolute, in document order
    pub frames: Vec<Url>,
}

/// Loads a page and extracts its text and references
///
/// A navigation that merely times out is not an error: implementations
/// extract whatever loaded (possibly nothing) and return `Ok`. Any other
/// failure is returned as `Err` and costs the crawl only this page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<PageContent, ScoutError>;

    /// Releases the underlying resources. Called once when the crawl ends.
    async fn close(&self) -> Result<(), ScoutError> {
        Ok(())
    }
}
