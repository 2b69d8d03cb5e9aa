//! HTML parser for extracting visible text and outbound references
//!
//! This module handles parsing HTML content to extract:
//! - Visible body text (script, style and template content excluded)
//! - Every `href` on the page
//! - Image sources
//! - Frame and iframe sources

use crate::crawler::page::PageContent;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never reaches the rendered page
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses HTML content into a [`PageContent`]
///
/// # Reference Extraction Rules
///
/// **Links:** every element with an `href` attribute (anchors, areas and
/// `<link>` tags alike), resolved against `base_url`.
///
/// **Images:** `<img src="...">`
///
/// **Frames:** `<frame src="...">` and `<iframe src="...">`
///
/// **Excluded everywhere:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Anything that is not HTTP(S) after resolution
///
/// Fragments are stripped and each list is de-duplicated in document order.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page's own URL, used for resolving relative references
///
/// # Example
///
/// ```
/// use happyhour_scout::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><body><p>Happy Hour 4-6</p><a href="/menu">Menu</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let page = parse_page(html, &base_url);
/// assert_eq!(page.text, "Happy Hour 4-6\nMenu");
/// assert_eq!(page.links[0].as_str(), "https://example.com/menu");
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> PageContent {
    let document = Html::parse_document(html);

    PageContent {
        text: extract_visible_text(&document),
        links: extract_attr(&document, "[href]", "href", base_url),
        images: extract_attr(&document, "img[src]", "src", base_url),
        frames: extract_attr(&document, "frame[src], iframe[src]", "src", base_url),
    }
}

/// Collects the text nodes under `<body>`, one trimmed line per node
fn extract_visible_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };

    let mut lines = Vec::new();
    for body in document.select(&body_selector) {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
            });
            if hidden {
                continue;
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed);
            }
        }
    }

    lines.join("\n")
}

fn extract_attr(document: &Html, selector: &str, attr: &str, base_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    resolve_all(
        document
            .select(&selector)
            .filter_map(|element| element.value().attr(attr)),
        base_url,
    )
}

/// Resolves raw references against `base_url`, dropping invalid ones and duplicates
///
/// Order of first appearance is preserved.
pub fn resolve_all<'a, I>(refs: I, base_url: &Url) -> Vec<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// Resolves a reference to an absolute URL and validates it
///
/// Returns None if the reference should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is removed.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut resolved = base_url.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);

    Some(resolved)
}
