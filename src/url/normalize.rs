use crate::UrlError;
use url::Url;

/// Reduces a URL to the form used for duplicate detection
///
/// # Canonicalization Steps
///
/// 1. Drop everything up to and including the first `://`
/// 2. Drop one trailing slash, if present
///
/// Scheme and trailing-slash variants therefore collapse onto one entry, so
/// `http://x.com/` and `https://x.com` are the same resource as far as the
/// visited set is concerned. Nothing else (case, query, port) is touched.
///
/// # Examples
///
/// ```
/// use happyhour_scout::url::canonicalize;
///
/// assert_eq!(canonicalize("http://example.com/"), "example.com");
/// assert_eq!(canonicalize("https://example.com/menu/"), "example.com/menu");
/// ```
pub fn canonicalize(url: &str) -> String {
    let without_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };

    without_scheme
        .strip_suffix('/')
        .unwrap_or(without_scheme)
        .to_string()
}

/// Parses the seed URL handed to a crawl
///
/// The seed must be an absolute http(s) URL with a host; anything else is
/// rejected before a browser is launched.
///
/// # Examples
///
/// ```
/// use happyhour_scout::url::parse_seed_url;
///
/// let seed = parse_seed_url(" https://example.com ").unwrap();
/// assert_eq!(seed.as_str(), "https://example.com/");
/// assert!(parse_seed_url("ftp://example.com").is_err());
/// ```
pub fn parse_seed_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
