use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use happyhour_scout::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs point at the same host
///
/// Ports and schemes are ignored; only the host name is compared. URLs
/// without a host never match.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns true when `link` has the same origin and path as `seed`
///
/// Query strings and fragments are not part of the comparison.
pub fn same_origin_and_path(link: &Url, seed: &Url) -> bool {
    link.origin() == seed.origin() && link.path() == seed.path()
}
