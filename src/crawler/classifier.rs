//! Keyword matching and page bucketing

use crate::output::Bucket;
use url::Url;

/// Term for happy hour mentions
pub const HAPPY_HOUR: &str = "happyhour";

/// Term for specials mentions
pub const SPECIAL: &str = "special";

/// Term for menu mentions
pub const MENU: &str = "menu";

/// Returns true if `text` contains `term` once punctuation, whitespace and case are ignored
///
/// Every character that is not an ASCII letter or digit is dropped before the
/// comparison, so "Happy Hour!", "happy-hour" and "HAPPYHOUR" all match
/// `"happyhour"`. `term` itself is expected to be lowercase alphanumeric.
///
/// # Examples
///
/// ```
/// use happyhour_scout::crawler::term_match;
///
/// assert!(term_match("Happy Hour $5!", "happyhour"));
/// assert!(!term_match("not a deal", "happyhour"));
/// ```
pub fn term_match(text: &str, term: &str) -> bool {
    let squashed: String = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    squashed.contains(term)
}

/// Picks the bucket a finished page's text belongs to
///
/// Rules are tried in order and the first match wins:
/// 1. the page URL mentions happy hour → `HappyHourLinkText`
/// 2. the text mentions happy hour → `HappyHourText`
/// 3. the text mentions specials → `Specials`
pub fn page_bucket(url: &Url, text: &str) -> Option<Bucket> {
    if term_match(url.as_str(), HAPPY_HOUR) {
        Some(Bucket::HappyHourLinkText)
    } else if term_match(text, HAPPY_HOUR) {
        Some(Bucket::HappyHourText)
    } else if term_match(text, SPECIAL) {
        Some(Bucket::Specials)
    } else {
        None
    }
}
