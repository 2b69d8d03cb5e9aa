use crate::url::canonicalize;
use std::collections::HashSet;

/// Canonical URLs already admitted during one crawl
///
/// The check and the insertion happen in a single call with no suspension
/// point between them, so two producers handing in the same canonical URL can
/// never both be admitted.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the URL and returns true the first time its canonical form is seen
    pub fn try_visit(&mut self, url: &str) -> bool {
        self.seen.insert(canonicalize(url))
    }

    /// Returns true if the URL's canonical form was already recorded
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&canonicalize(url))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
