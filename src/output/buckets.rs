//! Relevance buckets and the final aggregation step

use std::fmt;

/// One of the five relevance tiers, in aggregation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// OCR text of images found on a page whose URL mentions happy hour
    HappyHourLinkImages,
    /// Text of pages whose URL mentions happy hour
    HappyHourLinkText,
    /// OCR text of PDFs mentioning happy hour
    HappyHourPdf,
    /// Text of pages mentioning happy hour
    HappyHourText,
    /// Text of pages mentioning specials
    Specials,
}

impl Bucket {
    /// All buckets in aggregation priority order
    pub const ALL: [Bucket; 5] = [
        Bucket::HappyHourLinkImages,
        Bucket::HappyHourLinkText,
        Bucket::HappyHourPdf,
        Bucket::HappyHourText,
        Bucket::Specials,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HappyHourLinkImages => "happy_hour_link_images",
            Self::HappyHourLinkText => "happy_hour_link_text",
            Self::HappyHourPdf => "happy_hour_pdf",
            Self::HappyHourText => "happy_hour_text",
            Self::Specials => "specials",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A piece of extracted text and the URL it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub source: String,
    pub text: String,
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FROM {}:\n{}\n", self.source, self.text)
    }
}

/// Append-only text accumulators, one per [`Bucket`]
///
/// Fragments keep the order in which tasks completed, which is not the order
/// their URLs were prioritized in.
#[derive(Debug, Clone, Default)]
pub struct ResultBuckets {
    buckets: [Vec<Fragment>; 5],
}

impl ResultBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment to a bucket
    pub fn push(&mut self, bucket: Bucket, source: impl Into<String>, text: impl Into<String>) {
        self.buckets[bucket.index()].push(Fragment {
            source: source.into(),
            text: text.into(),
        });
    }

    pub fn get(&self, bucket: Bucket) -> &[Fragment] {
        &self.buckets[bucket.index()]
    }

    pub fn len(&self, bucket: Bucket) -> usize {
        self.buckets[bucket.index()].len()
    }

    /// Total number of fragments across all buckets
    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Concatenates bucket contents into the crawl's output string
///
/// Buckets are emitted in [`Bucket::ALL`] order. The first four tiers are
/// always included; `Specials` is included only when all four of them are
/// empty. Fragments are rendered as `FROM <url>:\n<text>\n` and joined with
/// newlines.
pub fn aggregate(buckets: &ResultBuckets) -> String {
    let higher_tiers_empty = Bucket::ALL
        .iter()
        .filter(|b| **b != Bucket::Specials)
        .all(|b| buckets.len(*b) == 0);

    Bucket::ALL
        .iter()
        .filter(|b| **b != Bucket::Specials || higher_tiers_empty)
        .flat_map(|b| buckets.get(*b))
        .map(Fragment::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns true if the text contains at least one ASCII letter or digit
pub fn has_meaningful_text(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphanumeric())
}
