//! Scheduling priority policy
//!
//! Every priority the crawler assigns comes from [`Rule::weight`]; nothing
//! else in the crate hard-codes a priority number.

use crate::crawler::classifier::{term_match, HAPPY_HOUR, MENU, SPECIAL};
use crate::url::{classify, same_origin_and_path, ResourceKind};
use url::Url;

/// A reason a task receives (part of) its priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The crawl's starting URL
    Seed,
    /// Base weight of any outbound page link
    Link,
    /// Bonus: link has the seed's exact origin and path
    SeedPath,
    /// Bonus: link mentions happy hour
    HappyHourTerm,
    /// Bonus: link mentions specials
    SpecialTerm,
    /// Bonus: link mentions a menu
    MenuTerm,
    /// Fixed weight of any PDF link
    PdfLink,
    /// Fixed weight of images found on a happy hour page
    HappyHourImage,
    /// Fixed weight of the frame fetched in place of an empty page
    FrameSubstitute,
}

impl Rule {
    pub const fn weight(self) -> i32 {
        match self {
            Rule::Seed => 0,
            Rule::Link => 1,
            Rule::SeedPath => 10,
            Rule::HappyHourTerm => 5,
            Rule::SpecialTerm => 4,
            Rule::MenuTerm => 3,
            Rule::PdfLink => 25,
            Rule::HappyHourImage => 30,
            Rule::FrameSubstitute => 1,
        }
    }
}

/// Priority of an outbound link discovered on a page
///
/// PDFs get a fixed [`Rule::PdfLink`] weight. Everything else starts at
/// [`Rule::Link`], gains [`Rule::SeedPath`] when it has the seed's origin and
/// path, and gains at most one keyword bonus: happy hour, else special, else
/// menu.
pub fn link_priority(link: &Url, seed: &Url) -> i32 {
    if classify(link) == ResourceKind::Pdf {
        return Rule::PdfLink.weight();
    }

    let mut priority = Rule::Link.weight();

    if same_origin_and_path(link, seed) {
        priority += Rule::SeedPath.weight();
    }

    let text = link.as_str();
    if term_match(text, HAPPY_HOUR) {
        priority += Rule::HappyHourTerm.weight();
    } else if term_match(text, SPECIAL) {
        priority += Rule::SpecialTerm.weight();
    } else if term_match(text, MENU) {
        priority += Rule::MenuTerm.weight();
    }

    priority
}

/// Priority of an image found on a page whose URL mentions happy hour
pub fn happy_hour_image_priority() -> i32 {
    Rule::HappyHourImage.weight()
}

/// Priority of the frame fetched in place of a page with no visible text
pub fn frame_substitute_priority() -> i32 {
    Rule::FrameSubstitute.weight()
}
