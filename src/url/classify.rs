use url::Url;

/// Extensions routed to image OCR
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extensions that carry no extractable text
const NON_TEXTUAL_EXTENSIONS: &[&str] = &["svg", "gif", "css"];

/// How a discovered resource is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Raster image - OCR'd directly
    Image,
    /// PDF document - OCR'd through the batch pipeline
    Pdf,
    /// Asset with no useful text - dropped without any work
    NonTextualSkip,
    /// Anything else - loaded as a page
    Page,
}

impl ResourceKind {
    /// Returns true if handling this resource costs a fetch or OCR call
    pub fn is_heavy(&self) -> bool {
        !matches!(self, Self::NonTextualSkip)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::NonTextualSkip => "skip",
            Self::Page => "page",
        }
    }
}

/// Classifies a URL by the extension of its final path segment
///
/// The comparison is case-insensitive. A segment without a dot, an empty
/// path, or an unknown extension all classify as [`ResourceKind::Page`].
///
/// # Examples
///
/// ```
/// use url::Url;
/// use happyhour_scout::url::{classify, ResourceKind};
///
/// let flyer = Url::parse("https://example.com/img/Flyer.JPG").unwrap();
/// assert_eq!(classify(&flyer), ResourceKind::Image);
///
/// let menu = Url::parse("https://example.com/menu").unwrap();
/// assert_eq!(classify(&menu), ResourceKind::Page);
/// ```
pub fn classify(url: &Url) -> ResourceKind {
    let Some(extension) = extension(url) else {
        return ResourceKind::Page;
    };

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        ResourceKind::Image
    } else if extension == "pdf" {
        ResourceKind::Pdf
    } else if NON_TEXTUAL_EXTENSIONS.contains(&extension.as_str()) {
        ResourceKind::NonTextualSkip
    } else {
        ResourceKind::Page
    }
}

/// Lowercased extension of the last path segment, if it has one
fn extension(url: &Url) -> Option<String> {
    let last_segment = url.path().rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}
