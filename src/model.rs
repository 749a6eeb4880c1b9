//! Data structures describing the highlights pulled out of a notebook export.
//!
//! The values here are plain data: they are produced by [`crate::extract`],
//! consumed once by [`crate::render`] and never mutated in between. Nothing in
//! this module references the HTML or PDF crates.

use std::fmt;
use std::sync::Arc;

/// Identifier used when a heading carries neither a page nor a location.
pub const UNKNOWN_LOCATOR: &str = "N/A";

/// Position reference attached to a highlight.
///
/// The digits are kept exactly as they appear in the heading so that the
/// rendered identifier matches the export (`"Page 007"` stays `"Page 007"`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locator {
    /// A printed page number, rendered as `Page N`.
    Page(String),
    /// A Kindle location, rendered as `Location N`.
    Location(String),
    /// Neither pattern matched the heading, rendered as `N/A`.
    #[default]
    Unknown,
}

impl Locator {
    /// Creates a page locator from the given digits.
    pub fn page(digits: impl Into<String>) -> Self {
        Self::Page(digits.into())
    }

    /// Creates a location locator from the given digits.
    pub fn location(digits: impl Into<String>) -> Self {
        Self::Location(digits.into())
    }

    /// Returns whether the locator carries a page or location number.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(digits) => write!(f, "Page {digits}"),
            Self::Location(digits) => write!(f, "Location {digits}"),
            Self::Unknown => f.write_str(UNKNOWN_LOCATOR),
        }
    }
}

/// A single highlighted passage together with its position reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Highlight {
    title: Arc<str>,
    locator: Locator,
    text: String,
}

impl Highlight {
    /// Creates a highlight belonging to the book called `title`.
    pub fn new(title: impl Into<Arc<str>>, locator: Locator, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator,
            text: text.into(),
        }
    }

    /// Returns the title of the book the highlight belongs to.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the page or location reference.
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Returns the identifier string (`Page N`, `Location N` or `N/A`).
    pub fn identifier(&self) -> String {
        self.locator.to_string()
    }

    /// Returns the highlighted passage.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Result of walking one notebook export.
///
/// Besides the title and the paired highlights, the raw element counts are
/// kept so callers can tell whether the pairing dropped anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    title: Arc<str>,
    highlights: Vec<Highlight>,
    heading_count: usize,
    text_count: usize,
}

impl Extraction {
    pub(crate) fn new(
        title: Arc<str>,
        highlights: Vec<Highlight>,
        heading_count: usize,
        text_count: usize,
    ) -> Self {
        Self {
            title,
            highlights,
            heading_count,
            text_count,
        }
    }

    /// Returns the normalized book title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the highlights in document order.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Consumes the extraction and returns the highlights.
    pub fn into_highlights(self) -> Vec<Highlight> {
        self.highlights
    }

    /// Number of note heading elements found in the document.
    pub fn heading_count(&self) -> usize {
        self.heading_count
    }

    /// Number of note text elements found in the document.
    pub fn text_count(&self) -> usize {
        self.text_count
    }

    /// Returns `true` when every heading had a matching text element.
    pub fn is_balanced(&self) -> bool {
        self.heading_count == self.text_count
    }

    /// Returns `true` when no highlights were paired.
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    /// Number of paired highlights.
    pub fn len(&self) -> usize {
        self.highlights.len()
    }
}
