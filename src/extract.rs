//! Pulling the title and highlights out of a parsed notebook export.

use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::loader::{text_content, HighlightDocument};
use crate::model::{Extraction, Highlight, Locator};

/// Title used when the export has no `bookTitle` element.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

const CONTAINER_TAG: &str = "div";
const TITLE_CLASS: &str = "bookTitle";
const HEADING_CLASS: &str = "noteHeading";
const TEXT_CLASS: &str = "noteText";

static PAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpage\s+(\d+)").expect("page pattern is valid"));
static LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\blocation\s+(\d+)").expect("location pattern is valid"));

/// Classifies a note heading by its page or location reference.
///
/// A page reference wins over a location reference when both are present.
pub fn classify_heading(heading: &str) -> Locator {
    if let Some(digits) = PAGE_PATTERN.captures(heading).and_then(|caps| caps.get(1)) {
        return Locator::page(digits.as_str());
    }
    if let Some(digits) = LOCATION_PATTERN
        .captures(heading)
        .and_then(|caps| caps.get(1))
    {
        return Locator::location(digits.as_str());
    }
    Locator::Unknown
}

/// Applies NFKC normalization and replaces the typographic apostrophe (U+2019).
pub fn normalize_title(raw: &str) -> String {
    raw.nfkc().collect::<String>().replace('\u{2019}', "'")
}

/// Extracts the book title and the paired highlights from `document`.
///
/// Headings and texts are paired by position. When the counts differ the
/// surplus elements are dropped and a warning is logged.
pub fn extract_highlights(document: &HighlightDocument) -> Extraction {
    let raw_title = document
        .first_element_with_class(CONTAINER_TAG, TITLE_CLASS)
        .map(|node| text_content(&node).trim().to_owned())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_owned());
    let title: Arc<str> = normalize_title(&raw_title).into();

    let headings = document.elements_with_class(CONTAINER_TAG, HEADING_CLASS);
    let texts = document.elements_with_class(CONTAINER_TAG, TEXT_CLASS);

    if headings.len() != texts.len() {
        warn!(
            "Found {} note headings but {} note texts; pairing only the first {}",
            headings.len(),
            texts.len(),
            headings.len().min(texts.len())
        );
    }

    let highlights: Vec<Highlight> = headings
        .iter()
        .zip(texts.iter())
        .map(|(heading, text)| {
            let locator = classify_heading(&text_content(heading));
            Highlight::new(Arc::clone(&title), locator, text_content(text).trim())
        })
        .collect();

    let unplaced = highlights
        .iter()
        .filter(|highlight| !highlight.locator().is_known())
        .count();
    debug!(
        "Extracted {} highlights from '{}' ({} without page or location)",
        highlights.len(),
        title,
        unplaced
    );

    Extraction::new(title, highlights, headings.len(), texts.len())
}
