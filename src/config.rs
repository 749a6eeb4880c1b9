//! Layout constants for the generated PDF.
//!
//! Measurements are expressed in typographic points because that is how the
//! page geometry of the export is defined; [`pt_to_mm`] converts them for
//! `genpdf`, which works in millimetres.

use std::path::{Path, PathBuf};

use genpdf::style::Color;
use genpdf::{Mm, PaperSize, Size};

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Converts typographic points to millimetres.
pub fn pt_to_mm(points: f64) -> f64 {
    points * MM_PER_INCH / POINTS_PER_INCH
}

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Text printed instead of the title and entries when nothing was extracted.
pub const EMPTY_PLACEHOLDER: &str = "No highlights found.";

/// Accent color used for the page/location identifier (`#33658A`).
pub const IDENTIFIER_COLOR: Color = Color::Rgb(0x33, 0x65, 0x8a);

/// Rendering options applied by [`crate::render::render_highlights`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    paper_size: Size,
    margin_pt: f64,
    title_font_size: u8,
    title_gap_pt: f64,
    body_font_size: u8,
    body_leading_pt: f64,
    identifier_color: Color,
    entry_gap_pt: f64,
    empty_placeholder: String,
    font_dir: Option<PathBuf>,
    bookmarks: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::Letter.into(),
            margin_pt: 72.0,
            title_font_size: 24,
            title_gap_pt: 20.0,
            body_font_size: 12,
            body_leading_pt: 14.0,
            identifier_color: IDENTIFIER_COLOR,
            entry_gap_pt: 18.0,
            empty_placeholder: EMPTY_PLACEHOLDER.to_owned(),
            font_dir: None,
            bookmarks: false,
        }
    }
}

impl RenderConfig {
    /// Creates the default configuration (US Letter, one inch margins).
    pub fn new() -> Self {
        Self::default()
    }

    /// Page size of the generated document.
    pub fn paper_size(&self) -> Size {
        self.paper_size
    }

    /// Margin applied on every side, in points.
    pub fn margin_pt(&self) -> f64 {
        self.margin_pt
    }

    /// Font size of the centered title block.
    pub fn title_font_size(&self) -> u8 {
        self.title_font_size
    }

    /// Vertical space after the title block, in points.
    pub fn title_gap_pt(&self) -> f64 {
        self.title_gap_pt
    }

    /// Font size of identifiers and highlight text.
    pub fn body_font_size(&self) -> u8 {
        self.body_font_size
    }

    /// Line spacing factor derived from the body leading.
    pub fn line_spacing(&self) -> f64 {
        self.body_leading_pt / f64::from(self.body_font_size)
    }

    /// Color of the identifier line.
    pub fn identifier_color(&self) -> Color {
        self.identifier_color
    }

    /// Vertical space after each entry, in points.
    pub fn entry_gap_pt(&self) -> f64 {
        self.entry_gap_pt
    }

    /// Line printed for an export without highlights.
    pub fn empty_placeholder(&self) -> &str {
        &self.empty_placeholder
    }

    /// Explicit font directory, checked before every other location.
    pub fn font_dir(&self) -> Option<&Path> {
        self.font_dir.as_deref()
    }

    /// Whether an outline entry should be added for every highlight.
    pub fn bookmarks(&self) -> bool {
        self.bookmarks
    }

    /// Sets the paper size and returns the updated configuration.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    /// Sets the margin (in points) and returns the updated configuration.
    pub fn with_margin_pt(mut self, margin_pt: f64) -> Self {
        self.margin_pt = margin_pt;
        self
    }

    /// Sets the identifier color and returns the updated configuration.
    pub fn with_identifier_color(mut self, color: Color) -> Self {
        self.identifier_color = color;
        self
    }

    /// Sets the gap after each entry (in points) and returns the updated configuration.
    pub fn with_entry_gap_pt(mut self, gap_pt: f64) -> Self {
        self.entry_gap_pt = gap_pt;
        self
    }

    /// Sets the font directory override and returns the updated configuration.
    pub fn with_font_dir(mut self, font_dir: impl Into<Option<PathBuf>>) -> Self {
        self.font_dir = font_dir.into();
        self
    }

    /// Requests an outline entry per highlight.
    ///
    /// The flag only has an effect when the crate is built with the
    /// `bookmarks` feature.
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    pub(crate) fn margin(&self) -> Mm {
        mm_from_f64(pt_to_mm(self.margin_pt))
    }

    pub(crate) fn title_gap(&self) -> Mm {
        mm_from_f64(pt_to_mm(self.title_gap_pt))
    }

    pub(crate) fn entry_gap(&self) -> Mm {
        mm_from_f64(pt_to_mm(self.entry_gap_pt))
    }
}

#[cfg(test)]
mod tests {
    use super::{pt_to_mm, RenderConfig};

    #[test]
    fn one_inch_is_seventy_two_points() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-9);
    }

    #[test]
    fn defaults_follow_letter_layout() {
        let config = RenderConfig::default();
        assert_eq!(config.margin_pt(), 72.0);
        assert_eq!(config.title_font_size(), 24);
        assert_eq!(config.body_font_size(), 12);
        assert_eq!(config.empty_placeholder(), "No highlights found.");
        assert!((config.line_spacing() - 14.0 / 12.0).abs() < 1e-9);
        assert!(config.font_dir().is_none());
    }
}
