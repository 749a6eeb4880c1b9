//! Document construction helpers.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style;
use genpdf::{self, Margins, PageDecorator, Size};

/// Shared counter of the page currently being laid out.
///
/// The page decorator advances it before each page is filled, so elements
/// rendered afterwards can read the 1-based number of the page they land on.
#[derive(Clone, Debug, Default)]
pub struct PageTracker(Rc<Cell<usize>>);

impl PageTracker {
    /// Creates a tracker that has not seen any page yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the current page, or `0` before the first page is started.
    pub fn current(&self) -> usize {
        self.0.get()
    }

    fn advance(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Builder for `genpdf::Document` instances.
#[derive(Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    paper_size: Option<Size>,
    margins: Option<Margins>,
    font_size: Option<u8>,
    line_spacing: Option<f64>,
    tracker: Option<PageTracker>,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Sets the default font size.
    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Sets the default line spacing factor.
    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = Some(line_spacing);
        self
    }

    /// Attaches a page tracker that is advanced for every rendered page.
    pub fn with_page_tracker(mut self, tracker: PageTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Builds a `genpdf::Document` using the given font family as the default.
    pub fn build(self, font_family: FontFamily<FontData>) -> genpdf::Document {
        let mut document = genpdf::Document::new(font_family);

        if let Some(title) = self.title {
            document.set_title(title);
        }
        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }
        if let Some(font_size) = self.font_size {
            document.set_font_size(font_size);
        }
        if let Some(line_spacing) = self.line_spacing {
            document.set_line_spacing(line_spacing);
        }

        let decorator = TrackingPageDecorator {
            margins: self.margins,
            tracker: self.tracker.unwrap_or_default(),
        };
        document.set_page_decorator(decorator);

        document
    }
}

struct TrackingPageDecorator {
    margins: Option<Margins>,
    tracker: PageTracker,
}

impl PageDecorator for TrackingPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.tracker.advance();

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        Ok(area)
    }
}
