//! Laying out the title and highlights as a PDF document.

use genpdf::elements::Paragraph;
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element, Margins};
use log::{debug, info, warn};

use crate::builder::{DocumentBuilder, PageTracker};
use crate::config::RenderConfig;
use crate::elements::{EntryPages, HighlightEntry};
use crate::error::ConvertError;
use crate::fonts;
use crate::model::Highlight;

/// A rendered PDF document.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
    /// 1-based start page of every highlight entry, in document order.
    ///
    /// A slot stays `None` when the entry was never laid out.
    pub entry_pages: Vec<Option<usize>>,
}

/// Renders `highlights` below a centered `title`.
///
/// Without highlights the document only contains the configured placeholder
/// line and no title block.
pub fn render_highlights(
    title: &str,
    highlights: &[Highlight],
    config: &RenderConfig,
) -> Result<RenderedPdf, ConvertError> {
    debug!("Laying out {} highlights for '{}'", highlights.len(), title);
    let font_family = fonts::load_font_family(config.font_dir()).map_err(ConvertError::FontLoad)?;

    let tracker = PageTracker::new();
    let mut document = DocumentBuilder::new()
        .with_title(title)
        .with_paper_size(config.paper_size())
        .with_margins(Margins::all(config.margin()))
        .with_font_size(config.body_font_size())
        .with_line_spacing(config.line_spacing())
        .with_page_tracker(tracker.clone())
        .build(font_family);

    let pages = EntryPages::with_len(highlights.len());

    if highlights.is_empty() {
        document.push(Paragraph::new(config.empty_placeholder().to_owned()));
    } else {
        let title_style = Style::new().bold().with_font_size(config.title_font_size());
        document.push(
            Paragraph::new(StyledString::new(title.to_owned(), title_style))
                .aligned(Alignment::Center)
                .padded(Margins::trbl(0, 0, config.title_gap(), 0)),
        );

        for (index, highlight) in highlights.iter().enumerate() {
            document.push(
                HighlightEntry::new(
                    index,
                    highlight.identifier(),
                    highlight.text(),
                    config.identifier_color(),
                    config.entry_gap(),
                )
                .with_page_recording(tracker.clone(), pages.clone()),
            );
        }
    }

    let mut bytes = Vec::new();
    document.render(&mut bytes).map_err(ConvertError::Render)?;

    let page_count = tracker.current();
    let entry_pages = pages.snapshot();
    let unplaced = entry_pages.iter().filter(|page| page.is_none()).count();
    if unplaced > 0 {
        warn!("{} highlight entries were not laid out", unplaced);
    }

    info!(
        "Rendered {} highlights on {} pages ({} bytes)",
        highlights.len(),
        page_count,
        bytes.len()
    );

    #[cfg(feature = "bookmarks")]
    let bytes = if config.bookmarks() && !highlights.is_empty() {
        crate::bookmarks::apply_highlight_bookmarks(&bytes, highlights, &entry_pages)?
    } else {
        bytes
    };

    #[cfg(not(feature = "bookmarks"))]
    if config.bookmarks() {
        warn!("Bookmarks requested but the `bookmarks` feature is disabled; ignoring");
    }

    Ok(RenderedPdf {
        bytes,
        page_count,
        entry_pages,
    })
}
