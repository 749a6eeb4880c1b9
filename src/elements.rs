//! Custom `genpdf` elements used by the highlight renderer.
//!
//! [`HighlightEntry`] stacks the identifier line, the passage and a trailing
//! gap. It keeps track of which part has been laid out so that a long passage
//! can continue on the next page, and records the page the entry started on.

use std::cell::RefCell;
use std::rc::Rc;

use genpdf::elements::Paragraph;
use genpdf::error::Error;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};

use crate::builder::PageTracker;

/// Start pages of rendered entries, shared between the elements and the renderer.
#[derive(Clone, Debug, Default)]
pub struct EntryPages(Rc<RefCell<Vec<Option<usize>>>>);

impl EntryPages {
    /// Creates a table with one empty slot per entry.
    pub fn with_len(len: usize) -> Self {
        Self(Rc::new(RefCell::new(vec![None; len])))
    }

    fn record(&self, index: usize, page: usize) {
        if let Some(slot) = self.0.borrow_mut().get_mut(index) {
            slot.get_or_insert(page);
        }
    }

    /// Returns the recorded start page for every entry.
    pub fn snapshot(&self) -> Vec<Option<usize>> {
        self.0.borrow().clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Heading,
    Body,
    Gap,
    Done,
}

/// One highlight: a bold, colored identifier line followed by the passage and a gap.
pub struct HighlightEntry {
    index: usize,
    heading: Paragraph,
    body: Paragraph,
    gap: Mm,
    stage: Stage,
    tracker: PageTracker,
    pages: EntryPages,
}

impl HighlightEntry {
    /// Creates the entry at position `index` of the document.
    pub fn new(
        index: usize,
        identifier: impl Into<String>,
        text: impl Into<String>,
        identifier_color: Color,
        gap: Mm,
    ) -> Self {
        let identifier: String = identifier.into();
        let text: String = text.into();
        let heading_style = Style::new().bold().with_color(identifier_color);
        Self {
            index,
            heading: Paragraph::new(StyledString::new(identifier, heading_style)),
            body: Paragraph::new(text),
            gap,
            stage: Stage::Heading,
            tracker: PageTracker::default(),
            pages: EntryPages::default(),
        }
    }

    /// Reports the start page of the entry through `pages`, read from `tracker`.
    pub fn with_page_recording(mut self, tracker: PageTracker, pages: EntryPages) -> Self {
        self.tracker = tracker;
        self.pages = pages;
        self
    }
}

fn render_part(
    part: &mut Paragraph,
    context: &genpdf::Context,
    area: &mut render::Area<'_>,
    style: Style,
    result: &mut RenderResult,
) -> Result<RenderResult, Error> {
    let part_result = part.render(context, area.clone(), style)?;
    result.size = result.size.stack_vertical(part_result.size);
    area.add_offset(Position::new(0, part_result.size.height));
    Ok(part_result)
}

impl Element for HighlightEntry {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();

        if self.stage == Stage::Heading {
            let heading = render_part(&mut self.heading, context, &mut area, style, &mut result)?;
            if heading.size.height > Mm::default() {
                self.pages.record(self.index, self.tracker.current());
            }
            if heading.has_more {
                result.has_more = true;
                return Ok(result);
            }
            self.stage = Stage::Body;
        }

        if self.stage == Stage::Body {
            let body = render_part(&mut self.body, context, &mut area, style, &mut result)?;
            if body.has_more {
                result.has_more = true;
                return Ok(result);
            }
            self.stage = Stage::Gap;
        }

        if self.stage == Stage::Gap {
            // A gap that does not fit is dropped at the page end.
            if self.gap <= area.size().height {
                result.size = result.size.stack_vertical(Size::new(0, self.gap));
            }
            self.stage = Stage::Done;
        }

        Ok(result)
    }
}
