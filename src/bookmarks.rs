//! PDF outline entries for highlights, built on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::model::Highlight;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed by `lopdf`.
    Parse(lopdf::Error),
    /// The updated document could not be serialized.
    Save(std::io::Error),
    /// The trailer has no usable `/Root` catalog dictionary.
    MissingCatalog,
    /// A highlight refers to a page the rendered document does not have.
    MissingPage {
        /// Position of the highlight in the document.
        highlight_index: usize,
        /// The requested (1-indexed) page number.
        page_number: usize,
    },
    /// A highlight was never laid out, so there is no page to point at.
    Unplaced {
        /// Position of the highlight in the document.
        highlight_index: usize,
    },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl std::fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse PDF bytes: {err}"),
            Self::Save(err) => write!(f, "Failed to serialize PDF with outline: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing or invalid"),
            Self::MissingPage {
                highlight_index,
                page_number,
            } => write!(
                f,
                "Highlight {} refers to missing page {}",
                highlight_index, page_number
            ),
            Self::Unplaced { highlight_index } => {
                write!(f, "Highlight {} was not placed on any page", highlight_index)
            }
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Save(err) => Some(err),
            Self::MissingCatalog | Self::MissingPage { .. } | Self::Unplaced { .. } => None,
        }
    }
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

/// Adds a flat outline with one entry per highlight.
///
/// Each entry is titled with the highlight identifier and points at the page
/// recorded in `entry_pages` (1-based, same order as `highlights`).
pub fn apply_highlight_bookmarks(
    pdf_bytes: &[u8],
    highlights: &[Highlight],
    entry_pages: &[Option<usize>],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    let mut entries = outline_entries(&mut document, highlights, entry_pages, &pages)?;
    if entries.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let outlines_id = document.new_object_id();
    link_entries(outlines_id, &mut document, &mut entries);
    insert_outlines_root(outlines_id, &mut document, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer).map_err(BookmarkError::Save)?;
    Ok(buffer)
}

fn outline_entries(
    document: &mut Document,
    highlights: &[Highlight],
    entry_pages: &[Option<usize>],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    highlights
        .iter()
        .zip(entry_pages)
        .enumerate()
        .map(|(index, (highlight, &page))| {
            let page_number = page.ok_or(BookmarkError::Unplaced {
                highlight_index: index,
            })?;
            let page_ref = u32::try_from(page_number)
                .ok()
                .and_then(|page| pages.get(&page).copied())
                .ok_or(BookmarkError::MissingPage {
                    highlight_index: index,
                    page_number,
                })?;
            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: highlight.identifier(),
            })
        })
        .collect()
}

fn link_entries(outlines_id: ObjectId, document: &mut Document, entries: &mut [OutlineEntry]) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(entries[index].title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .ok()
        .and_then(|root| root.as_reference().ok())
        .ok_or(BookmarkError::MissingCatalog)?;

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name("Outlines".into()));
    outlines.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        outlines.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        outlines.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(outlines));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .and_then(|object| object.as_dict_mut().ok())
        .ok_or(BookmarkError::MissingCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}
