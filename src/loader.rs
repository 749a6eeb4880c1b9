//! Reading and parsing notebook exports.
//!
//! Kindle exports are loose HTML (unclosed tags, stray headings), so parsing
//! goes through html5ever's error-tolerant tree builder. A document that is not
//! really a notebook simply yields no matching elements.

use std::fs;
use std::path::Path;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::ConvertError;

/// A parsed notebook export.
pub struct HighlightDocument {
    dom: RcDom,
}

impl HighlightDocument {
    /// Parses HTML markup. Never fails; malformed input produces a partial tree.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// Returns every `tag` element whose class list contains `class`, in document order.
    pub fn elements_with_class(&self, tag: &str, class: &str) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_matching(&self.dom.document, tag, class, &mut found, false);
        found
    }

    /// Returns the first `tag` element whose class list contains `class`.
    pub fn first_element_with_class(&self, tag: &str, class: &str) -> Option<Handle> {
        let mut found = Vec::new();
        collect_matching(&self.dom.document, tag, class, &mut found, true);
        found.into_iter().next()
    }
}

/// Reads the file at `path` and parses it.
pub fn load_document(path: impl AsRef<Path>) -> Result<HighlightDocument, ConvertError> {
    let path = path.as_ref();
    let html = fs::read_to_string(path).map_err(|err| ConvertError::read(path, err))?;
    debug!("Read {} bytes from {}", html.len(), path.display());
    Ok(HighlightDocument::parse(&html))
}

/// Concatenates every text node below `node`, like the DOM `textContent` property.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

fn push_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        push_text(child, out);
    }
}

fn has_class(node: &Handle, tag: &str, class: &str) -> bool {
    let NodeData::Element { name, attrs, .. } = &node.data else {
        return false;
    };
    if !(*name.local).eq_ignore_ascii_case(tag) {
        return false;
    }
    attrs
        .borrow()
        .iter()
        .filter(|attr| &*attr.name.local == "class")
        .any(|attr| attr.value.split_ascii_whitespace().any(|token| token == class))
}

fn collect_matching(
    node: &Handle,
    tag: &str,
    class: &str,
    found: &mut Vec<Handle>,
    first_only: bool,
) {
    if first_only && !found.is_empty() {
        return;
    }
    if has_class(node, tag, class) {
        found.push(node.clone());
        if first_only {
            return;
        }
    }
    for child in node.children.borrow().iter() {
        collect_matching(child, tag, class, found, first_only);
        if first_only && !found.is_empty() {
            return;
        }
    }
}
