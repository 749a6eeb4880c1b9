use std::fs;

use kindle_highlights::fonts;
use kindle_highlights::render::render_highlights;
use kindle_highlights::{convert, Highlight, Locator, RenderConfig};
use lopdf::Document;
use sha2::{Digest, Sha256};

const SKIP_REASON: &str =
    "no font family available. Set KINDLE_HIGHLIGHTS_FONTS_DIR or install Liberation/DejaVu fonts.";

fn sample_highlights(count: usize) -> Vec<Highlight> {
    (0..count)
        .map(|index| {
            let locator = if index % 2 == 0 {
                Locator::page((index + 1).to_string())
            } else {
                Locator::location((index * 10).to_string())
            };
            Highlight::new(
                "Sample Book",
                locator,
                format!("Passage number {index} that was highlighted on the device."),
            )
        })
        .collect()
}

fn sample_notebook() -> String {
    let mut html = String::from(
        "<html><head><meta charset=\"UTF-8\"></head><body><div class=\"bodyContainer\">\
         <div class=\"notebookFor\">Notebook for</div>\
         <div class=\"bookTitle\">The Left Hand of Darkness</div>\
         <div class=\"authors\">Ursula K. Le Guin</div>\
         <h2 class=\"sectionHeading\">Chapter 1</h2>",
    );
    for (heading, text) in [
        (
            "Highlight(<span class=\"highlight_yellow\">yellow</span>) - Page 1 · Location 30",
            "I'll make my report as if I told a story.",
        ),
        (
            "Highlight(<span class=\"highlight_blue\">blue</span>) - Location 215",
            "Light is the left hand of darkness.",
        ),
        ("Bookmark", "  "),
    ] {
        html.push_str(&format!(
            "<div class=\"noteHeading\">{heading}</div><div class=\"noteText\">{text}</div>"
        ));
    }
    html.push_str("</div></body></html>");
    html
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() && data[cursor] != terminator {
                    let byte = data[cursor];
                    if terminator == b')'
                        || !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t')
                    {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while let Some(start_pos) = data[offset..]
            .windows(start.len())
            .position(|window| window == start)
        {
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(&mut normalized, b"<xmp:MetadataDate>", b"</xmp:MetadataDate>");
    scrub_xml(&mut normalized, b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>");
    scrub_xml(&mut normalized, b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>");
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

/// Text drawn on every page, in content order.
fn page_text(bytes: &[u8]) -> String {
    let document = Document::load_mem(bytes).expect("parse rendered PDF");
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    document.extract_text(&pages).expect("extract text")
}

/// Checks that `extracted` shows exactly `expected`, in order.
///
/// Embedded TrueType subsets are written as glyph indices, which for the Latin
/// range of the supported fonts sit at a constant distance from the character
/// codes. Characters that land outside printable ASCII after shifting (digits,
/// punctuation, spaces) are ignored on both sides.
fn shows_in_order(extracted: &str, expected: &[&str]) -> bool {
    let printable = |c: u32| (0x21..0x7f).contains(&c);
    let actual: Vec<u32> = extracted
        .chars()
        .map(u32::from)
        .filter(|&c| printable(c))
        .collect();
    (0..=0x40).any(|shift| {
        let wanted: Vec<u32> = expected
            .iter()
            .flat_map(|part| part.chars())
            .filter(|c| !c.is_whitespace())
            .filter_map(|c| u32::from(c).checked_sub(shift))
            .filter(|&c| printable(c))
            .collect();
        !wanted.is_empty() && wanted == actual
    })
}

#[test]
fn renders_one_entry_per_highlight_in_order() {
    if !fonts::fonts_available() {
        eprintln!("Skipping renders_one_entry_per_highlight_in_order: {SKIP_REASON}");
        return;
    }

    let highlights = sample_highlights(5);
    let pdf = render_highlights("Sample Book", &highlights, &RenderConfig::default())
        .expect("render highlights");

    assert!(pdf.bytes.starts_with(b"%PDF"));
    let pages: Vec<usize> = pdf.entry_pages.iter().flatten().copied().collect();
    assert_eq!(pages.len(), highlights.len(), "every entry is laid out");
    assert_eq!(pages.first(), Some(&1));
    assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn title_and_entries_appear_in_source_order() {
    if !fonts::fonts_available() {
        eprintln!("Skipping title_and_entries_appear_in_source_order: {SKIP_REASON}");
        return;
    }

    let highlights = vec![
        Highlight::new("My Book", Locator::page("1"), "alpha passage"),
        Highlight::new("My Book", Locator::location("2"), "beta passage"),
        Highlight::new("My Book", Locator::Unknown, "gamma passage"),
    ];
    let pdf = render_highlights("My Book", &highlights, &RenderConfig::default())
        .expect("render highlights");
    let text = page_text(&pdf.bytes);

    assert!(shows_in_order(
        &text,
        &[
            "My Book",
            "Page 1",
            "alpha passage",
            "Location 2",
            "beta passage",
            "N/A",
            "gamma passage",
        ],
    ));
    assert!(!shows_in_order(
        &text,
        &[
            "My Book",
            "Location 2",
            "beta passage",
            "Page 1",
            "alpha passage",
            "N/A",
            "gamma passage",
        ],
    ));
}

#[test]
fn long_exports_continue_on_following_pages() {
    if !fonts::fonts_available() {
        eprintln!("Skipping long_exports_continue_on_following_pages: {SKIP_REASON}");
        return;
    }

    let highlights = sample_highlights(120);
    let pdf = render_highlights("Sample Book", &highlights, &RenderConfig::default())
        .expect("render highlights");

    assert!(pdf.page_count > 1, "120 entries should not fit on one page");
    let pages: Vec<usize> = pdf.entry_pages.iter().flatten().copied().collect();
    assert_eq!(pages.len(), 120, "every entry is laid out");
    let last_start = pages.last().copied().unwrap_or_default();
    assert!(last_start > 1 && last_start <= pdf.page_count);
}

#[test]
fn empty_export_renders_placeholder_only() {
    if !fonts::fonts_available() {
        eprintln!("Skipping empty_export_renders_placeholder_only: {SKIP_REASON}");
        return;
    }

    let pdf = render_highlights("Ignored Title", &[], &RenderConfig::default())
        .expect("render placeholder");

    assert!(!pdf.bytes.is_empty());
    assert_eq!(pdf.page_count, 1);
    assert!(pdf.entry_pages.is_empty());

    let text = page_text(&pdf.bytes);
    assert!(shows_in_order(&text, &["No highlights found."]));
    assert!(!shows_in_order(
        &text,
        &["Ignored Title", "No highlights found."]
    ));
}

#[test]
fn rendering_is_deterministic() {
    if !fonts::fonts_available() {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_REASON}");
        return;
    }

    let highlights = sample_highlights(3);
    let config = RenderConfig::default();
    let first = render_highlights("Sample Book", &highlights, &config).expect("first render");
    let second = render_highlights("Sample Book", &highlights, &config).expect("second render");

    assert_eq!(first.bytes.len(), second.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&first.bytes),
        normalized_hash(&second.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn converts_notebook_export_to_pdf_file() {
    if !fonts::fonts_available() {
        eprintln!("Skipping converts_notebook_export_to_pdf_file: {SKIP_REASON}");
        return;
    }

    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("left-hand.html");
    let output = dir.path().join("left-hand.pdf");
    fs::write(&input, sample_notebook()).expect("write notebook");

    let conversion = convert(&input, &output, &RenderConfig::default()).expect("convert");

    assert_eq!(conversion.title, "The Left Hand of Darkness");
    assert_eq!(conversion.highlights, 3);
    assert_eq!(conversion.output, output);
    let written = fs::read(&output).expect("read output");
    assert!(written.starts_with(b"%PDF"));
}

#[cfg(feature = "bookmarks")]
#[test]
fn outline_lists_every_highlight_at_its_page() {
    use lopdf::Object;

    if !fonts::fonts_available() {
        eprintln!("Skipping outline_lists_every_highlight_at_its_page: {SKIP_REASON}");
        return;
    }

    let highlights = sample_highlights(60);
    let config = RenderConfig::default().with_bookmarks(true);
    let pdf = render_highlights("Sample Book", &highlights, &config).expect("render highlights");
    assert!(pdf.page_count > 1);

    let document = Document::load_mem(&pdf.bytes).expect("parse rendered PDF");
    let page_numbers: std::collections::BTreeMap<_, _> = document
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number as usize))
        .collect();

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .expect("catalog reference");
    let catalog = document
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .expect("catalog");
    let outlines = catalog
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .and_then(|id| document.get_object(id))
        .and_then(Object::as_dict)
        .expect("outline root");

    let mut items = Vec::new();
    let mut next = outlines.get(b"First").and_then(Object::as_reference).ok();
    while let Some(id) = next {
        let item = document
            .get_object(id)
            .and_then(Object::as_dict)
            .expect("outline item");
        let title = match item.get(b"Title").expect("title") {
            Object::String(bytes, _) => String::from_utf8(bytes.clone()).expect("ascii title"),
            other => panic!("unexpected title object {other:?}"),
        };
        let target = item
            .get(b"Dest")
            .and_then(Object::as_array)
            .expect("destination")
            .first()
            .and_then(|page| page.as_reference().ok())
            .expect("destination page");
        items.push((title, page_numbers.get(&target).copied()));
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    let expected: Vec<(String, Option<usize>)> = highlights
        .iter()
        .zip(&pdf.entry_pages)
        .map(|(highlight, page)| (highlight.identifier(), *page))
        .collect();
    assert_eq!(items.len(), highlights.len());
    assert_eq!(items, expected);
}

#[cfg(not(feature = "bookmarks"))]
#[test]
fn bookmark_request_is_ignored_without_outline_support() {
    if !fonts::fonts_available() {
        eprintln!("Skipping bookmark_request_is_ignored_without_outline_support: {SKIP_REASON}");
        return;
    }

    let highlights = sample_highlights(2);
    let config = RenderConfig::default().with_bookmarks(true);
    let pdf = render_highlights("Sample Book", &highlights, &config).expect("render highlights");

    let document = Document::load_mem(&pdf.bytes).expect("parse rendered PDF");
    let catalog = document
        .trailer
        .get(b"Root")
        .and_then(|root| root.as_reference())
        .and_then(|id| document.get_object(id))
        .and_then(|object| object.as_dict())
        .expect("catalog");
    assert!(catalog.get(b"Outlines").is_err());
}
