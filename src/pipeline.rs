//! The complete conversion: load, extract, render, write.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::RenderConfig;
use crate::error::ConvertError;
use crate::extract::extract_highlights;
use crate::loader::load_document;
use crate::render::render_highlights;

/// Extension of generated documents.
pub const OUTPUT_EXTENSION: &str = "pdf";

/// Extensions accepted by the default input filter.
pub const INPUT_EXTENSIONS: &[&str] = &["html", "htm"];

/// Summary of a successful conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    /// Path of the written PDF.
    pub output: PathBuf,
    /// Book title used for the document.
    pub title: String,
    /// Number of highlights rendered.
    pub highlights: usize,
    /// Number of pages in the written PDF.
    pub pages: usize,
}

/// Converts the notebook export at `input` into a PDF written to `output`.
///
/// Nothing is written when loading or rendering fails.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &RenderConfig,
) -> Result<Conversion, ConvertError> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !is_html_path(input) {
        warn!(
            "{} does not have an .html extension; parsing it anyway",
            input.display()
        );
    }

    let document = load_document(input)?;
    let extraction = extract_highlights(&document);
    let title = extraction.title().to_owned();
    let highlights = extraction.into_highlights();
    let rendered = render_highlights(&title, &highlights, config)?;

    fs::write(output, &rendered.bytes).map_err(|err| ConvertError::write(output, err))?;
    info!("Wrote {} ({} bytes)", output.display(), rendered.bytes.len());

    Ok(Conversion {
        output: output.to_path_buf(),
        title,
        highlights: highlights.len(),
        pages: rendered.page_count,
    })
}

/// Default output location: the input's base name with a `.pdf` extension, next to the input.
pub fn suggested_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension(OUTPUT_EXTENSION)
}

/// Returns whether `path` passes the default input filter.
pub fn is_html_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            INPUT_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}
