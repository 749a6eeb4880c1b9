//! Error type shared by every stage of the conversion pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that abort a single conversion.
///
/// Every variant is terminal for the attempt that produced it; callers are
/// expected to report the message and let the user retry.
#[derive(Debug)]
pub enum ConvertError {
    /// The input file could not be read as UTF-8 text.
    Read {
        /// Path of the input file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// No usable font family could be loaded for the PDF layout.
    FontLoad(genpdf::error::Error),
    /// The PDF layout or encoding failed.
    Render(genpdf::error::Error),
    /// The rendered PDF could not be written to disk.
    Write {
        /// Path of the output file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The outline could not be added to the rendered document.
    #[cfg(feature = "bookmarks")]
    Bookmarks(crate::bookmarks::BookmarkError),
}

impl ConvertError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            Self::FontLoad(err) => write!(f, "Failed to load fonts: {err}"),
            Self::Render(err) => write!(f, "Failed to render PDF: {err}"),
            Self::Write { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => write!(f, "Failed to add bookmarks: {err}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

#[cfg(feature = "bookmarks")]
impl From<crate::bookmarks::BookmarkError> for ConvertError {
    fn from(err: crate::bookmarks::BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}
