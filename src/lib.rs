//! Core entry point for the kindle_highlights crate.
//!
//! The crate turns the HTML notebook exported by Kindle devices into a PDF
//! document. [`pipeline::convert`] runs the whole thing; the individual stages
//! live in [`loader`], [`extract`] and [`render`].

pub mod builder;
pub mod config;
pub mod elements;
pub mod error;
pub mod extract;
pub mod fonts;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod session;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use config::RenderConfig;
pub use error::ConvertError;
pub use model::{Extraction, Highlight, Locator};
pub use pipeline::{convert, Conversion};
