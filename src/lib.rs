//! Heading outline inference for PDF documents using lopdf
//!
//! This module provides:
//! - Positioned text extraction (font, size, origin) from content streams
//! - Heading style ranking by font size
//! - Line reconstruction, heading extraction and title derivation
//! - JSON output of the resulting outline

pub mod extractor;
pub mod lines;
pub mod outline;
pub mod styles;

pub use extractor::{extract_fragments, extract_fragments_mem, Fragment, Tenths};
pub use lines::{reconstruct_lines, Line};
pub use outline::{
    derive_title, extract_headings, save_json, write_json, Heading, Outline, OutlineOptions,
    UNTITLED,
};
pub use styles::{group_by_style, rank_heading_styles, HeadingLevel, HeadingLevelMap, StyleKey};

use log::info;
use std::path::Path;

/// Default name of the result file written by the CLI
pub const RESULT_FILE: &str = "result.json";

/// Infer the outline of a PDF file with default options
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline, PdfError> {
    extract_outline_with_options(path, &OutlineOptions::default())
}

/// Infer the outline of a PDF file
///
/// The document is loaded, its fragments collected, and the document is
/// released before the outline is built.
pub fn extract_outline_with_options<P: AsRef<Path>>(
    path: P,
    options: &OutlineOptions,
) -> Result<Outline, PdfError> {
    let fragments = extract_fragments(path)?;
    Ok(build_outline(&fragments, options))
}

/// Infer the outline of a PDF held in memory with default options
pub fn extract_outline_mem(buffer: &[u8]) -> Result<Outline, PdfError> {
    extract_outline_mem_with_options(buffer, &OutlineOptions::default())
}

/// Infer the outline of a PDF held in memory
pub fn extract_outline_mem_with_options(
    buffer: &[u8],
    options: &OutlineOptions,
) -> Result<Outline, PdfError> {
    let fragments = extract_fragments_mem(buffer)?;
    Ok(build_outline(&fragments, options))
}

/// Build an outline from already collected fragments
pub fn build_outline(fragments: &[Fragment], options: &OutlineOptions) -> Outline {
    let groups = group_by_style(fragments);
    let levels = rank_heading_styles(&groups, options.max_levels);
    let lines = reconstruct_lines(fragments);
    let headings = extract_headings(&lines, &levels);

    info!(
        "{} fragments, {} styles, {} lines, {} headings",
        fragments.len(),
        groups.len(),
        lines.len(),
        headings.len()
    );

    Outline::assemble(headings, options)
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Parse(e.to_string())
    }
}
