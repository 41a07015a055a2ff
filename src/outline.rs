//! Heading extraction, title derivation and outline output
//!
//! Lines whose style is one of the ranked heading styles become headings.
//! The title is built from the H1 headings at the start of the document.

use crate::lines::Line;
use crate::styles::{HeadingLevel, HeadingLevelMap, MAX_HEADING_LEVELS};
use crate::PdfError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Title used when no qualifying H1 heading exists
pub const UNTITLED: &str = "Untitled Document";

/// Options for outline inference
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Number of heading levels to assign (clamped to 6)
    pub max_levels: usize,
    /// H1 headings on pages before this index make up the title
    pub title_pages: u32,
    /// Title when no H1 is found on the title pages
    pub untitled: String,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            max_levels: MAX_HEADING_LEVELS,
            title_pages: 2,
            untitled: UNTITLED.to_string(),
        }
    }
}

/// A detected heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    /// Page index (0-indexed)
    pub page: u32,
}

/// Document title plus every heading in line order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<Heading>,
}

impl Outline {
    /// Derive the title from `headings` and package both
    pub fn assemble(headings: Vec<Heading>, options: &OutlineOptions) -> Self {
        let title = derive_title(&headings, options);
        Outline {
            title,
            outline: headings,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, PdfError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Keep the lines whose style maps to a heading level, in line order
pub fn extract_headings(lines: &[Line], levels: &HeadingLevelMap) -> Vec<Heading> {
    lines
        .iter()
        .filter_map(|line| {
            levels.get(&line.style_key()).map(|&level| Heading {
                level,
                text: line.text.clone(),
                page: line.page,
            })
        })
        .collect()
}

/// Join the H1 headings of the first pages into a title
pub fn derive_title(headings: &[Heading], options: &OutlineOptions) -> String {
    let title = headings
        .iter()
        .filter(|h| h.level == HeadingLevel::H1 && h.page < options.title_pages)
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let title = title.trim();

    if title.is_empty() {
        options.untitled.clone()
    } else {
        title.to_string()
    }
}

/// Write the outline as pretty JSON followed by a newline
pub fn write_json<W: Write>(outline: &Outline, mut writer: W) -> Result<(), PdfError> {
    serde_json::to_writer_pretty(&mut writer, outline)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write the outline as pretty JSON to a file, replacing it if present
pub fn save_json<P: AsRef<Path>>(outline: &Outline, path: P) -> Result<(), PdfError> {
    let file = File::create(path)?;
    write_json(outline, BufWriter::new(file))
}
