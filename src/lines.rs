//! Physical line reconstruction
//!
//! Fragments that share a page and a rounded baseline belong to the same
//! line. Within a line they are ordered left to right.

use crate::extractor::{Fragment, Tenths};
use crate::styles::StyleKey;
use indexmap::IndexMap;

/// A line of text rebuilt from same-baseline fragments
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Fragment texts, left to right, joined by single spaces
    pub text: String,
    /// Largest fragment size on the line
    pub size: Tenths,
    /// Font of the leftmost fragment
    pub font: String,
    pub y: Tenths,
    /// Page index (0-indexed)
    pub page: u32,
}

impl Line {
    pub fn style_key(&self) -> StyleKey {
        StyleKey::new(self.size, self.font.as_str())
    }
}

/// Merge fragments into lines keyed by (page, y).
///
/// Lines come out in the order their first fragment was seen. The line's
/// font is taken from its leftmost fragment, so a line whose prefix uses a
/// different font (a bold number, say) is classified by that prefix.
pub fn reconstruct_lines(fragments: &[Fragment]) -> Vec<Line> {
    let mut grouped: IndexMap<(u32, Tenths), Vec<&Fragment>> = IndexMap::new();
    for fragment in fragments {
        grouped
            .entry((fragment.page, fragment.y))
            .or_default()
            .push(fragment);
    }

    grouped
        .into_iter()
        .filter_map(|((page, y), mut items)| {
            // Stable: equal x keeps stream order
            items.sort_by_key(|f| f.x);
            let first = items.first()?;
            let size = items.iter().map(|f| f.size).max()?;
            let text = items
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Some(Line {
                text,
                size,
                font: first.font.clone(),
                y,
                page,
            })
        })
        .collect()
}
