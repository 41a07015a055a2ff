//! Style grouping and heading style ranking
//!
//! Fragments are grouped by (font size, font name). The largest styles are
//! then ranked into heading levels H1..H6.

use crate::extractor::{Fragment, Tenths};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of heading levels
pub const MAX_HEADING_LEVELS: usize = 6;

/// Visual class of text: rounded font size plus exact font name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleKey {
    pub size: Tenths,
    pub font: String,
}

impl StyleKey {
    pub fn new(size: Tenths, font: impl Into<String>) -> Self {
        Self {
            size,
            font: font.into(),
        }
    }
}

impl From<&Fragment> for StyleKey {
    fn from(fragment: &Fragment) -> Self {
        StyleKey::new(fragment.size, fragment.font.as_str())
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pt {}", self.size, self.font)
    }
}

/// Inferred heading depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// All levels, largest first
    pub const ALL: [HeadingLevel; MAX_HEADING_LEVELS] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Level for a zero-based rank (0 -> H1)
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::H5 => "H5",
            HeadingLevel::H6 => "H6",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fragments grouped by style, in first-seen order
pub type StyleGroups<'a> = IndexMap<StyleKey, Vec<&'a Fragment>>;

/// Heading styles and the level each one maps to
pub type HeadingLevelMap = IndexMap<StyleKey, HeadingLevel>;

/// Group fragments by their style key.
///
/// Groups appear in the order their first fragment was seen, and each group
/// keeps its fragments in input order.
pub fn group_by_style(fragments: &[Fragment]) -> StyleGroups<'_> {
    let mut groups = StyleGroups::new();
    for fragment in fragments {
        groups
            .entry(StyleKey::from(fragment))
            .or_default()
            .push(fragment);
    }
    groups
}

/// Pick heading styles and assign levels.
///
/// Styles are ordered by descending size, then by descending fragment count
/// among equal sizes. The first `max_levels` (at most six) become headings,
/// and levels are handed out by descending size with that order breaking ties.
pub fn rank_heading_styles(groups: &StyleGroups<'_>, max_levels: usize) -> HeadingLevelMap {
    let mut ranked: Vec<(&StyleKey, usize)> = groups
        .iter()
        .map(|(key, fragments)| (key, fragments.len()))
        .collect();
    ranked.sort_by(|a, b| b.0.size.cmp(&a.0.size).then(b.1.cmp(&a.1)));
    ranked.truncate(max_levels.min(MAX_HEADING_LEVELS));

    let mut candidates: Vec<&StyleKey> = ranked.into_iter().map(|(key, _)| key).collect();
    // Level order is by size alone; sort is stable so count order breaks ties
    candidates.sort_by(|a, b| b.size.cmp(&a.size));

    let levels: HeadingLevelMap = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(rank, key)| HeadingLevel::from_rank(rank).map(|level| (key.clone(), level)))
        .collect();

    for (key, level) in &levels {
        debug!("{} -> {}", key, level);
    }
    levels
}
