//! Free-text resolution against a reference cache
//!
//! Matching is case-sensitive, unanchored substring containment on the entry's
//! display name. Entries are scanned in cache order starting after the sentinel,
//! and the first hit wins: cache order (the upstream response order) is the
//! tie-break for ambiguous text.

use crate::reference::{ReferenceCache, SENTINEL_INDEX};

/// Outcome of resolving one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The text was empty or whitespace; nothing was looked up
    Blank,
    /// The text was given but no entry contains it
    Unmatched,
    /// First entry whose display name contains the text
    Matched(usize),
}

impl Resolution {
    /// Local index, collapsing both failure cases to the sentinel
    pub fn index(&self) -> usize {
        match self {
            Resolution::Matched(index) => *index,
            Resolution::Blank | Resolution::Unmatched => SENTINEL_INDEX,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Blank => "blank",
            Resolution::Unmatched => "unmatched",
            Resolution::Matched(_) => "matched",
        }
    }
}

/// Resolve text to a local index; 0 means unresolved
pub fn resolve(cache: &ReferenceCache, needle: &str) -> usize {
    lookup(cache, needle).index()
}

/// Resolve text, keeping "blank" and "matched nothing" apart
pub fn lookup(cache: &ReferenceCache, needle: &str) -> Resolution {
    if needle.trim().is_empty() {
        return Resolution::Blank;
    }

    cache
        .records()
        .iter()
        .find(|entry| entry.display_name.contains(needle))
        .map(|entry| Resolution::Matched(entry.local_index))
        .unwrap_or(Resolution::Unmatched)
}
