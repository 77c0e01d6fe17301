//! Dropdown selections that point into a reference cache

use super::cache::{ReferenceCache, ReferenceEntry, SENTINEL_INDEX};

/// A local index chosen by the operator.
///
/// The index can outlive the cache generation it was taken from, so it is
/// clamped whenever a rebuild shrinks the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
}

impl Selection {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_none(&self) -> bool {
        self.index == SENTINEL_INDEX
    }

    /// Keep the index inside a collection of `len` entries
    pub fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }

    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.index = (self.index + 1) % len;
        }
    }

    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.index = if self.index == 0 { len - 1 } else { self.index - 1 };
        }
    }

    /// The selected entry, or `None` for the sentinel / a stale index
    pub fn entry<'a>(&self, cache: &'a ReferenceCache) -> Option<&'a ReferenceEntry> {
        cache.get(self.index).filter(|e| !e.is_sentinel())
    }

    /// Remote id of the selected entry, `None` for the sentinel
    pub fn remote_id(&self, cache: &ReferenceCache) -> Option<u64> {
        self.entry(cache).and_then(|e| e.remote_id)
    }
}
