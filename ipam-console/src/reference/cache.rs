//! One generation of cached reference data for a single kind

use log::warn;
use serde_json::Value;

use super::kind::ReferenceKind;

/// Local index of the synthetic "None" entry present in every cache
pub const SENTINEL_INDEX: usize = 0;

/// Display name of the sentinel entry
pub const SENTINEL_LABEL: &str = "None";

/// One cached item of a reference kind
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    /// Position in the current generation; reassigned on every rebuild
    pub local_index: usize,
    /// Durable backend identifier, `None` only for the sentinel
    pub remote_id: Option<u64>,
    /// Presentation label and match target for text resolution
    pub display_name: String,
    /// The full decoded record
    pub raw: Value,
}

impl ReferenceEntry {
    fn sentinel() -> Self {
        Self {
            local_index: SENTINEL_INDEX,
            remote_id: None,
            display_name: SENTINEL_LABEL.to_string(),
            raw: Value::Null,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.local_index == SENTINEL_INDEX
    }

    /// String field of the raw record, if present
    pub fn raw_str(&self, field: &str) -> Option<&str> {
        self.raw.get(field).and_then(Value::as_str)
    }

    pub fn slug(&self) -> Option<&str> {
        self.raw_str("slug")
    }
}

/// Ordered entries of one reference kind.
///
/// Index 0 is always the sentinel; indices `1..` follow the order of the fetch
/// response. A cache is never patched: every refresh builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCache {
    kind: ReferenceKind,
    entries: Vec<ReferenceEntry>,
    skipped: usize,
}

impl ReferenceCache {
    /// A cache holding only the sentinel (before the first successful fetch)
    pub fn empty(kind: ReferenceKind) -> Self {
        Self {
            kind,
            entries: vec![ReferenceEntry::sentinel()],
            skipped: 0,
        }
    }

    /// Build a fresh generation from raw records.
    ///
    /// A record without a numeric `id` or without a non-empty display field is
    /// skipped on its own; the rest of the collection is kept.
    pub fn rebuild(kind: ReferenceKind, records: Vec<Value>) -> Self {
        let mut entries = Vec::with_capacity(records.len() + 1);
        entries.push(ReferenceEntry::sentinel());
        let mut skipped = 0;

        for (position, record) in records.into_iter().enumerate() {
            let remote_id = record.get("id").and_then(Value::as_u64);
            let display_name = kind
                .display_fields()
                .iter()
                .filter_map(|field| record.get(*field).and_then(Value::as_str))
                .find(|name| !name.trim().is_empty())
                .map(str::to_string);

            match (remote_id, display_name) {
                (Some(remote_id), Some(display_name)) => {
                    entries.push(ReferenceEntry {
                        local_index: entries.len(),
                        remote_id: Some(remote_id),
                        display_name,
                        raw: record,
                    });
                }
                (remote_id, display_name) => {
                    skipped += 1;
                    warn!(
                        "Skipping {} record #{}: missing {}",
                        kind,
                        position,
                        if remote_id.is_none() && display_name.is_none() {
                            "id and display name"
                        } else if remote_id.is_none() {
                            "id"
                        } else {
                            "display name"
                        }
                    );
                }
            }
        }

        Self {
            kind,
            entries,
            skipped,
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Number of entries including the sentinel (always at least 1)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when only the sentinel is present
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// Entry at a local index; `None` when out of range for this generation
    pub fn get(&self, local_index: usize) -> Option<&ReferenceEntry> {
        self.entries.get(local_index)
    }

    /// Every entry, sentinel first
    pub fn all(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Every entry except the sentinel
    pub fn records(&self) -> &[ReferenceEntry] {
        &self.entries[1..]
    }

    /// Remote id behind a local index, `None` for the sentinel or out of range
    pub fn remote_id(&self, local_index: usize) -> Option<u64> {
        self.get(local_index).and_then(|e| e.remote_id)
    }

    /// Display names in index order, for dropdowns
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.display_name.as_str()).collect()
    }

    /// Records dropped during the rebuild that produced this generation
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
