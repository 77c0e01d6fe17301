//! The full set of reference caches and its atomic replacement

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::cache::ReferenceCache;
use super::kind::ReferenceKind;

/// One cache per reference kind.
///
/// Cloning is cheap (each cache sits behind an `Arc`), so readers take a
/// snapshot and keep it for as long as they need a consistent view.
#[derive(Debug, Clone)]
pub struct ReferenceCaches {
    caches: BTreeMap<ReferenceKind, Arc<ReferenceCache>>,
}

impl Default for ReferenceCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceCaches {
    /// Every kind with only its sentinel
    pub fn new() -> Self {
        let caches = ReferenceKind::ALL
            .iter()
            .map(|kind| (*kind, Arc::new(ReferenceCache::empty(*kind))))
            .collect();
        Self { caches }
    }

    pub fn get(&self, kind: ReferenceKind) -> &ReferenceCache {
        // Populated for every kind in `new`, and `replace` only overwrites
        &self.caches[&kind]
    }

    /// Swap in a new generation for one kind
    pub fn replace(&mut self, cache: ReferenceCache) {
        self.caches.insert(cache.kind(), Arc::new(cache));
    }

    /// New set with the given generations swapped in, leaving `self` untouched
    pub fn with_replaced(&self, rebuilt: impl IntoIterator<Item = ReferenceCache>) -> Self {
        let mut next = self.clone();
        for cache in rebuilt {
            next.replace(cache);
        }
        next
    }
}

/// Single-writer / many-reader holder for the current cache set.
///
/// Refreshes build a complete replacement set and store it in one step, so a
/// reader never observes a half-rebuilt generation.
#[derive(Debug)]
pub struct SharedCaches {
    current: ArcSwap<ReferenceCaches>,
}

impl Default for SharedCaches {
    fn default() -> Self {
        Self::new(ReferenceCaches::new())
    }
}

impl SharedCaches {
    pub fn new(caches: ReferenceCaches) -> Self {
        Self {
            current: ArcSwap::from_pointee(caches),
        }
    }

    /// Consistent snapshot of every kind
    pub fn snapshot(&self) -> Arc<ReferenceCaches> {
        self.current.load_full()
    }

    /// Swap in rebuilt caches; kinds not listed keep their current generation
    pub fn publish(&self, rebuilt: Vec<ReferenceCache>) -> Arc<ReferenceCaches> {
        let next = Arc::new(self.current.load().with_replaced(rebuilt));
        self.current.store(next.clone());
        next
    }

    /// Drop every generation back to sentinel-only caches
    pub fn clear(&self) {
        self.current.store(Arc::new(ReferenceCaches::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_set_has_sentinel_only_caches() {
        let caches = ReferenceCaches::new();
        for kind in ReferenceKind::ALL {
            assert_eq!(caches.get(kind).names(), vec!["None"]);
        }
    }

    #[test]
    fn test_publish_replaces_only_listed_kinds() {
        let shared = SharedCaches::default();
        shared.publish(vec![
            ReferenceCache::rebuild(ReferenceKind::Tenant, vec![json!({"id": 1, "name": "A"})]),
            ReferenceCache::rebuild(ReferenceKind::Site, vec![json!({"id": 2, "name": "NYC"})]),
        ]);

        let before = shared.snapshot();
        shared.publish(vec![ReferenceCache::rebuild(
            ReferenceKind::Tenant,
            vec![json!({"id": 3, "name": "B"})],
        )]);
        let after = shared.snapshot();

        // The old snapshot is unaffected by the later publish
        assert_eq!(before.get(ReferenceKind::Tenant).names(), vec!["None", "A"]);
        assert_eq!(after.get(ReferenceKind::Tenant).names(), vec!["None", "B"]);
        assert_eq!(after.get(ReferenceKind::Site).names(), vec!["None", "NYC"]);
    }

    #[test]
    fn test_clear_resets_to_sentinels() {
        let shared = SharedCaches::default();
        shared.publish(vec![ReferenceCache::rebuild(
            ReferenceKind::Device,
            vec![json!({"id": 1, "display": "edge-01"})],
        )]);
        shared.clear();
        assert!(shared.snapshot().get(ReferenceKind::Device).is_empty());
    }
}
