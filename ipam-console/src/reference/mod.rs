//! Locally cached reference collections
//!
//! Tenants, device types, device roles, sites, manufacturers and devices are
//! fetched as a whole and kept as ordered caches whose index 0 is the "None"
//! sentinel. The UI reads them for dropdowns; the resolver and bulk import read
//! them for text matching.

pub mod cache;
pub mod kind;
pub mod selection;
pub mod set;

pub use cache::{ReferenceCache, SENTINEL_INDEX};
pub use kind::ReferenceKind;
pub use selection::Selection;
pub use set::{ReferenceCaches, SharedCaches};
