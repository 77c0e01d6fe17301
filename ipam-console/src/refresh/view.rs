//! List views and the collections each one keeps fresh

use crate::api::{Collection, Device};
use crate::api::client::decode_records;
use crate::reference::{ReferenceCache, ReferenceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    IpAddresses,
    Vlans,
    Devices,
}

impl View {
    pub const ALL: [View; 3] = [View::IpAddresses, View::Vlans, View::Devices];

    /// Reference kinds refreshed together with this view
    pub fn reference_kinds(&self) -> &'static [ReferenceKind] {
        match self {
            View::IpAddresses => &[ReferenceKind::Tenant],
            View::Vlans => &[ReferenceKind::Tenant, ReferenceKind::Site],
            View::Devices => &ReferenceKind::ALL,
        }
    }

    /// Collection holding the view's own rows.
    ///
    /// The device list has none: its rows are the device reference cache.
    pub fn row_collection(&self) -> Option<Collection> {
        match self {
            View::IpAddresses => Some(Collection::IpAddresses),
            View::Vlans => Some(Collection::Vlans),
            View::Devices => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::IpAddresses => "IP Addresses",
            View::Vlans => "VLANs",
            View::Devices => "Devices",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Typed device rows decoded from the device cache's raw records
pub fn device_rows(cache: &ReferenceCache) -> Vec<Device> {
    let raw = cache.records().iter().map(|e| e.raw.clone()).collect();
    decode_records(Collection::Devices, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_view_refreshes_every_kind() {
        assert_eq!(View::Devices.reference_kinds().len(), ReferenceKind::ALL.len());
        assert!(View::Devices.row_collection().is_none());
    }

    #[test]
    fn test_device_rows_follow_cache_order() {
        let cache = ReferenceCache::rebuild(
            ReferenceKind::Device,
            vec![
                json!({"id": 2, "display": "b", "serial": "S2"}),
                json!({"id": 1, "display": "a", "serial": "S1"}),
            ],
        );
        let rows = device_rows(&cache);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[1].serial, "S1");
    }
}
