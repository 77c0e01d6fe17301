//! Inventory API endpoints that return list envelopes

/// A list endpoint of the inventory API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tenants,
    DeviceTypes,
    DeviceRoles,
    Sites,
    Manufacturers,
    Devices,
    IpAddresses,
    Vlans,
    Prefixes,
}

impl Collection {
    /// Path relative to the base URL, with trailing slash
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Tenants => "/api/tenancy/tenants/",
            Collection::DeviceTypes => "/api/dcim/device-types/",
            Collection::DeviceRoles => "/api/dcim/device-roles/",
            Collection::Sites => "/api/dcim/sites/",
            Collection::Manufacturers => "/api/dcim/manufacturers/",
            Collection::Devices => "/api/dcim/devices/",
            Collection::IpAddresses => "/api/ipam/ip-addresses/",
            Collection::Vlans => "/api/ipam/vlans/",
            Collection::Prefixes => "/api/ipam/prefixes/",
        }
    }

    /// Human-readable name used in log lines and status messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Tenants => "tenants",
            Collection::DeviceTypes => "device types",
            Collection::DeviceRoles => "device roles",
            Collection::Sites => "sites",
            Collection::Manufacturers => "manufacturers",
            Collection::Devices => "devices",
            Collection::IpAddresses => "IP addresses",
            Collection::Vlans => "VLANs",
            Collection::Prefixes => "prefixes",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Build the URL of the first page of a collection
pub fn first_page_url(base_url: &str, collection: Collection, page_size: usize) -> String {
    format!(
        "{}{}?limit={}",
        base_url.trim_end_matches('/'),
        collection.path(),
        page_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_url_strips_trailing_slash() {
        assert_eq!(
            first_page_url("https://demo.netbox.dev/", Collection::Devices, 1000),
            "https://demo.netbox.dev/api/dcim/devices/?limit=1000"
        );
        assert_eq!(
            first_page_url("http://localhost:8000", Collection::Tenants, 50),
            "http://localhost:8000/api/tenancy/tenants/?limit=50"
        );
    }
}
