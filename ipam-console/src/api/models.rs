//! Typed records exchanged with the inventory API
//!
//! Everything that is read is decoded leniently (`#[serde(default)]`) since the
//! backend omits or nulls optional relations freely. Write requests skip absent
//! optional fields so the server applies its own defaults.

use serde::{Deserialize, Serialize};

/// Status value sent with every create request
pub const STATUS_ACTIVE: &str = "active";

/// List envelope returned by every collection endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// `{ value, label }` pair used for enumerated fields such as status or role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// Address family of a prefix (`4` / `IPv4`, `6` / `IPv6`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Family {
    #[serde(default)]
    pub value: u8,
    #[serde(default)]
    pub label: String,
}

/// Brief representation of a related object (tenant, site, role, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedObject {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl NestedObject {
    /// Best label available for presentation
    pub fn label(&self) -> &str {
        self.display
            .as_deref()
            .or(self.name.as_deref())
            .or(self.model.as_deref())
            .unwrap_or("")
    }
}

/// Label of an optional relation, or an empty string
pub fn label_of(obj: &Option<NestedObject>) -> &str {
    obj.as_ref().map(NestedObject::label).unwrap_or("")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpAddress {
    pub id: u64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: Option<Choice>,
    #[serde(default)]
    pub role: Option<Choice>,
    #[serde(default)]
    pub tenant: Option<NestedObject>,
    #[serde(default)]
    pub assigned_object_id: Option<u64>,
    #[serde(default)]
    pub dns_name: String,
    #[serde(default)]
    pub description: String,
}

impl IpAddress {
    pub fn is_assigned(&self) -> bool {
        self.assigned_object_id.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vlan {
    pub id: u64,
    #[serde(default)]
    pub vid: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<Choice>,
    #[serde(default)]
    pub tenant: Option<NestedObject>,
    #[serde(default)]
    pub site: Option<NestedObject>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prefix {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub display_url: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub family: Family,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub tenant: Option<NestedObject>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Device type as nested inside a device record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NestedDeviceType {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<NestedObject>,
}

impl NestedDeviceType {
    pub fn label(&self) -> &str {
        self.display.as_deref().or(self.model.as_deref()).unwrap_or("")
    }
}

/// A device as returned by both the list and the detail endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Device {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub device_type: Option<NestedDeviceType>,
    #[serde(default, alias = "device_role")]
    pub role: Option<NestedObject>,
    #[serde(default)]
    pub tenant: Option<NestedObject>,
    #[serde(default)]
    pub site: Option<NestedObject>,
    #[serde(default)]
    pub status: Option<Choice>,
    #[serde(default)]
    pub description: String,
}

impl Device {
    pub fn label(&self) -> &str {
        self.display
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }

    pub fn device_type_label(&self) -> &str {
        self.device_type.as_ref().map(NestedDeviceType::label).unwrap_or("")
    }

    pub fn manufacturer_label(&self) -> &str {
        self.device_type
            .as_ref()
            .map(|t| label_of(&t.manufacturer))
            .unwrap_or("")
    }

    pub fn status_label(&self) -> &str {
        self.status.as_ref().map(|s| s.label.as_str()).unwrap_or("")
    }
}

/// `{ name, slug }` reference accepted by writable relations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedRef {
    pub name: String,
    pub slug: String,
}

/// Body of `POST /api/dcim/devices/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRequest {
    pub name: String,
    pub device_type: u64,
    pub role: u64,
    pub site: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<u64>,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub serial: String,
}

/// Body of `POST /api/ipam/ip-addresses/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpAddressRequest {
    pub address: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<NestedRef>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dns_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Body of `POST /api/ipam/vlans/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VlanRequest {
    pub vid: u16,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<u64>,
}
