//! The six slow-changing collections that are cached locally

use crate::api::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum ReferenceKind {
    Tenant,
    DeviceType,
    DeviceRole,
    Site,
    Manufacturer,
    Device,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 6] = [
        ReferenceKind::Tenant,
        ReferenceKind::DeviceType,
        ReferenceKind::DeviceRole,
        ReferenceKind::Site,
        ReferenceKind::Manufacturer,
        ReferenceKind::Device,
    ];

    /// Endpoint the kind is fetched from
    pub fn collection(&self) -> Collection {
        match self {
            ReferenceKind::Tenant => Collection::Tenants,
            ReferenceKind::DeviceType => Collection::DeviceTypes,
            ReferenceKind::DeviceRole => Collection::DeviceRoles,
            ReferenceKind::Site => Collection::Sites,
            ReferenceKind::Manufacturer => Collection::Manufacturers,
            ReferenceKind::Device => Collection::Devices,
        }
    }

    /// Record fields tried, in order, for the display name
    pub fn display_fields(&self) -> &'static [&'static str] {
        match self {
            ReferenceKind::DeviceType => &["model"],
            ReferenceKind::Device => &["display", "name"],
            ReferenceKind::Tenant
            | ReferenceKind::DeviceRole
            | ReferenceKind::Site
            | ReferenceKind::Manufacturer => &["name"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Tenant => "Tenant",
            ReferenceKind::DeviceType => "Device Type",
            ReferenceKind::DeviceRole => "Device Role",
            ReferenceKind::Site => "Site",
            ReferenceKind::Manufacturer => "Manufacturer",
            ReferenceKind::Device => "Device",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
