//! Inventory API module
//!
//! Thin async client for the NetBox-style inventory backend: paginated collection
//! reads, single-record reads and create requests.

pub mod client;
pub mod collection;
pub mod error;
pub mod models;

#[cfg(test)]
pub mod fake;

pub use client::{ClientSettings, InventoryApi, InventoryClient};
pub use collection::Collection;
pub use error::ApiError;
pub use models::{
    Device, DeviceRequest, IpAddress, IpAddressRequest, NestedRef, Prefix, Vlan, VlanRequest,
};
