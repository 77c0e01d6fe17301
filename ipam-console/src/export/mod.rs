//! Spreadsheet snapshots of devices and prefixes

pub mod devices;
pub mod prefixes;
pub mod table;

pub use devices::export_devices;
pub use prefixes::export_prefixes;
