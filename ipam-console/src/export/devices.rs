//! Device snapshot export

use std::path::Path;

use anyhow::Result;

use super::table::{Cell, write_table};
use crate::api::Device;
use crate::api::models::label_of;

pub const DEVICE_HEADER: [&str; 8] = [
    "Name",
    "Type",
    "Manufacturer",
    "Role",
    "Site",
    "Tenant",
    "Serial",
    "Status",
];

pub fn device_row(device: &Device) -> Vec<Cell> {
    vec![
        Cell::text(device.label()),
        Cell::text(device.device_type_label()),
        Cell::text(device.manufacturer_label()),
        Cell::text(label_of(&device.role)),
        Cell::text(label_of(&device.site)),
        Cell::text(label_of(&device.tenant)),
        Cell::text(&device.serial),
        Cell::text(device.status_label()),
    ]
}

/// Devices whose label contains `filter` (all devices for an empty filter)
pub fn filter_devices<'a>(devices: &'a [Device], filter: &str) -> Vec<&'a Device> {
    devices
        .iter()
        .filter(|d| filter.is_empty() || d.label().contains(filter))
        .collect()
}

/// Write the devices matching `filter` to `path`; returns the row count
pub fn export_devices(path: &Path, devices: &[Device], filter: &str) -> Result<usize> {
    let rows: Vec<_> = filter_devices(devices, filter)
        .into_iter()
        .map(device_row)
        .collect();
    write_table(path, "Devices", &DEVICE_HEADER, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use serde_json::json;
    use tempfile::TempDir;

    fn devices() -> Vec<Device> {
        vec![
            serde_json::from_value(json!({
                "id": 1,
                "name": "edge-01",
                "serial": "SN1",
                "device_type": {"model": "C9300", "manufacturer": {"name": "Cisco"}},
                "role": {"name": "Edge"},
                "site": {"name": "NYC"},
                "tenant": {"name": "Acme"},
                "status": {"value": "active", "label": "Active"}
            }))
            .unwrap(),
            serde_json::from_value(json!({"id": 2, "name": "core-01"})).unwrap(),
        ]
    }

    #[test]
    fn test_xlsx_export_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.xlsx");
        assert_eq!(export_devices(&path, &devices(), "").unwrap(), 2);

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Devices").unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Data::String("Name".into()));
        assert_eq!(rows[1][2], Data::String("Cisco".into()));
        assert_eq!(rows[1][7], Data::String("Active".into()));
    }

    #[test]
    fn test_csv_export_applies_filter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("devices.csv");
        assert_eq!(export_devices(&path, &devices(), "core").unwrap(), 1);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header = reader.headers().unwrap().clone();
        assert_eq!(header.iter().collect::<Vec<_>>(), DEVICE_HEADER.to_vec());
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "core-01");
        assert_eq!(&records[0][1], "");
    }
}
