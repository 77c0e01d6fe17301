//! Positional schema of one import row

use crate::reference::ReferenceKind;

/// Number of positional cells in an import row
pub const COLUMN_COUNT: usize = 7;

/// Expected header row; columns are still read by position
pub const HEADER: [&str; COLUMN_COUNT] = [
    "Name",
    "Serial",
    "Tenant",
    "Manufacturer",
    "Role",
    "Site",
    "Device Type",
];

/// Whether a header row names the expected columns, ignoring case and padding
pub fn header_matches(cells: &[String]) -> bool {
    cells.len() >= COLUMN_COUNT
        && HEADER
            .iter()
            .zip(cells)
            .all(|(expected, found)| found.trim().eq_ignore_ascii_case(expected))
}

/// Reference kinds resolved for each row, in column order
pub const RESOLVED_KINDS: [ReferenceKind; 5] = [
    ReferenceKind::Tenant,
    ReferenceKind::Manufacturer,
    ReferenceKind::DeviceRole,
    ReferenceKind::Site,
    ReferenceKind::DeviceType,
];

/// One data row of an import sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based line in the source sheet, header included
    pub line: usize,
    pub name: String,
    pub serial: String,
    pub tenant: String,
    pub manufacturer: String,
    pub role: String,
    pub site: String,
    pub device_type: String,
}

impl ImportRow {
    /// Build a row from positional cells; missing trailing cells are blank and
    /// cells past the seventh are ignored
    pub fn from_cells(line: usize, cells: Vec<String>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or_default();
        Self {
            line,
            name: next(),
            serial: next(),
            tenant: next(),
            manufacturer: next(),
            role: next(),
            site: next(),
            device_type: next(),
        }
    }

    /// True when every cell is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.cells().iter().all(|c| c.trim().is_empty())
    }

    pub fn cells(&self) -> [&str; COLUMN_COUNT] {
        [
            &self.name,
            &self.serial,
            &self.tenant,
            &self.manufacturer,
            &self.role,
            &self.site,
            &self.device_type,
        ]
    }

    /// Cell holding the text to resolve for a reference kind
    pub fn reference(&self, kind: ReferenceKind) -> &str {
        match kind {
            ReferenceKind::Tenant => &self.tenant,
            ReferenceKind::Manufacturer => &self.manufacturer,
            ReferenceKind::DeviceRole => &self.role,
            ReferenceKind::Site => &self.site,
            ReferenceKind::DeviceType => &self.device_type,
            ReferenceKind::Device => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_mapping() {
        let row = ImportRow::from_cells(
            2,
            cells(&["sw-01", "SN1", "Acme", "Cisco", "Access", "NYC", "C9300"]),
        );
        assert_eq!(row.name, "sw-01");
        assert_eq!(row.serial, "SN1");
        assert_eq!(row.reference(ReferenceKind::Tenant), "Acme");
        assert_eq!(row.reference(ReferenceKind::Manufacturer), "Cisco");
        assert_eq!(row.reference(ReferenceKind::DeviceRole), "Access");
        assert_eq!(row.reference(ReferenceKind::Site), "NYC");
        assert_eq!(row.reference(ReferenceKind::DeviceType), "C9300");
    }

    #[test]
    fn test_short_row_is_padded() {
        let row = ImportRow::from_cells(3, cells(&["sw-02", "SN2"]));
        assert_eq!(row.device_type, "");
        assert!(!row.is_blank());
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let row = ImportRow::from_cells(4, cells(&["a", "b", "c", "d", "e", "f", "g", "h"]));
        assert_eq!(row.device_type, "g");
    }

    #[test]
    fn test_header_matches_ignores_case_and_padding() {
        let header: Vec<String> = HEADER.iter().map(|h| format!(" {} ", h.to_uppercase())).collect();
        assert!(header_matches(&header));

        let mut swapped: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
        swapped.swap(2, 3);
        assert!(!header_matches(&swapped));
        assert!(!header_matches(&["Name".to_string()]));
    }

    #[test]
    fn test_blank_row() {
        assert!(ImportRow::from_cells(5, cells(&["", "  ", ""])).is_blank());
    }
}
