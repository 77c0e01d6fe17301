//! Read import rows from an xlsx workbook or a csv file

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use log::warn;

use super::row::{HEADER, ImportRow, header_matches};

/// Read every data row of an import file, choosing the format by extension.
///
/// The first row is a header and is skipped.
pub fn read_rows(path: &Path, preferred_sheet: &str) -> Result<Vec<ImportRow>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        read_csv(path)
    } else {
        read_xlsx(path, preferred_sheet)
    }
}

/// Read rows from `preferred_sheet`, or from the first sheet when it is absent
pub fn read_xlsx(path: &Path, preferred_sheet: &str) -> Result<Vec<ImportRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = if sheet_names.iter().any(|s| s == preferred_sheet) {
        preferred_sheet.to_string()
    } else {
        sheet_names
            .first()
            .context("Excel file has no sheets")?
            .clone()
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    // Range rows are relative to the first used cell; keep line numbers absolute
    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    if let Some(header) = range.rows().next() {
        let header: Vec<String> = header.iter().map(cell_text).collect();
        check_header(path, &header);
    }

    let rows = range
        .rows()
        .enumerate()
        .skip(1)
        .map(|(offset, row)| {
            let cells = row.iter().map(cell_text).collect();
            ImportRow::from_cells(first_line + offset, cells)
        })
        .collect();

    Ok(rows)
}

pub fn read_csv(path: &Path) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let header: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();
    check_header(path, &header);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", index + 2))?;
        let cells = record.iter().map(str::to_string).collect();
        rows.push(ImportRow::from_cells(index + 2, cells));
    }
    Ok(rows)
}

/// Columns are positional; a differing header is reported but not fatal
fn check_header(path: &Path, header: &[String]) {
    if !header_matches(header) {
        warn!(
            "Header of {} is [{}], expected [{}]; reading columns by position",
            path.display(),
            header.join(", "),
            HEADER.join(", ")
        );
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}
