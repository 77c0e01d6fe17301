//! Write a header plus rows to xlsx or csv

use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use rust_xlsxwriter::Workbook;

/// One exported cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
        }
    }
}

/// Output format, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Xlsx,
        }
    }
}

/// Write `header` and `rows`, returning the number of data rows written
pub fn write_table(
    path: &Path,
    sheet_name: &str,
    header: &[&str],
    rows: &[Vec<Cell>],
) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    match ExportFormat::for_path(path) {
        ExportFormat::Xlsx => write_xlsx(path, sheet_name, header, rows)?,
        ExportFormat::Csv => write_csv(path, header, rows)?,
    }

    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}

fn write_xlsx(path: &Path, sheet_name: &str, header: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, title) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => worksheet.write_string(row_num, col as u16, s)?,
                Cell::Int(i) => worksheet.write_number(row_num, col as u16, *i as f64)?,
            };
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;
    Ok(())
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(header)
        .context("Failed to write CSV header")?;

    for (index, row) in rows.iter().enumerate() {
        wtr.write_record(row.iter().map(Cell::render))
            .with_context(|| format!("Failed to write CSV row {}", index + 1))?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
