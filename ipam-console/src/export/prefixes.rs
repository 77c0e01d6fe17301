//! Prefix snapshot export

use std::path::Path;

use anyhow::Result;

use super::table::{Cell, write_table};
use crate::api::Prefix;

pub const PREFIX_HEADER: [&str; 10] = [
    "ID",
    "URL",
    "Display URL",
    "Display",
    "Family Value",
    "Family Label",
    "Prefix",
    "Tenant Name",
    "Created",
    "Last Updated",
];

pub fn prefix_row(prefix: &Prefix) -> Vec<Cell> {
    let tenant = prefix
        .tenant
        .as_ref()
        .and_then(|t| t.name.as_deref())
        .unwrap_or("");
    vec![
        Cell::Int(prefix.id as i64),
        Cell::text(&prefix.url),
        Cell::text(&prefix.display_url),
        Cell::text(&prefix.display),
        Cell::Int(prefix.family.value as i64),
        Cell::text(&prefix.family.label),
        Cell::text(&prefix.prefix),
        Cell::text(tenant),
        Cell::text(prefix.created.as_deref().unwrap_or("")),
        Cell::text(prefix.last_updated.as_deref().unwrap_or("")),
    ]
}

pub fn export_prefixes(path: &Path, prefixes: &[Prefix]) -> Result<usize> {
    let rows: Vec<_> = prefixes.iter().map(prefix_row).collect();
    write_table(path, "Prefixes", &PREFIX_HEADER, &rows)
}
