//! Resolve import rows against the reference caches and submit device creates
//!
//! Each row resolves five text cells (tenant, manufacturer, role, site, device
//! type). A row with any cell that does not resolve is skipped as a whole and no
//! request is sent for it. Rows that resolve are submitted one at a time in row
//! order; a rejected submission is logged and the pass continues.

use log::{error, info};
use serde_json::Value;

use super::row::{ImportRow, RESOLVED_KINDS};
use crate::api::models::STATUS_ACTIVE;
use crate::api::{DeviceRequest, InventoryApi};
use crate::reference::{ReferenceCaches, ReferenceKind};
use crate::resolve::{Resolution, lookup};

/// What happened to one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Every cell was empty
    Blank,
    /// At least one reference did not resolve; the failing columns are listed
    Unresolved(Vec<(ReferenceKind, Resolution)>),
    /// Resolved but not sent (dry run)
    Planned(DeviceRequest),
    /// Sent and accepted
    Created { remote_id: Option<u64> },
    /// Sent and rejected
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub line: usize,
    pub name: String,
    pub outcome: RowOutcome,
}

/// Totals of one import pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    /// Create requests sent, accepted or not
    pub submitted: usize,
    pub created: usize,
    pub failed: usize,
    pub planned: usize,
    pub skipped_blank: usize,
    pub skipped_unresolved: usize,
    pub reports: Vec<RowReport>,
}

impl ImportSummary {
    fn record(&mut self, row: &ImportRow, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Blank => self.skipped_blank += 1,
            RowOutcome::Unresolved(_) => self.skipped_unresolved += 1,
            RowOutcome::Planned(_) => self.planned += 1,
            RowOutcome::Created { .. } => {
                self.submitted += 1;
                self.created += 1;
            }
            RowOutcome::Failed(_) => {
                self.submitted += 1;
                self.failed += 1;
            }
        }
        self.reports.push(RowReport {
            line: row.line,
            name: row.name.clone(),
            outcome,
        });
    }

    pub fn skipped(&self) -> usize {
        self.skipped_blank + self.skipped_unresolved
    }

    /// Status-bar sized description
    pub fn headline(&self) -> String {
        let mut line = if self.planned > 0 {
            format!("Dry run: {} rows would be submitted", self.planned)
        } else {
            format!(
                "Imported {} of {} submitted devices",
                self.created, self.submitted
            )
        };
        if self.skipped() > 0 {
            let mut reasons = Vec::new();
            if self.skipped_unresolved > 0 {
                reasons.push(format!("{} unresolved", self.skipped_unresolved));
            }
            if self.skipped_blank > 0 {
                reasons.push(format!("{} blank", self.skipped_blank));
            }
            line.push_str(&format!(", {} skipped ({})", self.skipped(), reasons.join(", ")));
        }
        if self.failed > 0 {
            line.push_str(&format!(", {} failed", self.failed));
        }
        line
    }
}

/// Resolve a row into a create-request, or list the columns that did not resolve
pub fn plan_row(
    row: &ImportRow,
    caches: &ReferenceCaches,
) -> Result<DeviceRequest, Vec<(ReferenceKind, Resolution)>> {
    let mut ids = [0u64; RESOLVED_KINDS.len()];
    let mut unresolved = Vec::new();

    for (slot, kind) in RESOLVED_KINDS.iter().enumerate() {
        let cache = caches.get(*kind);
        let resolution = lookup(cache, row.reference(*kind));
        match cache.remote_id(resolution.index()) {
            Some(id) if resolution.is_matched() => ids[slot] = id,
            _ => unresolved.push((*kind, resolution)),
        }
    }

    if !unresolved.is_empty() {
        return Err(unresolved);
    }

    let [tenant, manufacturer, role, site, device_type] = ids;
    Ok(DeviceRequest {
        name: row.name.clone(),
        device_type,
        role,
        site,
        tenant: Some(tenant),
        manufacturer: Some(manufacturer),
        status: STATUS_ACTIVE.to_string(),
        serial: row.serial.clone(),
    })
}

/// Run one import pass over `rows` against a fixed cache snapshot.
///
/// With `dry_run` nothing is sent; resolvable rows are reported as planned.
pub async fn import_all(
    rows: &[ImportRow],
    caches: &ReferenceCaches,
    api: &dyn InventoryApi,
    dry_run: bool,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for row in rows {
        if row.is_blank() {
            summary.record(row, RowOutcome::Blank);
            continue;
        }

        let request = match plan_row(row, caches) {
            Ok(request) => request,
            Err(unresolved) => {
                let columns: Vec<_> = unresolved
                    .iter()
                    .map(|(kind, resolution)| format!("{} ({})", kind, resolution.label()))
                    .collect();
                info!(
                    "Skipping import row {} '{}': unresolved {}",
                    row.line,
                    row.name,
                    columns.join(", ")
                );
                summary.record(row, RowOutcome::Unresolved(unresolved));
                continue;
            }
        };

        if dry_run {
            summary.record(row, RowOutcome::Planned(request));
            continue;
        }

        let outcome = match api.create_device(&request).await {
            Ok(created) => RowOutcome::Created {
                remote_id: created.get("id").and_then(Value::as_u64),
            },
            Err(e) => {
                error!("Failed to create device from row {} '{}': {}", row.line, row.name, e);
                RowOutcome::Failed(e.to_string())
            }
        };
        summary.record(row, outcome);
    }

    info!("{}", summary.headline());
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::reference::ReferenceCache;
    use serde_json::json;

    fn caches() -> ReferenceCaches {
        ReferenceCaches::new().with_replaced([
            ReferenceCache::rebuild(
                ReferenceKind::Tenant,
                vec![json!({"id": 10, "name": "Acme"}), json!({"id": 11, "name": "Best"})],
            ),
            ReferenceCache::rebuild(
                ReferenceKind::Manufacturer,
                vec![json!({"id": 20, "name": "Cisco"})],
            ),
            ReferenceCache::rebuild(
                ReferenceKind::DeviceRole,
                vec![json!({"id": 30, "name": "Access"})],
            ),
            ReferenceCache::rebuild(
                ReferenceKind::Site,
                vec![json!({"id": 40, "name": "NYC"})],
            ),
            ReferenceCache::rebuild(
                ReferenceKind::DeviceType,
                vec![json!({"id": 50, "model": "C9300-48P"})],
            ),
        ])
    }

    fn row(line: usize, cells: [&str; 7]) -> ImportRow {
        ImportRow::from_cells(line, cells.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_headline_counts_blank_rows() {
        let summary = ImportSummary {
            submitted: 3,
            created: 2,
            failed: 1,
            skipped_blank: 2,
            skipped_unresolved: 1,
            ..Default::default()
        };
        assert_eq!(
            summary.headline(),
            "Imported 2 of 3 submitted devices, 3 skipped (1 unresolved, 2 blank), 1 failed"
        );

        let only_blank = ImportSummary {
            skipped_blank: 4,
            ..Default::default()
        };
        assert_eq!(
            only_blank.headline(),
            "Imported 0 of 0 submitted devices, 4 skipped (4 blank)"
        );
    }

    #[tokio::test]
    async fn test_resolved_row_submits_remote_ids() {
        let api = FakeApi::new();
        let rows = vec![row(2, ["sw-01", "SN1", "Acme", "Cisco", "Access", "NYC", "C9300"])];

        let summary = import_all(&rows, &caches(), &api, false).await;

        assert_eq!(summary.submitted, 1);
        assert_eq!(summary.created, 1);
        let created = api.created();
        assert_eq!(
            created[0],
            DeviceRequest {
                name: "sw-01".into(),
                device_type: 50,
                role: 30,
                site: 40,
                tenant: Some(10),
                manufacturer: Some(20),
                status: "active".into(),
                serial: "SN1".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_one_unresolved_cell_skips_the_row() {
        let api = FakeApi::new();
        let rows = vec![
            row(2, ["sw-01", "SN1", "Acme", "Cisco", "Access", "LAX", "C9300"]),
            row(3, ["sw-02", "SN2", "", "Cisco", "Access", "NYC", "C9300"]),
        ];

        let summary = import_all(&rows, &caches(), &api, false).await;

        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.skipped_unresolved, 2);
        assert!(api.created().is_empty());
        assert_eq!(
            summary.reports[0].outcome,
            RowOutcome::Unresolved(vec![(ReferenceKind::Site, Resolution::Unmatched)])
        );
        assert_eq!(
            summary.reports[1].outcome,
            RowOutcome::Unresolved(vec![(ReferenceKind::Tenant, Resolution::Blank)])
        );
    }

    #[tokio::test]
    async fn test_failed_submission_does_not_stop_the_pass() {
        let api = FakeApi::new().failing_device("dup");
        let rows = vec![
            row(2, ["dup", "SN1", "Acme", "Cisco", "Access", "NYC", "C9300"]),
            row(3, ["", "", "", "", "", "", ""]),
            row(4, ["sw-03", "SN3", "Best", "Cisco", "Access", "NYC", "C9300"]),
        ];

        let summary = import_all(&rows, &caches(), &api, false).await;

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.skipped_blank, 1);
        let names: Vec<_> = api.created().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["dup", "sw-03"]);
        assert!(matches!(summary.reports[0].outcome, RowOutcome::Failed(ref msg) if msg.contains("400")));
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let api = FakeApi::new();
        let rows = vec![row(2, ["sw-01", "SN1", "Acme", "Cisco", "Access", "NYC", "C9300"])];

        let summary = import_all(&rows, &caches(), &api, true).await;

        assert_eq!(summary.planned, 1);
        assert_eq!(summary.submitted, 0);
        assert!(api.created().is_empty());
        assert!(summary.headline().starts_with("Dry run"));
    }

    #[tokio::test]
    async fn test_every_reference_carries_a_remote_id() {
        let caches = ReferenceCaches::new().with_replaced([
            ReferenceCache::rebuild(ReferenceKind::Tenant, vec![json!({"id": 1, "name": "Tenant A"})]),
            ReferenceCache::rebuild(ReferenceKind::Manufacturer, vec![json!({"id": 2, "name": "Acme"})]),
            ReferenceCache::rebuild(ReferenceKind::DeviceRole, vec![json!({"id": 3, "name": "Edge"})]),
            ReferenceCache::rebuild(ReferenceKind::Site, vec![json!({"id": 4, "name": "NYC"})]),
            ReferenceCache::rebuild(ReferenceKind::DeviceType, vec![json!({"id": 5, "model": "Router"})]),
        ]);
        let api = FakeApi::new();
        let rows = vec![row(2, ["r1", "", "Tenant A", "Acme", "Edge", "NYC", "Router"])];

        let summary = import_all(&rows, &caches, &api, false).await;

        assert_eq!(summary.submitted, 1);
        let request = &api.created()[0];
        assert_eq!(request.tenant, Some(1));
        assert_eq!(request.manufacturer, Some(2));
        assert_eq!((request.role, request.site, request.device_type), (3, 4, 5));
    }

    #[test]
    fn test_plan_row_reports_every_failing_column() {
        let unresolved = plan_row(
            &row(2, ["x", "", "Globex", "Cisco", "Core", "NYC", "Nexus"]),
            &caches(),
        )
        .unwrap_err();
        let kinds: Vec<_> = unresolved.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![ReferenceKind::Tenant, ReferenceKind::DeviceRole, ReferenceKind::DeviceType]
        );
    }
}
