//! One fetch-and-rebuild cycle for a view
//!
//! The cycle runs off the render path: it fetches each collection the view
//! depends on, builds complete replacement caches, and returns them as a
//! [`RefreshOutcome`]. Nothing is published until [`RefreshOutcome::apply`],
//! which swaps every successful rebuild in at once. A failed fetch leaves that
//! kind's previous generation in place.

use std::sync::Arc;

use log::{info, warn};

use super::scheduler::RefreshTicket;
use super::view::View;
use crate::api::client::decode_records;
use crate::api::{ApiError, Collection, InventoryApi, IpAddress, Vlan};
use crate::reference::{ReferenceCache, ReferenceCaches, ReferenceKind, SharedCaches};

/// Rows of the list a view shows, when the view has its own collection
#[derive(Debug, Clone)]
pub enum ViewRows {
    IpAddresses(Vec<IpAddress>),
    Vlans(Vec<Vlan>),
}

impl ViewRows {
    pub fn row_count(&self) -> usize {
        match self {
            ViewRows::IpAddresses(rows) => rows.len(),
            ViewRows::Vlans(rows) => rows.len(),
        }
    }
}

/// Everything a finished cycle produced
#[derive(Debug)]
pub struct RefreshOutcome {
    pub ticket: RefreshTicket,
    pub rebuilt: Vec<ReferenceCache>,
    pub failures: Vec<(Collection, ApiError)>,
    pub rows: Option<ViewRows>,
}

impl RefreshOutcome {
    pub fn view(&self) -> View {
        self.ticket.view
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when any failure was a credential rejection
    pub fn auth_rejected(&self) -> bool {
        self.failures.iter().any(|(_, e)| e.is_auth_rejected())
    }

    /// One-line description of the failures for the status bar
    pub fn failure_summary(&self) -> Option<String> {
        let (collection, error) = self.failures.first()?;
        let mut summary = format!("Refresh of {} failed: {}", collection, error);
        if self.failures.len() > 1 {
            summary.push_str(&format!(" (+{} more)", self.failures.len() - 1));
        }
        Some(summary)
    }

    /// Publish the rebuilt caches in one swap and return the new snapshot.
    ///
    /// The ticket and view rows stay with the caller.
    pub fn apply(&mut self, shared: &SharedCaches) -> Arc<ReferenceCaches> {
        for (collection, error) in &self.failures {
            warn!("Keeping previous {} after failed refresh: {}", collection, error);
        }
        let rebuilt = std::mem::take(&mut self.rebuilt);
        if rebuilt.is_empty() {
            return shared.snapshot();
        }
        shared.publish(rebuilt)
    }
}

/// Fetch and rebuild every reference kind the view depends on, then its rows
pub async fn run_cycle(api: &dyn InventoryApi, ticket: RefreshTicket) -> RefreshOutcome {
    let view = ticket.view;
    let mut rebuilt = Vec::new();
    let mut failures = Vec::new();

    for kind in view.reference_kinds() {
        match rebuild_kind(api, *kind).await {
            Ok(cache) => rebuilt.push(cache),
            Err(e) => failures.push((kind.collection(), e)),
        }
    }

    let rows = match view.row_collection() {
        Some(collection) => match api.fetch_collection(collection).await {
            Ok(raw) => Some(decode_rows(collection, raw)),
            Err(e) => {
                failures.push((collection, e));
                None
            }
        },
        None => None,
    };

    info!(
        "Refreshed {}: {} caches rebuilt, {} rows, {} failures",
        view,
        rebuilt.len(),
        rows.as_ref().map_or(0, ViewRows::row_count),
        failures.len()
    );

    RefreshOutcome {
        ticket,
        rebuilt,
        failures,
        rows,
    }
}

/// Fetch one kind and build its next generation
pub async fn rebuild_kind(
    api: &dyn InventoryApi,
    kind: ReferenceKind,
) -> Result<ReferenceCache, ApiError> {
    let records = api.fetch_collection(kind.collection()).await?;
    let cache = ReferenceCache::rebuild(kind, records);
    info!(
        "Rebuilt {} cache: {} entries, {} skipped",
        kind,
        cache.len() - 1,
        cache.skipped()
    );
    Ok(cache)
}

/// Fetch and rebuild the given reference kinds, keeping the previous generation
/// of any kind that fails
pub async fn refresh_kinds(
    api: &dyn InventoryApi,
    shared: &SharedCaches,
    kinds: &[ReferenceKind],
) -> Vec<(Collection, ApiError)> {
    let mut rebuilt = Vec::new();
    let mut failures = Vec::new();
    for &kind in kinds {
        match rebuild_kind(api, kind).await {
            Ok(cache) => rebuilt.push(cache),
            Err(e) => {
                warn!("Keeping previous {} after failed refresh: {}", kind.collection(), e);
                failures.push((kind.collection(), e));
            }
        }
    }
    shared.publish(rebuilt);
    failures
}

fn decode_rows(collection: Collection, raw: Vec<serde_json::Value>) -> ViewRows {
    match collection {
        Collection::Vlans => ViewRows::Vlans(decode_records(collection, raw)),
        _ => ViewRows::IpAddresses(decode_records(collection, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::import::RESOLVED_KINDS;
    use crate::refresh::RefreshScheduler;
    use serde_json::json;
    use std::time::Duration;

    fn populated_api() -> FakeApi {
        FakeApi::new()
            .with_collection(
                Collection::Tenants,
                vec![json!({"id": 1, "name": "Acme"}), json!({"id": 2, "name": "Best"})],
            )
            .with_collection(Collection::Sites, vec![json!({"id": 10, "name": "NYC"})])
            .with_collection(
                Collection::Vlans,
                vec![json!({"id": 5, "vid": 100, "name": "users"})],
            )
            .with_collection(
                Collection::IpAddresses,
                vec![json!({"id": 7, "address": "10.0.0.1/24"})],
            )
    }

    fn ticket_for(view: View) -> (RefreshScheduler, RefreshTicket) {
        let mut scheduler = RefreshScheduler::new(Duration::from_secs(30));
        let ticket = scheduler.tick(view, Duration::ZERO, false).unwrap();
        (scheduler, ticket)
    }

    #[tokio::test]
    async fn test_vlan_cycle_fetches_its_kinds_and_rows() {
        let api = populated_api();
        let (_, ticket) = ticket_for(View::Vlans);
        let outcome = run_cycle(&api, ticket).await;

        assert_eq!(
            api.fetches(),
            vec![Collection::Tenants, Collection::Sites, Collection::Vlans]
        );
        assert!(outcome.is_clean());
        assert_eq!(outcome.rebuilt.len(), 2);
        match outcome.rows {
            Some(ViewRows::Vlans(rows)) => assert_eq!(rows[0].vid, 100),
            other => panic!("unexpected rows {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_kind_keeps_previous_generation() {
        let shared = SharedCaches::default();
        shared.publish(vec![ReferenceCache::rebuild(
            ReferenceKind::Site,
            vec![json!({"id": 3, "name": "LON"})],
        )]);

        let api = populated_api().failing_collection(Collection::Sites, 500);
        let (_, ticket) = ticket_for(View::Vlans);
        let mut outcome = run_cycle(&api, ticket).await;
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failure_summary().unwrap().contains("sites"));

        let snapshot = outcome.apply(&shared);
        assert_eq!(snapshot.get(ReferenceKind::Site).names(), vec!["None", "LON"]);
        assert_eq!(
            snapshot.get(ReferenceKind::Tenant).names(),
            vec!["None", "Acme", "Best"]
        );
    }

    #[tokio::test]
    async fn test_auth_rejection_is_reported() {
        let api = populated_api().failing_collection(Collection::Tenants, 401);
        let (_, ticket) = ticket_for(View::IpAddresses);
        let outcome = run_cycle(&api, ticket).await;
        assert!(outcome.auth_rejected());
        assert!(matches!(outcome.rows, Some(ViewRows::IpAddresses(ref rows)) if rows.len() == 1));
        assert_eq!(outcome.rows.as_ref().map(ViewRows::row_count), Some(1));
    }

    #[tokio::test]
    async fn test_device_view_has_no_row_fetch() {
        let api = populated_api();
        let (_, ticket) = ticket_for(View::Devices);
        let outcome = run_cycle(&api, ticket).await;
        assert_eq!(api.fetches().len(), ReferenceKind::ALL.len());
        assert!(outcome.rows.is_none());
    }

    #[tokio::test]
    async fn test_two_due_signals_run_one_cycle() {
        let api = Arc::new(populated_api().with_fetch_delay(Duration::from_millis(20)));
        let (mut scheduler, ticket) = ticket_for(View::IpAddresses);

        let worker = {
            let api = api.clone();
            tokio::spawn(async move { run_cycle(api.as_ref(), ticket).await })
        };

        // Both signals arrive while the first cycle is still fetching
        for _ in 0..2 {
            scheduler.force(View::IpAddresses);
            assert!(
                scheduler
                    .tick(View::IpAddresses, Duration::from_secs(60), false)
                    .is_none()
            );
        }

        let outcome = worker.await.unwrap();
        assert!(scheduler.complete(outcome.ticket));
        assert_eq!(
            api.fetches(),
            vec![Collection::Tenants, Collection::IpAddresses]
        );
    }

    #[tokio::test]
    async fn test_refresh_kinds_publishes_every_kind() {
        let api = populated_api().failing_collection(Collection::Devices, 503);
        let shared = SharedCaches::default();
        let failures = refresh_kinds(&api, &shared, &ReferenceKind::ALL).await;
        assert_eq!(failures.len(), 1);
        assert_eq!(shared.snapshot().get(ReferenceKind::Tenant).len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_kinds_skips_kinds_not_asked_for() {
        let api = populated_api().failing_collection(Collection::Devices, 503);
        let shared = SharedCaches::default();
        let failures = refresh_kinds(&api, &shared, &RESOLVED_KINDS).await;
        assert!(failures.is_empty());
        assert!(!api.fetches().contains(&Collection::Devices));
        assert_eq!(shared.snapshot().get(ReferenceKind::Tenant).len(), 3);
    }
}
