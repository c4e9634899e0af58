#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::MemTxn;
use leasedb_core::kv::KvRead;
use leasedb_core::model::LABEL_GC_EXPIRE;
use leasedb_core::schema;
use leasedb_core::{
    ErrorKind, Filter, Lease, LeaseManager, LeaseOptions, RequestContext, ResourceRef,
};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::ops::ControlFlow;

fn ctx() -> RequestContext {
    RequestContext::new()
}

fn ids(leases: &[Lease]) -> Vec<&str> {
    leases.iter().map(|l| l.id.as_str()).collect()
}

/// Read view that cancels `ctx` once the first scanned entry was visited
struct CancelMidScan<'a> {
    inner: &'a MemTxn,
    ctx: RequestContext,
    visited: Cell<usize>,
}

impl<'a> CancelMidScan<'a> {
    fn new(inner: &'a MemTxn, ctx: &RequestContext) -> Self {
        Self {
            inner,
            ctx: ctx.clone(),
            visited: Cell::new(0),
        }
    }
}

impl KvRead for CancelMidScan<'_> {
    fn get(&self, key: &[u8]) -> leasedb_core::Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> leasedb_core::Result<ControlFlow<()>>,
    ) -> leasedb_core::Result<()> {
        self.inner.scan_prefix(prefix, &mut |key, value| {
            let flow = visit(key, value)?;
            self.visited.set(self.visited.get() + 1);
            self.ctx.cancel();
            Ok(flow)
        })
    }
}

#[test]
fn test_create_duplicate_create_list_delete_scenario() {
    // Given: an empty store
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    // When: tx1, tx1 again, then tx2 are created
    let tx1 = leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap();
    let dup = leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap_err();
    let tx2 = leases
        .create(&ctx(), LeaseOptions::new().with_id("tx2"))
        .unwrap();

    // Then: the duplicate fails with AlreadyExists
    assert_eq!(dup.kind(), ErrorKind::AlreadyExists);
    assert_eq!(dup.lease_id(), Some("tx1"));

    // And: list returns exactly tx1, tx2 with matching timestamps
    let listed = leases.list(&ctx(), &[]).unwrap();
    assert_eq!(ids(&listed), vec!["tx1", "tx2"]);
    assert_eq!(listed[0].created_at, tx1.created_at);
    assert_eq!(listed[1].created_at, tx2.created_at);

    // When: both are deleted
    for id in ["tx1", "tx2"] {
        leases.delete(&ctx(), &Lease::with_id(id)).unwrap();
    }

    // Then: nothing is left
    assert!(leases.list(&ctx(), &[]).unwrap().is_empty());
    assert!(txn.keys().is_empty());
}

#[test]
fn test_failed_create_leaves_record_untouched() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    let original = leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1").with_label("a", "1"))
        .unwrap();

    let err = leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1").with_label("b", "2"))
        .unwrap_err();

    assert!(err.is_already_exists());
    let listed = leases.list(&ctx(), &[]).unwrap();
    assert_eq!(listed, vec![original]);
}

#[test]
fn test_round_trip_labels_and_timestamp() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    let mut labels = BTreeMap::new();
    labels.insert("owner".to_string(), "ctr".to_string());
    labels.insert("containerd.io/gc.ref.content".to_string(), "sha256:ab".to_string());

    let created = leases
        .create(
            &ctx(),
            LeaseOptions::new().with_id("pull-1").with_labels(labels.clone()),
        )
        .unwrap();

    assert_eq!(created.labels, labels);
    let fetched = leases.get(&ctx(), "pull-1").unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn test_list_orders_by_id_not_creation() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    for id in ["zeta", "alpha", "tx10", "tx1", "mid"] {
        leases
            .create(&ctx(), LeaseOptions::new().with_id(id))
            .unwrap();
    }
    leases
        .add_resource(&ctx(), "tx1", &ResourceRef::content("default", "sha256:aa"))
        .unwrap();

    let listed = leases.list(&ctx(), &[]).unwrap();
    assert_eq!(ids(&listed), vec!["alpha", "mid", "tx1", "tx10", "zeta"]);
}

#[test]
fn test_generated_id_when_none_given() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    let a = leases.create(&ctx(), LeaseOptions::new()).unwrap();
    let b = leases.create(&ctx(), LeaseOptions::new()).unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.id.len(), 32);
    assert_eq!(leases.list(&ctx(), &[]).unwrap().len(), 2);
}

#[test]
fn test_expiration_stored_as_label() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    let at = chrono::Utc::now() + chrono::Duration::hours(24);

    let created = leases
        .create(&ctx(), LeaseOptions::new().with_id("tmp").with_expiration(at))
        .unwrap();

    let listed = leases.list(&ctx(), &[]).unwrap();
    assert!(listed[0].labels.contains_key(LABEL_GC_EXPIRE));
    assert_eq!(listed[0].expires_at(), Some(at));
    assert_eq!(created.expires_at(), Some(at));
    assert!(!listed[0].is_expired(chrono::Utc::now()));
}

#[test]
fn test_invalid_ids_rejected_without_writes() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    for id in ["", "a/b", "-x", "with space"] {
        let err = leases
            .create(&ctx(), LeaseOptions::new().with_id(id))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{:?}", id);
        assert_eq!(err.op(), Some("lease_create"));
    }
    assert!(txn.keys().is_empty());
}

#[test]
fn test_oversized_label_rejected() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    let err = leases
        .create(
            &ctx(),
            LeaseOptions::new()
                .with_id("tx1")
                .with_label("k", "v".repeat(5000)),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(txn.keys().is_empty());
}

#[test]
fn test_list_filters() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    leases
        .create(&ctx(), LeaseOptions::new().with_id("a").with_label("owner", "ctr"))
        .unwrap();
    leases
        .create(&ctx(), LeaseOptions::new().with_id("b").with_label("owner", "k8s"))
        .unwrap();
    leases
        .create(&ctx(), LeaseOptions::new().with_id("c"))
        .unwrap();

    let by_owner = leases
        .list(&ctx(), &[Filter::parse("labels.owner==ctr").unwrap()])
        .unwrap();
    assert_eq!(ids(&by_owner), vec!["a"]);

    let with_owner = leases.list(&ctx(), &[Filter::has_label("owner")]).unwrap();
    assert_eq!(ids(&with_owner), vec!["a", "b"]);

    let either = leases
        .list(&ctx(), &[Filter::id("c"), Filter::label("owner", "k8s")])
        .unwrap();
    assert_eq!(ids(&either), vec!["b", "c"]);
}

#[test]
fn test_delete_missing_lease_is_not_found() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    let err = leases.delete(&ctx(), &Lease::with_id("ghost")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_delete_cascades_resources_only_for_that_lease() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    let shared = ResourceRef::content("default", "sha256:shared");
    for id in ["tx1", "tx10"] {
        leases
            .create(&ctx(), LeaseOptions::new().with_id(id))
            .unwrap();
        leases.add_resource(&ctx(), id, &shared).unwrap();
    }
    leases
        .add_resource(&ctx(), "tx1", &ResourceRef::snapshot("overlayfs", "default", "l1"))
        .unwrap();

    leases.delete(&ctx(), &Lease::with_id("tx1")).unwrap();

    let err = leases.list_resources(&ctx(), "tx1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(leases.list_resources(&ctx(), "tx10").unwrap(), vec![shared]);
    assert!(txn.keys().iter().all(|k| !k.starts_with("leases/v1/tx1/")));
}

#[test]
fn test_resource_association_idempotent() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap();
    let r1 = ResourceRef::content("default", "sha256:01");
    let r2 = ResourceRef::snapshot("overlayfs", "default", "extract/1/sha256:02");

    leases.add_resource(&ctx(), "tx1", &r2).unwrap();
    leases.add_resource(&ctx(), "tx1", &r1).unwrap();
    leases.add_resource(&ctx(), "tx1", &r1).unwrap();

    assert_eq!(
        leases.list_resources(&ctx(), "tx1").unwrap(),
        vec![r1.clone(), r2.clone()]
    );

    leases.remove_resource(&ctx(), "tx1", &r1).unwrap();
    leases.remove_resource(&ctx(), "tx1", &r1).unwrap();

    assert_eq!(leases.list_resources(&ctx(), "tx1").unwrap(), vec![r2]);
}

#[test]
fn test_resource_ops_on_unknown_lease_are_not_found() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    let r = ResourceRef::content("default", "sha256:01");

    for err in [
        leases.add_resource(&ctx(), "ghost", &r).unwrap_err(),
        leases.remove_resource(&ctx(), "ghost", &r).unwrap_err(),
        leases.list_resources(&ctx(), "ghost").unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    assert!(txn.keys().is_empty());
}

#[test]
fn test_malformed_resource_rejected() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap();

    let err = leases
        .add_resource(&ctx(), "tx1", &ResourceRef::new("content", "a/b", "k"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(leases.list_resources(&ctx(), "tx1").unwrap().is_empty());
}

#[test]
fn test_cancelled_context_stops_operations() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap();

    let cancelled = RequestContext::new();
    cancelled.cancel();

    assert_eq!(
        leases.list(&cancelled, &[]).unwrap_err().kind(),
        ErrorKind::Cancelled
    );
    assert_eq!(
        leases
            .create(&cancelled, LeaseOptions::new().with_id("tx2"))
            .unwrap_err()
            .kind(),
        ErrorKind::Cancelled
    );
    assert_eq!(
        leases
            .delete(&cancelled, &Lease::with_id("tx1"))
            .unwrap_err()
            .kind(),
        ErrorKind::Cancelled
    );
    assert_eq!(leases.list(&ctx(), &[]).unwrap().len(), 1);
}

#[test]
fn test_cancellation_during_list_stops_the_scan() {
    // Given: several leases and a view that cancels after the first record
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    for id in ["a", "b", "c", "d"] {
        leases
            .create(&ctx(), LeaseOptions::new().with_id(id))
            .unwrap();
    }
    let cancellable = RequestContext::new();
    let view = CancelMidScan::new(&txn, &cancellable);

    // When: listing through that view
    let err = LeaseManager::new(&view)
        .list(&cancellable, &[])
        .unwrap_err();

    // Then: the scan stops at the next record instead of finishing
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(view.visited.get(), 1);
}

#[test]
fn test_cancellation_during_list_resources_stops_the_scan() {
    // Given: a lease holding three resources
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap();
    for digest in ["sha256:01", "sha256:02", "sha256:03"] {
        leases
            .add_resource(&ctx(), "tx1", &ResourceRef::content("default", digest))
            .unwrap();
    }
    let cancellable = RequestContext::new();
    let view = CancelMidScan::new(&txn, &cancellable);

    // When: enumerating its resources through the cancelling view
    let err = LeaseManager::new(&view)
        .list_resources(&cancellable, "tx1")
        .unwrap_err();

    // Then: enumeration is abandoned after the first entry
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(view.visited.get(), 1);
}

#[test]
fn test_created_at_increases_in_creation_order() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);

    let created: Vec<Lease> = (0..50)
        .map(|i| {
            leases
                .create(&ctx(), LeaseOptions::new().with_id(format!("tx{}", i)))
                .unwrap()
        })
        .collect();

    for pair in created.windows(2) {
        assert!(
            pair[1].created_at > pair[0].created_at,
            "{} created no later than {}",
            pair[1].id,
            pair[0].id
        );
    }
}

#[test]
fn test_storage_failure_surfaces_as_internal() {
    let txn = MemTxn::new();
    let leases = LeaseManager::new(&txn);
    txn.fail_writes();

    let err = leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(txn.keys().is_empty());
}

#[test]
fn test_unsupported_record_version_fails_closed() {
    let txn = MemTxn::new();
    txn.raw_put(
        &schema::lease_key("future"),
        br#"{"version":7,"created_at":"2024-01-01T00:00:00Z"}"#,
    );
    let leases = LeaseManager::new(&txn);

    let list_err = leases.list(&ctx(), &[]).unwrap_err();
    let get_err = leases.get(&ctx(), "future").unwrap_err();

    assert_eq!(list_err.kind(), ErrorKind::Internal);
    assert_eq!(get_err.kind(), ErrorKind::Internal);
    assert!(std::error::Error::source(&get_err).is_some());
}

#[test]
fn test_manager_over_trait_object() {
    let txn = MemTxn::new();
    let dyn_txn: &dyn leasedb_core::KvWrite = &txn;
    let leases = LeaseManager::new(dyn_txn);

    leases
        .create(&ctx(), LeaseOptions::new().with_id("tx1"))
        .unwrap();

    assert_eq!(leases.list(&ctx(), &[]).unwrap().len(), 1);
}
