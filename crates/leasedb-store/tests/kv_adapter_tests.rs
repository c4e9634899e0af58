// Integration tests for the SQLite key/value views

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::memory_db;
use leasedb_core::kv::{KvRead, KvWrite};
use std::ops::ControlFlow;

fn scan(txn: &dyn KvRead, prefix: &[u8]) -> Vec<Vec<u8>> {
    let mut keys = Vec::new();
    txn.scan_prefix(prefix, &mut |key, _| {
        keys.push(key.to_vec());
        Ok(ControlFlow::Continue(()))
    })
    .unwrap();
    keys
}

#[test]
fn test_scan_is_ordered_and_bounded_by_prefix() {
    // Given: keys inside and on both sides of the prefix
    let mut db = memory_db();
    db.update(|txn| {
        let keys: [&[u8]; 6] = [b"a/2", b"a/1", b"a0", b"a", b"a/10", b"b/1"];
        for key in keys {
            txn.put(key, b"")?;
        }
        Ok(())
    })
    .unwrap();

    // When: scanning "a/"
    let keys = db.view(|txn| Ok(scan(txn, b"a/"))).unwrap();

    // Then: only prefixed keys, in byte order
    assert_eq!(
        keys,
        vec![b"a/1".to_vec(), b"a/10".to_vec(), b"a/2".to_vec()]
    );
}

#[test]
fn test_scan_stops_on_break() {
    let mut db = memory_db();
    db.update(|txn| {
        txn.put(b"p/1", b"")?;
        txn.put(b"p/2", b"")?;
        txn.put(b"p/3", b"")
    })
    .unwrap();

    let mut seen = 0;
    db.view(|txn| {
        txn.scan_prefix(b"p/", &mut |_, _| {
            seen += 1;
            Ok(ControlFlow::Break(()))
        })
    })
    .unwrap();
    assert_eq!(seen, 1);
}

#[test]
fn test_scan_with_all_ff_prefix() {
    let mut db = memory_db();
    db.update(|txn| {
        txn.put(&[0xff, 0xff, 0x01], b"")?;
        txn.put(&[0xfe], b"")
    })
    .unwrap();

    let keys = db.view(|txn| Ok(scan(txn, &[0xff, 0xff]))).unwrap();
    assert_eq!(keys, vec![vec![0xff, 0xff, 0x01]]);
}

#[test]
fn test_write_view_reads_its_own_writes() {
    let mut db = memory_db();
    db.update(|txn| {
        txn.put(b"k", b"v1")?;
        assert_eq!(txn.get(b"k")?, Some(b"v1".to_vec()));

        // Put overwrites
        txn.put(b"k", b"v2")?;
        assert_eq!(txn.get(b"k")?, Some(b"v2".to_vec()));
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_delete_reports_presence() {
    let mut db = memory_db();
    db.update(|txn| {
        txn.put(b"k", b"v")?;
        assert!(txn.delete(b"k")?);
        assert!(!txn.delete(b"k")?);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_delete_prefix_leaves_neighbours() {
    // Given: a prefix and a sibling sharing its leading bytes
    let mut db = memory_db();
    db.update(|txn| {
        txn.put(b"leases/v1/a", b"")?;
        txn.put(b"leases/v1/a/resources/x", b"")?;
        txn.put(b"leases/v1/a/resources/y", b"")?;
        txn.put(b"leases/v1/ab", b"")
    })
    .unwrap();

    // When: removing everything under "leases/v1/a/"
    let removed = db
        .update(|txn| txn.delete_prefix(b"leases/v1/a/"))
        .unwrap();

    // Then: only the two nested keys go
    assert_eq!(removed, 2);
    let keys = db.view(|txn| Ok(scan(txn, b"leases/"))).unwrap();
    assert_eq!(
        keys,
        vec![b"leases/v1/a".to_vec(), b"leases/v1/ab".to_vec()]
    );
}
