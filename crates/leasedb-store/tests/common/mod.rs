#![allow(dead_code)]

use leasedb_store::{Db, StoreConfig};
use tempfile::TempDir;

/// A file-backed database in its own temporary directory
///
/// Keep the `TempDir` alive for as long as the database is used.
pub fn file_db() -> (TempDir, StoreConfig, Db) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = StoreConfig::at(dir.path().join("meta.db"));
    let db = Db::open(&config).expect("Failed to open database");
    (dir, config, db)
}

pub fn memory_db() -> Db {
    Db::open_in_memory().expect("Failed to open in-memory database")
}
