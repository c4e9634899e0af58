//! leasedb store - SQLite storage engine for the lease facility
//!
//! Provides:
//! - Connection management and `StoreConfig`
//! - Migrations framework for the key/value table
//! - Read and read-write transaction views implementing
//!   `leasedb_core::kv::{KvRead, KvWrite}`

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod txn;

// Re-export key types
pub use config::StoreConfig;
pub use db::Db;
pub use errors::Result;
pub use txn::{ReadTxn, WriteTxn};
