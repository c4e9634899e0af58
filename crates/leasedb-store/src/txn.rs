//! Transaction views implementing the lease storage seam
//!
//! `ReadTxn` exposes only `KvRead`; `WriteTxn` adds `KvWrite`. Both borrow
//! a SQLite transaction. Dropping either without committing rolls back.

use crate::errors::{from_rusqlite, Result};
use leasedb_core::kv::{prefix_upper_bound, KvRead, KvWrite};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::ops::ControlFlow;

fn get(conn: &Connection, key: &[u8]) -> Result<Option<Vec<u8>>> {
    conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")
        .map_err(from_rusqlite)?
        .query_row(params![key], |row| row.get(0))
        .optional()
        .map_err(from_rusqlite)
}

fn scan_prefix(
    conn: &Connection,
    prefix: &[u8],
    visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>>,
) -> Result<()> {
    let upper = prefix_upper_bound(prefix);
    let mut stmt = match upper {
        Some(_) => conn.prepare_cached(
            "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
        ),
        None => conn.prepare_cached("SELECT key, value FROM kv WHERE key >= ?1 ORDER BY key"),
    }
    .map_err(from_rusqlite)?;

    let mut rows = match &upper {
        Some(upper) => stmt.query(params![prefix, upper]),
        None => stmt.query(params![prefix]),
    }
    .map_err(from_rusqlite)?;

    while let Some(row) = rows.next().map_err(from_rusqlite)? {
        let key: Vec<u8> = row.get(0).map_err(from_rusqlite)?;
        let value: Vec<u8> = row.get(1).map_err(from_rusqlite)?;
        if !key.starts_with(prefix) {
            break;
        }
        if visit(&key, &value)?.is_break() {
            break;
        }
    }
    Ok(())
}

/// Read-only view over a deferred transaction
pub struct ReadTxn<'c> {
    tx: Transaction<'c>,
}

impl<'c> ReadTxn<'c> {
    pub(crate) fn new(tx: Transaction<'c>) -> Self {
        Self { tx }
    }

    /// End the transaction; reads never have anything to commit
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails to end the transaction.
    pub fn close(self) -> Result<()> {
        self.tx.rollback().map_err(from_rusqlite)
    }
}

impl KvRead for ReadTxn<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        get(&self.tx, key)
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>>,
    ) -> Result<()> {
        scan_prefix(&self.tx, prefix, visit)
    }
}

/// Read-write view over an IMMEDIATE transaction
///
/// Holding one means holding the database's single write lock.
pub struct WriteTxn<'c> {
    tx: Transaction<'c>,
}

impl<'c> WriteTxn<'c> {
    pub(crate) fn new(tx: Transaction<'c>) -> Self {
        Self { tx }
    }

    /// Make every write in this transaction durable
    ///
    /// # Errors
    ///
    /// `Internal` when the commit fails; nothing is then persisted.
    pub fn commit(self) -> Result<()> {
        self.tx.commit().map_err(from_rusqlite)
    }

    /// Discard every write in this transaction
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails to roll back.
    pub fn rollback(self) -> Result<()> {
        self.tx.rollback().map_err(from_rusqlite)
    }
}

impl KvRead for WriteTxn<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        get(&self.tx, key)
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>>,
    ) -> Result<()> {
        scan_prefix(&self.tx, prefix, visit)
    }
}

impl KvWrite for WriteTxn<'_> {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.tx
            .prepare_cached(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .map_err(from_rusqlite)?
            .execute(params![key, value])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let removed = self
            .tx
            .prepare_cached("DELETE FROM kv WHERE key = ?1")
            .map_err(from_rusqlite)?
            .execute(params![key])
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }

    fn delete_prefix(&self, prefix: &[u8]) -> Result<u64> {
        let removed = match prefix_upper_bound(prefix) {
            Some(upper) => self
                .tx
                .execute(
                    "DELETE FROM kv WHERE key >= ?1 AND key < ?2",
                    params![prefix, upper],
                )
                .map_err(from_rusqlite)?,
            None => self
                .tx
                .execute("DELETE FROM kv WHERE key >= ?1", params![prefix])
                .map_err(from_rusqlite)?,
        };
        Ok(removed as u64)
    }
}
