//! Database connection management
//!
//! `Db` owns one SQLite connection. It is the caller-side helper that opens
//! transactions for the lease manager; the manager itself never does.

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use crate::txn::{ReadTxn, WriteTxn};
use rusqlite::{Connection, TransactionBehavior};

/// Open a SQLite database at the given path
///
/// # Errors
///
/// `Internal` when the file cannot be opened or configured.
pub fn open(config: &StoreConfig) -> Result<Connection> {
    let conn = match &config.path {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    }
    .map_err(from_rusqlite)?;
    configure(&conn, config)?;
    Ok(conn)
}

/// Apply connection settings from the config
///
/// # Errors
///
/// `Internal` when a pragma is rejected.
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    conn.busy_timeout(config.busy_timeout())
        .map_err(from_rusqlite)?;

    if config.wal && config.path.is_some() {
        // journal_mode answers with the resulting mode, so it is a query
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        tracing::debug!(journal_mode = %mode, "journal mode set");
    }

    Ok(())
}

/// A lease database handle
pub struct Db {
    conn: Connection,
}

impl Db {
    /// Open (creating if needed) and migrate the database described by `config`
    ///
    /// # Errors
    ///
    /// `Internal` when opening fails or a migration fails or was tampered with.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let mut conn = open(config)?;
        apply_migrations(&mut conn)?;
        tracing::info!(path = ?config.path, "lease database opened");
        Ok(Self { conn })
    }

    /// Private in-memory database (for testing)
    ///
    /// # Errors
    ///
    /// Same as [`Db::open`].
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StoreConfig::default())
    }

    /// Begin a read transaction
    ///
    /// The snapshot is taken at the first read and stays stable until the
    /// view is dropped or closed.
    ///
    /// # Errors
    ///
    /// `Internal` when the transaction cannot be started.
    pub fn begin_read(&mut self) -> Result<ReadTxn<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(from_rusqlite)?;
        Ok(ReadTxn::new(tx))
    }

    /// Begin a write transaction, waiting up to the busy timeout for the lock
    ///
    /// # Errors
    ///
    /// `Internal` when the write lock is not granted within the busy timeout.
    pub fn begin_write(&mut self) -> Result<WriteTxn<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;
        Ok(WriteTxn::new(tx))
    }

    /// Run `f` in a read transaction
    ///
    /// # Errors
    ///
    /// Whatever `f` returned, or `Internal` from the engine.
    pub fn view<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&ReadTxn<'_>) -> Result<R>,
    {
        let txn = self.begin_read()?;
        let out = f(&txn)?;
        txn.close()?;
        Ok(out)
    }

    /// Run `f` in a write transaction
    ///
    /// Commits when `f` returns `Ok`; rolls back when it returns `Err`.
    ///
    /// # Errors
    ///
    /// Whatever `f` returned (after rolling back), or `Internal` from the
    /// engine, including a failed commit.
    pub fn update<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&WriteTxn<'_>) -> Result<R>,
    {
        let txn = self.begin_write()?;
        match f(&txn) {
            Ok(out) => {
                txn.commit()?;
                Ok(out)
            }
            Err(e) => {
                txn.rollback()?;
                Err(e)
            }
        }
    }
}
