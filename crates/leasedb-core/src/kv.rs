//! Storage engine seam
//!
//! The lease facility sees the engine only through these traits: an ordered
//! byte-keyed space viewed through one caller-owned transaction. A view that
//! implements only [`KvRead`] is read-only; [`KvWrite`] adds mutation.
//! Implementations must give read-your-writes inside one transaction and
//! visit keys in ascending bytewise order.
//!
//! Nothing here opens, commits or rolls back a transaction.

use crate::errors::Result;
use std::ops::ControlFlow;

/// Read access to an open transaction
pub trait KvRead {
    /// Value stored under `key`, if any
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Visit every entry whose key starts with `prefix`, ascending
    ///
    /// The visitor returns `ControlFlow::Break(())` to stop early; an `Err`
    /// from the visitor aborts the scan and is returned as is.
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails, or whatever the visitor returned.
    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>>,
    ) -> Result<()>;

    /// Whether a value is stored under `key`
    ///
    /// # Errors
    ///
    /// Same as [`KvRead::get`].
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Write access to an open read-write transaction
pub trait KvWrite: KvRead {
    /// Insert or overwrite `key`
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails or the view is read-only.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove one key; returns whether it existed
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails.
    fn delete(&self, key: &[u8]) -> Result<bool>;

    /// Remove every key starting with `prefix`; returns how many were removed
    ///
    /// # Errors
    ///
    /// `Internal` when the engine fails.
    fn delete_prefix(&self, prefix: &[u8]) -> Result<u64>;
}

/// Smallest byte string greater than every string starting with `prefix`
///
/// `None` when no such bound exists (empty or all-`0xFF` prefix).
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut bound = prefix.to_vec();
    while let Some(last) = bound.pop() {
        if last < u8::MAX {
            bound.push(last + 1);
            return Some(bound);
        }
    }
    None
}
