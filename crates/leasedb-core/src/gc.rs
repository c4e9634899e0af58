//! Lease roots for an external mark-and-sweep collector
//!
//! The collector unions this set with its other roots before sweeping.
//! Building it never mutates the store.

use crate::core_types::RequestContext;
use crate::errors::Result;
use crate::kv::KvRead;
use crate::manager::LeaseManager;
use crate::model::ResourceRef;
use crate::{log_op_end, log_op_error, log_op_start};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

pub struct GcRoots<'t, T: ?Sized> {
    leases: LeaseManager<'t, T>,
}

impl<'t, T: KvRead + ?Sized> GcRoots<'t, T> {
    pub fn new(txn: &'t T) -> Self {
        Self {
            leases: LeaseManager::new(txn),
        }
    }

    /// Every resource referenced by any live lease
    ///
    /// # Errors
    ///
    /// - `Cancelled`: the context was cancelled during enumeration
    /// - `Internal`: storage failure or undecodable record
    pub fn collect(&self, ctx: &RequestContext) -> Result<BTreeSet<ResourceRef>> {
        log_op_start!("gc_roots", request_id = %ctx.request_id);
        let start = Instant::now();

        let roots = self
            .collect_by_lease(ctx)
            .map(|by_lease| by_lease.into_values().flatten().collect::<BTreeSet<_>>());

        let duration_ms = start.elapsed().as_millis() as u64;
        match roots {
            Ok(roots) => {
                log_op_end!(
                    "gc_roots",
                    duration_ms = duration_ms,
                    resource_count = roots.len()
                );
                Ok(roots)
            }
            Err(e) => {
                log_op_error!("gc_roots", e, duration_ms = duration_ms);
                Err(e)
            }
        }
    }

    /// Resources grouped by the lease that pins them
    ///
    /// Leases without resources appear with an empty list.
    ///
    /// # Errors
    ///
    /// Same as [`GcRoots::collect`].
    pub fn collect_by_lease(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, Vec<ResourceRef>>> {
        let mut by_lease = BTreeMap::new();
        for lease in self.leases.list(ctx, &[])? {
            let refs = self.leases.list_resources(ctx, &lease.id)?;
            by_lease.insert(lease.id, refs);
        }
        Ok(by_lease)
    }
}
