//! Lease manager bound to one caller-owned transaction
//!
//! ## Logging Ownership
//!
//! Every public operation owns its lifecycle events:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The `_impl` functions only use `tracing::debug!()`.
//!
//! ## Transactions
//!
//! The manager never opens, commits or aborts. Existence checks and writes
//! run against the same view, so check-then-write is atomic exactly as far
//! as the caller's transaction is. No state survives between calls.

use crate::clock;
use crate::core_types::RequestContext;
use crate::errors::{already_exists, cancelled, lease_not_found, Result};
use crate::filters::{matches_any, Filter};
use crate::ids::generate_id;
use crate::kv::{KvRead, KvWrite};
use crate::model::{Lease, LeaseOptions, ResourceRef};
use crate::rules::validation::{validate_identifier, validate_labels, validate_resource};
use crate::schema;
use crate::{log_op_end, log_op_error, log_op_start};
use std::ops::ControlFlow;
use std::time::Instant;

fn check_cancelled(ctx: &RequestContext, op: &str) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(cancelled(op));
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Lease operations over a borrowed transaction view
///
/// Read operations need `T: KvRead`; mutations need `T: KvWrite`, so a
/// manager over a read-only view cannot create or delete.
pub struct LeaseManager<'t, T: ?Sized> {
    txn: &'t T,
}

impl<'t, T: ?Sized> LeaseManager<'t, T> {
    pub fn new(txn: &'t T) -> Self {
        Self { txn }
    }
}

impl<'t, T: KvRead + ?Sized> LeaseManager<'t, T> {
    /// All visible leases in ascending id order, narrowed by `filters`
    ///
    /// An empty filter slice keeps every lease; otherwise a lease is kept
    /// when any filter matches.
    ///
    /// # Errors
    ///
    /// - `Cancelled`: the context was cancelled during enumeration
    /// - `Internal`: storage failure or undecodable record
    pub fn list(&self, ctx: &RequestContext, filters: &[Filter]) -> Result<Vec<Lease>> {
        log_op_start!("lease_list", request_id = %ctx.request_id, filters = filters.len());
        let start = Instant::now();

        let leases = self.list_impl(ctx, filters).map_err(|e| {
            log_op_error!(
                "lease_list",
                e,
                duration_ms = elapsed_ms(start),
                request_id = %ctx.request_id
            );
            e
        })?;

        log_op_end!(
            "lease_list",
            duration_ms = elapsed_ms(start),
            request_id = %ctx.request_id,
            lease_count = leases.len()
        );
        Ok(leases)
    }

    fn list_impl(&self, ctx: &RequestContext, filters: &[Filter]) -> Result<Vec<Lease>> {
        check_cancelled(ctx, "lease_list")?;

        let mut leases = Vec::new();
        let root = schema::leases_root();
        self.txn.scan_prefix(root.as_bytes(), &mut |key, value| {
            check_cancelled(ctx, "lease_list")?;
            let id = match schema::parse_lease_key(key)? {
                Some(id) => id,
                None => return Ok(ControlFlow::Continue(())),
            };
            let lease = schema::decode_lease(&id, value)?;
            if matches_any(filters, &lease) {
                leases.push(lease);
            } else {
                tracing::debug!(lease_id = %lease.id, "lease filtered out");
            }
            Ok(ControlFlow::Continue(()))
        })?;

        Ok(leases)
    }

    /// Look up a single lease
    ///
    /// # Errors
    ///
    /// - `NotFound`: no lease with this id
    /// - `InvalidArgument`: malformed id
    /// - `Internal`: storage failure or undecodable record
    pub fn get(&self, ctx: &RequestContext, id: &str) -> Result<Lease> {
        log_op_start!("lease_get", request_id = %ctx.request_id, lease_id = id);
        let start = Instant::now();

        let lease = self.get_impl(ctx, id).map_err(|e| {
            log_op_error!(
                "lease_get",
                e,
                duration_ms = elapsed_ms(start),
                lease_id = id
            );
            e
        })?;

        log_op_end!("lease_get", duration_ms = elapsed_ms(start), lease_id = id);
        Ok(lease)
    }

    fn get_impl(&self, ctx: &RequestContext, id: &str) -> Result<Lease> {
        check_cancelled(ctx, "lease_get")?;
        validate_identifier("lease id", id).map_err(|e| e.with_op("lease_get"))?;

        match self.txn.get(&schema::lease_key(id))? {
            Some(value) => Ok(schema::decode_lease(id, &value)?),
            None => Err(lease_not_found("lease_get", id)),
        }
    }

    /// Resources associated with a lease, in `(type, namespace, key)` order
    ///
    /// # Errors
    ///
    /// - `NotFound`: no lease with this id
    /// - `Cancelled`, `Internal`
    pub fn list_resources(
        &self,
        ctx: &RequestContext,
        lease_id: &str,
    ) -> Result<Vec<ResourceRef>> {
        log_op_start!(
            "lease_list_resources",
            request_id = %ctx.request_id,
            lease_id = lease_id
        );
        let start = Instant::now();

        let refs = self.list_resources_impl(ctx, lease_id).map_err(|e| {
            log_op_error!(
                "lease_list_resources",
                e,
                duration_ms = elapsed_ms(start),
                lease_id = lease_id
            );
            e
        })?;

        log_op_end!(
            "lease_list_resources",
            duration_ms = elapsed_ms(start),
            lease_id = lease_id,
            resource_count = refs.len()
        );
        Ok(refs)
    }

    fn list_resources_impl(
        &self,
        ctx: &RequestContext,
        lease_id: &str,
    ) -> Result<Vec<ResourceRef>> {
        check_cancelled(ctx, "lease_list_resources")?;
        self.require_lease("lease_list_resources", lease_id)?;

        let mut refs = Vec::new();
        self.txn
            .scan_prefix(&schema::resources_prefix(lease_id), &mut |key, _| {
                check_cancelled(ctx, "lease_list_resources")?;
                refs.push(schema::parse_resource_key(lease_id, key)?);
                Ok(ControlFlow::Continue(()))
            })?;

        Ok(refs)
    }

    fn require_lease(&self, op: &str, lease_id: &str) -> Result<()> {
        validate_identifier("lease id", lease_id).map_err(|e| e.with_op(op))?;
        if !self.txn.contains(&schema::lease_key(lease_id))? {
            return Err(lease_not_found(op, lease_id));
        }
        Ok(())
    }
}

impl<'t, T: KvWrite + ?Sized> LeaseManager<'t, T> {
    /// Create a lease
    ///
    /// The id comes from `opts.id` or is allocated. Existence is checked in
    /// this transaction's view at the time of the call.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: a lease with this id is present; nothing is written
    /// - `InvalidArgument`: malformed id or labels
    /// - `Cancelled`, `Internal`
    pub fn create(&self, ctx: &RequestContext, opts: LeaseOptions) -> Result<Lease> {
        let requested = opts.id.clone().unwrap_or_default();
        log_op_start!(
            "lease_create",
            request_id = %ctx.request_id,
            lease_id = requested.as_str()
        );
        let start = Instant::now();

        let lease = self.create_impl(ctx, opts).map_err(|e| {
            log_op_error!(
                "lease_create",
                e,
                duration_ms = elapsed_ms(start),
                lease_id = requested.as_str()
            );
            e
        })?;

        log_op_end!(
            "lease_create",
            duration_ms = elapsed_ms(start),
            lease_id = lease.id.as_str()
        );
        Ok(lease)
    }

    fn create_impl(&self, ctx: &RequestContext, opts: LeaseOptions) -> Result<Lease> {
        check_cancelled(ctx, "lease_create")?;

        let labels = opts.effective_labels();
        let id = opts.id.unwrap_or_else(generate_id);
        validate_identifier("lease id", &id).map_err(|e| e.with_op("lease_create"))?;
        validate_labels(&labels).map_err(|e| e.with_op("lease_create").with_lease_id(&id))?;

        let key = schema::lease_key(&id);
        if self.txn.contains(&key)? {
            return Err(already_exists("lease_create", &id));
        }

        let lease = Lease {
            id,
            created_at: clock::now(),
            labels,
        };
        let value = schema::encode_lease(&lease)?;
        self.txn.put(&key, &value)?;
        tracing::debug!(lease_id = %lease.id, "lease record written");

        Ok(lease)
    }

    /// Delete a lease and every resource nested under it
    ///
    /// Only `lease.id` is consulted.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no lease with this id; nothing is removed
    /// - `Cancelled`, `Internal`
    pub fn delete(&self, ctx: &RequestContext, lease: &Lease) -> Result<()> {
        let id = lease.id.as_str();
        log_op_start!("lease_delete", request_id = %ctx.request_id, lease_id = id);
        let start = Instant::now();

        let removed = self.delete_impl(ctx, id).map_err(|e| {
            log_op_error!(
                "lease_delete",
                e,
                duration_ms = elapsed_ms(start),
                lease_id = id
            );
            e
        })?;

        log_op_end!(
            "lease_delete",
            duration_ms = elapsed_ms(start),
            lease_id = id,
            resource_count = removed
        );
        Ok(())
    }

    fn delete_impl(&self, ctx: &RequestContext, id: &str) -> Result<u64> {
        check_cancelled(ctx, "lease_delete")?;
        self.require_lease("lease_delete", id)?;

        let nested = self.txn.delete_prefix(&schema::lease_prefix(id))?;
        self.txn.delete(&schema::lease_key(id))?;
        tracing::debug!(lease_id = id, nested, "lease removed");

        Ok(nested)
    }

    /// Associate a resource with a lease; adding it twice keeps one entry
    ///
    /// # Errors
    ///
    /// - `NotFound`: no lease with this id
    /// - `InvalidArgument`: malformed reference
    /// - `Cancelled`, `Internal`
    pub fn add_resource(
        &self,
        ctx: &RequestContext,
        lease_id: &str,
        resource: &ResourceRef,
    ) -> Result<()> {
        self.mutate_resource("lease_add_resource", ctx, lease_id, resource, |txn, key| {
            txn.put(key, schema::RESOURCE_MARKER)
        })
    }

    /// Drop a resource association; a missing association is not an error
    ///
    /// # Errors
    ///
    /// - `NotFound`: no lease with this id
    /// - `InvalidArgument`: malformed reference
    /// - `Cancelled`, `Internal`
    pub fn remove_resource(
        &self,
        ctx: &RequestContext,
        lease_id: &str,
        resource: &ResourceRef,
    ) -> Result<()> {
        self.mutate_resource("lease_remove_resource", ctx, lease_id, resource, |txn, key| {
            if !txn.delete(key)? {
                tracing::debug!(lease_id, "resource was not associated");
            }
            Ok(())
        })
    }

    fn mutate_resource<F>(
        &self,
        op: &'static str,
        ctx: &RequestContext,
        lease_id: &str,
        resource: &ResourceRef,
        apply: F,
    ) -> Result<()>
    where
        F: FnOnce(&T, &[u8]) -> Result<()>,
    {
        log_op_start!(
            op,
            request_id = %ctx.request_id,
            lease_id = lease_id,
            resource = %resource
        );
        let start = Instant::now();

        let result = check_cancelled(ctx, op)
            .and_then(|_| validate_resource(resource).map_err(|e| e.with_op(op)))
            .and_then(|_| self.require_lease(op, lease_id))
            .and_then(|_| apply(self.txn, &schema::resource_key(lease_id, resource)));

        match result {
            Ok(()) => {
                log_op_end!(op, duration_ms = elapsed_ms(start), lease_id = lease_id);
                Ok(())
            }
            Err(e) => {
                log_op_error!(op, e, duration_ms = elapsed_ms(start), lease_id = lease_id);
                Err(e)
            }
        }
    }
}
