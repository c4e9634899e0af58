//! leasedb core - transactional lease facility
//!
//! Issues, enumerates and revokes leases: named, timestamped tokens that pin
//! content-addressable resources against garbage collection. All work runs
//! inside a transaction the caller opened on a [`kv`] implementation.
//!
//! - Lease manager (create/list/get/delete, resource association)
//! - Versioned bucket/key layout codec
//! - Default id allocation and identifier validation
//! - Label filters
//! - GC root view over all live leases
//! - Error and logging facilities

pub mod clock;
pub mod errors;
pub mod filters;
pub mod gc;
pub mod ids;
pub mod kv;
pub mod logging_facility;
pub mod manager;
pub mod model;
pub mod rules;
pub mod schema;

pub use leasedb_core_types as core_types;

// Re-export commonly used types
pub use core_types::{CancelToken, RequestContext};
pub use errors::{ErrorKind, LeaseError, Result};
pub use filters::{Filter, Predicate};
pub use gc::GcRoots;
pub use kv::{KvRead, KvWrite};
pub use manager::LeaseManager;
pub use model::{Lease, LeaseOptions, ResourceRef};
