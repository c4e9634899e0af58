//! Durable lease layout
//!
//! ```text
//! leases/v1/<ID>                                      -> LeaseRecord (JSON)
//! leases/v1/<ID>/resources/<Type>/<Namespace>/<Key>   -> empty marker
//! ```
//!
//! Lease ids never contain `/`, so a key directly under `leases/v1/` with no
//! further separator is a lease record and everything deeper belongs to that
//! lease. Bytewise key order is therefore ascending lease id order.

pub mod keys;
pub mod record;

/// Layout version written into keys and records
pub const SCHEMA_VERSION: u32 = 1;

pub use keys::{
    lease_key, lease_prefix, leases_root, parse_lease_key, parse_resource_key, resource_key,
    resources_prefix,
};
pub use record::{decode_lease, encode_lease, LeaseRecord, RESOURCE_MARKER};
