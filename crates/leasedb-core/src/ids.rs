//! Default lease identifier allocation
//!
//! IDs are UUIDv7 values in simple form: 32 lowercase hex digits, the first
//! twelve of which encode the creation millisecond. They sort roughly by
//! creation time, need no shared counter, and never contain a key separator.
//! Collisions are still caught by the manager's existence check.

use uuid::Uuid;

/// Generate a fresh lease identifier
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}
