//! Canonical schema constants for structured logging
//!
//! These constants keep field names consistent between the logging macros,
//! the lease manager and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_LEASE_ID: &str = "lease_id";
pub const FIELD_RESOURCE: &str = "resource";

// Collection sizes
pub const FIELD_LEASE_COUNT: &str = "lease_count";
pub const FIELD_RESOURCE_COUNT: &str = "resource_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
