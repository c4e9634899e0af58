//! Canonical logging macros
//!
//! Each lease operation emits exactly one start event and exactly one of
//! end / end_error.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use leasedb_core::log_op_start;
/// log_op_start!("lease_create");
/// log_op_start!("lease_create", lease_id = "tx1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use leasedb_core::log_op_end;
/// log_op_end!("lease_create", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// `$err` must be a `LeaseError` (or a reference to one).
///
/// # Example
///
/// ```
/// # use leasedb_core::log_op_error;
/// # use leasedb_core::errors::lease_not_found;
/// let err = lease_not_found("lease_delete", "tx1");
/// log_op_error!("lease_delete", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let lease_err: &$crate::errors::LeaseError = &$err;
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?lease_err.kind(),
            err.code = lease_err.code(),
            error = %lease_err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let lease_err: &$crate::errors::LeaseError = &$err;
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?lease_err.kind(),
            err.code = lease_err.code(),
            error = %lease_err,
            $($field)*
        );
    }};
}
