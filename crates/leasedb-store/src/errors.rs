//! Error helpers for leasedb-store
//!
//! Every engine failure becomes a `LeaseError` classified `Internal`, with
//! the original error kept as its source.

use leasedb_core::errors::{ErrorKind, LeaseError};

/// Result type alias using LeaseError
pub type Result<T> = std::result::Result<T, LeaseError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> LeaseError {
    LeaseError::new(ErrorKind::Internal)
        .with_op("sqlite")
        .with_message(err.to_string())
        .with_source(err)
}

/// Create a migration error
pub fn migration_error(migration_id: &str, err: rusqlite::Error) -> LeaseError {
    LeaseError::new(ErrorKind::Internal)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, err))
        .with_source(err)
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> LeaseError {
    LeaseError::new(ErrorKind::Internal)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a configuration error from a TOML parse failure
pub fn config_error(err: toml::de::Error) -> LeaseError {
    LeaseError::new(ErrorKind::InvalidArgument)
        .with_op("store_config")
        .with_message(err.to_string())
        .with_source(err)
}
