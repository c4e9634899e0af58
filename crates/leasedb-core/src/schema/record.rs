use super::SCHEMA_VERSION;
use crate::errors::CodecError;
use crate::model::{format_timestamp, Lease};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value stored under a resource key; only its presence matters
pub const RESOURCE_MARKER: &[u8] = b"";

/// Stored form of a lease (the id lives in the key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub version: u32,
    /// RFC-3339 with nanoseconds, UTC
    pub created_at: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Encode the stored form of `lease`
///
/// # Errors
///
/// [`CodecError::Record`] if serialization fails.
pub fn encode_lease(lease: &Lease) -> Result<Vec<u8>, CodecError> {
    let record = LeaseRecord {
        version: SCHEMA_VERSION,
        created_at: format_timestamp(&lease.created_at),
        labels: lease.labels.clone(),
    };
    Ok(serde_json::to_vec(&record)?)
}

/// Decode a record; any version other than [`SCHEMA_VERSION`] is refused
///
/// # Errors
///
/// - [`CodecError::UnsupportedVersion`] for any other layout version
/// - [`CodecError::Record`] for malformed JSON
/// - [`CodecError::Timestamp`] for an unparsable `created_at`
pub fn decode_lease(id: &str, bytes: &[u8]) -> Result<Lease, CodecError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)?;
    if probe.version != SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: probe.version,
            expected: SCHEMA_VERSION,
        });
    }

    let record: LeaseRecord = serde_json::from_slice(bytes)?;
    let created_at = DateTime::parse_from_rfc3339(&record.created_at)
        .map_err(|source| CodecError::Timestamp {
            value: record.created_at.clone(),
            source,
        })?
        .with_timezone(&Utc);

    Ok(Lease {
        id: id.to_string(),
        created_at,
        labels: record.labels,
    })
}
