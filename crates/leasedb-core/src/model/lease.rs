use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label carrying the optional expiry hint consumed by an external reaper
pub const LABEL_GC_EXPIRE: &str = "containerd.io/gc.expire";

/// A named, timestamped token pinning resources against garbage collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub labels: BTreeMap<String, String>,
}

impl Lease {
    /// A lease value that only names an ID, e.g. for `delete`
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: DateTime::<Utc>::default(),
            labels: BTreeMap::new(),
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Expiry hint recorded at creation, if present and well formed
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.label(LABEL_GC_EXPIRE)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    /// Whether the expiry hint lies at or before `now`
    ///
    /// Leases without a hint never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Render a timestamp the way lease records and labels store it
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
