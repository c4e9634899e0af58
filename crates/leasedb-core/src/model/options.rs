use super::lease::{format_timestamp, LABEL_GC_EXPIRE};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// How a lease is created
///
/// Defaults: no explicit ID (one is allocated), no labels, no expiry.
///
/// ```
/// use leasedb_core::model::LeaseOptions;
///
/// let opts = LeaseOptions::new()
///     .with_id("pull-alpine")
///     .with_label("owner", "ctr");
/// assert_eq!(opts.id.as_deref(), Some("pull-alpine"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaseOptions {
    /// Explicit identifier; allocated when `None`
    pub id: Option<String>,
    pub labels: BTreeMap<String, String>,
    /// Expiry hint for an external reaper; never enforced by the manager
    pub expires_at: Option<DateTime<Utc>>,
}

impl LeaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the whole label set
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Label set as it will be persisted, expiry folded in
    pub fn effective_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.labels.clone();
        if let Some(at) = &self.expires_at {
            labels.insert(LABEL_GC_EXPIRE.to_string(), format_timestamp(at));
        }
        labels
    }
}
