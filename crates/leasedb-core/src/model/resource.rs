use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource type for content blobs
pub const RESOURCE_CONTENT: &str = "content";
/// Resource type for ingest (in-flight write) references
pub const RESOURCE_INGEST: &str = "ingests";

/// Identifies a garbage-collectable object owned by an external store
///
/// Ordered by `(resource_type, namespace, key)`, which is also the order
/// references are stored under a lease.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: String,
    pub namespace: String,
    pub key: String,
}

impl ResourceRef {
    pub fn new(
        resource_type: impl Into<String>,
        namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    pub fn content(namespace: impl Into<String>, digest: impl Into<String>) -> Self {
        Self::new(RESOURCE_CONTENT, namespace, digest)
    }

    /// In-flight content write, keyed by its ingest reference
    pub fn ingest(namespace: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::new(RESOURCE_INGEST, namespace, reference)
    }

    /// Snapshot reference; the snapshotter name becomes part of the type
    pub fn snapshot(
        snapshotter: &str,
        namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::new(format!("snapshots.{}", snapshotter), namespace, key)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.resource_type, self.namespace, self.key)
    }
}
