use std::sync::Arc;
use thiserror::Error;

/// Result type alias using LeaseError
pub type Result<T> = std::result::Result<T, LeaseError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This is the only classification surfaced to callers. Use
/// [`LeaseError::kind`] to branch on it; never match on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A lease with the requested ID is already present
    AlreadyExists,
    /// The lease named by the operation does not exist
    NotFound,
    /// Malformed identifier, label or resource reference
    InvalidArgument,
    /// Storage engine failure, undecodable record or unsupported schema version
    Internal,
    /// The request context was cancelled before the operation finished
    Cancelled,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ErrorKind::Internal => "ERR_INTERNAL",
            ErrorKind::Cancelled => "ERR_CANCELLED",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification, the operation that failed, the lease it was
/// acting on and, when the failure came from a lower layer, the original
/// cause (reachable through [`std::error::Error::source`]).
#[derive(Debug, Clone)]
pub struct LeaseError {
    kind: ErrorKind,
    op: Option<String>,
    lease_id: Option<String>,
    message: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl LeaseError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            lease_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add lease ID context
    pub fn with_lease_id(mut self, id: impl Into<String>) -> Self {
        self.lease_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the underlying cause
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn lease_id(&self) -> Option<&str> {
        self.lease_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == ErrorKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl std::fmt::Display for LeaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(lease_id) = &self.lease_id {
            write!(f, " (lease_id: {})", lease_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for LeaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Failures while encoding or decoding the durable lease layout
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unsupported lease record schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("malformed lease record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("malformed timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("malformed key {key:?}: {reason}")]
    Key { key: String, reason: &'static str },
}

impl From<CodecError> for LeaseError {
    fn from(err: CodecError) -> Self {
        LeaseError::new(ErrorKind::Internal)
            .with_op("decode")
            .with_message(err.to_string())
            .with_source(err)
    }
}

/// Shorthand constructors used across the lease facility
pub fn already_exists(op: &str, lease_id: &str) -> LeaseError {
    LeaseError::new(ErrorKind::AlreadyExists)
        .with_op(op)
        .with_lease_id(lease_id)
        .with_message(format!("lease {:?} already exists", lease_id))
}

pub fn lease_not_found(op: &str, lease_id: &str) -> LeaseError {
    LeaseError::new(ErrorKind::NotFound)
        .with_op(op)
        .with_lease_id(lease_id)
        .with_message(format!("lease {:?} not found", lease_id))
}

pub fn invalid_argument(op: &str, reason: impl Into<String>) -> LeaseError {
    LeaseError::new(ErrorKind::InvalidArgument)
        .with_op(op)
        .with_message(reason)
}

pub fn cancelled(op: &str) -> LeaseError {
    LeaseError::new(ErrorKind::Cancelled)
        .with_op(op)
        .with_message("request context cancelled")
}
