//! Core types shared across leasedb facilities
//!
//! This crate provides foundational types used by the error, logging and
//! lease facilities:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Cancellation**: CancelToken carried inside RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod cancel;
pub mod correlation;
pub mod schema;

pub use cancel::CancelToken;
pub use correlation::{RequestContext, RequestId, TraceId};
