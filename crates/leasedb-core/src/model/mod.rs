pub mod lease;
pub mod options;
pub mod resource;

pub use lease::{format_timestamp, Lease, LABEL_GC_EXPIRE};
pub use options::LeaseOptions;
pub use resource::ResourceRef;
