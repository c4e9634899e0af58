pub mod validation;

pub use validation::{validate_identifier, validate_labels, validate_resource};
