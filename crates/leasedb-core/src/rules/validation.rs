use crate::errors::{invalid_argument, Result};
use crate::model::ResourceRef;
use std::collections::BTreeMap;

/// Longest identifier accepted for lease ids, resource types and namespaces
pub const MAX_IDENTIFIER_LEN: usize = 76;

/// Upper bound on `len(key) + len(value)` for a single label
pub const MAX_LABEL_LEN: usize = 4096;

/// Validate an identifier used as a key path component
///
/// Accepted: ASCII alphanumeric runs joined by a single `.`, `_` or `-`,
/// starting and ending alphanumeric, at most [`MAX_IDENTIFIER_LEN`] bytes.
/// The key separator `/` can therefore never appear.
///
/// # Errors
///
/// `InvalidArgument` naming `what` and the offending character.
pub fn validate_identifier(what: &str, s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(invalid_argument(
            "validate",
            format!("{} must not be empty", what),
        ));
    }
    if s.len() > MAX_IDENTIFIER_LEN {
        return Err(invalid_argument(
            "validate",
            format!(
                "{} {:?} longer than {} characters",
                what, s, MAX_IDENTIFIER_LEN
            ),
        ));
    }

    let mut prev_sep = true; // rejects a leading separator
    for c in s.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => prev_sep = false,
            '.' | '_' | '-' if !prev_sep => prev_sep = true,
            _ => {
                return Err(invalid_argument(
                    "validate",
                    format!("{} {:?} contains invalid character {:?}", what, s, c),
                ))
            }
        }
    }
    if prev_sep {
        return Err(invalid_argument(
            "validate",
            format!("{} {:?} must end with an alphanumeric character", what, s),
        ));
    }

    Ok(())
}

/// Validate a label set
///
/// # Errors
///
/// `InvalidArgument` for an empty key or an oversized label.
pub fn validate_labels(labels: &BTreeMap<String, String>) -> Result<()> {
    for (key, value) in labels {
        if key.is_empty() {
            return Err(invalid_argument("validate", "label key must not be empty"));
        }
        if key.len() + value.len() > MAX_LABEL_LEN {
            return Err(invalid_argument(
                "validate",
                format!("label {:?} exceeds {} bytes", key, MAX_LABEL_LEN),
            ));
        }
    }
    Ok(())
}

/// Validate a resource reference before it is encoded into a key
///
/// The key is the final path component, so it may contain `/`.
///
/// # Errors
///
/// `InvalidArgument` for a malformed type or namespace, or an empty key.
pub fn validate_resource(r: &ResourceRef) -> Result<()> {
    validate_identifier("resource type", &r.resource_type)?;
    validate_identifier("resource namespace", &r.namespace)?;
    if r.key.is_empty() {
        return Err(invalid_argument("validate", "resource key must not be empty"));
    }
    if r.key.contains('\0') {
        return Err(invalid_argument(
            "validate",
            format!("resource key {:?} contains NUL", r.key),
        ));
    }
    Ok(())
}
