use super::SCHEMA_VERSION;
use crate::errors::CodecError;
use crate::model::ResourceRef;

const SEP: char = '/';
const RESOURCES: &str = "resources";

fn utf8(key: &[u8]) -> Result<&str, CodecError> {
    std::str::from_utf8(key).map_err(|_| CodecError::Key {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: "not valid UTF-8",
    })
}

/// `leases/v1/`, the prefix of every lease key
pub fn leases_root() -> String {
    format!("leases{SEP}v{SCHEMA_VERSION}{SEP}")
}

/// `leases/v1/<id>`
pub fn lease_key(id: &str) -> Vec<u8> {
    format!("{}{}", leases_root(), id).into_bytes()
}

/// `leases/v1/<id>/`, the prefix of everything nested under one lease
pub fn lease_prefix(id: &str) -> Vec<u8> {
    format!("{}{}{SEP}", leases_root(), id).into_bytes()
}

/// `leases/v1/<id>/resources/`
pub fn resources_prefix(id: &str) -> Vec<u8> {
    format!("{}{}{SEP}{RESOURCES}{SEP}", leases_root(), id).into_bytes()
}

/// `leases/v1/<id>/resources/<type>/<namespace>/<key>`
pub fn resource_key(id: &str, r: &ResourceRef) -> Vec<u8> {
    let mut key = resources_prefix(id);
    key.extend_from_slice(
        format!("{}{SEP}{}{SEP}{}", r.resource_type, r.namespace, r.key).as_bytes(),
    );
    key
}

/// Lease id of a record key, or `None` for keys nested below a lease
///
/// # Errors
///
/// [`CodecError::Key`] for keys outside `leases/v1/`, non-UTF-8 keys and
/// an empty id.
pub fn parse_lease_key(key: &[u8]) -> Result<Option<String>, CodecError> {
    let key = utf8(key)?;
    let rest = key.strip_prefix(&leases_root()).ok_or(CodecError::Key {
        key: key.to_string(),
        reason: "outside the lease namespace",
    })?;
    if rest.is_empty() {
        return Err(CodecError::Key {
            key: key.to_string(),
            reason: "empty lease id",
        });
    }
    if rest.contains(SEP) {
        return Ok(None);
    }
    Ok(Some(rest.to_string()))
}

/// Decode a resource key belonging to lease `id`
///
/// # Errors
///
/// [`CodecError::Key`] when the key is not under this lease's resources
/// or lacks one of the three components.
pub fn parse_resource_key(id: &str, key: &[u8]) -> Result<ResourceRef, CodecError> {
    let prefix = resources_prefix(id);
    let rest = key.strip_prefix(prefix.as_slice()).ok_or_else(|| CodecError::Key {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: "not a resource of this lease",
    })?;
    let rest = utf8(rest)?;

    let mut parts = rest.splitn(3, SEP);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(t), Some(ns), Some(k)) if !t.is_empty() && !ns.is_empty() && !k.is_empty() => {
            Ok(ResourceRef::new(t, ns, k))
        }
        _ => Err(CodecError::Key {
            key: String::from_utf8_lossy(key).into_owned(),
            reason: "expected <type>/<namespace>/<key>",
        }),
    }
}
