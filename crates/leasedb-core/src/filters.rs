//! Label and id filters applied by `LeaseManager::list`
//!
//! A [`Filter`] is a conjunction of predicates. `list` keeps a lease when the
//! filter slice is empty or any one filter matches. Filters run against
//! decoded records; there is no label index.
//!
//! Compact syntax accepted by [`Filter::parse`]:
//!
//! ```text
//! id==tx1
//! labels.owner==ctr
//! labels."containerd.io/gc.expire"
//! labels.owner==ctr,labels.stage
//! ```

use crate::errors::{invalid_argument, Result};
use crate::model::Lease;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IdEquals(String),
    LabelEquals { key: String, value: String },
    LabelPresent(String),
}

impl Predicate {
    pub fn matches(&self, lease: &Lease) -> bool {
        match self {
            Predicate::IdEquals(id) => lease.id == *id,
            Predicate::LabelEquals { key, value } => lease.label(key) == Some(value.as_str()),
            Predicate::LabelPresent(key) => lease.labels.contains_key(key),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new().and(Predicate::IdEquals(id.into()))
    }

    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().and(Predicate::LabelEquals {
            key: key.into(),
            value: value.into(),
        })
    }

    pub fn has_label(key: impl Into<String>) -> Self {
        Self::new().and(Predicate::LabelPresent(key.into()))
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// An empty filter matches every lease
    pub fn matches(&self, lease: &Lease) -> bool {
        self.predicates.iter().all(|p| p.matches(lease))
    }

    /// Parse the compact `field==value,field` syntax
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty predicate, an unknown field,
    /// an empty label key or unbalanced quotes.
    pub fn parse(input: &str) -> Result<Self> {
        let mut filter = Filter::new();
        for part in split_unquoted(input, ',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid_argument(
                    "filter_parse",
                    format!("empty predicate in filter {:?}", input),
                ));
            }
            filter = filter.and(parse_predicate(part)?);
        }
        Ok(filter)
    }
}

/// Whether `lease` passes a filter list (OR of filters, empty = all)
pub fn matches_any(filters: &[Filter], lease: &Lease) -> bool {
    filters.is_empty() || filters.iter().any(|f| f.matches(lease))
}

fn parse_predicate(s: &str) -> Result<Predicate> {
    let (field, value) = match find_unquoted(s, "==") {
        Some(at) => (s[..at].trim(), Some(unquote(s[at + 2..].trim())?)),
        None => (s, None),
    };

    if field == "id" {
        return match value {
            Some(id) => Ok(Predicate::IdEquals(id)),
            None => Err(invalid_argument(
                "filter_parse",
                "id predicate requires a value",
            )),
        };
    }

    let key = match field.strip_prefix("labels.") {
        Some(raw) => unquote(raw)?,
        None => {
            return Err(invalid_argument(
                "filter_parse",
                format!("unknown filter field {:?}", field),
            ))
        }
    };
    if key.is_empty() {
        return Err(invalid_argument("filter_parse", "label key must not be empty"));
    }

    Ok(match value {
        Some(value) => Predicate::LabelEquals { key, value },
        None => Predicate::LabelPresent(key),
    })
}

fn unquote(s: &str) -> Result<String> {
    let inner = match s.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').ok_or_else(|| {
            invalid_argument("filter_parse", format!("unterminated quote in {:?}", s))
        })?,
        None => s,
    };
    if inner.contains('"') {
        return Err(invalid_argument(
            "filter_parse",
            format!("unexpected quote in {:?}", s),
        ));
    }
    Ok(inner.to_string())
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn find_unquoted(s: &str, needle: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes && s[i..].starts_with(needle) {
            return Some(i);
        }
    }
    None
}
