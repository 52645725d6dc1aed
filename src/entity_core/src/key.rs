//! Key composition.
//!
//! Every key attribute in the table is a list of segments joined with
//! [`KEY_DELIMITER`]. A segment is either a bare value or `LABEL#value`.
//! The delimiter, the segment order and the case rules are part of the
//! stored data format: changing any of them orphans existing items.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub const KEY_DELIMITER: char = '#';

/// Case normalization applied to a segment value before it is joined.
///
/// Labels are literals and never normalized.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Case {
    #[default]
    Preserve,
    Lower,
    Upper,
}

impl Case {
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        match self {
            Self::Preserve => raw.to_owned(),
            Self::Lower => raw.to_lowercase(),
            Self::Upper => raw.to_uppercase(),
        }
    }
}

/// Render one segment. Empty values are kept as empty segments.
#[must_use]
pub fn segment(label: Option<&str>, value: impl Display, case: Case) -> String {
    let value = case.apply(&value.to_string());
    if value.is_empty() {
        tracing::debug!(label = label.unwrap_or_default(), "empty key segment");
    }

    match label {
        Some(label) => format!("{label}{KEY_DELIMITER}{value}"),
        None => value,
    }
}

/// Join rendered parts in order.
#[must_use]
pub fn join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(KEY_DELIMITER);
        }
        out.push_str(part.as_ref());
    }

    out
}

/// Collect rendered key attributes into an item. Attributes without a
/// value are left out, which keeps the item out of that index.
#[must_use]
pub fn attributes<I>(pairs: I) -> crate::Item
where
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    pairs
        .into_iter()
        .filter_map(|(name, value)| Some((name.to_owned(), serde_json::Value::String(value?))))
        .collect()
}

///
/// PrimaryKey
///
/// Exact table key of one item.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PrimaryKey {
    pub pk: String,
    pub sk: String,
}

impl PrimaryKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.pk, self.sk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_applies_case_to_value_only() {
        assert_eq!(segment(Some("PM"), "Pm@Example.COM", Case::Lower), "PM#pm@example.com");
        assert_eq!(segment(Some("city"), "Boston", Case::Upper), "city#BOSTON");
        assert_eq!(segment(None, "abc123", Case::Preserve), "abc123");
    }

    #[test]
    fn empty_values_keep_their_segment() {
        let key = join([
            segment(Some("POSTAL"), "02101", Case::Upper),
            segment(Some("UNIT"), "", Case::Upper),
        ]);
        assert_eq!(key, "POSTAL#02101#UNIT#");
    }

    #[test]
    fn join_keeps_order() {
        assert_eq!(join(["WO", "abc123"]), "WO#abc123");
        assert_eq!(join(["b", "a", "c"]), "b#a#c");
        assert_eq!(join(Vec::<String>::new()), "");
    }

    #[test]
    fn attributes_skip_missing_values() {
        let item = attributes([
            ("pk", Some("WO#1".to_owned())),
            ("GSI2PK", None),
            ("GSI2SK", Some("STATUS#TO_DO".to_owned())),
        ]);
        assert_eq!(item.len(), 2);
        assert!(!item.contains_key("GSI2PK"));
        assert_eq!(item["pk"], "WO#1");
    }

    #[test]
    fn differing_case_collides_after_upper() {
        let a = segment(Some("CITY"), "new york", Case::Upper);
        let b = segment(Some("CITY"), "New York", Case::Upper);
        assert_eq!(a, b);
    }
}
