//! Access patterns.
//!
//! An access pattern is a named query shape that is answered by exactly one
//! index query: an index, a partition-key equality, an optional sort-key
//! condition, an ordering and a page size. Domains declare their patterns as
//! a `const` table of [`AccessPattern`] values so the mapping can be audited
//! against entity schemas in one place.

use crate::{
    Case, Error, Result, Schema,
    key::{self, KEY_DELIMITER},
};

///
/// Index
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Index {
    Primary,
    Gsi1,
    Gsi2,
    Gsi3,
    Gsi4,
}

impl Index {
    pub const SECONDARY: [Self; 4] = [Self::Gsi1, Self::Gsi2, Self::Gsi3, Self::Gsi4];

    /// Index name as provisioned in the table; `None` for the base table.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Primary => None,
            Self::Gsi1 => Some("GSI1"),
            Self::Gsi2 => Some("GSI2"),
            Self::Gsi3 => Some("GSI3"),
            Self::Gsi4 => Some("GSI4"),
        }
    }

    #[must_use]
    pub const fn partition_attribute(self) -> &'static str {
        match self {
            Self::Primary => "pk",
            Self::Gsi1 => "GSI1PK",
            Self::Gsi2 => "GSI2PK",
            Self::Gsi3 => "GSI3PK",
            Self::Gsi4 => "GSI4PK",
        }
    }

    #[must_use]
    pub const fn sort_attribute(self) -> &'static str {
        match self {
            Self::Primary => "sk",
            Self::Gsi1 => "GSI1SK",
            Self::Gsi2 => "GSI2SK",
            Self::Gsi3 => "GSI3SK",
            Self::Gsi4 => "GSI4SK",
        }
    }
}

///
/// SegmentTemplate
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmentTemplate {
    pub label: Option<&'static str>,
    pub case: Case,
}

impl SegmentTemplate {
    #[must_use]
    pub const fn labeled(label: &'static str, case: Case) -> Self {
        Self {
            label: Some(label),
            case,
        }
    }

    #[must_use]
    pub const fn bare(case: Case) -> Self {
        Self { label: None, case }
    }
}

///
/// KeyTemplate
///
/// Renders a key value from caller-supplied values, one per segment, using
/// the same rules as the entity derive.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyTemplate {
    pub prefix: Option<&'static str>,
    pub segments: &'static [SegmentTemplate],
}

impl KeyTemplate {
    #[must_use]
    pub const fn new(segments: &'static [SegmentTemplate]) -> Self {
        Self {
            prefix: None,
            segments,
        }
    }

    #[must_use]
    pub const fn arity(&self) -> usize {
        self.segments.len()
    }

    pub fn render(&self, values: &[&str]) -> Result<String> {
        if values.len() != self.arity() {
            return Err(Error::key(format!(
                "expected {} key value(s), got {}",
                self.arity(),
                values.len()
            )));
        }

        let parts = self
            .prefix
            .map(str::to_owned)
            .into_iter()
            .chain(
                self.segments
                    .iter()
                    .zip(values)
                    .map(|(segment, value)| key::segment(segment.label, value, segment.case)),
            );

        Ok(key::join(parts))
    }

    /// Label and case of the first rendered segment.
    #[must_use]
    pub fn leading(&self) -> Option<(Option<&'static str>, Case)> {
        if let Some(prefix) = self.prefix {
            let case = self.segments.first().map_or(Case::Preserve, |s| s.case);
            return Some((Some(prefix), case));
        }

        self.segments.first().map(|s| (s.label, s.case))
    }
}

///
/// SortCondition
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortCondition {
    Any,
    Exact(KeyTemplate),
    /// Literal prefix, e.g. `STATUS#`.
    BeginsWith(&'static str),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ScanOrder {
    #[default]
    Forward,
    /// Descending sort key; newest first for time-sortable keys.
    Reverse,
}

///
/// AccessPattern
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccessPattern {
    pub name: &'static str,
    pub index: Index,
    pub partition: KeyTemplate,
    pub sort: SortCondition,
    pub order: ScanOrder,
    pub page_size: u16,
}

impl AccessPattern {
    /// Bind caller values to the pattern.
    ///
    /// `sort_values` is only consulted for [`SortCondition::Exact`].
    pub fn resolve(&self, partition_values: &[&str], sort_values: &[&str]) -> Result<KeyCondition> {
        let partition = self
            .partition
            .render(partition_values)
            .map_err(|err| Error::key(format!("{}: partition {err}", self.name)))?;

        let sort = match self.sort {
            SortCondition::Any => None,
            SortCondition::Exact(template) => Some(SortPredicate::Equals(
                template
                    .render(sort_values)
                    .map_err(|err| Error::key(format!("{}: sort {err}", self.name)))?,
            )),
            SortCondition::BeginsWith(prefix) => Some(SortPredicate::BeginsWith(prefix.to_owned())),
        };

        Ok(KeyCondition {
            pattern: self.name,
            index: self.index,
            partition,
            sort,
            order: self.order,
            limit: self.page_size,
        })
    }

    /// Check that `schema` materializes this pattern's index and that the
    /// partition template agrees with the entity's definition of it.
    pub fn audit(&self, schema: &Schema) -> Result<()> {
        let partition_attribute = self.index.partition_attribute();
        let sort_attribute = self.index.sort_attribute();

        let Some(partition_def) = schema.key_def(partition_attribute) else {
            return Err(Error::key(format!(
                "{}: {} does not write {partition_attribute}",
                self.name, schema.entity_name
            )));
        };
        if schema.key_def(sort_attribute).is_none() {
            return Err(Error::key(format!(
                "{}: {} does not write {sort_attribute}",
                self.name, schema.entity_name
            )));
        }

        if partition_def.attribute_value.leading() != self.partition.leading() {
            return Err(Error::key(format!(
                "{}: partition template disagrees with {}.{partition_attribute}",
                self.name, schema.entity_name
            )));
        }

        if let SortCondition::BeginsWith(prefix) = self.sort {
            let label = prefix.trim_end_matches(KEY_DELIMITER);
            let sort_def = schema.key_def(sort_attribute);
            let leading = sort_def
                .as_ref()
                .and_then(|def| def.attribute_value.leading())
                .and_then(|(label, _)| label);
            if leading != Some(label) {
                return Err(Error::key(format!(
                    "{}: sort prefix {prefix} never matches {}.{sort_attribute}",
                    self.name, schema.entity_name
                )));
            }
        }

        Ok(())
    }
}

///
/// KeyCondition
///
/// A resolved access pattern, ready to be sent to a store.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyCondition {
    pub pattern: &'static str,
    pub index: Index,
    pub partition: String,
    pub sort: Option<SortPredicate>,
    pub order: ScanOrder,
    pub limit: u16,
}

impl KeyCondition {
    #[must_use]
    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit.max(1);
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SortPredicate {
    Equals(String),
    BeginsWith(String),
}

impl SortPredicate {
    #[must_use]
    pub fn matches(&self, sort_value: &str) -> bool {
        match self {
            Self::Equals(value) => sort_value == value,
            Self::BeginsWith(prefix) => sort_value.starts_with(prefix.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeValue, CompositeAttributeValue, KeyDef, Segment};

    const BY_MANAGER: AccessPattern = AccessPattern {
        name: "orders_by_manager",
        index: Index::Gsi1,
        partition: KeyTemplate::new(&[SegmentTemplate::labeled("PM", Case::Lower)]),
        sort: SortCondition::BeginsWith("STATUS#"),
        order: ScanOrder::Forward,
        page_size: 25,
    };

    const EXACT: AccessPattern = AccessPattern {
        name: "exact",
        index: Index::Primary,
        partition: KeyTemplate::new(&[SegmentTemplate::labeled("WO", Case::Preserve)]),
        sort: SortCondition::Exact(KeyTemplate::new(&[SegmentTemplate::labeled(
            "STATUS",
            Case::Preserve,
        )])),
        order: ScanOrder::Reverse,
        page_size: 5,
    };

    fn composite(prefix: Option<&str>, label: &str, case: Case) -> CompositeAttributeValue {
        CompositeAttributeValue {
            segments: vec![Segment {
                struct_field_name: "field".to_owned(),
                prefix: Some(label.to_owned()),
                case,
            }],
            prefix: prefix.map(str::to_owned),
            suffix: None,
        }
    }

    fn order_schema(case: Case) -> Schema {
        Schema {
            entity_name: "Order".to_owned(),
            partition_key_def: KeyDef {
                attribute_name: "pk".to_owned(),
                attribute_value: composite(None, "WO", Case::Preserve),
            },
            sort_key_def: KeyDef {
                attribute_name: "sk".to_owned(),
                attribute_value: AttributeValue::Composite(composite(
                    None,
                    "STATUS",
                    Case::Preserve,
                )),
            },
            non_key_defs: vec![
                KeyDef {
                    attribute_name: "GSI1PK".to_owned(),
                    attribute_value: AttributeValue::Composite(composite(None, "PM", case)),
                },
                KeyDef {
                    attribute_name: "GSI1SK".to_owned(),
                    attribute_value: AttributeValue::Composite(composite(
                        None,
                        "STATUS",
                        Case::Preserve,
                    )),
                },
            ],
        }
    }

    #[test]
    fn index_attribute_names() {
        assert_eq!(Index::Primary.partition_attribute(), "pk");
        assert_eq!(Index::Primary.sort_attribute(), "sk");
        assert_eq!(Index::Primary.name(), None);
        assert_eq!(Index::Gsi3.name(), Some("GSI3"));
        assert_eq!(Index::Gsi3.partition_attribute(), "GSI3PK");
        assert_eq!(Index::Gsi4.sort_attribute(), "GSI4SK");
    }

    #[test]
    fn resolve_normalizes_partition_value() {
        let condition = BY_MANAGER.resolve(&["PM@Example.com"], &[]).unwrap();
        assert_eq!(condition.index, Index::Gsi1);
        assert_eq!(condition.partition, "PM#pm@example.com");
        assert_eq!(
            condition.sort,
            Some(SortPredicate::BeginsWith("STATUS#".to_owned()))
        );
        assert_eq!(condition.limit, 25);
    }

    #[test]
    fn resolve_exact_sort() {
        let condition = EXACT.resolve(&["abc123"], &["TO_DO"]).unwrap();
        assert_eq!(condition.partition, "WO#abc123");
        assert_eq!(
            condition.sort,
            Some(SortPredicate::Equals("STATUS#TO_DO".to_owned()))
        );
        assert_eq!(condition.order, ScanOrder::Reverse);
    }

    #[test]
    fn resolve_rejects_wrong_arity() {
        assert!(matches!(BY_MANAGER.resolve(&[], &[]), Err(Error::Key(_))));
        assert!(matches!(EXACT.resolve(&["a"], &[]), Err(Error::Key(_))));

        const SINGLE: KeyTemplate = KeyTemplate::new(&[SegmentTemplate::bare(Case::Preserve)]);
        assert_eq!(SINGLE.arity(), 1);
        assert!(SINGLE.render(&["a", "b"]).is_err());
    }

    #[test]
    fn template_with_struct_prefix() {
        const TEMPLATE: KeyTemplate = KeyTemplate {
            prefix: Some("ORG"),
            segments: &[SegmentTemplate::bare(Case::Preserve)],
        };
        assert_eq!(TEMPLATE.render(&["42"]).unwrap(), "ORG#42");
        assert_eq!(TEMPLATE.leading(), Some((Some("ORG"), Case::Preserve)));
    }

    #[test]
    fn with_limit_never_zero() {
        let condition = BY_MANAGER.resolve(&["a"], &[]).unwrap().with_limit(0);
        assert_eq!(condition.limit, 1);
    }

    #[test]
    fn sort_predicate_matching() {
        assert!(SortPredicate::BeginsWith("STATUS#".into()).matches("STATUS#TO_DO"));
        assert!(!SortPredicate::BeginsWith("STATUS#".into()).matches("TENANT#a"));
        assert!(SortPredicate::Equals("x".into()).matches("x"));
    }

    #[test]
    fn audit_accepts_matching_schema() {
        BY_MANAGER.audit(&order_schema(Case::Lower)).unwrap();
    }

    #[test]
    fn audit_rejects_case_drift() {
        assert!(BY_MANAGER.audit(&order_schema(Case::Preserve)).is_err());
    }

    #[test]
    fn audit_rejects_missing_index() {
        let mut schema = order_schema(Case::Lower);
        schema.non_key_defs.clear();
        assert!(BY_MANAGER.audit(&schema).is_err());
    }

    #[test]
    fn schema_lists_indexes() {
        assert_eq!(order_schema(Case::Lower).indexes(), vec![Index::Gsi1]);
    }
}
