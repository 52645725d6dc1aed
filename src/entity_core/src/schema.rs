use crate::{Case, access::Index};

///
/// Schema
///
/// Static description of how an entity composes its key attributes.
/// Produced by `#[derive(Entity)]`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    pub entity_name: String,
    pub partition_key_def: KeyDef<CompositeAttributeValue>,
    pub sort_key_def: KeyDef<AttributeValue>,
    pub non_key_defs: Vec<KeyDef<AttributeValue>>,
}

impl Schema {
    /// Find the definition of a key or non-key attribute by its item name.
    #[must_use]
    pub fn key_def(&self, attribute_name: &str) -> Option<KeyDef<AttributeValue>> {
        if self.partition_key_def.attribute_name == attribute_name {
            return Some(KeyDef {
                attribute_name: attribute_name.to_owned(),
                attribute_value: AttributeValue::Composite(
                    self.partition_key_def.attribute_value.clone(),
                ),
            });
        }
        if self.sort_key_def.attribute_name == attribute_name {
            return Some(self.sort_key_def.clone());
        }

        self.non_key_defs
            .iter()
            .find(|def| def.attribute_name == attribute_name)
            .cloned()
    }

    /// Secondary indexes this entity projects itself into.
    #[must_use]
    pub fn indexes(&self) -> Vec<Index> {
        Index::SECONDARY
            .into_iter()
            .filter(|index| {
                self.key_def(index.partition_attribute()).is_some()
                    && self.key_def(index.sort_attribute()).is_some()
            })
            .collect()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyDef<V> {
    pub attribute_name: String,
    pub attribute_value: V,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttributeValue {
    Static(String),
    Composite(CompositeAttributeValue),
}

impl AttributeValue {
    /// Label and case of the first rendered segment.
    #[must_use]
    pub fn leading(&self) -> Option<(Option<&str>, Case)> {
        match self {
            Self::Static(value) => Some((Some(value.as_str()), Case::Preserve)),
            Self::Composite(composite) => composite.leading(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompositeAttributeValue {
    pub segments: Vec<Segment>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl CompositeAttributeValue {
    /// Label and case of the first rendered segment. A struct-level prefix
    /// renders as its own segment and therefore wins.
    #[must_use]
    pub fn leading(&self) -> Option<(Option<&str>, Case)> {
        if let Some(prefix) = &self.prefix {
            let case = self.segments.first().map_or(Case::Preserve, |s| s.case);
            return Some((Some(prefix.as_str()), case));
        }

        self.segments
            .first()
            .map(|segment| (segment.prefix.as_deref(), segment.case))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segment {
    pub struct_field_name: String,
    pub prefix: Option<String>,
    pub case: Case,
}
