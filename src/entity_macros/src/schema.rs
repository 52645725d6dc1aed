use crate::parser::{CaseDef, KeyKind, RawEntity, RawField, RawFieldKeyDef, RawStructKeyDef};
use proc_macro2::Span;
use std::collections::BTreeSet;
use syn::{Error, Ident, Type};

const DEFAULT_PK_NAME: &str = "pk";
const DEFAULT_SK_NAME: &str = "sk";

///
/// EntityModel
///
/// Validated key layout of one struct, ready for code generation.
///

#[derive(Debug)]
pub struct EntityModel {
    pub partition: KeyModel<CompositeModel>,
    pub sort: KeyModel<ValueModel>,
    pub non_keys: Vec<KeyModel<ValueModel>>,
    pub fields: Vec<RawField>,
}

impl EntityModel {
    /// Fields read by the partition and sort key, first use first.
    pub fn primary_key_fields(&self) -> Vec<&Ident> {
        let mut seen = BTreeSet::new();
        let sort_segments = match &self.sort.value {
            ValueModel::Static(_) => &[][..],
            ValueModel::Composite(composite) => &composite.segments[..],
        };

        self.partition
            .value
            .segments
            .iter()
            .chain(sort_segments)
            .map(|segment| &segment.field)
            .filter(|field| seen.insert(field.to_string()))
            .collect()
    }

    pub fn field_type(&self, field: &Ident) -> Option<&Type> {
        self.fields
            .iter()
            .find(|raw| raw.ident == *field)
            .map(|raw| &raw.ty)
    }
}

#[derive(Debug)]
pub struct KeyModel<V> {
    pub attribute_name: String,
    pub value: V,
}

#[derive(Debug)]
pub enum ValueModel {
    Static(String),
    Composite(CompositeModel),
}

#[derive(Debug, Default)]
pub struct CompositeModel {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub segments: Vec<SegmentModel>,
}

impl CompositeModel {
    pub fn is_sparse(&self) -> bool {
        self.segments.iter().any(|segment| segment.optional)
    }

    fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.suffix.is_none() && self.segments.is_empty()
    }
}

#[derive(Debug)]
pub struct SegmentModel {
    pub field: Ident,
    pub prefix: Option<String>,
    pub case: CaseDef,
    pub optional: bool,
}

fn combine(errors: &mut Option<Error>, err: Error) {
    match errors {
        Some(all) => all.combine(err),
        None => *errors = Some(err),
    }
}

fn single_struct_def(
    defs: &[RawStructKeyDef],
    kind: KeyKind,
) -> Result<Option<&RawStructKeyDef>, Error> {
    let mut matching = defs.iter().filter(|def| def.kind == kind);
    let first = matching.next();
    if let Some(dup) = matching.next() {
        return Err(Error::new(
            dup.span,
            format!("duplicate struct-level `#[{}]`", kind.ident()),
        ));
    }

    Ok(first)
}

/// Order the segments of one attribute. Several contributing fields must
/// each carry a distinct `order`.
fn ordered_segments(
    defs: &[&RawFieldKeyDef],
    attribute_name: &str,
) -> Result<Vec<SegmentModel>, Error> {
    if defs.len() > 1 {
        let mut diagnostic: Option<Error> = None;
        let mut orders = BTreeSet::new();
        for def in defs {
            match def.order {
                None => combine(
                    &mut diagnostic,
                    Error::new(
                        def.span,
                        format!(
                            "`{attribute_name}` is built from several fields; this `#[{}]` needs an `order`",
                            def.kind.ident()
                        ),
                    ),
                ),
                Some(order) if !orders.insert(order) => combine(
                    &mut diagnostic,
                    Error::new(
                        def.span,
                        format!("duplicate `order = {order}` in `{attribute_name}`"),
                    ),
                ),
                Some(_) => {}
            }
        }
        if let Some(err) = diagnostic {
            return Err(err);
        }
    }

    let mut sorted = defs.to_vec();
    sorted.sort_by_key(|def| def.order.unwrap_or_default());

    Ok(sorted
        .into_iter()
        .map(|def| SegmentModel {
            field: def.field_name.clone(),
            prefix: def.prefix.clone(),
            case: def.case,
            optional: def.optional,
        })
        .collect())
}

fn reject_optional(defs: &[&RawFieldKeyDef]) -> Result<(), Error> {
    let mut errors = None;
    for def in defs.iter().filter(|def| def.optional) {
        combine(
            &mut errors,
            Error::new(
                def.span,
                format!(
                    "`{}` is optional; only `#[nk]` attributes may be sparse",
                    def.field_name
                ),
            ),
        );
    }

    errors.map_or(Ok(()), Err)
}

fn build_partition(raw: &RawEntity) -> Result<KeyModel<CompositeModel>, Error> {
    let header = single_struct_def(&raw.struct_defs, KeyKind::Pk)?;
    let fields: Vec<&RawFieldKeyDef> = raw
        .field_defs
        .iter()
        .filter(|def| def.kind == KeyKind::Pk)
        .collect();

    let attribute_name = header
        .and_then(|def| def.name.clone())
        .unwrap_or_else(|| DEFAULT_PK_NAME.to_owned());

    if fields.is_empty() {
        return Err(Error::new(
            header.map_or_else(Span::call_site, |def| def.span),
            "the partition key needs at least one `#[pk]` field",
        ));
    }
    reject_optional(&fields)?;

    Ok(KeyModel {
        value: CompositeModel {
            prefix: header.and_then(|def| def.prefix.clone()),
            suffix: header.and_then(|def| def.suffix.clone()),
            segments: ordered_segments(&fields, &attribute_name)?,
        },
        attribute_name,
    })
}

fn build_sort(raw: &RawEntity) -> Result<KeyModel<ValueModel>, Error> {
    let header = single_struct_def(&raw.struct_defs, KeyKind::Sk)?;
    let fields: Vec<&RawFieldKeyDef> = raw
        .field_defs
        .iter()
        .filter(|def| def.kind == KeyKind::Sk)
        .collect();

    let attribute_name = header
        .and_then(|def| def.name.clone())
        .unwrap_or_else(|| DEFAULT_SK_NAME.to_owned());

    if let Some(static_value) = header.and_then(|def| def.static_value.clone()) {
        if !fields.is_empty() {
            let mut diagnostic = Error::new(
                Span::call_site(),
                "a static `#[sk(value = ..)]` cannot be combined with `#[sk]` fields",
            );
            for def in fields {
                diagnostic.combine(Error::new(def.span, "this field defines `#[sk]`"));
            }
            return Err(diagnostic);
        }

        return Ok(KeyModel {
            attribute_name,
            value: ValueModel::Static(static_value),
        });
    }

    reject_optional(&fields)?;
    let composite = CompositeModel {
        prefix: header.and_then(|def| def.prefix.clone()),
        suffix: header.and_then(|def| def.suffix.clone()),
        segments: ordered_segments(&fields, &attribute_name)?,
    };
    if composite.is_empty() {
        return Err(Error::new(
            header.map_or_else(Span::call_site, |def| def.span),
            "a sort key is required: add `#[sk(value = ..)]` or mark a field `#[sk]`",
        ));
    }

    Ok(KeyModel {
        attribute_name,
        value: ValueModel::Composite(composite),
    })
}

fn build_non_keys(raw: &RawEntity) -> Result<Vec<KeyModel<ValueModel>>, Error> {
    // header (if any) and contributing fields per attribute, declaration order
    let mut groups: Vec<(String, Option<&RawStructKeyDef>, Vec<&RawFieldKeyDef>)> = Vec::new();

    for def in raw.struct_defs.iter().filter(|def| def.kind == KeyKind::Nk) {
        let Some(name) = def.name.clone() else {
            continue;
        };
        if groups.iter().any(|(existing, ..)| *existing == name) {
            return Err(Error::new(
                def.span,
                format!("duplicate struct-level `#[nk(name = \"{name}\")]`"),
            ));
        }
        groups.push((name, Some(def), Vec::new()));
    }

    for def in raw.field_defs.iter().filter(|def| def.kind == KeyKind::Nk) {
        let name = def
            .name
            .clone()
            .unwrap_or_else(|| def.field_name.to_string());
        match groups.iter_mut().find(|(existing, ..)| *existing == name) {
            Some((_, _, fields)) => fields.push(def),
            None => groups.push((name, None, vec![def])),
        }
    }

    let mut non_keys = Vec::with_capacity(groups.len());
    for (attribute_name, header, fields) in groups {
        if let Some(static_value) = header.and_then(|def| def.static_value.clone()) {
            if let Some(def) = fields.first() {
                return Err(Error::new(
                    def.span,
                    format!("`{attribute_name}` has a static value and cannot take fields"),
                ));
            }
            non_keys.push(KeyModel {
                attribute_name,
                value: ValueModel::Static(static_value),
            });
            continue;
        }

        let composite = CompositeModel {
            prefix: header.and_then(|def| def.prefix.clone()),
            suffix: header.and_then(|def| def.suffix.clone()),
            segments: ordered_segments(&fields, &attribute_name)?,
        };
        if composite.is_empty() {
            return Err(Error::new(
                header.map_or_else(Span::call_site, |def| def.span),
                format!("`{attribute_name}` has no value, prefix or contributing field"),
            ));
        }
        non_keys.push(KeyModel {
            attribute_name,
            value: ValueModel::Composite(composite),
        });
    }

    Ok(non_keys)
}

pub fn build_model(raw: RawEntity) -> Result<EntityModel, Error> {
    let partition = build_partition(&raw)?;
    let sort = build_sort(&raw)?;
    let non_keys = build_non_keys(&raw)?;

    let mut names = BTreeSet::new();
    for name in std::iter::once(&partition.attribute_name)
        .chain(std::iter::once(&sort.attribute_name))
        .chain(non_keys.iter().map(|nk| &nk.attribute_name))
    {
        if !names.insert(name.as_str()) {
            return Err(Error::new(
                Span::call_site(),
                format!("attribute `{name}` is defined more than once"),
            ));
        }
    }

    Ok(EntityModel {
        partition,
        sort,
        non_keys,
        fields: raw.fields,
    })
}
