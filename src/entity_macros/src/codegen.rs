use crate::parser::CaseDef;
use crate::schema::{CompositeModel, EntityModel, KeyModel, SegmentModel, ValueModel};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

/// Where a segment reads its value from.
#[derive(Clone, Copy)]
enum Source {
    /// `self.<field>` inside `impl Entity`.
    SelfField,
    /// A `primary_key_of` parameter named after the field.
    Param,
}

fn tok_optional_string(value: Option<&str>) -> TokenStream {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(::std::string::String::from(#s)) },
        None => quote! { ::core::option::Option::None },
    }
}

fn tok_case(case: CaseDef) -> TokenStream {
    match case {
        CaseDef::Preserve => quote! { entity_core::Case::Preserve },
        CaseDef::Lower => quote! { entity_core::Case::Lower },
        CaseDef::Upper => quote! { entity_core::Case::Upper },
    }
}

//
// ─── SCHEMA ─────────────────────────────────────────────────────────────────────
//
fn tok_composite_def(composite: &CompositeModel) -> TokenStream {
    let prefix = tok_optional_string(composite.prefix.as_deref());
    let suffix = tok_optional_string(composite.suffix.as_deref());
    let segments = composite.segments.iter().map(|segment| {
        let field = segment.field.to_string();
        let prefix = tok_optional_string(segment.prefix.as_deref());
        let case = tok_case(segment.case);
        quote! {
            entity_core::Segment {
                struct_field_name: ::std::string::String::from(#field),
                prefix: #prefix,
                case: #case,
            }
        }
    });

    quote! {
        entity_core::CompositeAttributeValue {
            segments: ::std::vec![ #( #segments ),* ],
            prefix: #prefix,
            suffix: #suffix,
        }
    }
}

fn tok_key_def(key: &KeyModel<ValueModel>) -> TokenStream {
    let name = &key.attribute_name;
    let value = match &key.value {
        ValueModel::Static(value) => quote! {
            entity_core::AttributeValue::Static(::std::string::String::from(#value))
        },
        ValueModel::Composite(composite) => {
            let composite = tok_composite_def(composite);
            quote! { entity_core::AttributeValue::Composite(#composite) }
        }
    };

    quote! {
        entity_core::KeyDef {
            attribute_name: ::std::string::String::from(#name),
            attribute_value: #value,
        }
    }
}

//
// ─── KEY VALUES ─────────────────────────────────────────────────────────────────
//
fn tok_segment_value(segment: &SegmentModel, source: Source) -> TokenStream {
    let field = &segment.field;
    let label = match &segment.prefix {
        Some(prefix) => quote! { ::core::option::Option::Some(#prefix) },
        None => quote! { ::core::option::Option::None },
    };
    let case = tok_case(segment.case);
    let value = match source {
        Source::Param => quote! { &#field },
        Source::SelfField if segment.optional => quote! { self.#field.as_ref()? },
        Source::SelfField => quote! { &self.#field },
    };

    quote! { entity_core::key::segment(#label, #value, #case) }
}

/// `String` expression for a composite attribute.
fn tok_composite_value(composite: &CompositeModel, source: Source) -> TokenStream {
    let mut parts = Vec::new();
    if let Some(prefix) = &composite.prefix {
        parts.push(quote! { ::std::string::String::from(#prefix) });
    }
    parts.extend(
        composite
            .segments
            .iter()
            .map(|segment| tok_segment_value(segment, source)),
    );
    if let Some(suffix) = &composite.suffix {
        parts.push(quote! { ::std::string::String::from(#suffix) });
    }

    quote! { entity_core::key::join([ #( #parts ),* ]) }
}

/// `Option<String>` expression for a non-key attribute. Sparse attributes
/// evaluate to `None` as soon as one optional field is unset.
fn tok_non_key_value(value: &ValueModel) -> TokenStream {
    match value {
        ValueModel::Static(value) => {
            quote! { ::core::option::Option::Some(::std::string::String::from(#value)) }
        }
        ValueModel::Composite(composite) if composite.is_sparse() => {
            let joined = tok_composite_value(composite, Source::SelfField);
            quote! {
                (|| -> ::core::option::Option<::std::string::String> {
                    ::core::option::Option::Some(#joined)
                })()
            }
        }
        ValueModel::Composite(composite) => {
            let joined = tok_composite_value(composite, Source::SelfField);
            quote! { ::core::option::Option::Some(#joined) }
        }
    }
}

fn tok_sort_value(value: &ValueModel, source: Source) -> TokenStream {
    match value {
        ValueModel::Static(value) => quote! { ::std::string::String::from(#value) },
        ValueModel::Composite(composite) => tok_composite_value(composite, source),
    }
}

//
// ─── IMPL ───────────────────────────────────────────────────────────────────────
//
pub fn generate_impl(input: &DeriveInput, model: &EntityModel) -> TokenStream {
    let name = &input.ident;
    let vis = &input.vis;
    let entity_name = name.to_string();

    // schema()
    let pk_name = &model.partition.attribute_name;
    let pk_def = tok_composite_def(&model.partition.value);
    let sk_def = tok_key_def(&model.sort);
    let nk_defs = model.non_keys.iter().map(tok_key_def);

    // primary_key_of(..)
    let key_fields = model.primary_key_fields();
    let params = key_fields
        .iter()
        .map(|field| quote! { #field: impl ::std::fmt::Display });
    let args = key_fields.iter().map(|field| quote! { &self.#field });
    let pk_value = tok_composite_value(&model.partition.value, Source::Param);
    let sk_value = tok_sort_value(&model.sort.value, Source::Param);
    let key_fn_doc = format!("Table key of the `{entity_name}` identified by these fields.");

    // key_attributes()
    let sk_name = &model.sort.attribute_name;
    let nk_pairs = model.non_keys.iter().map(|nk| {
        let attribute = &nk.attribute_name;
        let value = tok_non_key_value(&nk.value);
        quote! { (#attribute, #value) }
    });

    // setters
    let setters_trait = format_ident!("{}Setters", name);
    let setter_sigs = model.fields.iter().map(|field| {
        let setter = format_ident!("set_{}", field.ident);
        let ty = &field.ty;
        quote! { fn #setter(self, value: #ty) -> Self; }
    });
    let setter_impls = model.fields.iter().map(|field| {
        let ident = &field.ident;
        let setter = format_ident!("set_{}", ident);
        let ty = &field.ty;
        quote! {
            fn #setter(self, value: #ty) -> Self {
                self.set(move |entity: &mut #name| entity.#ident = value)
            }
        }
    });
    let setters_doc = format!("Field setters for `UpdateBuilder<{entity_name}>`.");

    quote! {
        impl entity_core::Entity for #name {
            fn schema() -> entity_core::Schema {
                entity_core::Schema {
                    entity_name: ::std::string::String::from(#entity_name),
                    partition_key_def: entity_core::KeyDef {
                        attribute_name: ::std::string::String::from(#pk_name),
                        attribute_value: #pk_def,
                    },
                    sort_key_def: #sk_def,
                    non_key_defs: ::std::vec![ #( #nk_defs ),* ],
                }
            }

            fn primary_key(&self) -> entity_core::PrimaryKey {
                Self::primary_key_of( #( #args ),* )
            }

            fn key_attributes(&self) -> entity_core::Item {
                let key = entity_core::Entity::primary_key(self);
                entity_core::key::attributes([
                    (#pk_name, ::core::option::Option::Some(key.pk)),
                    (#sk_name, ::core::option::Option::Some(key.sk)),
                    #( #nk_pairs, )*
                ])
            }
        }

        impl #name {
            #[doc = #key_fn_doc]
            #[must_use]
            #vis fn primary_key_of( #( #params ),* ) -> entity_core::PrimaryKey {
                entity_core::PrimaryKey {
                    pk: #pk_value,
                    sk: #sk_value,
                }
            }
        }

        #[doc = #setters_doc]
        #vis trait #setters_trait: ::core::marker::Sized {
            #( #setter_sigs )*
        }

        impl<'a> #setters_trait for entity_core::UpdateBuilder<'a, #name> {
            #( #setter_impls )*
        }
    }
}
