use proc_macro2::Span;
use syn::{
    Attribute, Data, DeriveInput, Error, Fields, GenericArgument, Ident, LitInt, LitStr,
    PathArguments, Type, meta::ParseNestedMeta, spanned::Spanned,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyKind {
    Pk,
    Sk,
    Nk,
}

impl KeyKind {
    pub const ALL: [Self; 3] = [Self::Pk, Self::Sk, Self::Nk];

    pub fn ident(self) -> &'static str {
        match self {
            Self::Pk => "pk",
            Self::Sk => "sk",
            Self::Nk => "nk",
        }
    }

    fn of(attr: &Attribute) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| attr.path().is_ident(kind.ident()))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CaseDef {
    #[default]
    Preserve,
    Lower,
    Upper,
}

impl CaseDef {
    fn parse(lit: &LitStr) -> Result<Self, Error> {
        match lit.value().as_str() {
            "preserve" => Ok(Self::Preserve),
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            _ => Err(Error::new(
                lit.span(),
                "`case` must be one of \"preserve\", \"lower\", \"upper\"",
            )),
        }
    }
}

///
/// Struct-level `#[pk(..)]`, `#[sk(..)]`, `#[nk(..)]`
///

#[derive(Debug)]
pub struct RawStructKeyDef {
    pub kind: KeyKind,
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub static_value: Option<String>,
    pub span: Span,
}

///
/// Field-level `#[pk(..)]`, `#[sk(..)]`, `#[nk(..)]`
///

#[derive(Debug)]
pub struct RawFieldKeyDef {
    pub kind: KeyKind,
    pub field_name: Ident,
    pub optional: bool,
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub order: Option<usize>,
    pub case: CaseDef,
    pub span: Span,
}

#[derive(Debug)]
pub struct RawField {
    pub ident: Ident,
    pub ty: Type,
}

#[derive(Debug)]
pub struct RawEntity {
    pub struct_defs: Vec<RawStructKeyDef>,
    pub field_defs: Vec<RawFieldKeyDef>,
    pub fields: Vec<RawField>,
}

fn lit_str(meta: &ParseNestedMeta) -> Result<String, Error> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else { return false };
    let Some(last) = path.path.segments.last() else {
        return false;
    };

    last.ident == "Option"
        && matches!(
            &last.arguments,
            PathArguments::AngleBracketed(args)
                if matches!(args.args.first(), Some(GenericArgument::Type(_)))
        )
}

fn parse_struct_attr(attr: &Attribute, kind: KeyKind) -> Result<RawStructKeyDef, Error> {
    let mut def = RawStructKeyDef {
        kind,
        name: None,
        prefix: None,
        suffix: None,
        static_value: None,
        span: attr.span(),
    };

    if kind == KeyKind::Nk && matches!(attr.meta, syn::Meta::Path(_)) {
        return Err(Error::new(def.span, "struct-level `#[nk]` needs a `name`"));
    }
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(def);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            def.name = Some(lit_str(&meta)?);
        } else if meta.path.is_ident("prefix") {
            def.prefix = Some(lit_str(&meta)?);
        } else if meta.path.is_ident("suffix") {
            def.suffix = Some(lit_str(&meta)?);
        } else if meta.path.is_ident("value") {
            def.static_value = Some(lit_str(&meta)?);
        } else {
            return Err(meta.error(format!(
                "unknown struct-level `{}` argument; expected name, prefix, suffix or value",
                kind.ident()
            )));
        }
        Ok(())
    })?;

    if kind == KeyKind::Pk && def.static_value.is_some() {
        return Err(Error::new(def.span, "a partition key cannot be static"));
    }
    if kind == KeyKind::Nk && def.name.is_none() {
        return Err(Error::new(def.span, "struct-level `#[nk]` needs a `name`"));
    }

    Ok(def)
}

fn parse_field_attr(
    attr: &Attribute,
    kind: KeyKind,
    field: &RawField,
) -> Result<RawFieldKeyDef, Error> {
    let mut def = RawFieldKeyDef {
        kind,
        field_name: field.ident.clone(),
        optional: is_option(&field.ty),
        name: None,
        prefix: None,
        order: None,
        case: CaseDef::default(),
        span: attr.span(),
    };

    // bare `#[pk]` takes every default
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(def);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("prefix") {
            def.prefix = Some(lit_str(&meta)?);
        } else if meta.path.is_ident("order") {
            let lit: LitInt = meta.value()?.parse()?;
            def.order = Some(lit.base10_parse()?);
        } else if meta.path.is_ident("case") {
            let lit: LitStr = meta.value()?.parse()?;
            def.case = CaseDef::parse(&lit)?;
        } else if meta.path.is_ident("name") && kind == KeyKind::Nk {
            def.name = Some(lit_str(&meta)?);
        } else {
            return Err(meta.error(format!(
                "unknown field-level `{}` argument",
                kind.ident()
            )));
        }
        Ok(())
    })?;

    Ok(def)
}

pub fn parse_entity(input: &DeriveInput) -> Result<RawEntity, Error> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let Data::Struct(ds) = &input.data else {
        return Err(Error::new_spanned(
            input,
            "Entity can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &ds.fields else {
        return Err(Error::new_spanned(
            &ds.fields,
            "Entity requires named fields",
        ));
    };

    let mut struct_defs = Vec::new();
    for attr in &input.attrs {
        if let Some(kind) = KeyKind::of(attr) {
            struct_defs.push(parse_struct_attr(attr, kind)?);
        }
    }

    let mut fields = Vec::new();
    let mut field_defs = Vec::new();
    let mut errors: Option<Error> = None;

    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let raw = RawField {
            ident,
            ty: field.ty.clone(),
        };

        for attr in &field.attrs {
            let Some(kind) = KeyKind::of(attr) else {
                continue;
            };
            match parse_field_attr(attr, kind, &raw) {
                Ok(def) => field_defs.push(def),
                Err(err) => match &mut errors {
                    Some(all) => all.combine(err),
                    None => errors = Some(err),
                },
            }
        }
        fields.push(raw);
    }

    if let Some(err) = errors {
        return Err(err);
    }

    Ok(RawEntity {
        struct_defs,
        field_defs,
        fields,
    })
}
