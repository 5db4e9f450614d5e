//! Parsers for the properties of `#[instance(..)]`.
//!
//! Every property has exactly one parser in [`PARSERS`]. A parser receives the
//! attributes parsed so far and the raw property, and returns the attributes
//! with its own field set. Cross-property rules live in [`crate::validate`].

use std::mem::take;

use proc_macro2::TokenStream;
use syn::{
    meta::{self, ParseNestedMeta},
    parenthesized,
    parse::Parser,
    punctuated::Punctuated,
    Attribute, LitBool, LitStr, Meta, Path, Token, Type,
};

use crate::model::Scoping;

#[derive(Debug, Clone, Default)]
pub struct InstanceAttributes {
    pub declared_type: Option<Type>,
    /// `None` when absent or declared empty.
    pub declared_types: Option<Vec<Type>>,
    pub scoping: Scoping,
    pub factory: Option<Path>,
    pub classifier: Option<String>,
    pub disabled: bool,
}

type AttributeParser = fn(InstanceAttributes, &ParseNestedMeta) -> syn::Result<InstanceAttributes>;

const PARSERS: [(&str, AttributeParser); 6] = [
    ("type", parse_type),
    ("types", parse_types),
    ("factory", parse_factory),
    ("scoping", parse_scoping),
    ("classifier", parse_classifier),
    ("disabled", parse_disabled),
];

fn parse_type(attrs: InstanceAttributes, meta: &ParseNestedMeta) -> syn::Result<InstanceAttributes> {
    let declared_type: Type = meta.value()?.parse()?;
    Ok(InstanceAttributes {
        declared_type: Some(declared_type),
        ..attrs
    })
}

fn parse_types(attrs: InstanceAttributes, meta: &ParseNestedMeta) -> syn::Result<InstanceAttributes> {
    let content;
    parenthesized!(content in meta.input);
    let types: Vec<Type> = Punctuated::<Type, Token![,]>::parse_terminated(&content)?
        .into_iter()
        .collect();
    Ok(InstanceAttributes {
        declared_types: (!types.is_empty()).then_some(types),
        ..attrs
    })
}

fn parse_factory(attrs: InstanceAttributes, meta: &ParseNestedMeta) -> syn::Result<InstanceAttributes> {
    let factory: Path = meta.value()?.parse()?;
    Ok(InstanceAttributes {
        factory: Some(factory),
        ..attrs
    })
}

fn parse_scoping(attrs: InstanceAttributes, meta: &ParseNestedMeta) -> syn::Result<InstanceAttributes> {
    let input = meta.value()?;
    let name = if input.peek(LitStr) {
        input.parse::<LitStr>()?.value()
    } else {
        let path: Path = input.parse()?;
        path.segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default()
    };
    let scoping = Scoping::from_name(&name).ok_or_else(|| {
        meta.error(format!(
            "unknown scoping `{name}`, expected one of `unscoped`, `direct`, `topmost`"
        ))
    })?;
    Ok(InstanceAttributes { scoping, ..attrs })
}

fn parse_classifier(attrs: InstanceAttributes, meta: &ParseNestedMeta) -> syn::Result<InstanceAttributes> {
    let classifier = meta.value()?.parse::<LitStr>()?.value();
    Ok(InstanceAttributes {
        classifier: (!classifier.is_empty()).then_some(classifier),
        ..attrs
    })
}

fn parse_disabled(attrs: InstanceAttributes, meta: &ParseNestedMeta) -> syn::Result<InstanceAttributes> {
    let disabled = if meta.input.peek(Token![=]) {
        meta.value()?.parse::<LitBool>()?.value
    } else {
        true
    };
    Ok(InstanceAttributes { disabled, ..attrs })
}

#[derive(Default)]
struct AttributeParse {
    attrs: InstanceAttributes,
    seen: Vec<String>,
}

impl AttributeParse {
    fn property(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        let name = meta
            .path
            .get_ident()
            .map(ToString::to_string)
            .unwrap_or_default();

        let parser = PARSERS
            .iter()
            .find(|(property, _)| *property == name)
            .map(|(_, parser)| *parser)
            .ok_or_else(|| meta.error("unsupported instance property"))?;

        if self.seen.contains(&name) {
            return Err(meta.error(format!("duplicate property `{name}`")));
        }
        self.seen.push(name);

        self.attrs = parser(take(&mut self.attrs), &meta)?;
        Ok(())
    }
}

/// Parses one `#[instance(..)]` attribute; a bare `#[instance]` yields the defaults.
pub fn parse_instance(attr: &Attribute) -> syn::Result<InstanceAttributes> {
    if let Meta::Path(_) = attr.meta {
        return Ok(InstanceAttributes::default());
    }
    let mut parse = AttributeParse::default();
    attr.parse_nested_meta(|meta| parse.property(meta))?;
    Ok(parse.attrs)
}

/// Parses the arguments an attribute macro receives for `#[instance(..)]`.
pub fn parse_instance_args(args: TokenStream) -> syn::Result<InstanceAttributes> {
    let mut parse = AttributeParse::default();
    meta::parser(|meta| parse.property(meta)).parse2(args)?;
    Ok(parse.attrs)
}
