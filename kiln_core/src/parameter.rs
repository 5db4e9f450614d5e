use proc_macro2::Ident;
use quote::format_ident;
use syn::{
    Attribute, Expr, FnArg, GenericArgument, Generics, Lit, LitStr, Meta, Pat, PathArguments, Type,
    TypeParamBound,
};

use crate::{
    declaration::is_marker,
    model::{Cardinality, ParameterDescriptor},
    validate::render,
    Error, Options, Result,
};

fn strip(ty: &Type) -> &Type {
    match ty {
        Type::Paren(inner) => strip(&inner.elem),
        Type::Group(inner) => strip(&inner.elem),
        other => other,
    }
}

/// `T` of `Wrapper<T>`, when `ty` is a path ending in `wrapper` with one type argument.
pub(crate) fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = strip(ty) else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    match (types.next(), types.next()) {
        (Some(ty), None) => Some(ty),
        _ => None,
    }
}

fn is_scope_handle(ty: &Type, scope: &str) -> bool {
    let Type::Reference(reference) = strip(ty) else {
        return false;
    };
    let Type::TraitObject(object) = strip(&reference.elem) else {
        return false;
    };
    object.bounds.iter().any(|bound| match bound {
        TypeParamBound::Trait(bound) => bound
            .path
            .segments
            .last()
            .map(|segment| segment.ident == scope)
            .unwrap_or(false),
        _ => false,
    })
}

fn is_type_variable(ty: &Type, generics: &[&Generics]) -> bool {
    let Type::Path(path) = strip(ty) else {
        return false;
    };
    let Some(ident) = path.path.get_ident() else {
        return false;
    };
    path.qself.is_none()
        && generics
            .iter()
            .flat_map(|generics| generics.type_params())
            .any(|param| param.ident == *ident)
}

fn lookup(ty: &Type) -> Option<(Cardinality, &Type)> {
    if let Some(inner) = generic_argument(ty, "Option") {
        return generic_argument(inner, "Arc").map(|ty| (Cardinality::Optional, ty));
    }
    if let Some(inner) = generic_argument(ty, "Vec") {
        return generic_argument(inner, "Arc").map(|ty| (Cardinality::Many, ty));
    }
    if let Some(inner) = generic_argument(ty, "Lazy") {
        return Some((Cardinality::Lazy, inner));
    }
    generic_argument(ty, "Arc").map(|ty| (Cardinality::Single, ty))
}

/// Reads `#[classifier("main")]` or `#[classifier = "main"]`.
pub fn parse_classifier(attrs: &[Attribute], marker: &str) -> syn::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|attr| is_marker(attr, marker)) else {
        return Ok(None);
    };
    let classifier = match &attr.meta {
        Meta::NameValue(name_value) => match &name_value.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(lit) => lit.value(),
                other => return Err(syn::Error::new_spanned(other, "expected string literal")),
            },
            other => return Err(syn::Error::new_spanned(other, "expected string literal")),
        },
        _ => attr.parse_args::<LitStr>()?.value(),
    };
    Ok((!classifier.is_empty()).then_some(classifier))
}

fn parameter_name(pat: &Pat, index: usize) -> Ident {
    match pat {
        Pat::Ident(pat) if pat.ident == "scope" => format_ident!("scope_dependency"),
        Pat::Ident(pat) => pat.ident.clone(),
        _ => format_ident!("arg{}", index),
    }
}

/// Turns constructor inputs into lookups, in declaration order.
pub fn parse_parameters(
    element: &str,
    inputs: &[FnArg],
    generics: &[&Generics],
    options: &Options,
) -> Result<Vec<ParameterDescriptor>> {
    let mut parameters = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let pat_type = match input {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(_) => {
                return Err(Error::validation(element, "constructors must not take `self`"));
            }
        };

        let ty = pat_type.ty.as_ref();
        if is_scope_handle(ty, &options.scope) {
            parameters.push(ParameterDescriptor {
                name: format_ident!("scope"),
                ty: ty.clone(),
                scope_handle: true,
                classifier: None,
                cardinality: Cardinality::Single,
            });
            continue;
        }

        let name = parameter_name(&pat_type.pat, index);
        let (cardinality, looked_up) = lookup(ty).ok_or_else(|| {
            Error::validation(
                element,
                format!(
                    "Constructor parameter '{name}' has type `{}`. Use `Arc<T>`, `Option<Arc<T>>`, \
                     `Vec<Arc<T>>`, `Lazy<T>` or `&dyn {}`.",
                    render(ty),
                    options.scope
                ),
            )
        })?;

        if is_type_variable(looked_up, generics) {
            return Err(Error::validation(
                element,
                format!(
                    "Constructor parameter '{name}' is specified using a generic type which is an \
                     invalid parameter type. Use a concrete type or a trait object instead. \
                     '&dyn {}' is a valid parameter type too.",
                    options.scope
                ),
            ));
        }

        let classifier = parse_classifier(&pat_type.attrs, &options.classifier)
            .map_err(|err| Error::from_syn(element, err))?;

        parameters.push(ParameterDescriptor {
            name,
            ty: looked_up.clone(),
            scope_handle: false,
            classifier,
            cardinality,
        });
    }

    Ok(parameters)
}
