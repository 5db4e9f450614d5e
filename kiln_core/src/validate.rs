use quote::{quote, ToTokens};
use syn::Type;

use crate::{
    attribute::InstanceAttributes,
    declaration::{Supertype, TypeDeclaration},
    env::TypeSystem,
    model::{Namespace, TypeSelector},
    Error, Result,
};

/// Renders tokens the way they are written in source, for diagnostics.
pub(crate) fn render(tokens: &impl ToTokens) -> String {
    tokens
        .to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}

/// A type declaring neither `type` nor `types` provides itself, as long as it
/// implements no trait and derefs to nothing.
pub fn autodetect_type(attrs: InstanceAttributes, decl: &TypeDeclaration) -> Result<InstanceAttributes> {
    if attrs.declared_type.is_some() || attrs.declared_types.is_some() {
        return Ok(attrs);
    }

    if decl.interfaces.is_empty() && decl.supertype == Supertype::Root {
        let ident = &decl.ident;
        let declared_type: Type = syn::parse2(quote!(#ident))
            .map_err(|err| Error::internal(decl.element(), err))?;
        return Ok(InstanceAttributes {
            declared_type: Some(declared_type),
            ..attrs
        });
    }

    Err(Error::validation(
        decl.element(),
        "#[instance] must declare either 'type' or 'types' property.",
    ))
}

/// Resolves the declared type or types into the types the factory is indexed under.
pub fn select_types(element: &str, attrs: &InstanceAttributes) -> Result<(TypeSelector, Vec<Type>)> {
    match (&attrs.declared_type, &attrs.declared_types) {
        (Some(_), Some(_)) => Err(Error::validation(
            element,
            "#[instance] must declare either 'type' or 'types' property, not both.",
        )),
        (Some(declared_type), None) => Ok((
            TypeSelector::Single(declared_type.clone()),
            vec![declared_type.clone()],
        )),
        (None, Some(declared_types)) => {
            if !attrs.scoping.is_scoped() {
                return Err(Error::validation(
                    element,
                    "types() property must be used with scoped instances only. \
                     Set scoping to Scoping::Direct or Scoping::Topmost.",
                ));
            }
            Ok((
                TypeSelector::Multiple(declared_types.clone()),
                declared_types.clone(),
            ))
        }
        (None, None) => Err(Error::internal(element, "Cannot verify type declaration.")),
    }
}

pub fn check_assignable(
    element: &str,
    types: &dyn TypeSystem,
    namespace: &Namespace,
    product: &Type,
    resolved_types: &[Type],
) -> Result<()> {
    for target in resolved_types {
        if !types.is_assignable(namespace, product, target) {
            return Err(Error::validation(
                element,
                format!("`{}` must implement `{}`", render(product), render(target)),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use syn::{parse_quote, ItemStruct};

    use super::*;
    use crate::{fixtures, model::Scoping};

    fn plain_struct() -> TypeDeclaration {
        let item: ItemStruct = parse_quote!(pub struct UserData;);
        fixtures::declare(item, Vec::new(), Vec::new())
    }

    #[test]
    fn autodetects_type_without_interfaces() {
        let decl = plain_struct();
        let attrs = autodetect_type(InstanceAttributes::default(), &decl).unwrap();
        let expected: Type = parse_quote!(UserData);
        assert_eq!(Some(expected), attrs.declared_type);
    }

    #[test]
    fn single_interface_is_not_autodetected() {
        let item: ItemStruct = parse_quote!(pub struct HomePage;);
        let decl = fixtures::declare(item, vec![parse_quote!(Page)], Vec::new());
        let err = autodetect_type(InstanceAttributes::default(), &decl).unwrap_err();
        assert_eq!(
            "app::HomePage: #[instance] must declare either 'type' or 'types' property.",
            err.to_string()
        );
    }

    #[test]
    fn deref_target_blocks_autodetection() {
        let mut decl = plain_struct();
        decl.supertype = Supertype::Deref(parse_quote!(Base));
        assert!(autodetect_type(InstanceAttributes::default(), &decl).is_err());
    }

    #[test]
    fn single_type_resolves_to_itself() {
        let page: Type = parse_quote!(dyn Page);
        let attrs = InstanceAttributes {
            declared_type: Some(page.clone()),
            scoping: Scoping::Unscoped,
            ..Default::default()
        };
        let (selector, resolved) = select_types("app::HomePage", &attrs).unwrap();
        assert_eq!(TypeSelector::Single(page.clone()), selector);
        assert_eq!(vec![page], resolved);
    }

    #[test]
    fn type_and_types_are_exclusive() {
        let attrs = InstanceAttributes {
            declared_type: Some(parse_quote!(dyn Page)),
            declared_types: Some(vec![parse_quote!(dyn Page)]),
            ..Default::default()
        };
        let err = select_types("app::HomePage", &attrs).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().ends_with("not both."));
    }

    #[test]
    fn types_require_scoping() {
        let attrs = InstanceAttributes {
            declared_types: Some(vec![parse_quote!(dyn A), parse_quote!(dyn B)]),
            scoping: Scoping::Unscoped,
            ..Default::default()
        };
        let err = select_types("app::Both", &attrs).unwrap_err();
        assert!(err.to_string().contains("scoped instances only"));

        let direct = InstanceAttributes {
            scoping: Scoping::Direct,
            ..attrs
        };
        let (_, resolved) = select_types("app::Both", &direct).unwrap();
        let expected: Vec<Type> = vec![parse_quote!(dyn A), parse_quote!(dyn B)];
        assert_eq!(expected, resolved);
    }

    #[test]
    fn nothing_declared_is_a_compiler_fault() {
        let err = select_types("app::Lost", &InstanceAttributes::default()).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn unassignable_type_is_rejected() {
        let types = fixtures::Impls::new(&[("HomePage", "Page")]);
        let product: Type = parse_quote!(HomePage);
        let ns = Namespace::root().child("app");

        let ok: Vec<Type> = vec![parse_quote!(dyn Page), parse_quote!(HomePage)];
        check_assignable("app::HomePage", &types, &ns, &product, &ok).unwrap();

        let wrong: Vec<Type> = vec![parse_quote!(dyn crate::api::Repository)];
        let err = check_assignable("app::HomePage", &types, &ns, &product, &wrong).unwrap_err();
        assert_eq!(
            "app::HomePage: `HomePage` must implement `dyn crate::api::Repository`",
            err.to_string()
        );
    }
}
