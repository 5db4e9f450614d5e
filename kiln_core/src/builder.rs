//! Builders turning one declaration into its factory descriptors.
//!
//! Both builders run every `#[instance]` attribute of the declaration through the
//! attribute parsers and validators. They differ in where the parameter list
//! and the default product type come from.

use log::debug;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use syn::{Attribute, FnArg, Generics, Path, ReturnType, Type};

use crate::{
    attribute::{parse_instance, InstanceAttributes},
    declaration::{is_marker, ConstructorKind, Declaration, FunctionDeclaration, TypeDeclaration},
    env::TypeSystem,
    model::{Call, Construction, FactoryDescriptor, TypeSelector},
    parameter::{generic_argument, parse_parameters},
    validate::{autodetect_type, check_assignable, select_types},
    Error, Options, Result,
};

fn parse_type(element: &str, tokens: proc_macro2::TokenStream) -> Result<Type> {
    syn::parse2(tokens).map_err(|err| Error::internal(element, err))
}

fn parse_path(element: &str, tokens: proc_macro2::TokenStream) -> Result<Path> {
    syn::parse2(tokens).map_err(|err| Error::internal(element, err))
}

fn camel_case(ident: &Ident) -> String {
    ident
        .to_string()
        .trim_start_matches("r#")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Last identifier naming `ty`: `Page` for `dyn crate::Page + Send`.
fn type_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        Type::TraitObject(object) => object.bounds.iter().find_map(|bound| match bound {
            syn::TypeParamBound::Trait(bound) => {
                bound.path.segments.last().map(|s| s.ident.to_string())
            }
            _ => None,
        }),
        Type::Paren(inner) => type_ident(&inner.elem),
        Type::Group(inner) => type_ident(&inner.elem),
        _ => None,
    }
}

struct Validated {
    attrs: InstanceAttributes,
    selector: TypeSelector,
    resolved_types: Vec<Type>,
}

pub struct Builder<'a> {
    options: &'a Options,
    types: &'a dyn TypeSystem,
}

impl<'a> Builder<'a> {
    pub fn new(options: &'a Options, types: &'a dyn TypeSystem) -> Self {
        Self { options, types }
    }

    pub fn build(&self, decl: &Declaration) -> Result<Vec<FactoryDescriptor>> {
        match decl {
            Declaration::Type(decl) => self.build_for_type(decl),
            Declaration::Function(decl) => self.build_for_function(decl),
            Declaration::Misplaced(decl) => Err(Error::validation(&decl.element, &decl.reason)),
        }
    }

    fn instance_attrs<'d>(&self, attrs: &'d [Attribute]) -> Vec<&'d Attribute> {
        attrs
            .iter()
            .filter(|attr| is_marker(attr, &self.options.marker))
            .collect()
    }

    fn factory_name(&self, base: String, many: bool, resolved_types: &[Type]) -> Ident {
        let mut name = base;
        if many {
            let primary = resolved_types
                .first()
                .and_then(type_ident)
                .unwrap_or_else(|| "Instance".to_string());
            name.push_str("As");
            name.push_str(&primary);
        }
        name.push_str(&self.options.suffix);
        format_ident!("{}", name)
    }

    /// Descriptors of a type, constructed through its single constructor.
    pub fn build_for_type(&self, decl: &TypeDeclaration) -> Result<Vec<FactoryDescriptor>> {
        let element = decl.element();
        let ident = &decl.ident;
        let product = parse_type(&element, quote!(#ident))?;

        let mut validated = Vec::new();
        for attr in self.instance_attrs(&decl.attrs) {
            let attrs = parse_instance(attr).map_err(|err| Error::from_syn(&element, err))?;
            let attrs = autodetect_type(attrs, decl)?;
            let (selector, resolved_types) = select_types(&element, &attrs)?;
            check_assignable(&element, self.types, &decl.namespace, &product, &resolved_types)?;
            validated.push(Validated {
                attrs,
                selector,
                resolved_types,
            });
        }

        let constructor = match decl.constructors.as_slice() {
            [constructor] => constructor,
            _ => {
                return Err(Error::validation(
                    &element,
                    format!("Exactly one constructor is required for `{element}`"),
                ));
            }
        };

        let parameters = parse_parameters(
            &element,
            &constructor.inputs,
            &[&decl.generics, &constructor.generics],
            self.options,
        )?;

        if !decl.generics.params.is_empty() {
            return Err(Error::validation(
                &element,
                format!("Instance type `{ident}` must not declare generic parameters"),
            ));
        }

        let call = match &constructor.kind {
            ConstructorKind::Function(function) => {
                Call::Function(parse_path(&element, quote!(#ident::#function))?)
            }
            ConstructorKind::Unit => Call::Unit(ident.clone()),
        };

        let many = validated.len() > 1;
        let descriptors = validated
            .into_iter()
            .map(|validated| FactoryDescriptor {
                element: element.clone(),
                namespace: decl.namespace.clone(),
                vis: decl.vis.clone(),
                factory_name: self.factory_name(
                    ident.to_string(),
                    many,
                    &validated.resolved_types,
                ),
                construction: Construction {
                    call: call.clone(),
                    product: product.clone(),
                    returns_arc: false,
                },
                parameters: parameters.clone(),
                selector: validated.selector,
                resolved_types: validated.resolved_types,
                scoping: validated.attrs.scoping,
                custom_factory: validated.attrs.factory,
                classifier: validated.attrs.classifier,
                disabled: validated.attrs.disabled,
            })
            .collect::<Vec<_>>();

        debug!("{element}: {} descriptor(s)", descriptors.len());
        Ok(descriptors)
    }

    /// Descriptors of a factory function; the function's signature is its constructor.
    pub fn build_for_function(&self, decl: &FunctionDeclaration) -> Result<Vec<FactoryDescriptor>> {
        let element = decl.element();
        let sig = &decl.sig;
        let function = &sig.ident;

        if sig.asyncness.is_some() {
            return Err(Error::validation(&element, "Factory functions must not be async"));
        }

        let returned = match &sig.output {
            ReturnType::Type(_, ty) => ty.as_ref(),
            ReturnType::Default => {
                return Err(Error::validation(&element, "Factory functions must return the instance"));
            }
        };
        let (product, returns_arc) = match generic_argument(returned, "Arc") {
            Some(inner) => (inner.clone(), true),
            None => (returned.clone(), false),
        };
        let product = match (&decl.owner, type_ident(&product)) {
            (Some(owner), Some(name)) if name == "Self" => {
                let owner = &owner.ident;
                parse_type(&element, quote!(#owner))?
            }
            _ => product,
        };

        let no_generics = Generics::default();
        let owner_generics = decl
            .owner
            .as_ref()
            .map(|owner| &owner.generics)
            .unwrap_or(&no_generics);

        let inputs: Vec<FnArg> = sig.inputs.iter().cloned().collect();
        let parameters = parse_parameters(
            &element,
            &inputs,
            &[owner_generics, &sig.generics],
            self.options,
        )?;

        if !sig.generics.params.is_empty() || !owner_generics.params.is_empty() {
            return Err(Error::validation(
                &element,
                format!("Factory function `{function}` must not declare generic parameters"),
            ));
        }

        let mut validated = Vec::new();
        for attr in self.instance_attrs(&decl.attrs) {
            let attrs = parse_instance(attr).map_err(|err| Error::from_syn(&element, err))?;
            let attrs = if attrs.declared_type.is_none() && attrs.declared_types.is_none() {
                InstanceAttributes {
                    declared_type: Some(product.clone()),
                    ..attrs
                }
            } else {
                attrs
            };
            let (selector, resolved_types) = select_types(&element, &attrs)?;
            check_assignable(&element, self.types, &decl.namespace, &product, &resolved_types)?;
            validated.push(Validated {
                attrs,
                selector,
                resolved_types,
            });
        }

        let (call, base) = match &decl.owner {
            Some(owner) => {
                let owner = &owner.ident;
                (
                    parse_path(&element, quote!(#owner::#function))?,
                    format!("{}{}", owner, camel_case(function)),
                )
            }
            None => (parse_path(&element, quote!(#function))?, camel_case(function)),
        };

        let many = validated.len() > 1;
        let descriptors = validated
            .into_iter()
            .map(|validated| FactoryDescriptor {
                element: element.clone(),
                namespace: decl.namespace.clone(),
                vis: decl.vis.clone(),
                factory_name: self.factory_name(base.clone(), many, &validated.resolved_types),
                construction: Construction {
                    call: Call::Function(call.clone()),
                    product: product.clone(),
                    returns_arc,
                },
                parameters: parameters.clone(),
                selector: validated.selector,
                resolved_types: validated.resolved_types,
                scoping: validated.attrs.scoping,
                custom_factory: validated.attrs.factory,
                classifier: validated.attrs.classifier,
                disabled: validated.attrs.disabled,
            })
            .collect::<Vec<_>>();

        debug!("{element}: {} descriptor(s)", descriptors.len());
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use syn::{parse_quote, ItemFn, ItemStruct};

    use super::*;
    use crate::{fixtures, model::Scoping};

    fn types() -> fixtures::Impls {
        fixtures::Impls::new(&[
            ("HomePage", "Page"),
            ("Both", "A"),
            ("Both", "B"),
            ("UnderTest", "Page"),
        ])
    }

    fn build_type(item: ItemStruct, interfaces: Vec<Path>, constructors: Vec<syn::ImplItemFn>) -> Result<Vec<FactoryDescriptor>> {
        let options = Options::default();
        let types = types();
        let decl = fixtures::declare(item, interfaces, constructors);
        Builder::new(&options, &types).build_for_type(&decl)
    }

    fn build_function(item: ItemFn, owner: Option<Ident>) -> Result<Vec<FactoryDescriptor>> {
        let options = Options::default();
        let types = types();
        let decl = fixtures::function(item, owner);
        Builder::new(&options, &types).build_for_function(&decl)
    }

    #[test]
    fn builds_type_with_constructor() {
        let descriptors = build_type(
            parse_quote! {
                #[instance(type = dyn Page, scoping = unscoped)]
                pub struct HomePage { repository: Arc<dyn HomeRepository> }
            },
            vec![parse_quote!(Page)],
            vec![parse_quote! {
                pub fn new(repository: Arc<dyn HomeRepository>) -> Self { Self { repository } }
            }],
        )
        .unwrap();

        assert_eq!(1, descriptors.len());
        let descriptor = &descriptors[0];
        let page: Type = parse_quote!(dyn Page);
        let call: Path = parse_quote!(HomePage::new);
        assert_eq!("HomePageKilnFactory", descriptor.factory_name.to_string());
        assert_eq!(vec![page], descriptor.resolved_types);
        assert_eq!(Call::Function(call), descriptor.construction.call);
        assert_eq!(Scoping::Unscoped, descriptor.scoping);
        assert_eq!(1, descriptor.parameters.len());
        assert!(!descriptor.disabled);
    }

    #[test]
    fn two_constructors_are_rejected() {
        let err = build_type(
            parse_quote! {
                #[instance(type = dyn Page)]
                pub struct HomePage;
            },
            vec![parse_quote!(Page)],
            vec![
                parse_quote!(pub fn new() -> Self { Self }),
                parse_quote!(pub fn empty() -> Self { Self }),
            ],
        )
        .unwrap_err();
        assert_eq!(
            "app::HomePage: Exactly one constructor is required for `app::HomePage`",
            err.to_string()
        );
    }

    #[test]
    fn unit_struct_uses_implicit_constructor() {
        let descriptors = build_type(
            parse_quote! {
                #[instance]
                pub(crate) struct UserData;
            },
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        let user_data: Ident = parse_quote!(UserData);
        assert_eq!(Call::Unit(user_data), descriptors[0].construction.call);
        assert!(descriptors[0].parameters.is_empty());
    }

    #[test]
    fn disabled_descriptors_are_still_built() {
        let descriptors = build_type(
            parse_quote! {
                #[instance(type = dyn Page, disabled)]
                pub struct HomePage;
            },
            vec![parse_quote!(Page)],
            Vec::new(),
        )
        .unwrap();
        assert!(descriptors[0].disabled);
    }

    #[test]
    fn repeated_markers_name_factories_by_type() {
        let descriptors = build_type(
            parse_quote! {
                #[instance(type = dyn A)]
                #[instance(type = dyn B, classifier = "b")]
                pub struct Both;
            },
            vec![parse_quote!(A), parse_quote!(B)],
            Vec::new(),
        )
        .unwrap();
        let names: Vec<String> = descriptors.iter().map(|d| d.factory_name.to_string()).collect();
        assert_eq!(vec!["BothAsAKilnFactory", "BothAsBKilnFactory"], names);
        assert_eq!(Some("b".to_string()), descriptors[1].classifier);
    }

    #[test]
    fn generic_types_are_rejected() {
        let err = build_type(
            parse_quote! {
                #[instance]
                pub struct Holder<T> { value: T }
            },
            Vec::new(),
            vec![parse_quote!(pub fn new() -> Self { todo!() })],
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not declare generic parameters"));
    }

    #[test]
    fn function_defaults_to_its_return_type() {
        let descriptors = build_function(
            parse_quote! {
                #[instance(scoping = direct)]
                pub fn provide_under_test(dep: Arc<String>) -> UnderTest { UnderTest::new(dep) }
            },
            None,
        )
        .unwrap();
        let descriptor = &descriptors[0];
        let under_test: Type = parse_quote!(UnderTest);
        let call: Path = parse_quote!(provide_under_test);
        assert_eq!("ProvideUnderTestKilnFactory", descriptor.factory_name.to_string());
        assert_eq!(TypeSelector::Single(under_test.clone()), descriptor.selector);
        assert_eq!(under_test, descriptor.construction.product);
        assert_eq!(Call::Function(call), descriptor.construction.call);
        assert!(!descriptor.construction.returns_arc);
    }

    #[test]
    fn associated_function_returning_arc() {
        let descriptors = build_function(
            parse_quote! {
                #[instance(type = dyn Page)]
                pub fn create_page() -> Arc<Self> { Arc::new(UnderTest) }
            },
            Some(parse_quote!(UnderTest)),
        )
        .unwrap();
        let descriptor = &descriptors[0];
        let under_test: Type = parse_quote!(UnderTest);
        assert_eq!("UnderTestCreatePageKilnFactory", descriptor.factory_name.to_string());
        assert_eq!(under_test, descriptor.construction.product);
        assert!(descriptor.construction.returns_arc);
    }

    #[test]
    fn function_type_must_be_implemented() {
        let err = build_function(
            parse_quote! {
                #[instance(type = dyn Repository)]
                pub fn provide() -> UnderTest { UnderTest }
            },
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("`UnderTest` must implement `dyn Repository`"));
    }

    #[test]
    fn async_functions_are_rejected() {
        let err = build_function(
            parse_quote! {
                #[instance]
                pub async fn provide() -> UnderTest { UnderTest }
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
