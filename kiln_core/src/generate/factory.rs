use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::Path;

use crate::{
    env::{GeneratedUnit, UnitKind},
    model::{Call, Cardinality, FactoryDescriptor, ParameterDescriptor},
    Error, Options, Result,
};

/// `let name = scope.get_single::<T>("classifier")?;`
struct Lookup<'a> {
    kiln: &'a Path,
    parameter: &'a ParameterDescriptor,
}

impl ToTokens for Lookup<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let ParameterDescriptor {
            ref name,
            ref ty,
            ref classifier,
            cardinality,
            ..
        } = *self.parameter;

        let classifier = classifier.as_deref().unwrap_or("");
        if cardinality == Cardinality::Lazy {
            let kiln = self.kiln;
            tokens.extend(quote! {
                let #name = #kiln::Lazy::<#ty>::new(scope, #classifier)?;
            });
            return;
        }

        let method = format_ident!("{}", cardinality.method());
        tokens.extend(quote! {
            let #name = scope.#method::<#ty>(#classifier)?;
        })
    }
}

pub struct FactoryGenerator<'a> {
    options: &'a Options,
}

impl<'a> FactoryGenerator<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    fn produce(&self, descriptor: &FactoryDescriptor) -> TokenStream {
        let kiln = &self.options.runtime;
        match &descriptor.custom_factory {
            None => quote! { Self::instantiate(scope) },
            Some(factory) => {
                let product = &descriptor.construction.product;
                let scoping = scoping_tokens(kiln, descriptor);
                let classifier = descriptor.classifier();
                quote! {
                    <#factory as #kiln::CustomFactory<#product>>::create(
                        scope,
                        #scoping,
                        #classifier,
                        Self::instantiate,
                    )
                }
            }
        }
    }

    pub fn generate(&self, descriptor: &FactoryDescriptor) -> Result<GeneratedUnit> {
        let kiln = &self.options.runtime;
        let FactoryDescriptor {
            ref element,
            ref vis,
            ref factory_name,
            ref construction,
            ref parameters,
            scoping,
            ..
        } = *descriptor;

        let primary = descriptor
            .primary_type()
            .ok_or_else(|| Error::internal(element, "descriptor reached generation without a resolved type"))?;
        let product = &construction.product;

        let lookups = parameters
            .iter()
            .filter(|parameter| !parameter.scope_handle)
            .map(|parameter| Lookup { kiln, parameter });
        let arguments = parameters.iter().map(|parameter| &parameter.name);

        let call = match &construction.call {
            Call::Function(path) => quote! { #path(#(#arguments),*) },
            Call::Unit(ident) => quote! { #ident },
        };
        let instance = if construction.returns_arc {
            call
        } else {
            quote! { ::std::sync::Arc::new(#call) }
        };

        let produce = self.produce(descriptor);
        let is_scoped = scoping.is_scoped();
        let scoping = scoping_tokens(kiln, descriptor);
        let classifier = descriptor.classifier();

        let tokens = quote! {
            #vis struct #factory_name;

            #[allow(dead_code)]
            impl #factory_name {
                pub fn get_type() -> ::core::any::TypeId {
                    ::core::any::TypeId::of::<#primary>()
                }

                pub fn type_name() -> &'static str {
                    ::core::any::type_name::<#primary>()
                }

                #[allow(unused_variables)]
                fn instantiate(scope: &dyn #kiln::Scope) -> #kiln::Result<::std::sync::Arc<#product>> {
                    #(#lookups)*
                    Ok(#instance)
                }

                fn produce(scope: &dyn #kiln::Scope) -> #kiln::Result<::std::sync::Arc<#product>> {
                    #produce
                }
            }

            impl #kiln::InstanceFactory for #factory_name {
                type Instance = #primary;

                fn create(&self, scope: &dyn #kiln::Scope) -> #kiln::Result<::std::sync::Arc<Self::Instance>> {
                    let instance: ::std::sync::Arc<#primary> = Self::produce(scope)?;
                    Ok(instance)
                }

                fn is_scoped(&self) -> bool {
                    #is_scoped
                }

                fn scoping(&self) -> #kiln::Scoping {
                    #scoping
                }

                fn classifier(&self) -> &'static str {
                    #classifier
                }
            }
        };

        Ok(GeneratedUnit {
            name: factory_name.to_string(),
            kind: UnitKind::Factory,
            tokens,
        })
    }
}

pub(crate) fn scoping_tokens(kiln: &Path, descriptor: &FactoryDescriptor) -> TokenStream {
    let variant = format_ident!("{}", descriptor.scoping.variant());
    quote! { #kiln::Scoping::#variant }
}

#[cfg(test)]
mod tests {
    use syn::{parse_quote, ItemStruct};

    use super::*;
    use crate::{builder::Builder, fixtures};

    fn descriptor(item: ItemStruct, interfaces: Vec<Path>, constructors: Vec<syn::ImplItemFn>) -> FactoryDescriptor {
        let options = Options::default();
        let types = fixtures::Impls::new(&[("HomePage", "Page"), ("Both", "A"), ("Both", "B")]);
        let decl = fixtures::declare(item, interfaces, constructors);
        Builder::new(&options, &types)
            .build_for_type(&decl)
            .unwrap()
            .remove(0)
    }

    fn generate(descriptor: &FactoryDescriptor) -> String {
        let options = Options::default();
        let unit = FactoryGenerator::new(&options).generate(descriptor).unwrap();
        assert_eq!(UnitKind::Factory, unit.kind);

        let file: syn::File = syn::parse2(unit.tokens.clone()).unwrap();
        println!("{}", prettyplease::unparse(&file));

        unit.tokens.to_string()
    }

    #[test]
    fn unscoped_factory_with_required_parameter() {
        let descriptor = descriptor(
            parse_quote! {
                #[instance(type = dyn Page, scoping = unscoped)]
                pub struct HomePage { repository: Arc<HomeRepository> }
            },
            vec![parse_quote!(Page)],
            vec![parse_quote! {
                pub fn new(repository: Arc<HomeRepository>) -> Self { Self { repository } }
            }],
        );
        let code = generate(&descriptor);

        let lookup = quote!(let repository = scope.get_single::<HomeRepository>("")?;);
        let construct = quote!(Ok(::std::sync::Arc::new(HomePage::new(repository))));
        let is_scoped = quote!(fn is_scoped(&self) -> bool { false });
        let get_type = quote!(::core::any::TypeId::of::<dyn Page>());
        assert!(code.contains(&lookup.to_string()));
        assert!(code.contains(&construct.to_string()));
        assert!(code.contains(&is_scoped.to_string()));
        assert!(code.contains(&get_type.to_string()));
        assert!(code.contains(&quote!(pub struct HomePageKilnFactory;).to_string()));
    }

    #[test]
    fn resolves_in_declaration_order_and_passes_scope() {
        let descriptor = descriptor(
            parse_quote! {
                #[instance(type = dyn Page)]
                pub struct HomePage;
            },
            vec![parse_quote!(Page)],
            vec![parse_quote! {
                pub fn new(
                    #[classifier("main")] user: Option<Arc<UserData>>,
                    scope: &dyn Scope,
                    pages: Vec<Arc<dyn Page>>,
                ) -> Self { Self }
            }],
        );
        let code = generate(&descriptor);

        let optional = quote!(let user = scope.get_optional::<UserData>("main")?;).to_string();
        let many = quote!(let pages = scope.get_many::<dyn Page>("")?;).to_string();
        let construct = quote!(HomePage::new(user, scope, pages)).to_string();

        let optional_at = code.find(&optional).unwrap();
        let many_at = code.find(&many).unwrap();
        assert!(optional_at < many_at);
        assert!(code.contains(&construct));
        assert!(code.contains(&quote!(fn is_scoped(&self) -> bool { true }).to_string()));
    }

    #[test]
    fn lazy_parameters_are_wrapped_not_looked_up() {
        let descriptor = descriptor(
            parse_quote! {
                #[instance]
                pub struct Footer { settings: Lazy<Settings> }
            },
            Vec::new(),
            vec![parse_quote! {
                pub fn new(#[classifier("main")] settings: Lazy<Settings>) -> Self { Self { settings } }
            }],
        );
        let code = generate(&descriptor);

        let wrapped = quote!(let settings = ::kiln::Lazy::<Settings>::new(scope, "main")?;);
        assert!(code.contains(&wrapped.to_string()));
        assert!(!code.contains("get_single"));
        assert!(code.contains(&quote!(Footer::new(settings)).to_string()));
    }

    #[test]
    fn custom_factory_wraps_instantiation() {
        let descriptor = descriptor(
            parse_quote! {
                #[instance(type = dyn Page, factory = pool::Pooled, scoping = direct, classifier = "home")]
                pub struct HomePage;
            },
            vec![parse_quote!(Page)],
            Vec::new(),
        );
        let code = generate(&descriptor);

        let delegate = quote! {
            <pool::Pooled as ::kiln::CustomFactory<HomePage>>::create(
                scope,
                ::kiln::Scoping::Direct,
                "home",
                Self::instantiate,
            )
        };
        assert!(code.contains(&delegate.to_string()));
        assert!(code.contains(&quote!(Ok(::std::sync::Arc::new(HomePage))).to_string()));
    }

    #[test]
    fn missing_resolved_type_is_a_compiler_fault() {
        let mut descriptor = descriptor(
            parse_quote! {
                #[instance]
                struct Lonely;
            },
            Vec::new(),
            Vec::new(),
        );
        descriptor.resolved_types.clear();

        let options = Options::default();
        let err = FactoryGenerator::new(&options).generate(&descriptor).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }
}
