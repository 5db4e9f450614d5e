use proc_macro2::Ident;
use quote::{format_ident, quote};

use crate::{
    env::{GeneratedUnit, UnitKind},
    generate::factory::scoping_tokens,
    model::FactoryDescriptor,
    Error, Options, Result,
};

/// Registers a factory in the link-time instance index, once per resolved type.
pub struct IndexGenerator<'a> {
    options: &'a Options,
}

impl<'a> IndexGenerator<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    pub fn generate(&self, descriptor: &FactoryDescriptor) -> Result<GeneratedUnit> {
        if descriptor.resolved_types.is_empty() {
            return Err(Error::internal(
                &descriptor.element,
                "descriptor reached indexing without a resolved type",
            ));
        }

        let kiln = &self.options.runtime;
        let factory_name = &descriptor.factory_name;
        let factory_path = descriptor.namespace.qualify(factory_name);
        let classifier = descriptor.classifier();
        let scoping = scoping_tokens(kiln, descriptor);

        let types = &descriptor.resolved_types;
        let creators: Vec<Ident> = (0..types.len())
            .map(|i| format_ident!("__kiln_create_{}", i))
            .collect();
        let entries: Vec<Ident> = (0..types.len())
            .map(|i| format_ident!("__KILN_INDEX_{}_{}", factory_name, i))
            .collect();

        let tokens = quote! {
            impl #factory_name {
                #(
                    #[doc(hidden)]
                    fn #creators(scope: &dyn #kiln::Scope) -> #kiln::Result<#kiln::Erased> {
                        let instance: ::std::sync::Arc<#types> = Self::produce(scope)?;
                        let erased: #kiln::Erased = ::std::boxed::Box::new(instance);
                        Ok(erased)
                    }
                )*
            }

            #(
                #[#kiln::linkme::distributed_slice(#kiln::INSTANCE_INDEX)]
                #[linkme(crate = #kiln::linkme)]
                #[allow(non_upper_case_globals)]
                static #entries: #kiln::IndexEntry = #kiln::IndexEntry {
                    type_id: #kiln::type_id_of::<#types>,
                    type_name: ::core::any::type_name::<#types>,
                    classifier: #classifier,
                    scoping: #scoping,
                    factory: #factory_path,
                    create: #factory_name::#creators,
                };
            )*
        };

        Ok(GeneratedUnit {
            name: factory_name.to_string(),
            kind: UnitKind::Index,
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::{builder::Builder, fixtures};

    fn both() -> FactoryDescriptor {
        let options = Options::default();
        let types = fixtures::Impls::new(&[("Both", "A"), ("Both", "B")]);
        let decl = fixtures::declare(
            parse_quote! {
                #[instance(types(dyn A, dyn B), classifier = "pair")]
                pub struct Both;
            },
            vec![parse_quote!(A), parse_quote!(B)],
            Vec::new(),
        );
        Builder::new(&options, &types)
            .build_for_type(&decl)
            .unwrap()
            .remove(0)
    }

    #[test]
    fn entry_names_keep_the_factory_name() {
        let options = Options::default();
        let mut lower = both();
        lower.factory_name = format_ident!("aBKilnFactory");
        let mut snake = both();
        snake.factory_name = format_ident!("A_bKilnFactory");

        let lower = IndexGenerator::new(&options).generate(&lower).unwrap().tokens.to_string();
        let snake = IndexGenerator::new(&options).generate(&snake).unwrap().tokens.to_string();
        assert!(lower.contains("__KILN_INDEX_aBKilnFactory_0"));
        assert!(snake.contains("__KILN_INDEX_A_bKilnFactory_0"));
        assert!(lower.contains("allow (non_upper_case_globals)"));
    }

    #[test]
    fn one_entry_per_resolved_type() {
        let options = Options::default();
        let unit = IndexGenerator::new(&options).generate(&both()).unwrap();
        assert_eq!(UnitKind::Index, unit.kind);
        assert_eq!("BothKilnFactory", unit.name);

        let file: syn::File = syn::parse2(unit.tokens.clone()).unwrap();
        println!("{}", prettyplease::unparse(&file));

        let code = unit.tokens.to_string();
        assert_eq!(2, code.matches(":: kiln :: IndexEntry = :: kiln :: IndexEntry").count());
        assert!(code.contains(&quote!(type_id: ::kiln::type_id_of::<dyn A>,).to_string()));
        assert!(code.contains(&quote!(type_id: ::kiln::type_id_of::<dyn B>,).to_string()));
        assert!(code.contains(&quote!(factory: "app::BothKilnFactory",).to_string()));
        assert!(code.contains(&quote!(classifier: "pair",).to_string()));
        assert!(code.contains(&quote!(create: BothKilnFactory::__kiln_create_1,).to_string()));
        assert!(code.contains("__KILN_INDEX_BothKilnFactory_1"));
    }

    #[test]
    fn unresolved_descriptor_is_a_compiler_fault() {
        let mut descriptor = both();
        descriptor.resolved_types.clear();
        let options = Options::default();
        let err = IndexGenerator::new(&options).generate(&descriptor).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }
}
