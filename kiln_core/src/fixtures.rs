//! Hand-built declarations for unit tests.

use proc_macro2::Ident;
use syn::{Fields, Generics, ImplItemFn, ItemFn, ItemStruct, Path, Type};

use crate::{
    declaration::{
        Constructor, ConstructorKind, FunctionDeclaration, Owner, Supertype, TypeDeclaration,
    },
    env::TypeSystem,
    model::Namespace,
};

pub(crate) fn app() -> Namespace {
    Namespace::root().child("app")
}

pub(crate) fn constructor(item: ImplItemFn) -> Constructor {
    Constructor {
        kind: ConstructorKind::Function(item.sig.ident.clone()),
        generics: item.sig.generics.clone(),
        inputs: item.sig.inputs.into_iter().collect(),
    }
}

/// Declares `item` in `app`; a unit struct without constructors gets the implicit one.
pub(crate) fn declare(item: ItemStruct, interfaces: Vec<Path>, constructors: Vec<ImplItemFn>) -> TypeDeclaration {
    let mut constructors: Vec<Constructor> = constructors.into_iter().map(constructor).collect();
    if constructors.is_empty() && matches!(item.fields, Fields::Unit) {
        constructors.push(Constructor::unit());
    }
    TypeDeclaration {
        namespace: app(),
        ident: item.ident,
        vis: item.vis,
        generics: item.generics,
        attrs: item.attrs,
        interfaces,
        supertype: Supertype::Root,
        constructors,
    }
}

pub(crate) fn function(item: ItemFn, owner: Option<Ident>) -> FunctionDeclaration {
    FunctionDeclaration {
        namespace: app(),
        owner: owner.map(|ident| Owner {
            ident,
            generics: Generics::default(),
        }),
        vis: item.vis,
        sig: item.sig,
        attrs: item.attrs,
    }
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        Type::TraitObject(object) => object.bounds.iter().find_map(|bound| match bound {
            syn::TypeParamBound::Trait(bound) => {
                bound.path.segments.last().map(|s| s.ident.to_string())
            }
            _ => None,
        }),
        _ => None,
    }
}

/// `(type, trait)` pairs standing in for scanned impls.
pub(crate) struct Impls(Vec<(String, String)>);

impl Impls {
    pub(crate) fn new(impls: &[(&str, &str)]) -> Self {
        Self(
            impls
                .iter()
                .map(|(ty, tr)| (ty.to_string(), tr.to_string()))
                .collect(),
        )
    }
}

impl TypeSystem for Impls {
    fn is_assignable(&self, _namespace: &Namespace, source: &Type, target: &Type) -> bool {
        let (Some(source_name), Some(target_name)) = (last_ident(source), last_ident(target)) else {
            return false;
        };
        match target {
            Type::TraitObject(_) => {
                matches!(source, Type::TraitObject(_)) && source_name == target_name
                    || self
                        .0
                        .iter()
                        .any(|(ty, tr)| *ty == source_name && *tr == target_name)
            }
            _ => source_name == target_name,
        }
    }
}
