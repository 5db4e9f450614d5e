//! Source declarations as handed over by an [`Enumerator`](crate::env::Enumerator).

use proc_macro2::Ident;
use syn::{Attribute, FnArg, Generics, Path, Signature, Type, Visibility};

use crate::model::Namespace;

/// `true` when the attribute path ends with `marker`, so both `#[instance]` and
/// `#[kiln::instance]` match.
pub fn is_marker(attr: &Attribute, marker: &str) -> bool {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident == marker)
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Supertype {
    Root,
    /// `impl Deref for Type { type Target = .. }`
    Deref(Type),
}

#[derive(Debug, Clone)]
pub enum ConstructorKind {
    Function(Ident),
    /// Implicit constructor of a unit struct.
    Unit,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub kind: ConstructorKind,
    /// Generic parameters in scope: the impl block's followed by the function's.
    pub generics: Generics,
    pub inputs: Vec<FnArg>,
}

impl Constructor {
    pub fn unit() -> Self {
        Self {
            kind: ConstructorKind::Unit,
            generics: Generics::default(),
            inputs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    pub namespace: Namespace,
    pub ident: Ident,
    pub vis: Visibility,
    pub generics: Generics,
    pub attrs: Vec<Attribute>,
    pub interfaces: Vec<Path>,
    pub supertype: Supertype,
    pub constructors: Vec<Constructor>,
}

/// Self type of the impl block an associated factory function lives in.
#[derive(Debug, Clone)]
pub struct Owner {
    pub ident: Ident,
    pub generics: Generics,
}

#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    pub namespace: Namespace,
    pub owner: Option<Owner>,
    pub vis: Visibility,
    pub sig: Signature,
    pub attrs: Vec<Attribute>,
}

/// A marked item no factory can be generated for, such as a method of a
/// trait impl or an item nested in a function body.
#[derive(Debug, Clone)]
pub struct MisplacedDeclaration {
    pub namespace: Namespace,
    pub element: String,
    pub attrs: Vec<Attribute>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub enum Declaration {
    Type(TypeDeclaration),
    Function(FunctionDeclaration),
    Misplaced(MisplacedDeclaration),
}

impl TypeDeclaration {
    pub fn element(&self) -> String {
        self.namespace.qualify(&self.ident)
    }
}

impl FunctionDeclaration {
    pub fn element(&self) -> String {
        match &self.owner {
            Some(owner) => self
                .namespace
                .qualify(format_args!("{}::{}", owner.ident, self.sig.ident)),
            None => self.namespace.qualify(&self.sig.ident),
        }
    }
}

impl Declaration {
    pub fn element(&self) -> String {
        match self {
            Declaration::Type(decl) => decl.element(),
            Declaration::Function(decl) => decl.element(),
            Declaration::Misplaced(decl) => decl.element.clone(),
        }
    }

    pub fn attrs(&self) -> &[Attribute] {
        match self {
            Declaration::Type(decl) => &decl.attrs,
            Declaration::Function(decl) => &decl.attrs,
            Declaration::Misplaced(decl) => &decl.attrs,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            Declaration::Type(decl) => &decl.namespace,
            Declaration::Function(decl) => &decl.namespace,
            Declaration::Misplaced(decl) => &decl.namespace,
        }
    }

    pub fn is_annotated(&self, marker: &str) -> bool {
        self.attrs().iter().any(|attr| is_marker(attr, marker))
    }
}

#[cfg(test)]
mod tests {
    use syn::{parse_quote, ItemFn};

    use super::*;

    #[test]
    fn marker_matches_last_segment() {
        let plain: Attribute = parse_quote!(#[instance(type = dyn Page)]);
        let qualified: Attribute = parse_quote!(#[kiln::instance]);
        let other: Attribute = parse_quote!(#[instance_of]);
        assert!(is_marker(&plain, "instance"));
        assert!(is_marker(&qualified, "instance"));
        assert!(!is_marker(&other, "instance"));
    }

    #[test]
    fn function_element_includes_owner() {
        let item: ItemFn = parse_quote! {
            pub fn provide() -> Page { Page }
        };
        let decl = FunctionDeclaration {
            namespace: Namespace::root().child("app"),
            owner: Some(Owner {
                ident: parse_quote!(Page),
                generics: Generics::default(),
            }),
            vis: item.vis,
            sig: item.sig,
            attrs: Vec::new(),
        };
        assert_eq!("app::Page::provide", decl.element());
    }
}
