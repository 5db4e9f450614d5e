//! What the scan learned about the crate: its structs, impls, factory functions
//! and traits, indexed by the module they live in.

use std::{
    collections::HashSet,
    path::{Path as FsPath, PathBuf},
};

use kiln_core::{
    declaration::is_marker, Constructor, ConstructorKind, Declaration, Enumerator,
    FunctionDeclaration, MisplacedDeclaration, Namespace, Options, Owner, Supertype,
    TypeDeclaration, TypeSystem,
};
use log::debug;
use quote::ToTokens;
use syn::{
    Attribute, Fields, Generics, Ident, ImplItem, ImplItemFn, Item, ItemFn, ItemImpl, ItemStruct,
    ItemTrait, Path, PathSegment, ReturnType, Type, TypeParamBound,
};

use crate::{
    scan::{Module, ScanVisit, Scanner},
    Result,
};

type Key = (Namespace, String);

struct Scanned<T> {
    namespace: Namespace,
    item: T,
}

/// A struct or function declared inside the body of `owner`.
struct Nested {
    owner: Ident,
    ident: Ident,
    attrs: Vec<Attribute>,
}

fn strip(ty: &Type) -> &Type {
    match ty {
        Type::Paren(inner) => strip(&inner.elem),
        Type::Group(inner) => strip(&inner.elem),
        other => other,
    }
}

fn last_ident(path: &Path) -> Option<String> {
    path.segments.last().map(|segment| segment.ident.to_string())
}

fn trait_name(ty: &Type) -> Option<String> {
    let Type::TraitObject(object) = strip(ty) else {
        return None;
    };
    object.bounds.iter().find_map(|bound| match bound {
        TypeParamBound::Trait(bound) => last_ident(&bound.path),
        _ => None,
    })
}

/// Module and name `path` refers to when written inside `namespace`.
fn resolve_path(namespace: &Namespace, path: &Path) -> Option<Key> {
    if path.leading_colon.is_some() {
        return None;
    }
    let segments: Vec<&PathSegment> = path.segments.iter().collect();
    let (last, mut rest) = segments.split_last()?;
    let mut resolved = namespace.clone();

    match rest.first() {
        Some(segment) if segment.ident == "crate" => {
            resolved = Namespace::root();
            rest = &rest[1..];
        }
        Some(segment) if segment.ident == "self" => rest = &rest[1..],
        _ => {}
    }
    while let Some(segment) = rest.first() {
        if segment.ident != "super" {
            break;
        }
        resolved = resolved.parent()?;
        rest = &rest[1..];
    }
    for segment in rest {
        resolved = resolved.child(&segment.ident);
    }
    Some((resolved, last.ident.to_string()))
}

fn resolve_type(namespace: &Namespace, ty: &Type) -> Option<Key> {
    match strip(ty) {
        Type::Path(path) if path.qself.is_none() => resolve_path(namespace, &path.path),
        _ => None,
    }
}

/// Std traits that a derive could equally provide; they never name an instance type.
const DERIVABLE: [&str; 13] = [
    "Clone", "Copy", "Debug", "Default", "PartialEq", "Eq", "PartialOrd", "Ord", "Hash", "Send",
    "Sync", "Unpin", "Drop",
];

/// `impl<T: Bound> Trait for T`
fn is_blanket(imp: &ItemImpl) -> bool {
    let Type::Path(path) = strip(&imp.self_ty) else {
        return false;
    };
    let Some(ident) = path.path.get_ident() else {
        return false;
    };
    path.qself.is_none() && imp.generics.type_params().any(|param| param.ident == *ident)
}

fn merge_generics(outer: &Generics, inner: &Generics) -> Generics {
    let mut generics = outer.clone();
    generics.params.extend(inner.params.iter().cloned());
    generics
}

fn returns_self(function: &ImplItemFn, ident: &Ident) -> bool {
    let ReturnType::Type(_, ty) = &function.sig.output else {
        return false;
    };
    match strip(ty) {
        Type::Path(path) if path.qself.is_none() => {
            path.path.is_ident("Self") || path.path.is_ident(ident)
        }
        _ => false,
    }
}

#[derive(Default)]
pub struct TypeSpace {
    structs: Vec<Scanned<ItemStruct>>,
    impls: Vec<Scanned<ItemImpl>>,
    functions: Vec<Scanned<ItemFn>>,
    nested: Vec<Scanned<Nested>>,
    traits: HashSet<String>,
    files: Vec<PathBuf>,
    inject: String,
}

impl TypeSpace {
    pub fn new(options: &Options) -> Self {
        Self {
            inject: options.inject.clone(),
            ..Default::default()
        }
    }

    /// Walks the module tree rooted at `file`, usually `src/lib.rs`.
    pub fn scan(file: impl AsRef<FsPath>, options: &Options) -> Result<Self> {
        let module = Module::new(file.as_ref().to_path_buf())?;
        let space = ScanVisit::new(module, Self::new(options)).scan()?;
        debug!(
            "scanned {} file(s): {} struct(s), {} impl(s), {} function(s)",
            space.files.len(),
            space.structs.len(),
            space.impls.len(),
            space.functions.len()
        );
        Ok(space)
    }

    /// Every source file the scan read.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Namespaces declaring at least one `marker` item, failed or disabled ones included.
    pub fn annotated_namespaces(&self, marker: &str) -> Vec<Namespace> {
        let mut namespaces: Vec<Namespace> = self
            .annotated(marker)
            .iter()
            .map(|declaration| declaration.namespace().clone())
            .collect();
        namespaces.sort();
        namespaces.dedup();
        namespaces
    }

    fn impls_of<'a>(&'a self, key: &'a Key) -> impl Iterator<Item = &'a ItemImpl> + 'a {
        self.impls
            .iter()
            .filter(move |scanned| resolve_type(&scanned.namespace, &scanned.item.self_ty).as_ref() == Some(key))
            .map(|scanned| &scanned.item)
    }

    fn is_struct(&self, key: &Key) -> bool {
        self.structs
            .iter()
            .any(|scanned| scanned.namespace == key.0 && scanned.item.ident == key.1)
    }

    fn type_declaration(&self, scanned: &Scanned<ItemStruct>, marker: &str) -> TypeDeclaration {
        let item = &scanned.item;
        let key = (scanned.namespace.clone(), item.ident.to_string());

        let mut interfaces = Vec::new();
        let mut supertype = Supertype::Root;
        let mut candidates = Vec::new();

        for imp in self.impls_of(&key) {
            match &imp.trait_ {
                Some((None, path, _)) => match last_ident(path).as_deref() {
                    Some("Deref") => {
                        let target = imp.items.iter().find_map(|impl_item| match impl_item {
                            ImplItem::Type(ty) if ty.ident == "Target" => Some(ty.ty.clone()),
                            _ => None,
                        });
                        if let Some(target) = target {
                            supertype = Supertype::Deref(target);
                        }
                    }
                    Some(name) if name == "DerefMut" || DERIVABLE.contains(&name) => {}
                    _ => interfaces.push(path.clone()),
                },
                // negative impls
                Some((Some(_), _, _)) => {}
                None => {
                    for impl_item in imp.items.iter() {
                        let ImplItem::Fn(function) = impl_item else {
                            continue;
                        };
                        if function.sig.receiver().is_some()
                            || !returns_self(function, &item.ident)
                            || function.attrs.iter().any(|attr| is_marker(attr, marker))
                        {
                            continue;
                        }
                        let injected = function.attrs.iter().any(|attr| is_marker(attr, &self.inject));
                        candidates.push((
                            injected,
                            Constructor {
                                kind: ConstructorKind::Function(function.sig.ident.clone()),
                                generics: merge_generics(&imp.generics, &function.sig.generics),
                                inputs: function.sig.inputs.iter().cloned().collect(),
                            },
                        ));
                    }
                }
            }
        }

        let any_injected = candidates.iter().any(|(injected, _)| *injected);
        let mut constructors: Vec<Constructor> = candidates
            .into_iter()
            .filter(|(injected, _)| *injected || !any_injected)
            .map(|(_, constructor)| constructor)
            .collect();
        if constructors.is_empty() && matches!(item.fields, Fields::Unit) {
            constructors.push(Constructor::unit());
        }

        TypeDeclaration {
            namespace: scanned.namespace.clone(),
            ident: item.ident.clone(),
            vis: item.vis.clone(),
            generics: item.generics.clone(),
            attrs: item.attrs.clone(),
            interfaces,
            supertype,
            constructors,
        }
    }
}

impl Scanner for TypeSpace {
    fn file(&mut self, module: &Module) -> Result<()> {
        self.files.push(module.file().to_path_buf());
        Ok(())
    }

    fn item_struct(&mut self, module: &Module, i: &ItemStruct) -> Result<()> {
        self.structs.push(Scanned {
            namespace: module.namespace().clone(),
            item: i.clone(),
        });
        Ok(())
    }

    fn item_impl(&mut self, module: &Module, i: &ItemImpl) -> Result<()> {
        self.impls.push(Scanned {
            namespace: module.namespace().clone(),
            item: i.clone(),
        });
        Ok(())
    }

    fn item_fn(&mut self, module: &Module, i: &ItemFn) -> Result<()> {
        self.functions.push(Scanned {
            namespace: module.namespace().clone(),
            item: i.clone(),
        });
        Ok(())
    }

    fn item_trait(&mut self, _module: &Module, i: &ItemTrait) -> Result<()> {
        self.traits.insert(i.ident.to_string());
        Ok(())
    }

    fn nested_item(&mut self, module: &Module, owner: &Ident, i: &Item) -> Result<()> {
        let (ident, attrs) = match i {
            Item::Struct(item) => (&item.ident, &item.attrs),
            Item::Fn(item) => (&item.sig.ident, &item.attrs),
            _ => return Ok(()),
        };
        self.nested.push(Scanned {
            namespace: module.namespace().clone(),
            item: Nested {
                owner: owner.clone(),
                ident: ident.clone(),
                attrs: attrs.clone(),
            },
        });
        Ok(())
    }
}

impl Enumerator for TypeSpace {
    fn annotated(&self, marker: &str) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        for scanned in self.structs.iter() {
            if scanned.item.attrs.iter().any(|attr| is_marker(attr, marker)) {
                declarations.push(Declaration::Type(self.type_declaration(scanned, marker)));
            }
        }

        for scanned in self.impls.iter() {
            let Type::Path(self_ty) = strip(&scanned.item.self_ty) else {
                continue;
            };
            let Some(owner) = self_ty.path.segments.last().map(|segment| segment.ident.clone()) else {
                continue;
            };
            for impl_item in scanned.item.items.iter() {
                let ImplItem::Fn(function) = impl_item else {
                    continue;
                };
                if !function.attrs.iter().any(|attr| is_marker(attr, marker)) {
                    continue;
                }
                let declaration = if scanned.item.trait_.is_some() {
                    Declaration::Misplaced(MisplacedDeclaration {
                        namespace: scanned.namespace.clone(),
                        element: scanned
                            .namespace
                            .qualify(format_args!("{}::{}", owner, function.sig.ident)),
                        attrs: function.attrs.clone(),
                        reason: format!(
                            "#[{marker}] function `{}` must be declared in an inherent impl, not in a trait impl",
                            function.sig.ident
                        ),
                    })
                } else {
                    Declaration::Function(FunctionDeclaration {
                        namespace: scanned.namespace.clone(),
                        owner: Some(Owner {
                            ident: owner.clone(),
                            generics: scanned.item.generics.clone(),
                        }),
                        vis: function.vis.clone(),
                        sig: function.sig.clone(),
                        attrs: function.attrs.clone(),
                    })
                };
                declarations.push(declaration);
            }
        }

        for scanned in self.functions.iter() {
            if scanned.item.attrs.iter().any(|attr| is_marker(attr, marker)) {
                declarations.push(Declaration::Function(FunctionDeclaration {
                    namespace: scanned.namespace.clone(),
                    owner: None,
                    vis: scanned.item.vis.clone(),
                    sig: scanned.item.sig.clone(),
                    attrs: scanned.item.attrs.clone(),
                }));
            }
        }

        for scanned in self.nested.iter() {
            let nested = &scanned.item;
            if nested.attrs.iter().any(|attr| is_marker(attr, marker)) {
                declarations.push(Declaration::Misplaced(MisplacedDeclaration {
                    namespace: scanned.namespace.clone(),
                    element: scanned
                        .namespace
                        .qualify(format_args!("{}::{}", nested.owner, nested.ident)),
                    attrs: nested.attrs.clone(),
                    reason: format!(
                        "#[{marker}] item `{}` is declared inside the body of `{}`; move it to module level",
                        nested.ident, nested.owner
                    ),
                }));
            }
        }

        declarations
    }
}

impl TypeSystem for TypeSpace {
    fn is_assignable(&self, namespace: &Namespace, source: &Type, target: &Type) -> bool {
        if source.to_token_stream().to_string() == target.to_token_stream().to_string() {
            return true;
        }

        match strip(target) {
            Type::TraitObject(_) => {
                let Some(name) = trait_name(target) else {
                    return true;
                };
                if let Some(source_name) = trait_name(source) {
                    return source_name == name;
                }
                // traits declared outside the crate, derives included, are left to rustc
                if !self.traits.contains(&name) {
                    return true;
                }
                let blanket = self.impls.iter().any(|scanned| {
                    matches!(&scanned.item.trait_, Some((None, path, _)) if last_ident(path).as_deref() == Some(name.as_str()))
                        && is_blanket(&scanned.item)
                });
                if blanket {
                    return true;
                }
                match resolve_type(namespace, source) {
                    Some(key) if self.is_struct(&key) => self.impls_of(&key).any(|imp| {
                        matches!(&imp.trait_, Some((None, path, _)) if last_ident(path).as_deref() == Some(name.as_str()))
                    }),
                    _ => true,
                }
            }
            Type::Path(target) => match strip(source) {
                Type::Path(source) => last_ident(&source.path) == last_ident(&target.path),
                _ => false,
            },
            _ => false,
        }
    }
}
