use std::{
    fmt::{self, Display, Formatter},
    fs::read_to_string,
    mem::swap,
    path::{Path as FsPath, PathBuf},
};

use kiln_core::Namespace;
use log::{trace, warn};
use syn::{
    visit::{visit_item_mod, Visit},
    Attribute, Block, Ident, ImplItem, Item, ItemFn, ItemImpl, ItemMod, ItemStruct, ItemTrait,
    Meta,
};

use crate::{Error, Result};

/// A source file together with the module path it is mounted at.
#[derive(Debug, Clone)]
pub struct Module {
    root: PathBuf,
    file: PathBuf,
    namespace: Namespace,
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.namespace, self.file.display())
    }
}

impl Module {
    pub(crate) fn new(file: PathBuf) -> Result<Self> {
        Ok(Self {
            root: file
                .parent()
                .ok_or(Error::NoParent(file.to_string_lossy().to_string()))?
                .to_path_buf(),
            file,
            namespace: Namespace::root(),
        })
    }

    /// File backing `mod segment;`: `segment/mod.rs` or `segment.rs` below the
    /// directory of the current module.
    pub(crate) fn sub_module(&self, segment: &Ident) -> Option<Self> {
        let mut buf = self.root.to_path_buf();
        for parent in self.namespace.segments() {
            buf.push(parent);
        }
        buf.push(segment.to_string());
        buf.push("mod.rs");
        let file = if buf.is_file() {
            buf
        } else {
            // pop mod.rs
            buf.pop();
            buf.set_extension("rs");
            if buf.is_file() {
                buf
            } else {
                return None;
            }
        };

        Some(Self {
            root: self.root.clone(),
            file,
            namespace: self.namespace.child(segment),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn file(&self) -> &FsPath {
        &self.file
    }
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| match &attr.meta {
        Meta::List(list) if list.path.is_ident("cfg") => list.tokens.to_string() == "test",
        _ => false,
    })
}

/// Hooks called for every item the walk reaches, with the module it belongs to.
pub trait Scanner {
    fn file(&mut self, _module: &Module) -> Result<()> {
        Ok(())
    }

    fn item_struct(&mut self, _module: &Module, _i: &ItemStruct) -> Result<()> {
        Ok(())
    }

    fn item_impl(&mut self, _module: &Module, _i: &ItemImpl) -> Result<()> {
        Ok(())
    }

    fn item_fn(&mut self, _module: &Module, _i: &ItemFn) -> Result<()> {
        Ok(())
    }

    fn item_trait(&mut self, _module: &Module, _i: &ItemTrait) -> Result<()> {
        Ok(())
    }

    /// An item declared somewhere inside the body of the function `owner`.
    fn nested_item(&mut self, _module: &Module, _owner: &Ident, _i: &Item) -> Result<()> {
        Ok(())
    }
}

/// Items declared inside a function body, at any depth.
#[derive(Default)]
struct NestedItems<'ast> {
    items: Vec<&'ast Item>,
}

impl<'ast> NestedItems<'ast> {
    fn of(block: &'ast Block) -> Vec<&'ast Item> {
        let mut nested = Self::default();
        nested.visit_block(block);
        nested.items
    }
}

impl<'ast> Visit<'ast> for NestedItems<'ast> {
    fn visit_item(&mut self, i: &'ast Item) {
        self.items.push(i);
        syn::visit::visit_item(self, i);
    }
}

pub(crate) struct ScanVisit<T> {
    module: Module,
    scanner: T,
    error: Option<Error>,
}

impl<T> ScanVisit<T> {
    pub(crate) fn new(module: Module, scanner: T) -> Self {
        Self {
            module,
            scanner,
            error: None,
        }
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

impl<T: Scanner> ScanVisit<T> {
    fn nested(&mut self, owner: &Ident, block: &Block) {
        for item in NestedItems::of(block) {
            let result = self.scanner.nested_item(&self.module, owner, item);
            self.record(result);
        }
    }
}

impl<'ast, T> Visit<'ast> for ScanVisit<T>
where
    T: Scanner,
{
    // items nested in function bodies are not reachable by module path
    fn visit_item_fn(&mut self, i: &'ast ItemFn) {
        let result = self.scanner.item_fn(&self.module, i);
        self.record(result);
        self.nested(&i.sig.ident, &i.block);
    }

    fn visit_item_impl(&mut self, i: &'ast ItemImpl) {
        let result = self.scanner.item_impl(&self.module, i);
        self.record(result);
        for impl_item in i.items.iter() {
            if let ImplItem::Fn(function) = impl_item {
                self.nested(&function.sig.ident, &function.block);
            }
        }
    }

    fn visit_item_trait(&mut self, i: &'ast ItemTrait) {
        let result = self.scanner.item_trait(&self.module, i);
        self.record(result);
    }

    fn visit_item_mod(&mut self, i: &'ast ItemMod) {
        if is_cfg_test(&i.attrs) {
            return;
        }

        if i.content.is_none() {
            let Some(mut module) = self.module.sub_module(&i.ident) else {
                warn!("no source file for `mod {}` in {}", i.ident, self.module);
                return;
            };

            let file = match read_to_string(module.file()) {
                Ok(string) => syn::parse_file(&string).map_err(Error::from),
                Err(err) => Err(Error::from(err)),
            };
            let file = match file {
                Ok(file) => file,
                Err(err) => {
                    self.record(Err(err));
                    return;
                }
            };

            swap(&mut self.module, &mut module);
            let result = self.scanner.file(&self.module);
            self.record(result);
            self.visit_file(&file);
            swap(&mut self.module, &mut module);
        } else {
            let mut module = Module {
                namespace: self.module.namespace.child(&i.ident),
                ..self.module.clone()
            };

            swap(&mut self.module, &mut module);
            visit_item_mod(self, i);
            swap(&mut self.module, &mut module);
        }
    }

    fn visit_item_struct(&mut self, i: &'ast ItemStruct) {
        let result = self.scanner.item_struct(&self.module, i);
        self.record(result);
    }
}

impl<T: Scanner> ScanVisit<T> {
    pub(crate) fn scan(mut self) -> Result<T> {
        trace!("scanning {}", self.module);
        let string = read_to_string(&self.module.file)?;
        let file = syn::parse_file(&string)?;
        let result = self.scanner.file(&self.module);
        self.record(result);
        self.visit_file(&file);
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.scanner),
        }
    }
}
