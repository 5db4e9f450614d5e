use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use proc_macro2::Ident;
use syn::{Path, Type, Visibility};

/// Module path of a declaration, relative to the crate root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace(Vec<String>);

impl Namespace {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, name: impl ToString) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// `app::HomePage` for an item `HomePage` in `app`; crate-root items keep their bare name.
    pub fn qualify(&self, name: impl Display) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}::{}", self.0.join("::"), name)
        }
    }

    /// Directory of the namespace below the generated output root.
    pub fn relative_dir(&self) -> PathBuf {
        self.0.iter().collect()
    }
}

impl<S: ToString> FromIterator<S> for Namespace {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(|s| s.to_string()).collect())
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("crate")?;
        for segment in self.0.iter() {
            write!(f, "::{segment}")?;
        }
        Ok(())
    }
}

/// Whether and where a produced instance is cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scoping {
    Unscoped,
    Direct,
    #[default]
    Topmost,
}

impl Scoping {
    pub fn is_scoped(self) -> bool {
        self != Scoping::Unscoped
    }

    pub fn variant(self) -> &'static str {
        match self {
            Scoping::Unscoped => "Unscoped",
            Scoping::Direct => "Direct",
            Scoping::Topmost => "Topmost",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "unscoped" => Some(Scoping::Unscoped),
            "direct" => Some(Scoping::Direct),
            "topmost" => Some(Scoping::Topmost),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSelector {
    Single(Type),
    Multiple(Vec<Type>),
}

/// How a dependency is looked up in the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// `Arc<T>`, fails when absent or ambiguous.
    Single,
    /// `Option<Arc<T>>`.
    Optional,
    /// `Vec<Arc<T>>`.
    Many,
    /// `Lazy<T>`, a single lookup deferred to first access.
    Lazy,
}

impl Cardinality {
    pub fn method(self) -> &'static str {
        match self {
            Cardinality::Single | Cardinality::Lazy => "get_single",
            Cardinality::Optional => "get_optional",
            Cardinality::Many => "get_many",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: Ident,
    /// The looked up type; for a scope handle, the declared parameter type.
    pub ty: Type,
    pub scope_handle: bool,
    pub classifier: Option<String>,
    pub cardinality: Cardinality,
}

impl ParameterDescriptor {
    pub fn is_optional(&self) -> bool {
        self.cardinality == Cardinality::Optional
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `HomePage::new(..)`, `Page::provide(..)` or a free `provide(..)`.
    Function(Path),
    /// Unit struct literal.
    Unit(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Construction {
    pub call: Call,
    /// Type behind the `Arc` that construction yields.
    pub product: Type,
    /// The call already returns `Arc<product>`.
    pub returns_arc: bool,
}

#[derive(Debug, Clone)]
pub struct FactoryDescriptor {
    /// Qualified name of the declaring item, used in diagnostics.
    pub element: String,
    pub namespace: Namespace,
    pub vis: Visibility,
    pub factory_name: Ident,
    pub construction: Construction,
    pub parameters: Vec<ParameterDescriptor>,
    pub selector: TypeSelector,
    pub resolved_types: Vec<Type>,
    pub scoping: Scoping,
    pub custom_factory: Option<Path>,
    pub classifier: Option<String>,
    pub disabled: bool,
}

impl FactoryDescriptor {
    pub fn primary_type(&self) -> Option<&Type> {
        self.resolved_types.first()
    }

    pub fn classifier(&self) -> &str {
        self.classifier.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_display() {
        let ns = Namespace::root().child("app").child("extension");
        assert_eq!("crate::app::extension", ns.to_string());
        assert_eq!("app::extension::HomePage", ns.qualify("HomePage"));
        assert_eq!(PathBuf::from("app/extension"), ns.relative_dir());
        assert_eq!(Some(Namespace::root().child("app")), ns.parent());
        assert_eq!("HomePage", Namespace::root().qualify("HomePage"));
        assert_eq!(None, Namespace::root().parent());
    }

    #[test]
    fn scoping_names() {
        assert_eq!(Some(Scoping::Direct), Scoping::from_name("DIRECT"));
        assert_eq!(Some(Scoping::Unscoped), Scoping::from_name("Unscoped"));
        assert_eq!(None, Scoping::from_name("sometimes"));
        assert!(!Scoping::Unscoped.is_scoped());
        assert!(Scoping::default().is_scoped());
    }
}
