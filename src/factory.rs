use std::sync::Arc;

use crate::{Result, Scope};

/// Whether and where a produced instance is cached by the scope that owns it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scoping {
    /// A new instance per lookup.
    Unscoped,
    /// Cached in the scope the lookup is made on.
    Direct,
    /// Cached in the outermost scope.
    #[default]
    Topmost,
}

impl Scoping {
    pub fn is_scoped(self) -> bool {
        self != Scoping::Unscoped
    }
}

/// Implemented by every generated `*KilnFactory`.
pub trait InstanceFactory {
    type Instance: ?Sized + 'static;

    fn create(&self, scope: &dyn Scope) -> Result<Arc<Self::Instance>>;

    fn is_scoped(&self) -> bool;

    fn scoping(&self) -> Scoping;

    /// `""` when the instance is not classified.
    fn classifier(&self) -> &'static str;
}

/// Builds the instance from its resolved dependencies.
pub type Instantiate<T> = fn(&dyn Scope) -> Result<Arc<T>>;

/// Takes over instance creation for `#[instance(factory = ..)]`.
///
/// `instantiate` runs the generated construction; a custom factory may wrap
/// it, pool its results or bypass it entirely.
pub trait CustomFactory<T: ?Sized> {
    fn create(
        scope: &dyn Scope,
        scoping: Scoping,
        classifier: &str,
        instantiate: Instantiate<T>,
    ) -> Result<Arc<T>>;
}
