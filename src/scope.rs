use std::{
    any::{type_name, Any, TypeId},
    sync::Arc,
};

use crate::{KilnError, Result};

/// An `Arc<T>` with its type erased.
pub type Erased = Box<dyn Any>;

/// What a factory asks its scope for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// `""` when the dependency is not classified.
    pub classifier: &'a str,
}

impl<'a> Request<'a> {
    pub fn of<T: ?Sized + 'static>(classifier: &'a str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            classifier,
        }
    }
}

/// The dependency container generated factories resolve their parameters from.
///
/// Implementations return every instance matching the request, each boxed as
/// an `Arc<T>` of the requested type. The typed lookups on `dyn Scope` decide
/// what a count other than one means.
pub trait Scope {
    fn resolve(&self, request: &Request<'_>) -> Result<Vec<Erased>>;

    /// An owned handle to this scope, for lookups deferred past construction
    /// such as [`Lazy`](crate::Lazy) parameters. Scopes that cannot hand one
    /// out keep the default.
    fn handle(&self) -> Option<Arc<dyn Scope>> {
        None
    }
}

impl<'s> dyn Scope + 's {
    fn typed<T: ?Sized + 'static>(&self, classifier: &str) -> Result<Vec<Arc<T>>> {
        self.resolve(&Request::of::<T>(classifier))?
            .into_iter()
            .map(|erased| {
                erased
                    .downcast::<Arc<T>>()
                    .map(|instance| *instance)
                    .map_err(|_| KilnError::TypeMismatch {
                        type_name: type_name::<T>(),
                    })
            })
            .collect()
    }

    /// Exactly one instance, else [`KilnError::NotFound`] or [`KilnError::Ambiguous`].
    pub fn get_single<T: ?Sized + 'static>(&self, classifier: &str) -> Result<Arc<T>> {
        let mut instances = self.typed::<T>(classifier)?;
        match instances.len() {
            1 => Ok(instances.remove(0)),
            0 => Err(KilnError::NotFound {
                type_name: type_name::<T>(),
                classifier: classifier.to_string(),
            }),
            count => Err(KilnError::Ambiguous {
                type_name: type_name::<T>(),
                classifier: classifier.to_string(),
                count,
            }),
        }
    }

    pub fn get_optional<T: ?Sized + 'static>(&self, classifier: &str) -> Result<Option<Arc<T>>> {
        let mut instances = self.typed::<T>(classifier)?;
        match instances.len() {
            0 => Ok(None),
            1 => Ok(Some(instances.remove(0))),
            count => Err(KilnError::Ambiguous {
                type_name: type_name::<T>(),
                classifier: classifier.to_string(),
                count,
            }),
        }
    }

    pub fn get_many<T: ?Sized + 'static>(&self, classifier: &str) -> Result<Vec<Arc<T>>> {
        self.typed::<T>(classifier)
    }
}
