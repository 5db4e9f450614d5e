use std::{
    any::type_name,
    fmt::{self, Debug, Formatter},
    sync::{Arc, OnceLock},
};

use crate::{KilnError, Result, Scope};

/// A required dependency looked up on first access instead of at construction.
///
/// Holds an owned handle of the scope it was created from, so the scope must
/// implement [`Scope::handle`]. The first successful lookup is kept.
pub struct Lazy<T: ?Sized + 'static> {
    scope: Arc<dyn Scope>,
    classifier: &'static str,
    instance: OnceLock<Arc<T>>,
}

impl<T: ?Sized + 'static> Lazy<T> {
    pub fn new(scope: &dyn Scope, classifier: &'static str) -> Result<Self> {
        let scope = scope.handle().ok_or(KilnError::Detached {
            type_name: type_name::<T>(),
        })?;
        Ok(Self {
            scope,
            classifier,
            instance: OnceLock::new(),
        })
    }

    pub fn classifier(&self) -> &'static str {
        self.classifier
    }

    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Resolves the instance through [`get_single`](Scope::get_single) on first call.
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(instance) = self.instance.get() {
            return Ok(instance.clone());
        }
        let instance = self.scope.get_single::<T>(self.classifier)?;
        Ok(self.instance.get_or_init(|| instance).clone())
    }
}

impl<T: ?Sized + 'static> Debug for Lazy<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("type_name", &type_name::<T>())
            .field("classifier", &self.classifier)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
