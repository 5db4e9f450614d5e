use std::{
    any::TypeId,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use linkme::distributed_slice;

use crate::{Erased, KilnError, Result, Scope, Scoping};

/// One factory registered under one of the types it provides.
pub struct IndexEntry {
    pub type_id: fn() -> TypeId,
    pub type_name: fn() -> &'static str,
    pub classifier: &'static str,
    pub scoping: Scoping,
    /// Path of the factory struct below the crate root.
    pub factory: &'static str,
    /// Creates the instance as an erased `Arc` of the indexed type.
    pub create: fn(&dyn Scope) -> Result<Erased>,
}

impl Debug for IndexEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexEntry")
            .field("type_name", &(self.type_name)())
            .field("classifier", &self.classifier)
            .field("scoping", &self.scoping)
            .field("factory", &self.factory)
            .finish()
    }
}

impl IndexEntry {
    pub fn provides(&self, type_id: TypeId, classifier: &str) -> bool {
        (self.type_id)() == type_id && self.classifier == classifier
    }

    pub fn create_as<T: ?Sized + 'static>(&self, scope: &dyn Scope) -> Result<Arc<T>> {
        let erased = (self.create)(scope)?;
        erased
            .downcast::<Arc<T>>()
            .map(|instance| *instance)
            .map_err(|_| KilnError::TypeMismatch {
                type_name: (self.type_name)(),
            })
    }
}

/// Every generated factory, once per resolved type, collected at link time.
#[distributed_slice]
pub static INSTANCE_INDEX: [IndexEntry] = [..];

/// `TypeId::of` as a plain function pointer for index entries.
pub fn type_id_of<T: ?Sized + 'static>() -> TypeId {
    TypeId::of::<T>()
}

pub fn index() -> &'static [IndexEntry] {
    &INSTANCE_INDEX
}

/// Entries providing `T` under `classifier`, in link order.
pub fn factories_for<T: ?Sized + 'static>(
    classifier: &str,
) -> impl Iterator<Item = &'static IndexEntry> + '_ {
    let type_id = TypeId::of::<T>();
    INSTANCE_INDEX
        .iter()
        .filter(move |entry| entry.provides(type_id, classifier))
}
