use std::sync::Arc;

use kiln::{index, Erased, Request, Result, Scope};

/// Creates every requested instance straight from the index, without caching.
#[derive(Debug, Default)]
pub struct IndexScope;

impl Scope for IndexScope {
    fn resolve(&self, request: &Request<'_>) -> Result<Vec<Erased>> {
        index()
            .iter()
            .filter(|entry| entry.provides(request.type_id, request.classifier))
            .map(|entry| (entry.create)(self))
            .collect()
    }

    fn handle(&self) -> Option<Arc<dyn Scope>> {
        Some(Arc::new(IndexScope))
    }
}
