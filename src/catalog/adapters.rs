//! Registry of extension adapters keyed by capability name.
//!
//! This is the fallback step of resolution: anything a table resource does
//! not recognize itself is looked up here first. Names with no adapter are
//! left to the owning service.

use crate::catalog::resource::TableResource;
use crate::error::ResolveError;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Contributes one extension capability to table resources.
pub trait ResolveAdapter: Send + Sync {
    /// Cheap check, no I/O.
    fn can_adapt(&self, resource: &TableResource) -> bool;

    /// Produce the extension value. A [`ResolveError`] returned through the
    /// `anyhow` error is passed on unchanged; anything else is reported as
    /// [`ResolveError::Adapter`].
    fn adapt(
        &self,
        resource: &TableResource,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<Arc<dyn Any + Send + Sync>>>;
}

#[derive(Default)]
/// In-memory store for adapters keyed by extension name.
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Arc<dyn ResolveAdapter>>,
}

impl AdapterRegistry {
    /// Register an adapter, replacing any previous one under the same name.
    pub fn register(&mut self, name: impl Into<String>, adapter: Arc<dyn ResolveAdapter>) {
        self.adapters.insert(name.into(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResolveAdapter>> {
        self.adapters.get(name)
    }

    /// Registered names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    pub(crate) fn can_resolve(&self, name: &str, resource: &TableResource) -> bool {
        self.get(name)
            .is_some_and(|adapter| adapter.can_adapt(resource))
    }

    pub(crate) fn resolve(
        &self,
        name: &str,
        resource: &TableResource,
        cancel: &CancellationToken,
    ) -> Result<Option<Arc<dyn Any + Send + Sync>>, ResolveError> {
        match self.get(name) {
            Some(adapter) if adapter.can_adapt(resource) => adapter
                .adapt(resource, cancel)
                .map_err(|err| match err.downcast::<ResolveError>() {
                    Ok(resolve) => resolve,
                    Err(other) => ResolveError::Adapter {
                        name: name.to_string(),
                        reason: format!("{other:#}"),
                    },
                }),
            _ => Ok(None),
        }
    }
}
