//! Collaborator seams: the owning service and its backing data store.
//!
//! A table resource never talks to storage directly. It asks its [`Service`]
//! for a [`DataStore`] and asks the data store for per-table access. Every
//! call that may block takes the caller's cancellation token; implementations
//! decide how to honor it.

use crate::catalog::capability::{Capability, Resolved};
use crate::catalog::model::{Envelope, FeatureType};
use crate::catalog::status::{Status, StatusMessage};
use crate::error::{DataStoreError, ResolveError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Parent of a set of table resources; owns the connection to the store.
pub trait Service: Send + Sync {
    fn identifier(&self) -> &Url;

    fn status(&self) -> Status;

    fn message(&self) -> Option<StatusMessage>;

    /// Handle to the backing store. May open a connection lazily.
    fn data_store(&self, cancel: &CancellationToken) -> Result<Arc<dyn DataStore>, DataStoreError>;

    /// Service-level resolution, used by resources for facets they delegate:
    /// raw connections and extensions no adapter is registered for.
    fn resolve(
        &self,
        capability: &Capability,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved>, ResolveError>;

    /// Forecast for [`Service::resolve`]. Must not perform I/O.
    fn can_resolve(&self, capability: &Capability) -> bool;
}

/// Backing store holding the tables of one service.
pub trait DataStore: Send + Sync {
    fn type_names(&self, cancel: &CancellationToken) -> Result<Vec<String>, DataStoreError>;

    fn feature_access(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<FeatureAccess, DataStoreError>;

    fn schema(&self, name: &str, cancel: &CancellationToken) -> Result<FeatureType, DataStoreError>;
}

/// Read access to one table.
pub trait FeatureSource: Send + Sync {
    fn name(&self) -> &str;

    fn bounds(&self, cancel: &CancellationToken) -> Result<Option<Envelope>, DataStoreError>;
}

/// Write access to one table.
pub trait FeatureStore: FeatureSource {
    /// View this store as a plain read handle.
    fn into_source(self: Arc<Self>) -> Arc<dyn FeatureSource>;
}

/// What the store hands back for a table: it either accepts writes or not.
#[derive(Clone)]
pub enum FeatureAccess {
    ReadOnly(Arc<dyn FeatureSource>),
    Mutable(Arc<dyn FeatureStore>),
}

impl FeatureAccess {
    pub fn is_mutable(&self) -> bool {
        matches!(self, FeatureAccess::Mutable(_))
    }

    /// Read handle regardless of mutability.
    pub fn into_source(self) -> Arc<dyn FeatureSource> {
        match self {
            FeatureAccess::ReadOnly(source) => source,
            FeatureAccess::Mutable(store) => store.into_source(),
        }
    }
}

/// Raw session to the backing store, exposed by services.
pub trait Connection: Send + Sync {
    fn url(&self) -> &Url;

    fn is_closed(&self) -> bool;
}
