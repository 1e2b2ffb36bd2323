//! Capability resolution for table resources.
//!
//! `can_resolve` is the cheap forecast and `resolve` does the work. The
//! forecast is optimistic about feature stores until a resolution has shown
//! the table to be read-only; after that both sides say no.

use crate::catalog::capability::{Capability, Resolved};
use crate::catalog::info::build_info;
use crate::catalog::resource::{Mutability, TableResource};
use crate::catalog::service::FeatureAccess;
use crate::error::ResolveError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl TableResource {
    /// Materialize `capability` for this table.
    ///
    /// Returns `Ok(None)` when the capability is not available; errors are
    /// reserved for failures talking to the service or its store. Only the
    /// data-store and feature branches perform I/O, and only the feature
    /// branch records read-only discovery.
    pub fn resolve(
        &self,
        capability: &Capability,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved>, ResolveError> {
        match capability {
            Capability::ResourceInfo => Ok(Some(Resolved::Info(build_info(self, cancel)))),
            Capability::Resource => Ok(Some(Resolved::Resource(self.clone()))),
            Capability::DataStore => Ok(Some(Resolved::DataStore(self.data_store(cancel)?))),
            Capability::FeatureStore => self.resolve_features(false, cancel),
            Capability::FeatureSource => self.resolve_features(true, cancel),
            Capability::Service => Ok(Some(Resolved::Service(self.attached_service()?))),
            Capability::Connection => self.attached_service()?.resolve(capability, cancel),
            Capability::Extension(name) if self.adapters().get(name).is_some() => Ok(self
                .adapters()
                .resolve(name, self, cancel)?
                .map(Resolved::Extension)),
            Capability::Extension(_) => self.attached_service()?.resolve(capability, cancel),
        }
    }

    /// Whether `resolve` could produce `capability`. No I/O, no mutation.
    pub fn can_resolve(&self, capability: &Capability) -> bool {
        match capability {
            Capability::ResourceInfo
            | Capability::Resource
            | Capability::DataStore
            | Capability::FeatureSource
            | Capability::Service => true,
            Capability::FeatureStore => self.mutability() != Mutability::ReadOnly,
            Capability::Extension(name) if self.adapters().get(name).is_some() => {
                self.adapters().can_resolve(name, self)
            }
            Capability::Connection | Capability::Extension(_) => self
                .service()
                .is_some_and(|service| service.can_resolve(capability)),
        }
    }

    // A read request goes through the write probe too: a writable table
    // answers it with its store, and a read-only answer is recorded before
    // the source is handed back from the same store handle.
    fn resolve_features(
        &self,
        wants_source: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved>, ResolveError> {
        if self.mutability() == Mutability::ReadOnly {
            if !wants_source {
                debug!(resource = %self.identifier(), "feature store refused, table is read-only");
                return Ok(None);
            }
            let store = self.data_store(cancel)?;
            let source = store.feature_access(self.name(), cancel)?.into_source();
            return Ok(Some(Resolved::FeatureSource(source)));
        }

        let store = self.data_store(cancel)?;
        match store.feature_access(self.name(), cancel)? {
            FeatureAccess::Mutable(feature_store) => {
                let effective = self.record_mutability(Mutability::Writable);
                if wants_source {
                    Ok(Some(Resolved::FeatureSource(feature_store.into_source())))
                } else if effective == Mutability::Writable {
                    Ok(Some(Resolved::FeatureStore(feature_store)))
                } else {
                    // Lost to an earlier read-only discovery; that one stands.
                    debug!(resource = %self.identifier(), "feature store withheld, table already read-only");
                    Ok(None)
                }
            }
            FeatureAccess::ReadOnly(source) => {
                self.record_mutability(Mutability::ReadOnly);
                if wants_source {
                    Ok(Some(Resolved::FeatureSource(source)))
                } else {
                    debug!(resource = %self.identifier(), "store returned a read-only source");
                    Ok(None)
                }
            }
        }
    }
}
