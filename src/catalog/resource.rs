//! Table resources: one catalog node per queryable table of a service.
//!
//! A `TableResource` is cheap to clone; clones share the status override and
//! the read-only discovery. The node keeps a weak reference to its service so
//! the catalog, not the node, decides how long the service lives.

use crate::catalog::adapters::AdapterRegistry;
use crate::catalog::identity::{ResourceId, build_identifier};
use crate::catalog::info::{ResourceInfo, build_info};
use crate::catalog::model::FeatureType;
use crate::catalog::service::{DataStore, Service};
use crate::catalog::status::{Status, StatusMessage, StatusOverride, StatusSlot};
use crate::error::{IdentityError, ResolveError};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What is known about whether a table accepts writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mutability {
    Unknown,
    ReadOnly,
    Writable,
}

impl Mutability {
    fn to_u8(self) -> u8 {
        match self {
            Mutability::Unknown => 0,
            Mutability::ReadOnly => 1,
            Mutability::Writable => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Mutability::ReadOnly,
            2 => Mutability::Writable,
            _ => Mutability::Unknown,
        }
    }
}

/// Write-once tri-state. Leaves `Unknown` at most once and never returns.
#[derive(Debug, Default)]
struct MutabilityCell(AtomicU8);

impl MutabilityCell {
    fn get(&self) -> Mutability {
        Mutability::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Returns the value in effect after the attempt, which is the earlier
    /// discovery if one already landed.
    fn discover(&self, value: Mutability) -> Mutability {
        match self.0.compare_exchange(
            Mutability::Unknown.to_u8(),
            value.to_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => value,
            Err(current) => Mutability::from_u8(current),
        }
    }
}

#[derive(Clone)]
pub struct TableResource {
    inner: Arc<ResourceInner>,
}

struct ResourceInner {
    name: String,
    identifier: ResourceId,
    service: Weak<dyn Service>,
    status: StatusSlot,
    mutability: MutabilityCell,
    adapters: Arc<AdapterRegistry>,
}

impl TableResource {
    /// Create the node for table `name` of `service`.
    ///
    /// Fails when the name cannot be turned into an identifier; no node is
    /// created in that case.
    pub fn new(service: &Arc<dyn Service>, name: impl Into<String>) -> Result<Self, IdentityError> {
        Self::with_adapters(service, name, Arc::new(AdapterRegistry::default()))
    }

    pub fn with_adapters(
        service: &Arc<dyn Service>,
        name: impl Into<String>,
        adapters: Arc<AdapterRegistry>,
    ) -> Result<Self, IdentityError> {
        let name = name.into();
        let identifier = build_identifier(service.identifier(), &name)?;
        Ok(Self {
            inner: Arc::new(ResourceInner {
                name,
                identifier,
                service: Arc::downgrade(service),
                status: StatusSlot::default(),
                mutability: MutabilityCell::default(),
                adapters,
            }),
        })
    }

    /// Table name within the owning service.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn identifier(&self) -> &ResourceId {
        &self.inner.identifier
    }

    /// The owning service, if the catalog still holds it.
    pub fn service(&self) -> Option<Arc<dyn Service>> {
        self.inner.service.upgrade()
    }

    pub(crate) fn attached_service(&self) -> Result<Arc<dyn Service>, ResolveError> {
        self.service()
            .ok_or_else(|| ResolveError::Detached(self.inner.identifier.to_string()))
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.inner.adapters
    }

    /// Local override if set, else the service's current status.
    pub fn status(&self) -> Status {
        self.inner.status.effective_status(|| match self.service() {
            Some(service) => service.status(),
            None => Status::Broken,
        })
    }

    /// Local override message if an override is set, else the service's.
    pub fn message(&self) -> Option<StatusMessage> {
        self.inner.status.effective_message(|| match self.service() {
            Some(service) => service.message(),
            None => {
                let detached: StatusMessage =
                    Arc::new(ResolveError::Detached(self.inner.identifier.to_string()));
                Some(detached)
            }
        })
    }

    /// Set the status and message of this resource, replacing any previous
    /// override. `message` may be `None`.
    pub fn set_status(&self, status: Status, message: Option<StatusMessage>) {
        self.inner.status.set(status, message);
    }

    pub fn status_override(&self) -> Option<Arc<StatusOverride>> {
        self.inner.status.get()
    }

    pub fn mutability(&self) -> Mutability {
        self.inner.mutability.get()
    }

    /// `None` until the first feature-store request has been answered.
    pub fn read_only(&self) -> Option<bool> {
        match self.mutability() {
            Mutability::Unknown => None,
            Mutability::ReadOnly => Some(true),
            Mutability::Writable => Some(false),
        }
    }

    pub(crate) fn record_mutability(&self, discovered: Mutability) -> Mutability {
        let effective = self.inner.mutability.discover(discovered);
        if effective != discovered {
            warn!(
                resource = %self.inner.identifier,
                ?discovered,
                ?effective,
                "store reported a different mutability than first discovered"
            );
        } else if discovered == Mutability::ReadOnly {
            info!(resource = %self.inner.identifier, "resource is read-only");
        }
        effective
    }

    /// The service's data store handle.
    pub fn data_store(&self, cancel: &CancellationToken) -> Result<Arc<dyn DataStore>, ResolveError> {
        let service = self.attached_service()?;
        Ok(service.data_store(cancel)?)
    }

    /// Schema of this table as reported by the data store.
    pub fn schema(&self, cancel: &CancellationToken) -> Result<FeatureType, ResolveError> {
        let store = self.data_store(cancel)?;
        Ok(store.schema(self.name(), cancel)?)
    }

    pub fn info(&self, cancel: &CancellationToken) -> ResourceInfo {
        build_info(self, cancel)
    }

    /// True when both handles refer to the same node.
    pub fn ptr_eq(&self, other: &TableResource) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TableResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableResource")
            .field("identifier", &self.inner.identifier.as_str())
            .field("mutability", &self.mutability())
            .field("status_override", &self.inner.status.get())
            .finish()
    }
}

/// Build a resource for every table the service's store lists.
///
/// Names that cannot form an identifier are skipped with a warning so one
/// odd table does not hide the rest.
pub fn members(
    service: &Arc<dyn Service>,
    adapters: &Arc<AdapterRegistry>,
    cancel: &CancellationToken,
) -> Result<Vec<TableResource>, ResolveError> {
    let store = service.data_store(cancel)?;
    let mut resources = Vec::new();
    for name in store.type_names(cancel)? {
        match TableResource::with_adapters(service, name.as_str(), Arc::clone(adapters)) {
            Ok(resource) => resources.push(resource),
            Err(err) => warn!(
                service = %service.identifier(),
                table = %name,
                error = %err,
                "skipping table"
            ),
        }
    }
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutability_cell_is_write_once() {
        let cell = MutabilityCell::default();
        assert_eq!(cell.get(), Mutability::Unknown);
        assert_eq!(cell.discover(Mutability::ReadOnly), Mutability::ReadOnly);
        assert_eq!(cell.discover(Mutability::Writable), Mutability::ReadOnly);
        assert_eq!(cell.get(), Mutability::ReadOnly);
    }

    #[test]
    fn mutability_u8_round_trips() {
        for value in [Mutability::Unknown, Mutability::ReadOnly, Mutability::Writable] {
            assert_eq!(Mutability::from_u8(value.to_u8()), value);
        }
    }
}
