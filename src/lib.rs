//! Capability resolution for catalog table resources.
//!
//! A catalog lists services, and each service lists table resources. Callers
//! hold a [`TableResource`] and ask it for facets of itself (descriptive info,
//! its service, a data-store handle, a writable or read-only feature handle,
//! a raw connection) without knowing up front which of them exist. The crate
//! covers the resource side of that conversation: stable identifiers, status
//! inheritance, the resolver and its side-effect free forecast. Services and
//! stores are collaborators reached through the traits in [`catalog::service`];
//! [`memory`] provides an in-memory implementation used by the tests and the
//! `catalog-probe` binary.

pub mod catalog;
pub mod error;
pub mod logging;
pub mod memory;

pub use catalog::{
    AdapterRegistry, Capability, Connection, DataStore, Envelope, FeatureAccess, FeatureSource,
    FeatureStore, FeatureType, Mutability, ResolveAdapter, Resolved, ResourceId, ResourceInfo,
    Service, Status, StatusMessage, TableInfo, TableResource, build_identifier, build_info,
    members,
};
pub use error::{DataStoreError, IdentityError, ResolveError};
pub use memory::{MemoryDataStore, MemoryService, MemoryTable, load_fixture};
pub use tokio_util::sync::CancellationToken;
