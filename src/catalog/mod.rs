//! Catalog resources and capability resolution.
//!
//! A [`TableResource`] stands for one table of a [`Service`]. Callers ask it
//! for facets by [`Capability`]: `can_resolve` answers without I/O, `resolve`
//! materializes the facet. Status is inherited from the service unless the
//! resource carries its own override.

pub mod adapters;
pub mod capability;
pub mod identity;
pub mod info;
pub mod model;
mod resolve;
pub mod resource;
pub mod service;
pub mod status;

pub use adapters::{AdapterRegistry, ResolveAdapter};
pub use capability::{Capability, Resolved};
pub use identity::{FRAGMENT_SEPARATOR, ResourceId, build_identifier};
pub use info::{ResourceInfo, TableInfo, build_info};
pub use model::{AttributeDescriptor, Envelope, FeatureType, GeometryDescriptor};
pub use resource::{Mutability, TableResource, members};
pub use service::{Connection, DataStore, FeatureAccess, FeatureSource, FeatureStore, Service};
pub use status::{Status, StatusMessage, StatusOverride, StatusSlot};
