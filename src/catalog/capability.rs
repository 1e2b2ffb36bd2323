//! Capability kinds a table resource can be asked for, and the facets that
//! come back when one is materialized.

use crate::catalog::info::ResourceInfo;
use crate::catalog::resource::TableResource;
use crate::catalog::service::{Connection, DataStore, FeatureSource, FeatureStore, Service};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A facet a resource may be able to provide.
///
/// The named variants are handled by the resource itself; `Extension` is
/// routed to the adapter registry and carries the adapter name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Capability {
    ResourceInfo,
    Resource,
    DataStore,
    FeatureStore,
    FeatureSource,
    Service,
    Connection,
    Extension(String),
}

impl Capability {
    /// Every capability the resource recognizes directly.
    pub const BUILTIN: [Capability; 7] = [
        Capability::ResourceInfo,
        Capability::Resource,
        Capability::DataStore,
        Capability::FeatureStore,
        Capability::FeatureSource,
        Capability::Service,
        Capability::Connection,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Capability::ResourceInfo => "resource-info",
            Capability::Resource => "self-as-resource",
            Capability::DataStore => "data-store-handle",
            Capability::FeatureStore => "mutable-data-handle",
            Capability::FeatureSource => "read-only-data-handle",
            Capability::Service => "owning-service",
            Capability::Connection => "raw-connection",
            Capability::Extension(name) => name.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "resource-info" => Capability::ResourceInfo,
            "self-as-resource" => Capability::Resource,
            "data-store-handle" => Capability::DataStore,
            "mutable-data-handle" => Capability::FeatureStore,
            "read-only-data-handle" => Capability::FeatureSource,
            "owning-service" => Capability::Service,
            "raw-connection" => Capability::Connection,
            other => Capability::Extension(other.to_string()),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// A materialized facet returned by `resolve`.
#[derive(Clone)]
pub enum Resolved {
    Info(ResourceInfo),
    Resource(TableResource),
    DataStore(Arc<dyn DataStore>),
    FeatureStore(Arc<dyn FeatureStore>),
    FeatureSource(Arc<dyn FeatureSource>),
    Service(Arc<dyn Service>),
    Connection(Arc<dyn Connection>),
    Extension(Arc<dyn Any + Send + Sync>),
}

impl Resolved {
    /// Short label for the variant, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Info(_) => "resource-info",
            Resolved::Resource(_) => "self-as-resource",
            Resolved::DataStore(_) => "data-store-handle",
            Resolved::FeatureStore(_) => "mutable-data-handle",
            Resolved::FeatureSource(_) => "read-only-data-handle",
            Resolved::Service(_) => "owning-service",
            Resolved::Connection(_) => "raw-connection",
            Resolved::Extension(_) => "extension",
        }
    }

    pub fn into_info(self) -> Option<ResourceInfo> {
        match self {
            Resolved::Info(info) => Some(info),
            _ => None,
        }
    }

    pub fn into_feature_store(self) -> Option<Arc<dyn FeatureStore>> {
        match self {
            Resolved::FeatureStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn into_feature_source(self) -> Option<Arc<dyn FeatureSource>> {
        match self {
            Resolved::FeatureSource(source) => Some(source),
            _ => None,
        }
    }

    pub fn into_data_store(self) -> Option<Arc<dyn DataStore>> {
        match self {
            Resolved::DataStore(store) => Some(store),
            _ => None,
        }
    }

    pub fn into_connection(self) -> Option<Arc<dyn Connection>> {
        match self {
            Resolved::Connection(conn) => Some(conn),
            _ => None,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Info(info) => f.debug_tuple("Info").field(info).finish(),
            Resolved::Resource(resource) => {
                f.debug_tuple("Resource").field(resource.identifier()).finish()
            }
            Resolved::FeatureStore(store) => f.debug_tuple("FeatureStore").field(&store.name()).finish(),
            Resolved::FeatureSource(source) => {
                f.debug_tuple("FeatureSource").field(&source.name()).finish()
            }
            Resolved::Service(service) => {
                f.debug_tuple("Service").field(&service.identifier().as_str()).finish()
            }
            Resolved::Connection(conn) => f.debug_tuple("Connection").field(&conn.url().as_str()).finish(),
            other => f.write_str(other.kind()),
        }
    }
}
