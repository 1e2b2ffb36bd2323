//! In-memory service and data store.
//!
//! Implements the collaborator traits without any real backend so catalogs
//! can be exercised end to end: per-table writability, optional schemas,
//! switchable service health, injectable connection failures and cooperative
//! cancellation. Every data-store call is counted so callers can check how
//! much I/O a resolution actually did.

pub mod fixture;

use crate::catalog::{
    Capability, Connection, DataStore, Envelope, FeatureAccess, FeatureSource, FeatureStore,
    FeatureType, Resolved, Service, Status, StatusMessage,
};
use crate::error::{DataStoreError, ResolveError};
use arc_swap::{ArcSwap, ArcSwapOption};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use url::Url;

pub use fixture::{StoreFixture, load_fixture, parse_fixture};

#[derive(Clone, Debug, Default)]
/// One table held by a [`MemoryDataStore`].
pub struct MemoryTable {
    /// `None` makes schema lookups fail.
    pub schema: Option<FeatureType>,
    pub writable: bool,
    pub bounds: Option<Envelope>,
}

#[derive(Debug, Default)]
pub struct MemoryDataStore {
    tables: BTreeMap<String, MemoryTable>,
    io_calls: AtomicUsize,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, table: MemoryTable) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Number of data-store calls served so far.
    pub fn io_calls(&self) -> usize {
        self.io_calls.load(Ordering::SeqCst)
    }

    fn begin(&self, cancel: &CancellationToken) -> Result<(), DataStoreError> {
        self.io_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(DataStoreError::Cancelled);
        }
        Ok(())
    }

    fn table(&self, name: &str) -> Result<&MemoryTable, DataStoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| DataStoreError::UnknownTable(name.to_string()))
    }
}

impl DataStore for MemoryDataStore {
    fn type_names(&self, cancel: &CancellationToken) -> Result<Vec<String>, DataStoreError> {
        self.begin(cancel)?;
        Ok(self.tables.keys().cloned().collect())
    }

    fn feature_access(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<FeatureAccess, DataStoreError> {
        self.begin(cancel)?;
        let table = self.table(name)?;
        let features = Arc::new(MemoryFeatures {
            name: name.to_string(),
            bounds: table.bounds,
        });
        if table.writable {
            Ok(FeatureAccess::Mutable(features))
        } else {
            Ok(FeatureAccess::ReadOnly(features))
        }
    }

    fn schema(&self, name: &str, cancel: &CancellationToken) -> Result<FeatureType, DataStoreError> {
        self.begin(cancel)?;
        self.table(name)?
            .schema
            .clone()
            .ok_or_else(|| DataStoreError::Schema {
                table: name.to_string(),
                reason: "no schema recorded".to_string(),
            })
    }
}

#[derive(Debug)]
struct MemoryFeatures {
    name: String,
    bounds: Option<Envelope>,
}

impl FeatureSource for MemoryFeatures {
    fn name(&self) -> &str {
        &self.name
    }

    fn bounds(&self, cancel: &CancellationToken) -> Result<Option<Envelope>, DataStoreError> {
        if cancel.is_cancelled() {
            return Err(DataStoreError::Cancelled);
        }
        Ok(self.bounds)
    }
}

impl FeatureStore for MemoryFeatures {
    fn into_source(self: Arc<Self>) -> Arc<dyn FeatureSource> {
        self
    }
}

#[derive(Debug)]
pub struct MemoryConnection {
    url: Url,
    closed: AtomicBool,
}

impl MemoryConnection {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Connection for MemoryConnection {
    fn url(&self) -> &Url {
        &self.url
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct ServiceHealth {
    status: Status,
    message: Option<StatusMessage>,
}

/// Service backed by a [`MemoryDataStore`].
pub struct MemoryService {
    url: Url,
    health: ArcSwap<ServiceHealth>,
    connect_failure: ArcSwapOption<String>,
    store: Arc<MemoryDataStore>,
    connection: Arc<MemoryConnection>,
}

impl MemoryService {
    pub fn new(url: Url, store: MemoryDataStore) -> Self {
        let connection = Arc::new(MemoryConnection {
            url: url.clone(),
            closed: AtomicBool::new(false),
        });
        Self {
            url,
            health: ArcSwap::from_pointee(ServiceHealth {
                status: Status::Connected,
                message: None,
            }),
            connect_failure: ArcSwapOption::empty(),
            store: Arc::new(store),
            connection,
        }
    }

    pub fn set_status(&self, status: Status, message: Option<StatusMessage>) {
        self.health.store(Arc::new(ServiceHealth { status, message }));
    }

    /// Make every later `data_store` call fail with `reason`, or heal with `None`.
    pub fn fail_connections(&self, reason: Option<String>) {
        self.connect_failure.store(reason.map(Arc::new));
    }

    pub fn store(&self) -> &Arc<MemoryDataStore> {
        &self.store
    }

    pub fn connection(&self) -> &Arc<MemoryConnection> {
        &self.connection
    }
}

impl Service for MemoryService {
    fn identifier(&self) -> &Url {
        &self.url
    }

    fn status(&self) -> Status {
        self.health.load().status
    }

    fn message(&self) -> Option<StatusMessage> {
        self.health.load().message.clone()
    }

    fn data_store(&self, cancel: &CancellationToken) -> Result<Arc<dyn DataStore>, DataStoreError> {
        if cancel.is_cancelled() {
            return Err(DataStoreError::Cancelled);
        }
        if let Some(reason) = self.connect_failure.load_full() {
            return Err(DataStoreError::Connection(reason.to_string()));
        }
        let store: Arc<dyn DataStore> = self.store.clone();
        Ok(store)
    }

    fn resolve(
        &self,
        capability: &Capability,
        cancel: &CancellationToken,
    ) -> Result<Option<Resolved>, ResolveError> {
        match capability {
            Capability::Connection => {
                let conn: Arc<dyn Connection> = self.connection.clone();
                Ok(Some(Resolved::Connection(conn)))
            }
            Capability::DataStore => Ok(Some(Resolved::DataStore(self.data_store(cancel)?))),
            _ => Ok(None),
        }
    }

    fn can_resolve(&self, capability: &Capability) -> bool {
        matches!(capability, Capability::Connection | Capability::DataStore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryDataStore {
        MemoryDataStore::new()
            .with_table(
                "roads",
                MemoryTable {
                    schema: Some(FeatureType {
                        name: "roads".into(),
                        attributes: Vec::new(),
                        geometry: None,
                    }),
                    writable: true,
                    bounds: None,
                },
            )
            .with_table("archive", MemoryTable::default())
    }

    #[test]
    fn access_follows_table_writability() {
        let store = store();
        let cancel = CancellationToken::new();
        assert!(store.feature_access("roads", &cancel).unwrap().is_mutable());
        assert!(!store.feature_access("archive", &cancel).unwrap().is_mutable());
        assert!(matches!(
            store.feature_access("missing", &cancel),
            Err(DataStoreError::UnknownTable(_))
        ));
        assert_eq!(store.io_calls(), 3);
    }

    #[test]
    fn missing_schema_is_an_error() {
        let store = store();
        let cancel = CancellationToken::new();
        assert!(store.schema("roads", &cancel).is_ok());
        assert!(matches!(
            store.schema("archive", &cancel),
            Err(DataStoreError::Schema { .. })
        ));
    }

    #[test]
    fn cancelled_token_stops_io() {
        let store = store();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            store.type_names(&cancel),
            Err(DataStoreError::Cancelled)
        ));
    }

    #[test]
    fn connect_failure_can_be_toggled() {
        let service = MemoryService::new(Url::parse("mem://local/db").unwrap(), store());
        let cancel = CancellationToken::new();
        service.fail_connections(Some("refused".into()));
        assert!(matches!(
            service.data_store(&cancel),
            Err(DataStoreError::Connection(reason)) if reason == "refused"
        ));
        service.fail_connections(None);
        assert!(service.data_store(&cancel).is_ok());
    }
}
