use std::path::PathBuf;
use std::sync::Arc;
use tablecat::{
    Envelope, FeatureType, MemoryDataStore, MemoryService, MemoryTable, Service,
    catalog::{AttributeDescriptor, GeometryDescriptor},
};
use url::Url;

pub const SERVICE_URL: &str = "svc://host/db";

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn roads_schema() -> FeatureType {
    FeatureType {
        name: "roads".to_string(),
        attributes: vec![AttributeDescriptor {
            name: "lanes".to_string(),
            binding: "integer".to_string(),
            nillable: false,
        }],
        geometry: Some(GeometryDescriptor {
            name: "geom".to_string(),
            binding: "linestring".to_string(),
            crs: Some("EPSG:4326".to_string()),
        }),
    }
}

pub fn roads_bounds() -> Envelope {
    Envelope {
        min_x: -123.3,
        min_y: 48.4,
        max_x: -123.2,
        max_y: 48.5,
    }
}

/// Store with a writable `roads`, a read-only `archive` and a `legacy`
/// table whose schema cannot be read.
pub fn sample_store() -> MemoryDataStore {
    MemoryDataStore::new()
        .with_table(
            "roads",
            MemoryTable {
                schema: Some(roads_schema()),
                writable: true,
                bounds: Some(roads_bounds()),
            },
        )
        .with_table(
            "archive",
            MemoryTable {
                schema: Some(FeatureType {
                    name: "archive".to_string(),
                    attributes: Vec::new(),
                    geometry: None,
                }),
                writable: false,
                bounds: None,
            },
        )
        .with_table(
            "legacy",
            MemoryTable {
                schema: None,
                writable: false,
                bounds: None,
            },
        )
}

/// The concrete service plus the same service behind the trait object that
/// resources are created from.
pub fn sample_service() -> (Arc<MemoryService>, Arc<dyn Service>) {
    let service = Arc::new(MemoryService::new(
        Url::parse(SERVICE_URL).expect("valid service url"),
        sample_store(),
    ));
    let dynamic: Arc<dyn Service> = service.clone();
    (service, dynamic)
}
