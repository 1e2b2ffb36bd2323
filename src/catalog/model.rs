//! Schema and extent types exchanged with the data store.
//!
//! These mirror what a spatial table exposes: named attributes with a value
//! binding, at most one default geometry column with its reference system,
//! and an optional bounding envelope.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Column layout of one table.
pub struct FeatureType {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,
    #[serde(default)]
    pub geometry: Option<GeometryDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Non-geometry column.
pub struct AttributeDescriptor {
    pub name: String,
    pub binding: String,
    #[serde(default = "default_nillable")]
    pub nillable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Default geometry column.
pub struct GeometryDescriptor {
    pub name: String,
    pub binding: String,
    #[serde(default)]
    pub crs: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
/// Axis-aligned bounding box in the table's reference system.
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

fn default_nillable() -> bool {
    true
}

impl FeatureType {
    /// Reference system of the default geometry, when declared.
    pub fn crs(&self) -> Option<&str> {
        self.geometry.as_ref().and_then(|geom| geom.crs.as_deref())
    }
}
