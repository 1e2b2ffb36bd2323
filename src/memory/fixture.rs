//! JSON fixtures describing an in-memory service.
//!
//! A fixture is validated against `schema/store_fixture.schema.json` before it
//! is deserialized, and rejected when it lists the same table twice, so a
//! malformed file never yields a half-populated store.

use crate::catalog::{Envelope, FeatureType, Status, StatusMessage};
use crate::memory::{MemoryDataStore, MemoryService, MemoryTable};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use url::Url;

const FIXTURE_SCHEMA_VERSION: &str = "store_fixture_v1";
const FIXTURE_SCHEMA: &str = include_str!("../../schema/store_fixture.schema.json");

#[derive(Clone, Debug, Deserialize)]
pub struct StoreFixture {
    pub schema_version: String,
    pub service: ServiceFixture,
    pub tables: Vec<TableFixture>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceFixture {
    pub url: Url,
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TableFixture {
    pub name: String,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub schema: Option<FeatureType>,
    #[serde(default)]
    pub bounds: Option<Envelope>,
}

fn default_status() -> Status {
    Status::Connected
}

impl StoreFixture {
    /// Build the service described by this fixture.
    pub fn build_service(&self) -> Arc<MemoryService> {
        let store = self
            .tables
            .iter()
            .fold(MemoryDataStore::new(), |store, table| {
                store.with_table(
                    table.name.clone(),
                    MemoryTable {
                        schema: table.schema.clone(),
                        writable: table.writable,
                        bounds: table.bounds,
                    },
                )
            });
        let service = MemoryService::new(self.service.url.clone(), store);
        let message = self.service.message.as_ref().map(|text| {
            let message: StatusMessage = Arc::new(io::Error::other(text.clone()));
            message
        });
        service.set_status(self.service.status, message);
        Arc::new(service)
    }
}

/// Read, validate and parse a fixture file.
pub fn load_fixture(path: &Path) -> Result<StoreFixture> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading store fixture {}", path.display()))?;
    parse_fixture(&data).with_context(|| format!("loading {}", path.display()))
}

pub fn parse_fixture(data: &str) -> Result<StoreFixture> {
    let value: Value = serde_json::from_str(data).context("parsing store fixture")?;
    validate_schema_version(&value)?;
    validate_against_schema(&value)?;

    let fixture: StoreFixture =
        serde_json::from_value(value).context("decoding store fixture")?;
    validate_tables(&fixture)?;
    Ok(fixture)
}

fn validate_schema_version(value: &Value) -> Result<()> {
    let version = value
        .get("schema_version")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if version.is_empty() {
        bail!("schema_version must not be empty");
    }
    if version != FIXTURE_SCHEMA_VERSION {
        bail!(
            "schema_version '{}' not supported, expected '{}'",
            version,
            FIXTURE_SCHEMA_VERSION
        );
    }
    Ok(())
}

fn validate_against_schema(value: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(FIXTURE_SCHEMA).context("parsing store fixture schema")?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling store fixture schema: {err}"))?;

    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("store fixture failed schema validation:\n{}", details);
    }
    Ok(())
}

fn validate_tables(fixture: &StoreFixture) -> Result<()> {
    let mut seen = BTreeSet::new();
    for table in &fixture.tables {
        if table.name.trim().is_empty() {
            bail!("encountered table with no name");
        }
        if !seen.insert(table.name.as_str()) {
            bail!("duplicate table name {}", table.name);
        }
    }
    Ok(())
}
