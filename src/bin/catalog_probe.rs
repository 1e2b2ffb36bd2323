//! Resolve capabilities against tables of an in-memory store fixture.
//!
//! Without `--capability` the binary prints, per table, what the resource
//! forecasts it can resolve. With one or more `--capability` flags it resolves
//! each in order and prints one JSON record per request, so the effect of
//! read-only discovery on later forecasts is visible in the stream.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tablecat::logging::init_tracing;
use tablecat::{
    AdapterRegistry, CancellationToken, Capability, ResourceId, Resolved, Service, Status,
    TableResource, load_fixture, members,
};

#[derive(Parser, Debug)]
#[command(name = "catalog-probe", version, about = "Probe catalog resources of a store fixture")]
struct Cli {
    /// Store fixture (JSON) describing the service and its tables.
    #[arg(long, env = "TABLECAT_STORE")]
    store: PathBuf,

    /// Only probe this table.
    #[arg(long)]
    table: Option<String>,

    /// Capability to resolve; repeat to resolve several in order.
    #[arg(long = "capability", value_name = "NAME")]
    capabilities: Vec<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Serialize)]
struct ResolveRecord {
    table: String,
    identifier: ResourceId,
    capability: Capability,
    can_resolve_before: bool,
    outcome: Value,
    can_resolve_after: bool,
    read_only: Option<bool>,
    status: Status,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs).map_err(|err| anyhow!("initializing logging: {err}"))?;

    let fixture = load_fixture(&cli.store)?;
    let service: Arc<dyn Service> = fixture.build_service();
    let adapters = Arc::new(AdapterRegistry::default());
    let cancel = CancellationToken::new();

    let mut resources = members(&service, &adapters, &cancel)
        .with_context(|| format!("enumerating tables of {}", service.identifier()))?;
    if let Some(table) = &cli.table {
        resources.retain(|resource| resource.name() == table);
        if resources.is_empty() {
            bail!("table '{}' not found in {}", table, cli.store.display());
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.capabilities.is_empty() {
        for resource in &resources {
            writeln!(out, "{}", forecast_record(resource))?;
        }
        return Ok(());
    }

    let capabilities: Vec<Capability> = cli
        .capabilities
        .iter()
        .map(|name| Capability::parse(name))
        .collect();
    for resource in &resources {
        for capability in &capabilities {
            let record = resolve_record(resource, capability, &cancel);
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
    }
    Ok(())
}

fn forecast_record(resource: &TableResource) -> Value {
    let mut can_resolve = Map::new();
    for capability in Capability::BUILTIN {
        can_resolve.insert(
            capability.as_str().to_string(),
            Value::Bool(resource.can_resolve(&capability)),
        );
    }
    json!({
        "table": resource.name(),
        "identifier": resource.identifier(),
        "status": resource.status(),
        "read_only": resource.read_only(),
        "can_resolve": can_resolve,
    })
}

fn resolve_record(
    resource: &TableResource,
    capability: &Capability,
    cancel: &CancellationToken,
) -> ResolveRecord {
    let can_resolve_before = resource.can_resolve(capability);
    let outcome = match resource.resolve(capability, cancel) {
        Ok(Some(resolved)) => json!({
            "result": "resolved",
            "kind": resolved.kind(),
            "detail": describe(&resolved),
        }),
        Ok(None) => json!({"result": "unsupported"}),
        Err(err) => json!({
            "result": "error",
            "error": format!("{:#}", anyhow::Error::new(err)),
        }),
    };
    ResolveRecord {
        table: resource.name().to_string(),
        identifier: resource.identifier().clone(),
        capability: capability.clone(),
        can_resolve_before,
        outcome,
        can_resolve_after: resource.can_resolve(capability),
        read_only: resource.read_only(),
        status: resource.status(),
    }
}

fn describe(resolved: &Resolved) -> Value {
    match resolved {
        Resolved::Info(info) => serde_json::to_value(info).unwrap_or(Value::Null),
        Resolved::Resource(resource) => json!(resource.identifier()),
        Resolved::FeatureStore(store) => json!(store.name()),
        Resolved::FeatureSource(source) => json!(source.name()),
        Resolved::Service(service) => json!(service.identifier().as_str()),
        Resolved::Connection(conn) => json!({
            "url": conn.url().as_str(),
            "closed": conn.is_closed(),
        }),
        Resolved::DataStore(_) | Resolved::Extension(_) => Value::Null,
    }
}
