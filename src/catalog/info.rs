//! Descriptive metadata for a table resource.
//!
//! Info construction never fails from the caller's point of view: any error
//! while fetching the schema, or a panic inside a collaborator, is logged and
//! turned into [`ResourceInfo::Unavailable`].

use crate::catalog::identity::ResourceId;
use crate::catalog::model::{Envelope, FeatureType};
use crate::catalog::resource::TableResource;
use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResourceInfo {
    Available(TableInfo),
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub identifier: ResourceId,
    pub name: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub schema: FeatureType,
    #[serde(default)]
    pub crs: Option<String>,
    #[serde(default)]
    pub bounds: Option<Envelope>,
}

impl ResourceInfo {
    pub fn is_available(&self) -> bool {
        matches!(self, ResourceInfo::Available(_))
    }

    pub fn table(&self) -> Option<&TableInfo> {
        match self {
            ResourceInfo::Available(info) => Some(info),
            ResourceInfo::Unavailable => None,
        }
    }
}

/// Build the info object for `resource`, degrading to `Unavailable` on error.
///
/// Collaborator panics are caught here as well. The resource's own state is
/// only read on this path, so nothing is left half-updated by an unwind.
pub fn build_info(resource: &TableResource, cancel: &CancellationToken) -> ResourceInfo {
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| try_build_info(resource, cancel)));
    match attempt {
        Ok(Ok(info)) => ResourceInfo::Available(info),
        Ok(Err(err)) => {
            warn!(
                resource = %resource.identifier(),
                error = %err,
                "error creating resource info"
            );
            ResourceInfo::Unavailable
        }
        Err(payload) => {
            warn!(
                resource = %resource.identifier(),
                panic = panic_text(&*payload),
                "collaborator panicked while creating resource info"
            );
            ResourceInfo::Unavailable
        }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic payload"
    }
}

fn try_build_info(
    resource: &TableResource,
    cancel: &CancellationToken,
) -> Result<TableInfo, ResolveError> {
    let store = resource.data_store(cancel)?;
    let name = resource.name();
    let schema = store.schema(name, cancel)?;

    // Extent is optional metadata; a failure here must not hide the schema.
    let bounds = match store
        .feature_access(name, cancel)
        .and_then(|access| access.into_source().bounds(cancel))
    {
        Ok(bounds) => bounds,
        Err(err) => {
            debug!(resource = %resource.identifier(), error = %err, "bounds unavailable");
            None
        }
    };

    let service_url = resource.identifier().service_url();
    let mut keywords = vec![service_url.scheme().to_string(), name.to_string()];
    if schema.name != name {
        keywords.push(schema.name.clone());
    }

    Ok(TableInfo {
        identifier: resource.identifier().clone(),
        name: name.to_string(),
        title: name.to_string(),
        description: format!("Table {name} served by {service_url}"),
        keywords,
        crs: schema.crs().map(str::to_string),
        schema,
        bounds,
    })
}
