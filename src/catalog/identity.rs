use crate::error::IdentityError;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Fragment separator reserved by the identifier scheme.
pub const FRAGMENT_SEPARATOR: char = '#';

// `%` is escaped so an already-escaped name cannot alias a raw one, and
// whitespace is escaped so the url parser has nothing to trim or drop.
const NAME_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Stable identifier for a table resource: `<service-url>#<table>`.
///
/// Only [`build_identifier`] produces these, so every `ResourceId` carries
/// exactly one fragment naming the table inside its service.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Url);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The owning service's identifier, i.e. this id with the fragment removed.
    pub fn service_url(&self) -> Url {
        let mut url = self.0.clone();
        url.set_fragment(None);
        url
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Derive a resource identifier from its service identifier and local name.
///
/// Pure and deterministic. The name is percent-encoded into the fragment, so
/// distinct names always give distinct identifiers. Rejects names that would
/// move the fragment boundary: empty names, names containing `#`, and parents
/// that already carry a fragment.
pub fn build_identifier(parent: &Url, local_name: &str) -> Result<ResourceId, IdentityError> {
    if local_name.is_empty() {
        return Err(IdentityError::EmptyName);
    }
    if local_name.contains(FRAGMENT_SEPARATOR) {
        return Err(IdentityError::InvalidName(local_name.to_string()));
    }
    if parent.fragment().is_some() {
        return Err(IdentityError::FragmentInParent(parent.to_string()));
    }

    let encoded = utf8_percent_encode(local_name, NAME_ENCODE_SET);
    let raw = format!("{}{}{}", parent.as_str(), FRAGMENT_SEPARATOR, encoded);
    let url = Url::parse(&raw).map_err(|err| IdentityError::Malformed {
        identifier: raw.clone(),
        reason: err.to_string(),
    })?;

    let round_trips = url
        .fragment()
        .map(|fragment| percent_decode_str(fragment).decode_utf8_lossy())
        .is_some_and(|decoded| decoded == local_name);
    if !round_trips {
        return Err(IdentityError::InvalidName(local_name.to_string()));
    }
    Ok(ResourceId(url))
}
