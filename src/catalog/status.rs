//! Health status for catalog entries.
//!
//! A resource reports its own override when one has been set and otherwise
//! asks its service every time; the parent's answer is never cached.

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Diagnostic payload attached to a status.
pub type StatusMessage = Arc<dyn Error + Send + Sync>;

/// Connection health of a catalog entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Connected,
    NotConnected,
    Broken,
    RestrictedAccess,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Connected => "connected",
            Status::NotConnected => "not_connected",
            Status::Broken => "broken",
            Status::RestrictedAccess => "restricted_access",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "connected" => Some(Status::Connected),
            "not_connected" => Some(Status::NotConnected),
            "broken" => Some(Status::Broken),
            "restricted_access" => Some(Status::RestrictedAccess),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A locally set status that wins over the inherited one.
#[derive(Clone)]
pub struct StatusOverride {
    pub status: Status,
    pub message: Option<StatusMessage>,
}

impl fmt::Debug for StatusOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusOverride")
            .field("status", &self.status)
            .field("message", &self.message.as_ref().map(|m| m.to_string()))
            .finish()
    }
}

/// Lock-free slot holding an optional [`StatusOverride`].
///
/// Status and message are swapped in as one pair, so a reader never sees the
/// status of one override with the message of another.
#[derive(Default)]
pub struct StatusSlot {
    current: ArcSwapOption<StatusOverride>,
}

impl StatusSlot {
    /// Replace any previous override.
    pub fn set(&self, status: Status, message: Option<StatusMessage>) {
        self.current
            .store(Some(Arc::new(StatusOverride { status, message })));
    }

    pub fn get(&self) -> Option<Arc<StatusOverride>> {
        self.current.load_full()
    }

    /// The override status, or whatever `inherited` reports right now.
    pub fn effective_status(&self, inherited: impl FnOnce() -> Status) -> Status {
        match &*self.current.load() {
            Some(local) => local.status,
            None => inherited(),
        }
    }

    /// The override message (which may be `None`), or the inherited one.
    pub fn effective_message(
        &self,
        inherited: impl FnOnce() -> Option<StatusMessage>,
    ) -> Option<StatusMessage> {
        match &*self.current.load() {
            Some(local) => local.message.clone(),
            None => inherited(),
        }
    }
}

impl fmt::Debug for StatusSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSlot")
            .field("current", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn message(text: &str) -> StatusMessage {
        Arc::new(io::Error::other(text.to_string()))
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            Status::Connected,
            Status::NotConnected,
            Status::Broken,
            Status::RestrictedAccess,
        ] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json.trim_matches('"'), status.as_str());
        }
        assert_eq!(Status::parse("sleeping"), None);
    }

    #[test]
    fn empty_slot_defers_to_inherited() {
        let slot = StatusSlot::default();
        assert_eq!(slot.effective_status(|| Status::NotConnected), Status::NotConnected);
        assert_eq!(slot.effective_status(|| Status::Connected), Status::Connected);
        let inherited = slot.effective_message(|| Some(message("parent down")));
        assert_eq!(inherited.unwrap().to_string(), "parent down");
    }

    #[test]
    fn override_wins_including_absent_message() {
        let slot = StatusSlot::default();
        slot.set(Status::Broken, Some(message("table dropped")));
        assert_eq!(slot.effective_status(|| Status::Connected), Status::Broken);
        assert_eq!(
            slot.effective_message(|| None).unwrap().to_string(),
            "table dropped"
        );

        slot.set(Status::Connected, None);
        assert_eq!(slot.effective_status(|| Status::Broken), Status::Connected);
        assert!(slot.effective_message(|| Some(message("parent"))).is_none());
    }

    #[test]
    fn inherited_closure_not_called_when_overridden() {
        let slot = StatusSlot::default();
        slot.set(Status::RestrictedAccess, None);
        let status = slot.effective_status(|| panic!("parent must not be queried"));
        assert_eq!(status, Status::RestrictedAccess);
    }
}
