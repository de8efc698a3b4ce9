//! Bridge between the widgets and the host that embeds them.
//!
//! The host owns a small global object (`toolOutput`, `toolResponseMetadata`,
//! `widgetState`, `theme`, `locale`) and pushes changes to it out-of-band. Widgets
//! never keep an authoritative copy: they subscribe to one key at a time and read
//! snapshots straight from the host.

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod call;
pub mod sandbox;
pub mod store;

pub use call::{CallStatus, PendingCall};
pub use store::HostGlobals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlobalKey {
    ToolOutput,
    ToolResponseMetadata,
    WidgetState,
    Theme,
    Locale,
}

impl GlobalKey {
    pub const ALL: [GlobalKey; 5] = [
        GlobalKey::ToolOutput,
        GlobalKey::ToolResponseMetadata,
        GlobalKey::WidgetState,
        GlobalKey::Theme,
        GlobalKey::Locale,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToolOutput => "toolOutput",
            Self::ToolResponseMetadata => "toolResponseMetadata",
            Self::WidgetState => "widgetState",
            Self::Theme => "theme",
            Self::Locale => "locale",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// Result of reading one global.
///
/// A host that has not injected its global object yet, a missing key and a JSON
/// `null` all read as `Absent`. Rendering code treats `Absent` as "still loading",
/// never as empty data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Snapshot {
    #[default]
    Absent,
    Present(Value),
}

impl Snapshot {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(value) => Self::Present(value.clone()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Absent => None,
            Self::Present(value) => Some(value),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

/// The single change notification the host broadcasts: `{ "globals": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetGlobalsEvent {
    #[serde(default)]
    pub globals: Map<String, Value>,
}

impl SetGlobalsEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: GlobalKey, value: Value) -> Self {
        self.globals.insert(key.as_str().to_string(), value);
        self
    }

    pub fn carries(&self, key: GlobalKey) -> bool {
        self.globals.contains_key(key.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = GlobalKey> + '_ {
        self.globals.keys().filter_map(|name| GlobalKey::from_wire(name))
    }
}

/// De-registration handle for a global subscription.
///
/// Dropping the handle deregisters the listener, so a torn-down view cannot be
/// called back. `unsubscribe` does the same explicitly.
#[must_use = "dropping a Subscription deregisters its listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

pub type ChangeListener = Box<dyn Fn() + Send + Sync>;

/// Reactive read side of the host globals.
pub trait HostGlobalStore: Send + Sync {
    /// Registers `on_change` for one key. It fires at most once per change
    /// notification that carries `key`.
    fn subscribe(&self, key: GlobalKey, on_change: ChangeListener) -> Subscription;

    /// Reads the current value of `key` from the host, uncached.
    fn snapshot(&self, key: GlobalKey) -> Snapshot;

    /// Initial-render read. There is no server-rendered variant, so this is the
    /// live read.
    fn server_snapshot(&self, key: GlobalKey) -> Snapshot {
        self.snapshot(key)
    }
}

/// Calls the widget makes back into the host.
pub trait HostActions: Send + Sync {
    /// Hands the full widget state to the host for persistence. Fire-and-forget.
    fn set_widget_state(&self, state: Value) -> Result<(), HostError>;

    fn call_tool(&self, name: &str, args: Value) -> PendingCall;

    fn send_follow_up_message(&self, prompt: &str) -> PendingCall;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_missing_values_read_as_absent() {
        assert!(Snapshot::from_value(None).is_absent());
        assert!(Snapshot::from_value(Some(&Value::Null)).is_absent());
        assert_eq!(
            Snapshot::from_value(Some(&json!("dark"))).as_str(),
            Some("dark")
        );
    }

    #[test]
    fn set_globals_event_parses_host_payload() {
        let event: SetGlobalsEvent = serde_json::from_value(json!({
            "globals": { "theme": "dark", "displayMode": "inline" }
        }))
        .expect("event should parse");

        assert!(event.carries(GlobalKey::Theme));
        assert!(!event.carries(GlobalKey::ToolOutput));
        assert_eq!(event.keys().collect::<Vec<_>>(), vec![GlobalKey::Theme]);
    }

    #[test]
    fn wire_names_round_trip_through_lookup() {
        for key in GlobalKey::ALL {
            assert_eq!(GlobalKey::from_wire(key.as_str()), Some(key));
        }
        assert_eq!(GlobalKey::from_wire("displayMode"), None);
    }
}
