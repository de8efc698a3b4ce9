use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod store;

pub const SCHEMA_VERSION: u32 = 1;

/// Widget state the host keeps for one conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SavedWidgetState {
    pub schema_version: u32,
    pub turn_id: String,
    pub widget: String,
    pub state: Value,
    pub saved_at: String,
}
