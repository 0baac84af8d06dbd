//! Chain events as handed over by the chain client.
//!
//! A [`RawEvent`] is loosely typed: its parameters are JSON values whose
//! shape depends on the emitting module. Typed decoding happens in
//! `sdrop-core`.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single event parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParam {
    /// Type name as reported by the node metadata (e.g. `AccountId`).
    #[serde(rename = "type", default)]
    pub type_name: CompactString,
    pub value: serde_json::Value,
}

impl EventParam {
    pub fn new(type_name: impl Into<CompactString>, value: serde_json::Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }
}

/// One entry of a block's event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Emitting module (pallet) name.
    #[serde(rename = "module")]
    pub module_id: CompactString,
    /// Event name within the module.
    #[serde(rename = "event")]
    pub event_id: CompactString,
    #[serde(default)]
    pub params: SmallVec<[EventParam; 6]>,
}

impl RawEvent {
    /// Whether this event carries the given module/event tag.
    pub fn is(&self, module_id: &str, event_id: &str) -> bool {
        self.module_id == module_id && self.event_id == event_id
    }
}
