//! Core types for state variable storage.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for allocating owner identity tokens.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token for the owner of recorded state values.
///
/// Slot definitions are shared by every instance of a class; the values
/// stored inside them are partitioned by this token. Tokens are never
/// reused within a process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl OwnerId {
    /// Allocate a fresh token.
    pub fn next() -> Self {
        OwnerId(NEXT_OWNER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner state of a collection. A collection records values only once an
/// owner token has been bound to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    /// No owner assigned yet (freshly instantiated from a template).
    Unbound,
    /// Bound to a live stateful instance.
    Bound(OwnerId),
}

/// Selector for enable/disable operations: a single slot, an explicit list
/// of slots, or every known slot.
///
/// The string `"all"` (any casing) is the expand-to-all sentinel, both on
/// its own and inside a name list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateSelector {
    All,
    Name(String),
    Names(Vec<String>),
}

impl From<&str> for StateSelector {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            StateSelector::All
        } else {
            StateSelector::Name(s.to_string())
        }
    }
}

impl From<String> for StateSelector {
    fn from(s: String) -> Self {
        StateSelector::from(s.as_str())
    }
}

impl From<&[&str]> for StateSelector {
    fn from(names: &[&str]) -> Self {
        StateSelector::Names(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for StateSelector {
    fn from(names: &[String]) -> Self {
        StateSelector::Names(names.to_vec())
    }
}

impl From<Vec<String>> for StateSelector {
    fn from(names: Vec<String>) -> Self {
        StateSelector::Names(names)
    }
}

impl<const N: usize> From<[&str; N]> for StateSelector {
    fn from(names: [&str; N]) -> Self {
        StateSelector::Names(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Saved form of a single slot: the (set, value, enabled) triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSlot {
    pub is_set: bool,
    pub value: Option<Value>,
    pub enabled: bool,
}

/// Serialized snapshot of a stateful object: one entry per slot that
/// currently has a value. Enabled flags of unset slots are not preserved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedStates(pub BTreeMap<String, SavedSlot>);

impl SavedStates {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SavedSlot> {
        self.0.get(name)
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::error::StateError::Deserialization(e.to_string()))
    }

    /// Encode as MessagePack.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode from MessagePack.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
