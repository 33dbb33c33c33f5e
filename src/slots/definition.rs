//! Named, conditionally-stored slot definitions.

use crate::error::{Result, StateError};
use crate::types::OwnerId;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A single named state variable definition.
///
/// One definition is shared (via `Arc`) by the template of the declaring
/// class and by every instance collection cloned from it. Values and
/// enabled overrides are partitioned by owner identity, so instances never
/// observe each other's state.
pub struct SlotDefinition {
    name: String,
    doc: String,
    enabled_default: bool,
    values: RwLock<HashMap<OwnerId, Value>>,
    enabled: RwLock<HashMap<OwnerId, bool>>,
}

impl SlotDefinition {
    /// Create a definition, enabled by default.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::trace!(slot = %name, "new state variable definition");
        Self {
            name,
            doc: "State variable".to_string(),
            enabled_default: true,
            values: RwLock::new(HashMap::new()),
            enabled: RwLock::new(HashMap::new()),
        }
    }

    /// Set the documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Set the class-wide default for the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled_default = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn enabled_default(&self) -> bool {
        self.enabled_default
    }

    /// Whether a value has been recorded for `owner`.
    pub fn is_set(&self, owner: OwnerId) -> bool {
        self.values.read().contains_key(&owner)
    }

    /// The value recorded for `owner`.
    pub fn get(&self, owner: OwnerId) -> Result<Value> {
        self.values
            .read()
            .get(&owner)
            .cloned()
            .ok_or_else(|| StateError::UnknownState(self.name.clone()))
    }

    /// Record a value for `owner`, but only while the slot is enabled for
    /// that owner. Writes to a disabled slot are dropped, not an error.
    pub fn set(&self, owner: OwnerId, value: Value) {
        if self.is_enabled(owner) {
            self.values.write().insert(owner, value);
        } else {
            tracing::trace!(slot = %self.name, owner = %owner, "dropping write to disabled slot");
        }
    }

    /// The owner-specific override if present, else the class-wide default.
    pub fn is_enabled(&self, owner: OwnerId) -> bool {
        self.enabled
            .read()
            .get(&owner)
            .copied()
            .unwrap_or(self.enabled_default)
    }

    /// Set the owner-specific enabled override.
    pub fn enable(&self, owner: OwnerId, value: bool) {
        tracing::trace!(slot = %self.name, owner = %owner, enabled = value, "toggling slot");
        self.enabled.write().insert(owner, value);
    }

    /// Remove the value recorded for `owner`.
    pub fn delete(&self, owner: OwnerId) -> Result<()> {
        self.values
            .write()
            .remove(&owner)
            .map(|_| ())
            .ok_or_else(|| StateError::UnknownState(self.name.clone()))
    }

    /// Record a value for `owner` unconditionally, bypassing the enabled
    /// gate. Only the restore/copy paths may use this.
    pub(crate) fn put(&self, owner: OwnerId, value: Value) {
        self.values.write().insert(owner, value);
    }

    /// Drop every record for `owner`. Called when the owning collection is
    /// dropped.
    pub(crate) fn release(&self, owner: OwnerId) {
        self.values.write().remove(&owner);
        self.enabled.write().remove(&owner);
    }
}

impl fmt::Debug for SlotDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDefinition")
            .field("name", &self.name)
            .field("enabled_default", &self.enabled_default)
            .field("owners", &self.values.read().len())
            .finish()
    }
}
