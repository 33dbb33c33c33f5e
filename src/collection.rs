//! Per-instance registry of state variables.

use crate::error::{Result, StateError};
use crate::slots::{SlotDefinition, StateTemplate};
use crate::stateful::HasStates;
use crate::types::{Owner, OwnerId, StateSelector};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of the state variables of one owning object.
///
/// An instance collection is cloned from a class [`StateTemplate`]; the
/// slot definitions stay shared with the template, while values and
/// enabled overrides are partitioned by the collection's owner token.
/// Mutation requires a bound owner; a freshly instantiated collection is
/// unbound until [`bind_owner`](StateCollection::bind_owner) is called.
pub struct StateCollection {
    class_name: String,
    items: HashMap<String, Arc<SlotDefinition>>,
    /// Declaration order, as merged at template-build time.
    order: Vec<String>,
    owner: Owner,
    /// Stack of enabled-name sets captured by `enable_temporarily`.
    stored_temporarily: Vec<Vec<String>>,
}

impl StateCollection {
    pub(crate) fn from_template(template: &StateTemplate) -> Self {
        Self {
            class_name: template.class_name().to_string(),
            items: template
                .items()
                .iter()
                .map(|(name, def)| (name.clone(), Arc::clone(def)))
                .collect(),
            order: template.names().to_vec(),
            owner: Owner::Unbound,
            stored_temporarily: Vec::new(),
        }
    }

    /// Assign a fresh owner token. May only happen once.
    pub fn bind_owner(&mut self) -> Result<OwnerId> {
        match self.owner {
            Owner::Bound(_) => Err(StateError::InvalidOwner(
                "collection owner may only be assigned once".to_string(),
            )),
            Owner::Unbound => {
                let id = OwnerId::next();
                self.owner = Owner::Bound(id);
                Ok(id)
            }
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Name of the class whose template this collection was cloned from.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// All known slot names, declaration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    fn check_known(&self, name: &str) -> Result<&Arc<SlotDefinition>> {
        self.items.get(name).ok_or_else(|| StateError::UnknownSlot {
            class: self.class_name.clone(),
            slot: name.to_string(),
        })
    }

    fn owner_id(&self) -> Result<OwnerId> {
        match self.owner {
            Owner::Bound(id) => Ok(id),
            Owner::Unbound => Err(StateError::InvalidOwner(
                "collection has no owner assigned".to_string(),
            )),
        }
    }

    fn effective_enabled(&self, def: &SlotDefinition) -> bool {
        match self.owner {
            Owner::Bound(id) => def.is_enabled(id),
            Owner::Unbound => def.enabled_default(),
        }
    }

    fn effective_set(&self, def: &SlotDefinition) -> bool {
        match self.owner {
            Owner::Bound(id) => def.is_set(id),
            Owner::Unbound => false,
        }
    }

    // --- Predicates ---

    /// Whether `name` is known at all. Never fails.
    pub fn is_known(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Whether `name` is enabled for this owner.
    pub fn is_enabled(&self, name: &str) -> Result<bool> {
        let def = self.check_known(name)?;
        Ok(self.effective_enabled(def))
    }

    /// Whether `name` has a value recorded for this owner.
    pub fn is_set(&self, name: &str) -> Result<bool> {
        let def = self.check_known(name)?;
        Ok(self.effective_set(def))
    }

    /// Whether `name` is known and enabled.
    pub fn is_active(&self, name: &str) -> bool {
        self.is_known(name) && matches!(self.is_enabled(name), Ok(true))
    }

    // --- Value access ---

    /// The value recorded for `name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        let def = self.check_known(name)?;
        match self.owner {
            Owner::Bound(id) => def.get(id),
            Owner::Unbound => Err(StateError::UnknownState(name.to_string())),
        }
    }

    /// Record a value for `name`. Dropped silently while the slot is
    /// disabled for this owner.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let def = self.check_known(name)?;
        let owner = self.owner_id()?;
        def.set(owner, value.into());
        Ok(())
    }

    /// Remove the value recorded for `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let def = self.check_known(name)?;
        let owner = self.owner_id()?;
        def.delete(owner)
    }

    /// Record a value unconditionally; restore/copy paths only.
    pub(crate) fn put_value(&self, name: &str, value: Value) -> Result<()> {
        let def = self.check_known(name)?;
        let owner = self.owner_id()?;
        def.put(owner, value);
        Ok(())
    }

    // --- Enabling ---

    /// Enable (`value = true`) or disable the selected slots. Unknown names
    /// fail with `UnknownSlot` unless `missing_ok`, in which case they are
    /// skipped.
    pub fn enable_with(
        &self,
        selector: impl Into<StateSelector>,
        value: bool,
        missing_ok: bool,
    ) -> Result<()> {
        let owner = self.owner_id()?;
        let names: Vec<String> = match selector.into() {
            StateSelector::All => self.order.clone(),
            StateSelector::Name(name) => vec![name],
            StateSelector::Names(list) => {
                let mut out = Vec::new();
                for name in list {
                    // the sentinel also expands inside a name list
                    if name.eq_ignore_ascii_case("all") {
                        out.extend(self.order.iter().cloned());
                    } else {
                        out.push(name);
                    }
                }
                out
            }
        };

        for name in names {
            if name.is_empty() {
                return Err(StateError::InvalidArgument(
                    "empty state variable name".to_string(),
                ));
            }
            match self.check_known(&name) {
                Ok(def) => def.enable(owner, value),
                Err(_) if missing_ok => {
                    tracing::trace!(slot = %name, "skipping unknown slot");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Enable the selected slots.
    pub fn enable(&self, selector: impl Into<StateSelector>) -> Result<()> {
        self.enable_with(selector, true, false)
    }

    /// Disable the selected slots.
    pub fn disable(&self, selector: impl Into<StateSelector>) -> Result<()> {
        self.enable_with(selector, false, false)
    }

    /// Currently-enabled names, declaration order.
    pub fn enabled_names(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| self.effective_enabled(&self.items[*name]))
            .cloned()
            .collect()
    }

    /// Replace the full enabled set: every known name becomes enabled iff
    /// it appears in `names`. Unknown names in `names` are ignored.
    pub fn set_enabled_names<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let owner = self.owner_id()?;
        for name in &self.order {
            let enabled = names.iter().any(|n| n.as_ref() == name);
            self.items[name].enable(owner, enabled);
        }
        Ok(())
    }

    // --- Temporary enabling ---

    /// Push the current enabled-set, then enable every name in `names`
    /// that is currently disabled and, if `other` is given, enabled on
    /// `other`. Restore with
    /// [`reset_enabled_temporarily`](StateCollection::reset_enabled_temporarily).
    pub fn enable_temporarily<S: AsRef<str>>(
        &mut self,
        names: &[S],
        other: Option<&dyn HasStates>,
    ) -> Result<()> {
        self.stored_temporarily.push(self.enabled_names());
        tracing::debug!(
            class = %self.class_name,
            depth = self.stored_temporarily.len(),
            "stored enabled set"
        );

        for name in names {
            let name = name.as_ref();
            if !self.is_enabled(name)? {
                let other_enabled = match other {
                    None => true,
                    Some(o) => o.states().is_enabled(name)?,
                };
                if other_enabled {
                    tracing::debug!(slot = %name, "temporarily enabling slot");
                    self.enable_with(name, true, false)?;
                }
            }
        }
        Ok(())
    }

    /// Pop the stack and restore the previously stored enabled-set.
    pub fn reset_enabled_temporarily(&mut self) -> Result<()> {
        let restored = self
            .stored_temporarily
            .pop()
            .ok_or(StateError::StackUnderflow)?;
        tracing::debug!(class = %self.class_name, "restoring previous enabled set");
        self.set_enabled_names(&restored)
    }

    // --- Reporting ---

    /// One human-readable line per slot, sorted by name: the name, an
    /// `[enabled]` marker, a `*` marker if a value is set, and the
    /// documentation string.
    pub fn listing(&self) -> Vec<String> {
        let mut names: Vec<&String> = self.order.iter().collect();
        names.sort();
        names
            .iter()
            .map(|name| {
                let def = &self.items[*name];
                format!(
                    "{}{}{}: {}",
                    name,
                    if self.effective_enabled(def) { "[enabled]" } else { "" },
                    if self.effective_set(def) { "*" } else { "" },
                    def.doc()
                )
            })
            .collect()
    }

    // --- Copying ---

    /// Copy `other`'s enabled-set and, for every name known here that has
    /// a value on `other`, the stored value.
    pub fn copy_states_from(&self, other: &dyn HasStates) -> Result<()> {
        let other = other.states();
        let owner = self.owner_id()?;
        self.set_enabled_names(&other.enabled_names())?;
        for name in &self.order {
            if other.is_known(name) && other.is_set(name)? {
                self.items[name].put(owner, other.get(name)?);
            }
        }
        Ok(())
    }
}

impl fmt::Display for StateCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} states:", self.items.len())?;
        for name in self.order.iter().take(4) {
            write!(f, " {}", name)?;
            let def = &self.items[name];
            if self.effective_enabled(def) {
                write!(f, "+")?;
            }
            if self.effective_set(def) {
                write!(f, "*")?;
            }
        }
        if self.items.len() > 4 {
            write!(f, "...")?;
        }
        Ok(())
    }
}

impl fmt::Debug for StateCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCollection")
            .field("class", &self.class_name)
            .field("owner", &self.owner)
            .field("names", &self.order)
            .finish()
    }
}

impl Drop for StateCollection {
    fn drop(&mut self) {
        if let Owner::Bound(id) = self.owner {
            for def in self.items.values() {
                def.release(id);
            }
        }
    }
}
