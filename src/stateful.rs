//! The capability every stateful object embeds.

use crate::collection::StateCollection;
use crate::error::Result;
use crate::slots::StateTemplate;
use crate::types::{SavedSlot, SavedStates};
use std::fmt;

/// Capability of exposing a state collection.
///
/// Implemented both by [`Stateful`] and by [`StateCollection`] itself, so
/// operations that consult another object's states (temporary enabling,
/// copying) accept either kind without inspecting it.
pub trait HasStates {
    fn states(&self) -> &StateCollection;
    fn states_mut(&mut self) -> &mut StateCollection;
}

impl HasStates for StateCollection {
    fn states(&self) -> &StateCollection {
        self
    }

    fn states_mut(&mut self) -> &mut StateCollection {
        self
    }
}

/// Base for stateful objects: an instance-owned clone of the class
/// template, bound to a fresh owner token at construction.
///
/// Algorithm objects embed a `Stateful` and expose conditional results
/// through its [`states`](Stateful::states) accessor, the only sanctioned
/// access path into state values from outside.
pub struct Stateful {
    states: StateCollection,
}

impl Stateful {
    /// Clone `template` into a fresh owner-bound collection.
    pub fn new(template: &StateTemplate) -> Result<Self> {
        let mut states = template.instantiate();
        states.bind_owner()?;
        tracing::debug!(class = %states.class_name(), "initialized stateful instance");
        Ok(Self { states })
    }

    /// Like [`new`](Stateful::new), then apply `enable` (tolerating
    /// unknown names) followed by `disable` (strict on unknown names).
    pub fn with_states<E: AsRef<str>, D: AsRef<str>>(
        template: &StateTemplate,
        enable: &[E],
        disable: &[D],
    ) -> Result<Self> {
        let stateful = Self::new(template)?;
        let enable: Vec<String> = enable.iter().map(|s| s.as_ref().to_string()).collect();
        let disable: Vec<String> = disable.iter().map(|s| s.as_ref().to_string()).collect();
        stateful.states.enable_with(enable, true, true)?;
        stateful.states.enable_with(disable, false, false)?;
        Ok(stateful)
    }

    pub fn states(&self) -> &StateCollection {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut StateCollection {
        &mut self.states
    }

    /// Produce the persisted mapping `{name: (is_set, value, enabled)}`
    /// for every slot currently set. Enabled flags of unset slots are not
    /// preserved.
    pub fn save_states(&self) -> Result<SavedStates> {
        let mut saved = SavedStates::default();
        for name in self.states.names() {
            if self.states.is_set(name)? {
                saved.0.insert(
                    name.clone(),
                    SavedSlot {
                        is_set: true,
                        value: Some(self.states.get(name)?),
                        enabled: self.states.is_enabled(name)?,
                    },
                );
            }
        }
        tracing::debug!(
            class = %self.states.class_name(),
            slots = saved.len(),
            "saved states"
        );
        Ok(saved)
    }

    /// Re-initialize a fresh instance from `template` and replay `saved`.
    /// Values are written before the enabled flag is replayed, so a slot
    /// that was set and later disabled is restored intact.
    pub fn restore_states(template: &StateTemplate, saved: &SavedStates) -> Result<Self> {
        let stateful = Self::new(template)?;
        for (name, slot) in &saved.0 {
            if slot.is_set {
                if let Some(value) = &slot.value {
                    stateful.states.put_value(name, value.clone())?;
                }
            }
            stateful
                .states
                .enable_with(name.as_str(), slot.enabled, false)?;
        }
        tracing::debug!(
            class = %stateful.states.class_name(),
            slots = saved.len(),
            "restored states"
        );
        Ok(stateful)
    }
}

impl HasStates for Stateful {
    fn states(&self) -> &StateCollection {
        &self.states
    }

    fn states_mut(&mut self) -> &mut StateCollection {
        &mut self.states
    }
}

impl fmt::Display for Stateful {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {}", self.states.class_name(), self.states)
    }
}

impl fmt::Debug for Stateful {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use crate::slots::SlotDefinition;
    use serde_json::json;

    fn template() -> StateTemplate {
        StateTemplate::builder("Classifier")
            .slot(SlotDefinition::new("trained_labels"))
            .slot(SlotDefinition::new("training_error").with_enabled(false))
            .build()
    }

    #[test]
    fn test_construction_applies_enable_then_disable() {
        let template = template();
        let stateful = Stateful::with_states(
            &template,
            &["training_error", "unheard_of"],
            &["trained_labels"],
        )
        .unwrap();

        assert!(stateful.states().is_enabled("training_error").unwrap());
        assert!(!stateful.states().is_enabled("trained_labels").unwrap());
    }

    #[test]
    fn test_disable_list_is_strict() {
        let template = template();
        let result = Stateful::with_states(&template, &["training_error"], &["unheard_of"]);
        assert!(matches!(result, Err(StateError::UnknownSlot { .. })));
    }

    #[test]
    fn test_save_emits_only_set_slots() {
        let template = template();
        let stateful = Stateful::new(&template).unwrap();
        stateful.states().set("trained_labels", json!(["a"])).unwrap();

        let saved = stateful.save_states().unwrap();
        assert_eq!(saved.len(), 1);
        let slot = saved.get("trained_labels").unwrap();
        assert!(slot.is_set);
        assert_eq!(slot.value, Some(json!(["a"])));
        assert!(slot.enabled);
    }

    #[test]
    fn test_roundtrip_preserves_set_value_and_enabled() {
        let template = template();
        let stateful = Stateful::with_states(&template, &["training_error"], &[] as &[&str])
            .unwrap();
        stateful.states().set("training_error", json!(0.25)).unwrap();
        stateful.states().set("trained_labels", json!(["x", "y"])).unwrap();
        // disabled after the value was recorded; the value must survive
        stateful.states().disable("training_error").unwrap();

        let saved = stateful.save_states().unwrap();
        let restored = Stateful::restore_states(&template, &saved).unwrap();

        for name in ["training_error", "trained_labels"] {
            assert_eq!(
                restored.states().is_set(name).unwrap(),
                stateful.states().is_set(name).unwrap()
            );
            assert_eq!(
                restored.states().get(name).unwrap(),
                stateful.states().get(name).unwrap()
            );
            assert_eq!(
                restored.states().is_enabled(name).unwrap(),
                stateful.states().is_enabled(name).unwrap()
            );
        }
    }

    #[test]
    fn test_restore_rejects_unknown_slots() {
        let template = template();
        let mut saved = SavedStates::default();
        saved.0.insert(
            "unheard_of".to_string(),
            crate::types::SavedSlot {
                is_set: true,
                value: Some(json!(1)),
                enabled: true,
            },
        );

        let result = Stateful::restore_states(&template, &saved);
        assert!(matches!(result, Err(StateError::UnknownSlot { .. })));
    }

    #[test]
    fn test_display() {
        let template = template();
        let stateful = Stateful::new(&template).unwrap();
        assert_eq!(
            stateful.to_string(),
            "Classifier with 2 states: trained_labels+ training_error"
        );
    }
}
