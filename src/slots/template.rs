//! Class-level templates: the build-time aggregation of slot definitions.
//!
//! Each class-like entity registers its slots explicitly through
//! [`TemplateBuilder`], merging ancestor templates with `inherit`. The
//! resulting [`StateTemplate`] is immutable; instances clone it via
//! [`StateTemplate::instantiate`]. Typically the template is built once and
//! cached in a `std::sync::OnceLock`:
//!
//! ```ignore
//! fn template() -> &'static StateTemplate {
//!     static TEMPLATE: OnceLock<StateTemplate> = OnceLock::new();
//!     TEMPLATE.get_or_init(|| {
//!         StateTemplate::builder("KnnClassifier")
//!             .inherit(classifier_template())
//!             .slot(SlotDefinition::new("distances").with_doc("Distances to neighbors"))
//!             .build()
//!     })
//! }
//! ```

use super::definition::SlotDefinition;
use crate::collection::StateCollection;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable aggregation of the slot definitions a class declares or
/// inherits. Built once per class; holds no per-instance values.
pub struct StateTemplate {
    class_name: String,
    items: HashMap<String, Arc<SlotDefinition>>,
    order: Vec<String>,
}

impl StateTemplate {
    /// Start building a template for the named class.
    pub fn builder(class_name: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder {
            class_name: class_name.into(),
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Slot names in declaration order, as merged at build time.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The shared definition for `name`, if declared.
    pub fn definition(&self, name: &str) -> Option<&Arc<SlotDefinition>> {
        self.items.get(name)
    }

    /// Clone the template into a fresh, unbound instance collection. The
    /// definitions stay shared; only the owner and the enable stack are
    /// per-instance.
    pub fn instantiate(&self) -> StateCollection {
        StateCollection::from_template(self)
    }

    pub(crate) fn items(&self) -> &HashMap<String, Arc<SlotDefinition>> {
        &self.items
    }
}

/// Builder merging local slot declarations with inherited templates.
///
/// Override precedence is most-derived-wins: a local `slot` declaration
/// replaces an inherited definition of the same name, and `inherit` never
/// overrides a name that is already present (so among several inherited
/// bases, the first wins).
pub struct TemplateBuilder {
    class_name: String,
    items: HashMap<String, Arc<SlotDefinition>>,
    order: Vec<String>,
}

impl TemplateBuilder {
    /// Declare a slot. Replaces any inherited definition of the same name,
    /// keeping its position in declaration order.
    pub fn slot(mut self, definition: SlotDefinition) -> Self {
        let name = definition.name().to_string();
        if self.items.insert(name.clone(), Arc::new(definition)).is_none() {
            self.order.push(name);
        }
        self
    }

    /// Merge every slot of an ancestor template that is not already
    /// declared here.
    pub fn inherit(mut self, base: &StateTemplate) -> Self {
        for name in &base.order {
            if !self.items.contains_key(name) {
                self.items
                    .insert(name.clone(), Arc::clone(&base.items[name]));
                self.order.push(name.clone());
            }
        }
        self
    }

    pub fn build(self) -> StateTemplate {
        tracing::debug!(
            class = %self.class_name,
            slots = self.order.len(),
            "built state template"
        );
        StateTemplate {
            class_name: self.class_name,
            items: self.items,
            order: self.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_template() -> StateTemplate {
        StateTemplate::builder("Classifier")
            .slot(SlotDefinition::new("trained_labels"))
            .slot(SlotDefinition::new("training_error").with_enabled(false))
            .build()
    }

    #[test]
    fn test_local_declarations() {
        let template = base_template();
        assert_eq!(template.class_name(), "Classifier");
        assert_eq!(template.names(), ["trained_labels", "training_error"]);
        assert!(template.is_known("training_error"));
        assert!(!template.is_known("predictions"));
    }

    #[test]
    fn test_inherit_merges_ancestor_slots() {
        let base = base_template();
        let derived = StateTemplate::builder("KnnClassifier")
            .inherit(&base)
            .slot(SlotDefinition::new("distances"))
            .build();

        assert_eq!(
            derived.names(),
            ["trained_labels", "training_error", "distances"]
        );
    }

    #[test]
    fn test_local_slot_overrides_inherited() {
        let base = base_template();
        let derived = StateTemplate::builder("VerboseClassifier")
            .inherit(&base)
            .slot(SlotDefinition::new("training_error").with_enabled(true))
            .build();

        // position preserved, definition replaced
        assert_eq!(derived.names(), ["trained_labels", "training_error"]);
        assert!(derived
            .definition("training_error")
            .unwrap()
            .enabled_default());
        // the base keeps its own definition
        assert!(!base.definition("training_error").unwrap().enabled_default());
    }

    #[test]
    fn test_slot_declared_before_inherit_wins() {
        let base = base_template();
        let derived = StateTemplate::builder("EagerClassifier")
            .slot(SlotDefinition::new("training_error").with_enabled(true))
            .inherit(&base)
            .build();

        assert!(derived
            .definition("training_error")
            .unwrap()
            .enabled_default());
        assert_eq!(derived.names(), ["training_error", "trained_labels"]);
    }

    #[test]
    fn test_first_inherited_base_wins() {
        let a = StateTemplate::builder("A")
            .slot(SlotDefinition::new("shared").with_doc("from A"))
            .build();
        let b = StateTemplate::builder("B")
            .slot(SlotDefinition::new("shared").with_doc("from B"))
            .build();

        let merged = StateTemplate::builder("C").inherit(&a).inherit(&b).build();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.definition("shared").unwrap().doc(), "from A");
    }
}
