//! Slot definitions and the class-level templates that aggregate them.

mod definition;
mod template;

pub use definition::SlotDefinition;
pub use template::{StateTemplate, TemplateBuilder};
