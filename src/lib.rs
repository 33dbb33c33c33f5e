//! # State Variables
//!
//! Conditionally-computed result attributes for algorithm objects.
//!
//! Classifiers and analyzers expose optional results ("training error",
//! "predicted values") as named state variables that can be selectively
//! enabled or disabled for performance, with lazy "not yet computed"
//! semantics: reading a slot before anything was recorded is an error,
//! and writes to a disabled slot are silently dropped.
//!
//! ## Core Concepts
//!
//! - **Slot definitions**: named, conditionally-stored value holders,
//!   shared by every instance of the declaring class
//! - **Templates**: per-class, build-time merge of declared and inherited
//!   slots (most-derived declaration wins)
//! - **Collections**: per-instance registries cloned from a template,
//!   partitioning values by owner identity
//! - **Stateful**: the embeddable capability wiring it all together, with
//!   save/restore serialization hooks
//!
//! ## Example
//!
//! ```ignore
//! use statevar::{SlotDefinition, Stateful, StateTemplate};
//!
//! let template = StateTemplate::builder("KnnClassifier")
//!     .slot(SlotDefinition::new("predictions").with_doc("Most recent predictions"))
//!     .slot(SlotDefinition::new("training_error").with_enabled(false))
//!     .build();
//!
//! let clf = Stateful::new(&template)?;
//! clf.states().set("predictions", serde_json::json!([0, 1, 1]))?;
//!
//! // disabled by default: this write is dropped
//! clf.states().set("training_error", serde_json::json!(0.05))?;
//! assert!(!clf.states().is_set("training_error")?);
//! ```

pub mod collection;
pub mod error;
pub mod slots;
pub mod stateful;
pub mod types;

// Re-exports
pub use collection::StateCollection;
pub use error::{Result, StateError};
pub use slots::{SlotDefinition, StateTemplate, TemplateBuilder};
pub use stateful::{HasStates, Stateful};
pub use types::*;
