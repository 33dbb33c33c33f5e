//! Error types for state variable operations.

use thiserror::Error;

/// Main error type for state variable operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Value of state variable '{0}' is not yet known")]
    UnknownState(String),

    #[error("States of {class} have no slot '{slot}' registered")]
    UnknownSlot { class: String, slot: String },

    #[error("Invalid state selector: {0}")]
    InvalidArgument(String),

    #[error("No previously stored set of enabled states to restore")]
    StackUnderflow,

    #[error("Invalid collection owner: {0}")]
    InvalidOwner(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for StateError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StateError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for StateError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StateError::Deserialization(e.to_string())
    }
}

/// Result type for state variable operations.
pub type Result<T> = std::result::Result<T, StateError>;
