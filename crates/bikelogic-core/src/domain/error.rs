//! Engine error taxonomy.
//!
//! Data-shape problems never surface here: malformed payloads normalize to
//! empty maps and missing fields make a rule indeterminate. These variants are
//! caller bugs or snapshot-construction failures.

use super::category::Category;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{role} must be a {expected} component, got {actual} ({id})")]
    CategoryMismatch {
        role: &'static str,
        expected: String,
        actual: Category,
        id: String,
    },

    #[error("duplicate component id in catalog: {0}")]
    DuplicateComponent(String),

    #[error("component not found: {0}")]
    ComponentNotFound(String),

    #[error("invalid gearing input: {0}")]
    InvalidGearing(String),

    #[error("component {id} has no {field}")]
    MissingAttribute { id: String, field: &'static str },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
