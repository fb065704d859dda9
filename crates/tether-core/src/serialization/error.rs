use crate::core::restraints::error::RestraintError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("No factory is registered for type '{0}'")]
    UnknownType(String),

    #[error("Snapshot references particle id {0}, which does not exist in the target model")]
    DanglingReference(u64),

    #[error("Malformed snapshot for '{type_id}': {reason}")]
    MalformedSnapshot { type_id: String, reason: String },

    #[error("Shared restraint record {0} refers to an instance that was never emitted")]
    UnknownRecord(u32),

    #[error("Restraint record {0} is emitted more than once")]
    DuplicateRecord(u32),

    #[error("Restored restraint is invalid: {0}")]
    Restraint(#[from] RestraintError),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
