use thiserror::Error;

use super::config::ConfigError;
use crate::core::restraints::error::RestraintError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Restraint '{restraint}' (member {index}) failed to evaluate: {source}")]
    Evaluation {
        index: usize,
        restraint: String,
        #[source]
        source: RestraintError,
    },

    #[error("Invalid scoring function configuration: {0}")]
    Config(#[from] ConfigError),
}
