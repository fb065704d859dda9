use crate::core::models::model::ModelError;
use crate::core::restraints::error::RestraintError;
use crate::engine::config::ConfigError;
use crate::engine::error::EngineError;
use crate::serialization::error::SerializationError;
use thiserror::Error;

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Restraint(#[from] RestraintError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

pub type Result<T> = std::result::Result<T, Error>;
