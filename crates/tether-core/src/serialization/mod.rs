//! # Serialization Module
//!
//! Snapshots of models, restraints and scoring functions, plus the type registry
//! that turns a restraint snapshot back into the right concrete type.
//!
//! - [`snapshot`] - Plain serde data types: restraint, scoring-function and model snapshots
//! - [`registry`] - Type identifier → factory registry used for polymorphic restore
//! - [`session`] - Identity-preserving writer/reader for restraints shared by several owners
//! - [`error`] - [`SerializationError`](error::SerializationError)
//!
//! Snapshots are format-agnostic; [`to_json`] and [`from_json`] cover the common case.

pub mod error;
pub mod registry;
pub mod session;
pub mod snapshot;

use error::SerializationError;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn to_json<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    Ok(serde_json::from_str(json)?)
}
