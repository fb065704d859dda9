//! # tether
//!
//! Restraint-based scoring over a shared particle model, with polymorphic,
//! identity-preserving snapshots.
//!
//! ## Architectural Philosophy
//!
//! The library is layered so that each part can be used and tested on its own.
//!
//! - **[`core`]: The Foundation.** The [`Model`] owning particles, typed attributes and
//!   derivative accumulators, plus the [`Restraint`] contract and the built-in harmonic terms.
//!
//! - **[`engine`]: The Evaluation Layer.** [`ScoringFunction`] groups restraints over one
//!   model, owns the evaluation round and reports the first failing member.
//!
//! - **[`serialization`]: Persistence.** Snapshots of models, restraints and scoring
//!   functions, a type registry for restoring restraints polymorphically, and writer/reader
//!   sessions that keep shared restraints shared.
//!
//! ## Example
//!
//! ```
//! use nalgebra::Point3;
//! use std::sync::Arc;
//! use tether::{Model, Restraint, ScoringFunction, Xyz, ZPlaneRestraint};
//!
//! # fn main() -> tether::Result<()> {
//! let model = Arc::new(Model::new("example"));
//! let p = model.add_particle("p")?;
//! Xyz::setup_particle(&model, p, Point3::new(1.0, 2.0, 3.0))?;
//!
//! let restraint: Arc<dyn Restraint> = Arc::new(ZPlaneRestraint::new(&model, p, 10.0)?);
//! let sf = ScoringFunction::new(&model, vec![restraint])?;
//!
//! assert!((sf.evaluate(true)? - 45.0).abs() < 1e-9);
//! assert!((Xyz::new(&model, p)?.derivative(2)? - 30.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod serialization;

#[cfg(test)]
mod test_utils;

pub use crate::core::models::ids::ParticleIndex;
pub use crate::core::models::keys::{FloatKey, IntKey, StringKey};
pub use crate::core::models::model::Model;
pub use crate::core::models::xyz::Xyz;
pub use crate::core::restraints::distance::HarmonicDistanceRestraint;
pub use crate::core::restraints::info::StaticInfo;
pub use crate::core::restraints::restraint::Restraint;
pub use crate::core::restraints::z_plane::ZPlaneRestraint;
pub use crate::engine::scoring_function::ScoringFunction;
pub use crate::error::{Error, Result};
pub use crate::serialization::registry::RegisteredRestraint;
