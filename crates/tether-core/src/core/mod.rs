//! # Core Module
//!
//! The data model and scoring terms of tether.
//!
//! - **Particles and attributes** ([`models`]) - The [`Model`](models::model::Model) owning
//!   every particle, its typed attributes and the derivative accumulators written during scoring
//! - **Scoring terms** ([`restraints`]) - The [`Restraint`](restraints::restraint::Restraint)
//!   contract, its accumulators, static metadata and the built-in harmonic terms
//! - **Utilities** ([`utils`]) - Atomic float accumulation and unique object naming

pub mod models;
pub mod restraints;
pub mod utils;
