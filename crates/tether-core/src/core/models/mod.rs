//! # Models Module
//!
//! Particle and attribute storage for a scoring run.
//!
//! - [`ids`] - Model identities and generational particle handles
//! - [`keys`] - Interned attribute keys for float, int and string attributes
//! - [`attributes`] - Column-oriented attribute tables with derivative slots
//! - [`model`] - The [`Model`](model::Model) owning particles and attributes
//! - [`xyz`] - A coordinate view over the reserved `x`/`y`/`z` attributes
//!
//! ```ignore
//! use tether::core::models::{model::Model, xyz::Xyz};
//! use nalgebra::Point3;
//!
//! let model = Model::new("example");
//! let p = model.add_particle("p")?;
//! let xyz = Xyz::setup_particle(&model, p, Point3::new(1.0, 2.0, 3.0))?;
//! assert_eq!(xyz.z()?, 3.0);
//! ```

pub mod attributes;
pub mod ids;
pub mod keys;
pub mod model;
pub mod xyz;
