//! # Restraints Module
//!
//! The polymorphic scoring-term contract and the built-in terms.
//!
//! - [`restraint`] - The [`Restraint`](restraint::Restraint) trait and shared [`RestraintBase`](restraint::RestraintBase)
//! - [`accumulator`] - Weighted score and derivative accumulators handed to each term
//! - [`info`] - [`StaticInfo`](info::StaticInfo), typed construction-time metadata
//! - [`error`] - Restraint construction and evaluation errors
//! - [`z_plane`] - Harmonic restraint toward the `z = 0` plane
//! - [`distance`] - Harmonic spring between two particles
//!
//! New terms implement [`Restraint`](restraint::Restraint) and, to take part in
//! polymorphic deserialization,
//! [`RegisteredRestraint`](crate::serialization::registry::RegisteredRestraint).

pub mod accumulator;
pub mod distance;
pub mod error;
pub mod info;
pub mod restraint;
pub mod z_plane;
