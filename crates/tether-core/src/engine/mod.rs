//! # Engine Module
//!
//! Aggregation of restraints into a single evaluable score.
//!
//! - **Scoring** ([`scoring_function`]) - [`ScoringFunction`](scoring_function::ScoringFunction),
//!   which owns the evaluation round: it clears derivative accumulators once, evaluates every
//!   member in construction order and sums their weighted scores
//! - **Configuration** ([`config`]) - [`ScoringFunctionBuilder`](config::ScoringFunctionBuilder)
//!   and its validation errors
//! - **Error Handling** ([`error`]) - [`EngineError`](error::EngineError), including the aggregate
//!   evaluation error that names the first failing member
//!
//! With the `parallel` feature, members are evaluated on the rayon thread pool. Their results
//! are still gathered and summed in construction order.

pub mod config;
pub mod error;
pub mod scoring_function;
