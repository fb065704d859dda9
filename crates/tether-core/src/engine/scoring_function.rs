use super::config::{ConfigError, ScoringFunctionBuilder};
use super::error::EngineError;
use crate::core::models::ids::ParticleIndex;
use crate::core::models::model::Model;
use crate::core::restraints::restraint::Restraint;
use crate::serialization::error::SerializationError;
use crate::serialization::session::{SnapshotReader, SnapshotWriter};
use crate::serialization::snapshot::ScoringFunctionSnapshot;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The sum of an ordered set of restraints over one model.
///
/// Restraints are shared, not owned: the same `Arc<dyn Restraint>` may sit in
/// any number of scoring functions, and a parameter change made through any
/// handle shows up in every one of them.
#[derive(Debug)]
pub struct ScoringFunction {
    name: String,
    model: Arc<Model>,
    restraints: Vec<Arc<dyn Restraint>>,
}

impl ScoringFunction {
    pub const TYPE_NAME: &'static str = "tether::ScoringFunction";

    pub fn new(
        model: &Arc<Model>,
        restraints: Vec<Arc<dyn Restraint>>,
    ) -> Result<Self, ConfigError> {
        Self::builder().model(model).restraints(restraints).build()
    }

    pub fn builder() -> ScoringFunctionBuilder {
        ScoringFunctionBuilder::new()
    }

    pub(crate) fn from_parts(
        name: String,
        model: Arc<Model>,
        restraints: Vec<Arc<dyn Restraint>>,
    ) -> Self {
        Self {
            name,
            model,
            restraints,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn restraints(&self) -> &[Arc<dyn Restraint>] {
        &self.restraints
    }

    /// Union of all member inputs, in first-seen order.
    pub fn inputs(&self) -> Vec<ParticleIndex> {
        let mut seen = HashSet::new();
        self.restraints
            .iter()
            .flat_map(|r| r.inputs())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Total weighted score of all members.
    ///
    /// With `derivatives`, every derivative slot of the model is zeroed once
    /// before any member runs, so afterwards the slots hold exactly this
    /// round's gradient. Members are summed in construction order.
    ///
    /// # Errors
    ///
    /// [`EngineError::Evaluation`] wrapping the failure of the first member (by
    /// position) that fails. Derivatives already written by earlier members
    /// are not rolled back.
    #[instrument(skip_all, name = "scoring_function_evaluate", fields(scoring_function = %self.name, derivatives = derivatives))]
    pub fn evaluate(&self, derivatives: bool) -> Result<f64, EngineError> {
        let total: f64 = self.evaluate_members(derivatives)?.into_iter().sum();
        debug!(total, "evaluated scoring function");
        Ok(total)
    }

    /// Weighted score of each member, in construction order.
    ///
    /// Clears derivatives exactly like [`ScoringFunction::evaluate`].
    #[instrument(skip_all, name = "scoring_function_terms", fields(scoring_function = %self.name, derivatives = derivatives))]
    pub fn evaluate_terms(&self, derivatives: bool) -> Result<Vec<f64>, EngineError> {
        self.evaluate_members(derivatives)
    }

    fn evaluate_members(&self, derivatives: bool) -> Result<Vec<f64>, EngineError> {
        if derivatives {
            self.model.clear_derivatives();
        }

        #[cfg(not(feature = "parallel"))]
        let scores = self
            .restraints
            .iter()
            .enumerate()
            .map(|(index, restraint)| evaluate_member(index, restraint, derivatives))
            .collect::<Result<Vec<_>, _>>()?;

        // Every member runs; the first failure by position is then reported.
        #[cfg(feature = "parallel")]
        let scores = {
            let results: Vec<Result<f64, EngineError>> = self
                .restraints
                .par_iter()
                .enumerate()
                .map(|(index, restraint)| evaluate_member(index, restraint, derivatives))
                .collect();
            results.into_iter().collect::<Result<Vec<_>, _>>()?
        };

        Ok(scores)
    }

    pub fn snapshot(&self) -> ScoringFunctionSnapshot {
        self.snapshot_with(&mut SnapshotWriter::new())
    }

    /// Writes this scoring function as part of a larger session. Restraints
    /// already written by `writer` (here or for another scoring function) are
    /// emitted as shared markers.
    pub fn snapshot_with(&self, writer: &mut SnapshotWriter) -> ScoringFunctionSnapshot {
        ScoringFunctionSnapshot {
            type_id: Self::TYPE_NAME.to_string(),
            name: self.name.clone(),
            members: self.restraints.iter().map(|r| writer.record(r)).collect(),
        }
    }

    pub fn from_snapshot(
        model: &Arc<Model>,
        snapshot: &ScoringFunctionSnapshot,
    ) -> Result<Self, SerializationError> {
        Self::from_snapshot_with(&mut SnapshotReader::new(model), snapshot)
    }

    /// Restores against the reader's model; restraints shared with earlier
    /// snapshots of the same session come back as the same instance.
    pub fn from_snapshot_with(
        reader: &mut SnapshotReader<'_>,
        snapshot: &ScoringFunctionSnapshot,
    ) -> Result<Self, SerializationError> {
        if snapshot.type_id != Self::TYPE_NAME {
            return Err(SerializationError::UnknownType(snapshot.type_id.clone()));
        }
        let restraints = snapshot
            .members
            .iter()
            .map(|record| reader.restore(record))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            scoring_function = %snapshot.name,
            restraints = restraints.len(),
            "restored scoring function"
        );
        Ok(Self::from_parts(
            snapshot.name.clone(),
            Arc::clone(reader.model()),
            restraints,
        ))
    }
}

fn evaluate_member(
    index: usize,
    restraint: &Arc<dyn Restraint>,
    derivatives: bool,
) -> Result<f64, EngineError> {
    restraint
        .accumulate(derivatives)
        .map_err(|source| EngineError::Evaluation {
            index,
            restraint: restraint.name().to_string(),
            source,
        })
}
