use super::accumulator::ScoreAccumulator;
use super::error::{RestraintError, check_finite};
use super::info::StaticInfo;
use crate::core::models::ids::ParticleIndex;
use crate::core::models::model::Model;
use crate::core::utils::atomic::AtomicF64;
use crate::core::utils::naming::unique_name;
use crate::serialization::snapshot::{RestraintSnapshot, ScalarValue};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// State shared by every restraint: its name, owning model and weight.
pub struct RestraintBase {
    name: String,
    model: Arc<Model>,
    weight: AtomicF64,
}

impl RestraintBase {
    /// `%1%` in `name` is replaced by a unique counter.
    pub fn new(model: &Arc<Model>, name: &str) -> Self {
        Self {
            name: unique_name(name),
            model: Arc::clone(model),
            weight: AtomicF64::new(1.0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn weight(&self) -> f64 {
        self.weight.load()
    }

    pub fn set_weight(&self, weight: f64) -> Result<(), RestraintError> {
        self.weight.store(check_finite(&self.name, "weight", weight)?);
        Ok(())
    }
}

impl fmt::Debug for RestraintBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestraintBase")
            .field("name", &self.name)
            .field("model", &self.model.name())
            .field("weight", &self.weight())
            .finish()
    }
}

/// A scoring term over a set of particles.
///
/// Implementors provide the score/derivative kernel, their inputs, static
/// metadata and the parameters needed to rebuild them; evaluation, weighting
/// and snapshotting are provided on top of those.
///
/// Restraints are shared as `Arc<dyn Restraint>` between callers and any
/// number of scoring functions, so parameters that can change after
/// construction use interior mutability and are visible to every owner.
pub trait Restraint: fmt::Debug + Send + Sync {
    fn base(&self) -> &RestraintBase;

    /// Fully-qualified, stable type name; also the registry identifier.
    fn type_name(&self) -> &'static str;

    /// Adds this restraint's unweighted score into `accumulator` and, when the
    /// accumulator carries a derivative accumulator, the analytic gradient of
    /// that score with respect to every input coordinate.
    fn add_score_and_derivatives(
        &self,
        accumulator: &mut ScoreAccumulator,
    ) -> Result<(), RestraintError>;

    /// The particles read during evaluation, in construction order.
    fn inputs(&self) -> Vec<ParticleIndex>;

    fn static_info(&self) -> StaticInfo;

    /// Constructor parameters, in the order the type's factory reads them back.
    fn parameters(&self) -> Vec<ScalarValue>;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn model(&self) -> &Arc<Model> {
        self.base().model()
    }

    fn weight(&self) -> f64 {
        self.base().weight()
    }

    fn set_weight(&self, weight: f64) -> Result<(), RestraintError> {
        self.base().set_weight(weight)
    }

    /// Computes the weighted score as a round of its own.
    ///
    /// With `derivatives`, every derivative slot of the model is zeroed first,
    /// so afterwards the slots hold exactly this restraint's gradient.
    ///
    /// # Errors
    ///
    /// [`RestraintError::DanglingReference`] if an input particle no longer
    /// exists; the model is left untouched in that case.
    fn evaluate(&self, derivatives: bool) -> Result<f64, RestraintError> {
        if derivatives {
            check_inputs(self)?;
            self.model().clear_derivatives();
        }
        self.accumulate(derivatives)
    }

    /// Like [`Restraint::evaluate`] but adds into the derivative slots without
    /// clearing them. Used when several terms share one round, as in
    /// [`ScoringFunction::evaluate`](crate::engine::scoring_function::ScoringFunction::evaluate).
    fn accumulate(&self, derivatives: bool) -> Result<f64, RestraintError> {
        check_inputs(self)?;
        let mut accumulator = ScoreAccumulator::new(self.weight(), derivatives);
        self.add_score_and_derivatives(&mut accumulator)?;
        let score = accumulator.score();
        trace!(restraint = self.name(), score, derivatives, "evaluated restraint");
        Ok(score)
    }

    fn snapshot(&self) -> RestraintSnapshot {
        RestraintSnapshot {
            type_id: self.type_name().to_string(),
            name: self.name().to_string(),
            weight: self.weight(),
            parameters: self.parameters(),
            inputs: self.inputs().iter().map(ParticleIndex::id).collect(),
        }
    }
}

fn check_inputs<R: Restraint + ?Sized>(restraint: &R) -> Result<(), RestraintError> {
    let model = restraint.model();
    match restraint.inputs().into_iter().find(|&p| !model.contains(p)) {
        Some(particle) => Err(RestraintError::DanglingReference {
            restraint: restraint.name().to_string(),
            particle,
        }),
        None => Ok(()),
    }
}
