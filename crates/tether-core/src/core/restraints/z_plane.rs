use super::accumulator::ScoreAccumulator;
use super::error::{RestraintError, check_non_negative};
use super::info::StaticInfo;
use super::restraint::{Restraint, RestraintBase};
use crate::core::models::ids::ParticleIndex;
use crate::core::models::model::Model;
use crate::core::models::xyz::Xyz;
use crate::core::utils::atomic::AtomicF64;
use crate::serialization::error::SerializationError;
use crate::serialization::registry::RegisteredRestraint;
use crate::serialization::snapshot::{RestraintSnapshot, ScalarValue};
use std::sync::Arc;

/// Harmonic restraint pulling one particle toward the plane `z = 0`.
///
/// `E = 0.5 * k * z²`, with gradient `(0, 0, k * z)`.
#[derive(Debug)]
pub struct ZPlaneRestraint {
    base: RestraintBase,
    particle: ParticleIndex,
    force_constant: AtomicF64,
}

impl ZPlaneRestraint {
    /// # Errors
    ///
    /// [`RestraintError::InvalidParameter`] if `force_constant` is negative or
    /// not finite; [`RestraintError::Model`] if `particle` is not in `model`.
    pub fn new(
        model: &Arc<Model>,
        particle: ParticleIndex,
        force_constant: f64,
    ) -> Result<Self, RestraintError> {
        Self::with_base(
            RestraintBase::new(model, "ZPlaneRestraint%1%"),
            particle,
            force_constant,
        )
    }

    fn with_base(
        base: RestraintBase,
        particle: ParticleIndex,
        force_constant: f64,
    ) -> Result<Self, RestraintError> {
        let force_constant = check_non_negative(base.name(), "force constant", force_constant)?;
        base.model().check_particle(particle)?;
        Ok(Self {
            base,
            particle,
            force_constant: AtomicF64::new(force_constant),
        })
    }

    pub fn particle(&self) -> ParticleIndex {
        self.particle
    }

    pub fn force_constant(&self) -> f64 {
        self.force_constant.load()
    }

    pub fn set_force_constant(&self, force_constant: f64) -> Result<(), RestraintError> {
        self.force_constant.store(check_non_negative(
            self.name(),
            "force constant",
            force_constant,
        )?);
        Ok(())
    }
}

impl Restraint for ZPlaneRestraint {
    fn base(&self) -> &RestraintBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn add_score_and_derivatives(
        &self,
        accumulator: &mut ScoreAccumulator,
    ) -> Result<(), RestraintError> {
        let xyz = Xyz::new(self.model(), self.particle)?;
        let k = self.force_constant();
        let z = xyz.z()?;
        accumulator.add_score(0.5 * k * z * z);
        if let Some(da) = accumulator.derivative_accumulator() {
            xyz.add_to_derivative(2, k * z, da)?;
        }
        Ok(())
    }

    fn inputs(&self) -> Vec<ParticleIndex> {
        vec![self.particle]
    }

    fn static_info(&self) -> StaticInfo {
        StaticInfo::builder()
            .string("type", Self::TYPE_NAME)
            .float("force constant", self.force_constant())
            .build()
    }

    fn parameters(&self) -> Vec<ScalarValue> {
        vec![ScalarValue::Float(self.force_constant())]
    }
}

impl RegisteredRestraint for ZPlaneRestraint {
    const TYPE_NAME: &'static str = "tether::core::restraints::z_plane::ZPlaneRestraint";

    fn from_snapshot(
        model: &Arc<Model>,
        snapshot: &RestraintSnapshot,
    ) -> Result<Self, SerializationError> {
        snapshot.check_shape(1, 1)?;
        let particle = snapshot.resolve_inputs(model)?[0];
        let restraint = Self::with_base(
            RestraintBase::new(model, &snapshot.name),
            particle,
            snapshot.float(0)?,
        )?;
        restraint.set_weight(snapshot.weight)?;
        Ok(restraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::model_with_particle_at;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn scores_half_k_z_squared() {
        let (model, p) = model_with_particle_at(Point3::new(1.0, 2.0, 3.0));
        let restraint = ZPlaneRestraint::new(&model, p, 10.0).unwrap();

        assert_relative_eq!(restraint.evaluate(true).unwrap(), 45.0, max_relative = 1e-4);
        assert_relative_eq!(restraint.evaluate(false).unwrap(), 45.0, max_relative = 1e-4);
    }

    #[test]
    fn accumulates_gradient_along_z_only() {
        let (model, p) = model_with_particle_at(Point3::new(1.0, 2.0, 3.0));
        let restraint = ZPlaneRestraint::new(&model, p, 10.0).unwrap();

        restraint.evaluate(true).unwrap();

        let derivatives = Xyz::new(&model, p).unwrap().derivatives().unwrap();
        assert_abs_diff_eq!(derivatives, Vector3::new(0.0, 0.0, 30.0), epsilon = 1e-4);
    }

    #[test]
    fn repeated_evaluation_reports_the_same_gradient() {
        let (model, p) = model_with_particle_at(Point3::new(1.0, 2.0, 3.0));
        let restraint = ZPlaneRestraint::new(&model, p, 10.0).unwrap();

        restraint.evaluate(true).unwrap();
        restraint.evaluate(true).unwrap();

        let derivatives = Xyz::new(&model, p).unwrap().derivatives().unwrap();
        assert_abs_diff_eq!(derivatives, Vector3::new(0.0, 0.0, 30.0), epsilon = 1e-4);
    }

    #[test]
    fn evaluate_without_derivatives_leaves_accumulators_unchanged() {
        let (model, p) = model_with_particle_at(Point3::new(0.0, 0.0, -2.0));
        let restraint = ZPlaneRestraint::new(&model, p, 4.0).unwrap();

        restraint.evaluate(false).unwrap();

        let derivatives = Xyz::new(&model, p).unwrap().derivatives().unwrap();
        assert_eq!(derivatives, Vector3::zeros());
    }

    #[test]
    fn gradient_matches_finite_difference_of_score() {
        let (model, p) = model_with_particle_at(Point3::new(0.3, -0.7, 1.9));
        let restraint = ZPlaneRestraint::new(&model, p, 2.5).unwrap();
        let xyz = Xyz::new(&model, p).unwrap();
        restraint.evaluate(true).unwrap();
        let analytic = xyz.derivative(2).unwrap();

        let h = 1e-6;
        xyz.set_coordinate(2, 1.9 + h).unwrap();
        let plus = restraint.evaluate(false).unwrap();
        xyz.set_coordinate(2, 1.9 - h).unwrap();
        let minus = restraint.evaluate(false).unwrap();

        assert_relative_eq!(analytic, (plus - minus) / (2.0 * h), max_relative = 1e-5);
    }

    #[test]
    fn inputs_are_the_single_restrained_particle() {
        let (model, p) = model_with_particle_at(Point3::origin());
        let restraint = ZPlaneRestraint::new(&model, p, 1.0).unwrap();
        assert_eq!(restraint.inputs(), vec![p]);
    }

    #[test]
    fn static_info_exposes_type_and_force_constant() {
        let (model, p) = model_with_particle_at(Point3::new(1.0, 2.0, 3.0));
        let restraint = ZPlaneRestraint::new(&model, p, 10.0).unwrap();
        let info = restraint.static_info();

        assert_eq!(info.number_of_string(), 1);
        assert_eq!(info.string_key(0), Some("type"));
        assert_eq!(
            info.string_value(0),
            Some("tether::core::restraints::z_plane::ZPlaneRestraint")
        );
        assert_eq!(info.number_of_float(), 1);
        assert_eq!(info.float_key(0), Some("force constant"));
        assert_abs_diff_eq!(info.float_value(0).unwrap(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn rejects_negative_or_non_finite_force_constant() {
        let (model, p) = model_with_particle_at(Point3::origin());
        for k in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ZPlaneRestraint::new(&model, p, k),
                Err(RestraintError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn rejects_particle_from_another_model() {
        let (_, p) = model_with_particle_at(Point3::origin());
        let (other, _) = model_with_particle_at(Point3::origin());
        assert!(matches!(
            ZPlaneRestraint::new(&other, p, 1.0),
            Err(RestraintError::Model(_))
        ));
    }

    #[test]
    fn force_constant_change_is_visible_through_shared_handle() {
        let (model, p) = model_with_particle_at(Point3::new(0.0, 0.0, 1.0));
        let restraint = Arc::new(ZPlaneRestraint::new(&model, p, 2.0).unwrap());
        let shared: Arc<dyn Restraint> = restraint.clone();

        restraint.set_force_constant(6.0).unwrap();

        assert_relative_eq!(shared.evaluate(false).unwrap(), 3.0);
        assert!(restraint.set_force_constant(-3.0).is_err());
        assert_eq!(restraint.force_constant(), 6.0);
    }

    #[test]
    fn snapshot_round_trip_reproduces_score_and_type() {
        let (model, p) = model_with_particle_at(Point3::new(1.0, 2.0, 3.0));
        let restraint = ZPlaneRestraint::new(&model, p, 10.0).unwrap();
        restraint.set_weight(0.5).unwrap();

        let restored = ZPlaneRestraint::from_snapshot(&model, &restraint.snapshot()).unwrap();

        assert_eq!(restored.name(), restraint.name());
        assert_eq!(restored.type_name(), restraint.type_name());
        assert_eq!(restored.weight(), 0.5);
        assert_abs_diff_eq!(
            restored.evaluate(false).unwrap(),
            restraint.evaluate(false).unwrap(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn restoring_with_missing_particle_reports_dangling_reference() {
        let (model, p) = model_with_particle_at(Point3::origin());
        let snapshot = ZPlaneRestraint::new(&model, p, 1.0).unwrap().snapshot();
        model.remove_particle(p).unwrap();

        assert!(matches!(
            ZPlaneRestraint::from_snapshot(&model, &snapshot),
            Err(SerializationError::DanglingReference(id)) if id == p.id()
        ));
    }
}
