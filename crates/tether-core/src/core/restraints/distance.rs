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

// Below this separation the direction of the gradient is undefined.
const MIN_DISTANCE: f64 = 1e-12;

/// Harmonic spring between two particles.
///
/// `E = 0.5 * k * (d - mean)²` where `d` is the distance between the
/// particles. The gradient on the first particle is
/// `k * (d - mean) * (p0 - p1) / d` and the second receives its negation.
#[derive(Debug)]
pub struct HarmonicDistanceRestraint {
    base: RestraintBase,
    particles: [ParticleIndex; 2],
    mean: f64,
    force_constant: AtomicF64,
}

impl HarmonicDistanceRestraint {
    pub fn new(
        model: &Arc<Model>,
        first: ParticleIndex,
        second: ParticleIndex,
        mean: f64,
        force_constant: f64,
    ) -> Result<Self, RestraintError> {
        Self::with_base(
            RestraintBase::new(model, "HarmonicDistanceRestraint%1%"),
            [first, second],
            mean,
            force_constant,
        )
    }

    fn with_base(
        base: RestraintBase,
        particles: [ParticleIndex; 2],
        mean: f64,
        force_constant: f64,
    ) -> Result<Self, RestraintError> {
        let mean = check_non_negative(base.name(), "mean", mean)?;
        let force_constant = check_non_negative(base.name(), "force constant", force_constant)?;
        if particles[0] == particles[1] {
            return Err(RestraintError::InvalidParameter {
                restraint: base.name().to_string(),
                parameter: "particles",
                reason: "the two restrained particles must be distinct".to_string(),
            });
        }
        for particle in particles {
            base.model().check_particle(particle)?;
        }
        Ok(Self {
            base,
            particles,
            mean,
            force_constant: AtomicF64::new(force_constant),
        })
    }

    pub fn particles(&self) -> [ParticleIndex; 2] {
        self.particles
    }

    pub fn mean(&self) -> f64 {
        self.mean
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

impl Restraint for HarmonicDistanceRestraint {
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
        let first = Xyz::new(self.model(), self.particles[0])?;
        let second = Xyz::new(self.model(), self.particles[1])?;
        let delta = first.coordinates()? - second.coordinates()?;
        let distance = delta.norm();
        let k = self.force_constant();
        let stretch = distance - self.mean;

        accumulator.add_score(0.5 * k * stretch * stretch);
        if let Some(da) = accumulator.derivative_accumulator() {
            if distance > MIN_DISTANCE {
                let gradient = delta * (k * stretch / distance);
                first.add_to_derivatives(&gradient, da)?;
                second.add_to_derivatives(&-gradient, da)?;
            }
        }
        Ok(())
    }

    fn inputs(&self) -> Vec<ParticleIndex> {
        self.particles.to_vec()
    }

    fn static_info(&self) -> StaticInfo {
        StaticInfo::builder()
            .string("type", Self::TYPE_NAME)
            .float("force constant", self.force_constant())
            .float("mean", self.mean)
            .particles("particles", self.particles.to_vec())
            .build()
    }

    fn parameters(&self) -> Vec<ScalarValue> {
        vec![
            ScalarValue::Float(self.mean),
            ScalarValue::Float(self.force_constant()),
        ]
    }
}

impl RegisteredRestraint for HarmonicDistanceRestraint {
    const TYPE_NAME: &'static str = "tether::core::restraints::distance::HarmonicDistanceRestraint";

    fn from_snapshot(
        model: &Arc<Model>,
        snapshot: &RestraintSnapshot,
    ) -> Result<Self, SerializationError> {
        snapshot.check_shape(2, 2)?;
        let inputs = snapshot.resolve_inputs(model)?;
        let restraint = Self::with_base(
            RestraintBase::new(model, &snapshot.name),
            [inputs[0], inputs[1]],
            snapshot.float(0)?,
            snapshot.float(1)?,
        )?;
        restraint.set_weight(snapshot.weight)?;
        Ok(restraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::model_with_particles_at;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{Point3, Vector3};

    fn restraint_between(
        a: Point3<f64>,
        b: Point3<f64>,
        mean: f64,
        k: f64,
    ) -> (Arc<Model>, HarmonicDistanceRestraint) {
        let (model, particles) = model_with_particles_at(&[a, b]);
        let restraint =
            HarmonicDistanceRestraint::new(&model, particles[0], particles[1], mean, k).unwrap();
        (model, restraint)
    }

    #[test]
    fn scores_half_k_stretch_squared() {
        let (_, restraint) =
            restraint_between(Point3::origin(), Point3::new(3.0, 4.0, 0.0), 2.0, 4.0);
        assert_relative_eq!(restraint.evaluate(false).unwrap(), 18.0);
    }

    #[test]
    fn gradients_are_equal_and_opposite_along_the_bond() {
        let (model, restraint) =
            restraint_between(Point3::origin(), Point3::new(3.0, 4.0, 0.0), 2.0, 4.0);
        restraint.evaluate(true).unwrap();

        let [a, b] = restraint.particles();
        let da = Xyz::new(&model, a).unwrap().derivatives().unwrap();
        let db = Xyz::new(&model, b).unwrap().derivatives().unwrap();
        // k * stretch = 12, unit vector from b to a = (-0.6, -0.8, 0)
        assert_abs_diff_eq!(da, Vector3::new(-7.2, -9.6, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(db, -da, epsilon = 1e-12);
    }

    #[test]
    fn gradient_matches_finite_difference_of_score() {
        let (model, restraint) = restraint_between(
            Point3::new(0.1, -0.4, 0.9),
            Point3::new(1.3, 0.8, -0.2),
            0.5,
            3.0,
        );
        restraint.evaluate(true).unwrap();
        let a = Xyz::new(&model, restraint.particles()[0]).unwrap();
        let analytic = a.derivatives().unwrap();
        let origin = a.coordinates().unwrap();

        let h = 1e-6;
        for axis in 0..3 {
            a.set_coordinate(axis, origin[axis] + h).unwrap();
            let plus = restraint.evaluate(false).unwrap();
            a.set_coordinate(axis, origin[axis] - h).unwrap();
            let minus = restraint.evaluate(false).unwrap();
            a.set_coordinate(axis, origin[axis]).unwrap();
            assert_abs_diff_eq!(analytic[axis], (plus - minus) / (2.0 * h), epsilon = 1e-5);
        }
    }

    #[test]
    fn coincident_particles_contribute_score_but_no_gradient() {
        let (model, restraint) =
            restraint_between(Point3::origin(), Point3::origin(), 1.0, 2.0);
        assert_relative_eq!(restraint.evaluate(true).unwrap(), 1.0);
        let a = Xyz::new(&model, restraint.particles()[0]).unwrap();
        assert_eq!(a.derivatives().unwrap(), Vector3::zeros());
    }

    #[test]
    fn inputs_preserve_construction_order() {
        let (model, particles) =
            model_with_particles_at(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        let restraint =
            HarmonicDistanceRestraint::new(&model, particles[1], particles[0], 1.0, 1.0).unwrap();
        assert_eq!(restraint.inputs(), vec![particles[1], particles[0]]);
    }

    #[test]
    fn rejects_identical_particles_and_invalid_parameters() {
        let (model, particles) = model_with_particles_at(&[Point3::origin()]);
        let p = particles[0];
        assert!(matches!(
            HarmonicDistanceRestraint::new(&model, p, p, 1.0, 1.0),
            Err(RestraintError::InvalidParameter {
                parameter: "particles",
                ..
            })
        ));

        let (model, particles) =
            model_with_particles_at(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert!(matches!(
            HarmonicDistanceRestraint::new(&model, particles[0], particles[1], -1.0, 1.0),
            Err(RestraintError::InvalidParameter {
                parameter: "mean",
                ..
            })
        ));
        assert!(matches!(
            HarmonicDistanceRestraint::new(&model, particles[0], particles[1], 1.0, f64::NAN),
            Err(RestraintError::InvalidParameter {
                parameter: "force constant",
                ..
            })
        ));
    }

    #[test]
    fn static_info_lists_type_parameters_and_particles() {
        let (_, restraint) =
            restraint_between(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 1.5, 2.0);
        let info = restraint.static_info();
        assert_eq!(info.number_of_string(), 1);
        assert_eq!(
            info.string_value(0),
            Some("tether::core::restraints::distance::HarmonicDistanceRestraint")
        );
        assert_eq!(info.floats().get("force constant"), Some(&2.0));
        assert_eq!(info.floats().get("mean"), Some(&1.5));
        assert_eq!(
            info.particle_lists().get("particles"),
            Some(&restraint.particles().to_vec())
        );
    }

    #[test]
    fn snapshot_round_trip_reproduces_score() {
        let (model, restraint) =
            restraint_between(Point3::origin(), Point3::new(0.0, 2.0, 2.0), 1.0, 5.0);
        let restored =
            HarmonicDistanceRestraint::from_snapshot(&model, &restraint.snapshot()).unwrap();

        assert_eq!(restored.particles(), restraint.particles());
        assert_abs_diff_eq!(
            restored.evaluate(false).unwrap(),
            restraint.evaluate(false).unwrap(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn restore_rejects_snapshot_with_wrong_arity() {
        let (model, restraint) =
            restraint_between(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 1.0, 1.0);
        let mut snapshot = restraint.snapshot();
        snapshot.inputs.pop();
        assert!(matches!(
            HarmonicDistanceRestraint::from_snapshot(&model, &snapshot),
            Err(SerializationError::MalformedSnapshot { .. })
        ));
    }
}
