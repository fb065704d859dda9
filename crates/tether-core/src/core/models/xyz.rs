use super::ids::ParticleIndex;
use super::keys::FloatKey;
use super::model::{Model, ModelError};
use crate::core::restraints::accumulator::DerivativeAccumulator;
use nalgebra::{Point3, Vector3};
use once_cell::sync::Lazy;

static XYZ_KEYS: Lazy<[FloatKey; 3]> =
    Lazy::new(|| [FloatKey::new("x"), FloatKey::new("y"), FloatKey::new("z")]);

/// The reserved float keys holding Cartesian coordinates, in `x`, `y`, `z` order.
pub fn xyz_keys() -> [FloatKey; 3] {
    *XYZ_KEYS
}

/// A coordinate view over one particle of a model.
///
/// `Xyz` stores nothing itself: positions live in the model under the reserved
/// `x`/`y`/`z` float keys, and gradients live in the matching derivative slots.
#[derive(Debug, Clone, Copy)]
pub struct Xyz<'m> {
    model: &'m Model,
    particle: ParticleIndex,
}

impl<'m> Xyz<'m> {
    /// Writes `position` onto `particle` and returns a view of it.
    pub fn setup_particle(
        model: &'m Model,
        particle: ParticleIndex,
        position: Point3<f64>,
    ) -> Result<Self, ModelError> {
        for (key, value) in xyz_keys().into_iter().zip(position.iter()) {
            model.set_attribute(particle, key, *value)?;
        }
        Ok(Self { model, particle })
    }

    pub fn is_setup(model: &Model, particle: ParticleIndex) -> bool {
        xyz_keys()
            .into_iter()
            .all(|key| model.has_attribute(particle, key))
    }

    /// Wraps a particle previously set up with coordinates.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownParticle`] for a foreign or stale handle,
    /// [`ModelError::UnknownAttribute`] if the particle has no coordinates.
    pub fn new(model: &'m Model, particle: ParticleIndex) -> Result<Self, ModelError> {
        model.check_particle(particle)?;
        if let Some(missing) = xyz_keys()
            .into_iter()
            .find(|&key| !model.has_attribute(particle, key))
        {
            return Err(ModelError::UnknownAttribute {
                particle,
                key: missing.name(),
            });
        }
        Ok(Self { model, particle })
    }

    pub fn particle(&self) -> ParticleIndex {
        self.particle
    }

    fn key(axis: usize) -> Result<FloatKey, ModelError> {
        XYZ_KEYS
            .get(axis)
            .copied()
            .ok_or(ModelError::InvalidAxis(axis))
    }

    /// `axis` is 0, 1 or 2 for x, y or z; anything else is [`ModelError::InvalidAxis`].
    pub fn coordinate(&self, axis: usize) -> Result<f64, ModelError> {
        self.model.attribute(self.particle, Self::key(axis)?)
    }

    pub fn x(&self) -> Result<f64, ModelError> {
        self.coordinate(0)
    }

    pub fn y(&self) -> Result<f64, ModelError> {
        self.coordinate(1)
    }

    pub fn z(&self) -> Result<f64, ModelError> {
        self.coordinate(2)
    }

    pub fn coordinates(&self) -> Result<Point3<f64>, ModelError> {
        Ok(Point3::new(self.x()?, self.y()?, self.z()?))
    }

    pub fn set_coordinate(&self, axis: usize, value: f64) -> Result<(), ModelError> {
        self.model.set_attribute(self.particle, Self::key(axis)?, value)
    }

    pub fn set_coordinates(&self, position: Point3<f64>) -> Result<(), ModelError> {
        for (axis, value) in position.iter().enumerate() {
            self.set_coordinate(axis, *value)?;
        }
        Ok(())
    }

    pub fn derivative(&self, axis: usize) -> Result<f64, ModelError> {
        self.model.derivative(self.particle, Self::key(axis)?)
    }

    pub fn derivatives(&self) -> Result<Vector3<f64>, ModelError> {
        Ok(Vector3::new(
            self.derivative(0)?,
            self.derivative(1)?,
            self.derivative(2)?,
        ))
    }

    pub fn add_to_derivative(
        &self,
        axis: usize,
        value: f64,
        accumulator: &DerivativeAccumulator,
    ) -> Result<(), ModelError> {
        self.model.add_to_derivative(
            self.particle,
            Self::key(axis)?,
            accumulator.accumulate(value),
        )
    }

    pub fn add_to_derivatives(
        &self,
        gradient: &Vector3<f64>,
        accumulator: &DerivativeAccumulator,
    ) -> Result<(), ModelError> {
        for (axis, value) in gradient.iter().enumerate() {
            self.add_to_derivative(axis, *value, accumulator)?;
        }
        Ok(())
    }
}
