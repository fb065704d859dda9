use super::attributes::{AttributeKind, AttributeStore};
use super::ids::{ModelId, ParticleIndex, ParticleKey};
use super::keys::{AttributeKey, FloatKey, IntKey, StringKey};
use crate::core::utils::naming::unique_name;
use crate::serialization::error::SerializationError;
use crate::serialization::snapshot::{AttributeRecord, ModelSnapshot, ScalarValue};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use slotmap::{Key, KeyData, SlotMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("{0} does not belong to this model or has been removed")]
    UnknownParticle(ParticleIndex),
    #[error("No particle with id {id} exists in model '{model}'")]
    UnknownParticleId { id: u64, model: String },
    #[error("Attribute '{key}' is not set on {particle}")]
    UnknownAttribute { particle: ParticleIndex, key: String },
    #[error("Invalid model state: {0}")]
    InvalidState(String),
    #[error("Coordinate axis {0} is out of range (expected 0, 1 or 2)")]
    InvalidAxis(usize),
}

/// Per-particle bookkeeping that is not an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleData {
    pub name: String,
}

#[derive(Debug, Default)]
struct ModelState {
    particles: SlotMap<ParticleKey, ParticleData>,
    attributes: AttributeStore,
}

/// Owner of all particles and their attribute tables.
///
/// A `Model` is the single shared mutable resource of a scoring run: restraints
/// hold an `Arc<Model>` and read coordinates through it, and every derivative
/// they produce is written through [`Model::add_to_derivative`]. Structural
/// changes (adding particles, setting attributes) take an exclusive lock;
/// reads and derivative accumulation only take a shared one, since derivative
/// slots are atomic.
pub struct Model {
    id: ModelId,
    name: String,
    closed: AtomicBool,
    state: RwLock<ModelState>,
}

impl Model {
    /// Creates an empty model. `%1%` in `name` is replaced by a unique counter.
    pub fn new(name: &str) -> Self {
        Self {
            id: ModelId::next(),
            name: unique_name(name),
            closed: AtomicBool::new(false),
            state: RwLock::new(ModelState::default()),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a particle and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidState`] if the model has been closed.
    pub fn add_particle(&self, name: &str) -> Result<ParticleIndex, ModelError> {
        if self.is_closed() {
            return Err(ModelError::InvalidState(format!(
                "cannot add particle '{}' to closed model '{}'",
                name, self.name
            )));
        }
        let key = self.state.write().particles.insert(ParticleData {
            name: unique_name(name),
        });
        let particle = ParticleIndex::new(self.id, key);
        debug!(model = %self.name, particle = particle.id(), "added particle");
        Ok(particle)
    }

    /// Removes a particle together with all of its attributes.
    ///
    /// Restraints still referring to the particle fail with a dangling
    /// reference error on their next evaluation.
    pub fn remove_particle(&self, particle: ParticleIndex) -> Result<(), ModelError> {
        if self.is_closed() {
            return Err(ModelError::InvalidState(format!(
                "cannot remove particles from closed model '{}'",
                self.name
            )));
        }
        self.check_particle(particle)?;
        let mut state = self.state.write();
        state.particles.remove(particle.key());
        state.attributes.remove_particle(particle.key());
        debug!(model = %self.name, particle = particle.id(), "removed particle");
        Ok(())
    }

    /// Closes the model for structural changes; attribute values and
    /// derivatives remain writable.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(model = %self.name, "closed model");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn contains(&self, particle: ParticleIndex) -> bool {
        particle.model_id() == self.id && self.state.read().particles.contains_key(particle.key())
    }

    pub fn check_particle(&self, particle: ParticleIndex) -> Result<(), ModelError> {
        if self.contains(particle) {
            Ok(())
        } else {
            Err(ModelError::UnknownParticle(particle))
        }
    }

    /// Resolves a snapshot particle id into a handle of this model.
    pub fn particle(&self, id: u64) -> Result<ParticleIndex, ModelError> {
        let particle = ParticleIndex::from_id(self.id, id);
        if self.contains(particle) {
            Ok(particle)
        } else {
            Err(ModelError::UnknownParticleId {
                id,
                model: self.name.clone(),
            })
        }
    }

    pub fn particle_name(&self, particle: ParticleIndex) -> Result<String, ModelError> {
        self.check_particle(particle)?;
        self.state
            .read()
            .particles
            .get(particle.key())
            .map(|data| data.name.clone())
            .ok_or(ModelError::UnknownParticle(particle))
    }

    pub fn particle_indexes(&self) -> Vec<ParticleIndex> {
        self.state
            .read()
            .particles
            .keys()
            .map(|key| ParticleIndex::new(self.id, key))
            .collect()
    }

    pub fn number_of_particles(&self) -> usize {
        self.state.read().particles.len()
    }

    pub fn has_attribute<K: AttributeKind>(
        &self,
        particle: ParticleIndex,
        key: AttributeKey<K>,
    ) -> bool {
        self.contains(particle) && K::get(&self.state.read().attributes, key, particle.key()).is_some()
    }

    pub fn attribute<K: AttributeKind>(
        &self,
        particle: ParticleIndex,
        key: AttributeKey<K>,
    ) -> Result<K::Value, ModelError> {
        self.check_particle(particle)?;
        K::get(&self.state.read().attributes, key, particle.key()).ok_or_else(|| {
            ModelError::UnknownAttribute {
                particle,
                key: key.name(),
            }
        })
    }

    pub fn set_attribute<K: AttributeKind>(
        &self,
        particle: ParticleIndex,
        key: AttributeKey<K>,
        value: K::Value,
    ) -> Result<(), ModelError> {
        self.check_particle(particle)?;
        K::set(&mut self.state.write().attributes, key, particle.key(), value);
        Ok(())
    }

    pub fn remove_attribute<K: AttributeKind>(
        &self,
        particle: ParticleIndex,
        key: AttributeKey<K>,
    ) -> Result<K::Value, ModelError> {
        self.check_particle(particle)?;
        K::remove(&mut self.state.write().attributes, key, particle.key()).ok_or_else(|| {
            ModelError::UnknownAttribute {
                particle,
                key: key.name(),
            }
        })
    }

    /// Adds `delta` into the derivative slot of a float attribute. Never overwrites.
    ///
    /// Safe to call concurrently for the same or different slots.
    pub fn add_to_derivative(
        &self,
        particle: ParticleIndex,
        key: FloatKey,
        delta: f64,
    ) -> Result<(), ModelError> {
        self.check_particle(particle)?;
        if self
            .state
            .read()
            .attributes
            .add_to_derivative(key, particle.key(), delta)
        {
            Ok(())
        } else {
            Err(ModelError::UnknownAttribute {
                particle,
                key: key.name(),
            })
        }
    }

    pub fn derivative(&self, particle: ParticleIndex, key: FloatKey) -> Result<f64, ModelError> {
        self.check_particle(particle)?;
        self.state
            .read()
            .attributes
            .derivative(key, particle.key())
            .ok_or_else(|| ModelError::UnknownAttribute {
                particle,
                key: key.name(),
            })
    }

    /// Zeroes every derivative slot. Called once at the start of an evaluation round.
    pub fn clear_derivatives(&self) {
        self.state.read().attributes.clear_derivatives();
    }

    /// Captures particles (with their ids) and all attribute values.
    ///
    /// Derivatives are transient per evaluation round and are not captured.
    pub fn snapshot(&self) -> ModelSnapshot {
        let state = self.state.read();
        let mut attributes = Vec::new();
        for key in state.particles.keys() {
            let particle = key.data().as_ffi();
            for (attribute, value) in state.attributes.float_entries(key) {
                attributes.push(AttributeRecord {
                    particle,
                    key: attribute.name(),
                    value: ScalarValue::Float(value),
                });
            }
            for (attribute, value) in state.attributes.int_entries(key) {
                attributes.push(AttributeRecord {
                    particle,
                    key: attribute.name(),
                    value: ScalarValue::Int(value),
                });
            }
            for (attribute, value) in state.attributes.string_entries(key) {
                attributes.push(AttributeRecord {
                    particle,
                    key: attribute.name(),
                    value: ScalarValue::String(value),
                });
            }
        }
        ModelSnapshot {
            name: self.name.clone(),
            closed: self.is_closed(),
            particles: state.particles.clone(),
            attributes,
        }
    }

    /// Rebuilds a model whose particle ids match those in `snapshot`; a model
    /// closed when captured comes back closed.
    pub fn from_snapshot(snapshot: &ModelSnapshot) -> Result<Self, SerializationError> {
        let mut state = ModelState {
            particles: snapshot.particles.clone(),
            attributes: AttributeStore::new(),
        };
        for record in &snapshot.attributes {
            let key: ParticleKey = KeyData::from_ffi(record.particle).into();
            if !state.particles.contains_key(key) {
                return Err(SerializationError::DanglingReference(record.particle));
            }
            match &record.value {
                ScalarValue::Float(value) => {
                    state
                        .attributes
                        .set_float(FloatKey::new(&record.key), key, *value)
                }
                ScalarValue::Int(value) => {
                    state.attributes.set_int(IntKey::new(&record.key), key, *value)
                }
                ScalarValue::String(value) => {
                    state
                        .attributes
                        .set_string(StringKey::new(&record.key), key, value.clone())
                }
            }
        }
        let model = Self {
            id: ModelId::next(),
            name: snapshot.name.clone(),
            closed: AtomicBool::new(snapshot.closed),
            state: RwLock::new(state),
        };
        debug!(
            model = %model.name,
            particles = model.number_of_particles(),
            "restored model from snapshot"
        );
        Ok(model)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new("Model%1%")
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("particles", &self.number_of_particles())
            .field("closed", &self.is_closed())
            .finish()
    }
}
