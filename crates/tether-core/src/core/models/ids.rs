use slotmap::{Key, KeyData, new_key_type};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    pub struct ParticleKey;
}

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [`Model`](super::model::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a particle, valid only for the model that issued it.
///
/// The handle pairs the issuing model's identity with a generational slot key,
/// so a handle from another model or one whose particle has been removed is
/// rejected instead of silently aliasing a different particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleIndex {
    model: ModelId,
    key: ParticleKey,
}

impl ParticleIndex {
    pub(crate) fn new(model: ModelId, key: ParticleKey) -> Self {
        Self { model, key }
    }

    pub(crate) fn from_id(model: ModelId, id: u64) -> Self {
        Self::new(model, KeyData::from_ffi(id).into())
    }

    pub fn model_id(&self) -> ModelId {
        self.model
    }

    pub(crate) fn key(&self) -> ParticleKey {
        self.key
    }

    /// Stable integer identity of the particle within its model, as written to snapshots.
    pub fn id(&self) -> u64 {
        self.key.data().as_ffi()
    }
}

impl fmt::Display for ParticleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "particle {} of model {}", self.id(), self.model.0)
    }
}
