use super::error::SerializationError;
use super::snapshot::RestraintSnapshot;
use crate::core::models::model::Model;
use crate::core::restraints::distance::HarmonicDistanceRestraint;
use crate::core::restraints::restraint::Restraint;
use crate::core::restraints::z_plane::ZPlaneRestraint;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rebuilds a restraint from its snapshot against a target model.
pub type RestraintFactory =
    fn(&Arc<Model>, &RestraintSnapshot) -> Result<Arc<dyn Restraint>, SerializationError>;

/// A restraint type that can be reconstructed from a [`RestraintSnapshot`].
pub trait RegisteredRestraint: Restraint + Sized + 'static {
    /// Must equal what [`Restraint::type_name`] returns for every instance.
    const TYPE_NAME: &'static str;

    fn from_snapshot(
        model: &Arc<Model>,
        snapshot: &RestraintSnapshot,
    ) -> Result<Self, SerializationError>;
}

fn restore_erased<T: RegisteredRestraint>(
    model: &Arc<Model>,
    snapshot: &RestraintSnapshot,
) -> Result<Arc<dyn Restraint>, SerializationError> {
    Ok(Arc::new(T::from_snapshot(model, snapshot)?))
}

/// Type identifier → factory table.
#[derive(Debug, Clone, Default)]
pub struct RestraintRegistry {
    factories: HashMap<String, RestraintFactory>,
}

impl RestraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every restraint type shipped with the crate.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry.register::<ZPlaneRestraint>();
        registry.register::<HarmonicDistanceRestraint>();
        registry
    }

    pub fn register<T: RegisteredRestraint>(&mut self) {
        self.register_factory(T::TYPE_NAME, restore_erased::<T>);
    }

    /// Registers `factory` under `type_id`, replacing any earlier factory.
    pub fn register_factory(&mut self, type_id: &str, factory: RestraintFactory) {
        if self
            .factories
            .insert(type_id.to_string(), factory)
            .is_some()
        {
            warn!(type_id, "replaced existing restraint factory");
        } else {
            debug!(type_id, "registered restraint factory");
        }
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.factories.contains_key(type_id)
    }

    pub fn factory(&self, type_id: &str) -> Result<RestraintFactory, SerializationError> {
        self.factories
            .get(type_id)
            .copied()
            .ok_or_else(|| SerializationError::UnknownType(type_id.to_string()))
    }

    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Dispatches on the snapshot's type identifier.
    pub fn restore(
        &self,
        model: &Arc<Model>,
        snapshot: &RestraintSnapshot,
    ) -> Result<Arc<dyn Restraint>, SerializationError> {
        let factory = self.factory(&snapshot.type_id)?;
        factory(model, snapshot)
    }
}

static REGISTRY: Lazy<RwLock<RestraintRegistry>> =
    Lazy::new(|| RwLock::new(RestraintRegistry::with_builtin_types()));

/// Adds a restraint type to the process-wide registry.
pub fn register<T: RegisteredRestraint>() {
    REGISTRY.write().register::<T>();
}

pub fn register_factory(type_id: &str, factory: RestraintFactory) {
    REGISTRY.write().register_factory(type_id, factory);
}

pub fn is_registered(type_id: &str) -> bool {
    REGISTRY.read().contains(type_id)
}

pub fn registered_types() -> Vec<String> {
    REGISTRY.read().type_ids()
}

/// Rebuilds a restraint of whatever concrete type `snapshot` names, using the
/// process-wide registry.
///
/// # Errors
///
/// [`SerializationError::UnknownType`] if no factory is registered for the
/// snapshot's type identifier; otherwise whatever the factory reports.
pub fn restore_restraint(
    model: &Arc<Model>,
    snapshot: &RestraintSnapshot,
) -> Result<Arc<dyn Restraint>, SerializationError> {
    // Factories may consult the registry themselves, so the lock is released first.
    let factory = REGISTRY.read().factory(&snapshot.type_id)?;
    let restraint = factory(model, snapshot)?;
    debug!(
        type_id = %snapshot.type_id,
        restraint = restraint.name(),
        "restored restraint"
    );
    Ok(restraint)
}
