use super::error::SerializationError;
use super::registry::restore_restraint;
use super::snapshot::RestraintRecord;
use crate::core::models::model::Model;
use crate::core::restraints::restraint::Restraint;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Assigns session-local ids to restraint instances while writing.
///
/// Every restraint seen by one writer is retained until the writer is dropped,
/// so an address can never be reused for a different instance mid-session.
#[derive(Debug, Default)]
pub struct SnapshotWriter {
    ids: HashMap<usize, u32>,
    retained: Vec<Arc<dyn Restraint>>,
}

impl SnapshotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn address(restraint: &Arc<dyn Restraint>) -> usize {
        Arc::as_ptr(restraint) as *const () as usize
    }

    /// A full `Instance` record the first time `restraint` is seen, a `Shared`
    /// marker afterwards.
    pub fn record(&mut self, restraint: &Arc<dyn Restraint>) -> RestraintRecord {
        let next = self.ids.len() as u32;
        match self.ids.entry(Self::address(restraint)) {
            Entry::Occupied(entry) => RestraintRecord::Shared { id: *entry.get() },
            Entry::Vacant(entry) => {
                entry.insert(next);
                self.retained.push(Arc::clone(restraint));
                RestraintRecord::Instance {
                    id: next,
                    snapshot: restraint.snapshot(),
                }
            }
        }
    }

    pub fn instances_written(&self) -> usize {
        self.retained.len()
    }
}

/// Resolves records produced by one [`SnapshotWriter`] session, handing out
/// the same `Arc` for every record that shares an id.
#[derive(Debug)]
pub struct SnapshotReader<'m> {
    model: &'m Arc<Model>,
    restored: HashMap<u32, Arc<dyn Restraint>>,
}

impl<'m> SnapshotReader<'m> {
    pub fn new(model: &'m Arc<Model>) -> Self {
        Self {
            model,
            restored: HashMap::new(),
        }
    }

    pub fn model(&self) -> &'m Arc<Model> {
        self.model
    }

    /// # Errors
    ///
    /// [`SerializationError::DuplicateRecord`] if an id is emitted in full
    /// twice; [`SerializationError::UnknownRecord`] if a `Shared` marker
    /// precedes (or lacks) its instance; otherwise any restore error.
    pub fn restore(
        &mut self,
        record: &RestraintRecord,
    ) -> Result<Arc<dyn Restraint>, SerializationError> {
        match record {
            RestraintRecord::Instance { id, snapshot } => {
                if self.restored.contains_key(id) {
                    return Err(SerializationError::DuplicateRecord(*id));
                }
                let restraint = restore_restraint(self.model, snapshot)?;
                self.restored.insert(*id, Arc::clone(&restraint));
                Ok(restraint)
            }
            RestraintRecord::Shared { id } => self
                .restored
                .get(id)
                .cloned()
                .ok_or(SerializationError::UnknownRecord(*id)),
        }
    }

    pub fn instances_restored(&self) -> usize {
        self.restored.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::restraints::z_plane::ZPlaneRestraint;
    use crate::test_utils::model_with_particle_at;
    use nalgebra::Point3;

    fn shared_restraint(model: &Arc<Model>) -> Arc<dyn Restraint> {
        let p = model.particle_indexes()[0];
        Arc::new(ZPlaneRestraint::new(model, p, 2.0).unwrap())
    }

    #[test]
    fn writer_emits_instance_once_then_shared_markers() {
        let (model, _) = model_with_particle_at(Point3::new(0.0, 0.0, 1.0));
        let a = shared_restraint(&model);
        let b = shared_restraint(&model);
        let mut writer = SnapshotWriter::new();

        let first = writer.record(&a);
        let second = writer.record(&b);
        let again = writer.record(&Arc::clone(&a));

        assert!(matches!(first, RestraintRecord::Instance { id: 0, .. }));
        assert!(matches!(second, RestraintRecord::Instance { id: 1, .. }));
        assert_eq!(again, RestraintRecord::Shared { id: 0 });
        assert_eq!(writer.instances_written(), 2);
    }

    #[test]
    fn reader_returns_same_instance_for_shared_records() {
        let (model, _) = model_with_particle_at(Point3::new(0.0, 0.0, 1.0));
        let a = shared_restraint(&model);
        let mut writer = SnapshotWriter::new();
        let records = [writer.record(&a), writer.record(&a)];

        let mut reader = SnapshotReader::new(&model);
        let first = reader.restore(&records[0]).unwrap();
        let second = reader.restore(&records[1]).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &a));
        assert_eq!(reader.instances_restored(), 1);
    }

    #[test]
    fn shared_marker_before_instance_is_rejected() {
        let (model, _) = model_with_particle_at(Point3::origin());
        let mut reader = SnapshotReader::new(&model);
        assert!(matches!(
            reader.restore(&RestraintRecord::Shared { id: 3 }),
            Err(SerializationError::UnknownRecord(3))
        ));
    }

    #[test]
    fn repeated_instance_id_is_rejected() {
        let (model, _) = model_with_particle_at(Point3::origin());
        let record = SnapshotWriter::new().record(&shared_restraint(&model));
        let mut reader = SnapshotReader::new(&model);

        reader.restore(&record).unwrap();
        assert!(matches!(
            reader.restore(&record),
            Err(SerializationError::DuplicateRecord(0))
        ));
    }
}
