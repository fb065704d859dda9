use super::ids::ParticleKey;
use super::keys::{
    AttributeKey, FloatKey, FloatKind, IntKey, IntKind, KeyKind, StringKey, StringKind,
};
use crate::core::utils::atomic::AtomicF64;
use slotmap::SecondaryMap;

type Column<T> = SecondaryMap<ParticleKey, T>;

fn column_mut<T>(columns: &mut Vec<Column<T>>, index: usize) -> &mut Column<T> {
    if columns.len() <= index {
        columns.resize_with(index + 1, SecondaryMap::new);
    }
    &mut columns[index]
}

fn entries<K: KeyKind, T: Clone>(
    columns: &[Column<T>],
    particle: ParticleKey,
) -> Vec<(AttributeKey<K>, T)> {
    columns
        .iter()
        .enumerate()
        .filter_map(|(index, column)| {
            column
                .get(particle)
                .map(|value| (AttributeKey::from_index(index as u32), value.clone()))
        })
        .collect()
}

/// A key family that can be read from and written to an [`AttributeStore`].
pub trait AttributeKind: KeyKind + Sized {
    type Value: Clone;

    fn get(
        store: &AttributeStore,
        key: AttributeKey<Self>,
        particle: ParticleKey,
    ) -> Option<Self::Value>;
    fn set(
        store: &mut AttributeStore,
        key: AttributeKey<Self>,
        particle: ParticleKey,
        value: Self::Value,
    );
    fn remove(
        store: &mut AttributeStore,
        key: AttributeKey<Self>,
        particle: ParticleKey,
    ) -> Option<Self::Value>;
}

impl AttributeKind for FloatKind {
    type Value = f64;

    fn get(store: &AttributeStore, key: FloatKey, particle: ParticleKey) -> Option<f64> {
        store.float(key, particle)
    }
    fn set(store: &mut AttributeStore, key: FloatKey, particle: ParticleKey, value: f64) {
        store.set_float(key, particle, value);
    }
    fn remove(store: &mut AttributeStore, key: FloatKey, particle: ParticleKey) -> Option<f64> {
        store.remove_float(key, particle)
    }
}

impl AttributeKind for IntKind {
    type Value = i64;

    fn get(store: &AttributeStore, key: IntKey, particle: ParticleKey) -> Option<i64> {
        store.int(key, particle)
    }
    fn set(store: &mut AttributeStore, key: IntKey, particle: ParticleKey, value: i64) {
        store.set_int(key, particle, value);
    }
    fn remove(store: &mut AttributeStore, key: IntKey, particle: ParticleKey) -> Option<i64> {
        store.remove_int(key, particle)
    }
}

impl AttributeKind for StringKind {
    type Value = String;

    fn get(store: &AttributeStore, key: StringKey, particle: ParticleKey) -> Option<String> {
        store.string(key, particle).map(str::to_string)
    }
    fn set(store: &mut AttributeStore, key: StringKey, particle: ParticleKey, value: String) {
        store.set_string(key, particle, value);
    }
    fn remove(store: &mut AttributeStore, key: StringKey, particle: ParticleKey) -> Option<String> {
        store.remove_string(key, particle)
    }
}

/// Column-oriented attribute tables for all particles of a model.
///
/// Each key owns one column (indexed by the key's interned index), and each
/// column maps particle slots to values. Every float slot has a parallel
/// derivative slot created alongside it, so accumulation never has to allocate
/// and can proceed through a shared reference.
#[derive(Debug, Default, Clone)]
pub struct AttributeStore {
    floats: Vec<Column<f64>>,
    derivatives: Vec<Column<AtomicF64>>,
    ints: Vec<Column<i64>>,
    strings: Vec<Column<String>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn float(&self, key: FloatKey, particle: ParticleKey) -> Option<f64> {
        self.floats.get(key.index())?.get(particle).copied()
    }

    pub fn has_float(&self, key: FloatKey, particle: ParticleKey) -> bool {
        self.float(key, particle).is_some()
    }

    pub fn set_float(&mut self, key: FloatKey, particle: ParticleKey, value: f64) {
        column_mut(&mut self.floats, key.index()).insert(particle, value);
        let derivatives = column_mut(&mut self.derivatives, key.index());
        if !derivatives.contains_key(particle) {
            derivatives.insert(particle, AtomicF64::default());
        }
    }

    pub fn remove_float(&mut self, key: FloatKey, particle: ParticleKey) -> Option<f64> {
        if let Some(derivatives) = self.derivatives.get_mut(key.index()) {
            derivatives.remove(particle);
        }
        self.floats.get_mut(key.index())?.remove(particle)
    }

    pub fn derivative(&self, key: FloatKey, particle: ParticleKey) -> Option<f64> {
        self.derivatives
            .get(key.index())?
            .get(particle)
            .map(AtomicF64::load)
    }

    /// Adds `delta` into the derivative slot; returns `false` if the attribute was never set.
    pub fn add_to_derivative(&self, key: FloatKey, particle: ParticleKey, delta: f64) -> bool {
        match self
            .derivatives
            .get(key.index())
            .and_then(|column| column.get(particle))
        {
            Some(slot) => {
                slot.fetch_add(delta);
                true
            }
            None => false,
        }
    }

    pub fn clear_derivatives(&self) {
        for column in &self.derivatives {
            for (_, slot) in column.iter() {
                slot.store(0.0);
            }
        }
    }

    pub fn int(&self, key: IntKey, particle: ParticleKey) -> Option<i64> {
        self.ints.get(key.index())?.get(particle).copied()
    }

    pub fn set_int(&mut self, key: IntKey, particle: ParticleKey, value: i64) {
        column_mut(&mut self.ints, key.index()).insert(particle, value);
    }

    pub fn remove_int(&mut self, key: IntKey, particle: ParticleKey) -> Option<i64> {
        self.ints.get_mut(key.index())?.remove(particle)
    }

    pub fn string(&self, key: StringKey, particle: ParticleKey) -> Option<&str> {
        self.strings
            .get(key.index())?
            .get(particle)
            .map(String::as_str)
    }

    pub fn set_string(&mut self, key: StringKey, particle: ParticleKey, value: String) {
        column_mut(&mut self.strings, key.index()).insert(particle, value);
    }

    pub fn remove_string(&mut self, key: StringKey, particle: ParticleKey) -> Option<String> {
        self.strings.get_mut(key.index())?.remove(particle)
    }

    pub fn float_entries(&self, particle: ParticleKey) -> Vec<(FloatKey, f64)> {
        entries(&self.floats, particle)
    }

    pub fn int_entries(&self, particle: ParticleKey) -> Vec<(IntKey, i64)> {
        entries(&self.ints, particle)
    }

    pub fn string_entries(&self, particle: ParticleKey) -> Vec<(StringKey, String)> {
        entries(&self.strings, particle)
    }

    /// Drops every attribute and derivative slot of `particle`.
    pub fn remove_particle(&mut self, particle: ParticleKey) {
        for column in &mut self.floats {
            column.remove(particle);
        }
        for column in &mut self.derivatives {
            column.remove(particle);
        }
        for column in &mut self.ints {
            column.remove(particle);
        }
        for column in &mut self.strings {
            column.remove(particle);
        }
    }
}
