use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Interning table mapping attribute names to dense indices.
#[derive(Debug, Default)]
pub struct KeyTable {
    names: Vec<String>,
    indices: HashMap<String, u32>,
}

impl KeyTable {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.indices.insert(name.to_string(), index);
        index
    }
}

/// The value family a key addresses; each family has its own interning table.
pub trait KeyKind: 'static {
    const KIND: &'static str;
    fn table() -> &'static RwLock<KeyTable>;
}

#[derive(Debug)]
pub enum FloatKind {}
#[derive(Debug)]
pub enum IntKind {}
#[derive(Debug)]
pub enum StringKind {}

static FLOAT_KEYS: Lazy<RwLock<KeyTable>> = Lazy::new(Default::default);
static INT_KEYS: Lazy<RwLock<KeyTable>> = Lazy::new(Default::default);
static STRING_KEYS: Lazy<RwLock<KeyTable>> = Lazy::new(Default::default);

impl KeyKind for FloatKind {
    const KIND: &'static str = "float";
    fn table() -> &'static RwLock<KeyTable> {
        &FLOAT_KEYS
    }
}

impl KeyKind for IntKind {
    const KIND: &'static str = "int";
    fn table() -> &'static RwLock<KeyTable> {
        &INT_KEYS
    }
}

impl KeyKind for StringKind {
    const KIND: &'static str = "string";
    fn table() -> &'static RwLock<KeyTable> {
        &STRING_KEYS
    }
}

/// An attribute name resolved once to a process-wide integer index.
///
/// Creating the same key twice yields equal values; the index is what the
/// attribute tables are addressed by.
pub struct AttributeKey<K: KeyKind> {
    index: u32,
    kind: PhantomData<K>,
}

pub type FloatKey = AttributeKey<FloatKind>;
pub type IntKey = AttributeKey<IntKind>;
pub type StringKey = AttributeKey<StringKind>;

impl<K: KeyKind> AttributeKey<K> {
    pub fn new(name: &str) -> Self {
        if let Some(&index) = K::table().read().indices.get(name) {
            return Self::from_index(index);
        }
        Self::from_index(K::table().write().intern(name))
    }

    pub(crate) fn from_index(index: u32) -> Self {
        Self {
            index,
            kind: PhantomData,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn name(&self) -> String {
        K::table().read().names[self.index()].clone()
    }

    /// Looks up an already-interned key without creating it.
    pub fn find(name: &str) -> Option<Self> {
        K::table()
            .read()
            .indices
            .get(name)
            .map(|&index| Self::from_index(index))
    }
}

impl<K: KeyKind> Clone for AttributeKey<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: KeyKind> Copy for AttributeKey<K> {}

impl<K: KeyKind> PartialEq for AttributeKey<K> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<K: KeyKind> Eq for AttributeKey<K> {}

impl<K: KeyKind> Hash for AttributeKey<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<K: KeyKind> fmt::Debug for AttributeKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Key({:?})", K::KIND, self.name())
    }
}

impl<K: KeyKind> fmt::Display for AttributeKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_resolves_to_same_key() {
        let a = FloatKey::new("keys-test-radius");
        let b = FloatKey::new("keys-test-radius");
        assert_eq!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn distinct_names_resolve_to_distinct_indices() {
        let a = FloatKey::new("keys-test-a");
        let b = FloatKey::new("keys-test-b");
        assert_ne!(a.index(), b.index());
    }

    #[test]
    fn name_returns_interned_name() {
        let key = StringKey::new("keys-test-label");
        assert_eq!(key.name(), "keys-test-label");
        assert_eq!(key.to_string(), "keys-test-label");
    }

    #[test]
    fn find_does_not_intern_unknown_names() {
        assert!(IntKey::find("keys-test-never-created").is_none());
        let created = IntKey::new("keys-test-created");
        assert_eq!(IntKey::find("keys-test-created"), Some(created));
    }

    #[test]
    fn key_families_are_interned_independently() {
        let float = FloatKey::new("keys-test-shared-name");
        let int = IntKey::new("keys-test-shared-name");
        assert_eq!(float.name(), int.name());
        assert_eq!(format!("{:?}", int), "intKey(\"keys-test-shared-name\")");
    }
}
