use crate::core::models::ids::ParticleIndex;

/// An ordered list of `(key, value)` pairs for one value type.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoEntries<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for InfoEntries<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> InfoEntries<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(key, _)| key.as_str())
    }

    pub fn value(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    fn push(&mut self, key: &str, value: T) {
        self.entries.push((key.to_string(), value));
    }
}

/// Construction-time metadata describing a restraint.
///
/// Entries are grouped into independent namespaces by value type, and each
/// namespace keeps insertion order: position `i` always names the same pair
/// within one `StaticInfo`. Instances are built with [`StaticInfoBuilder`] and
/// are immutable afterwards; they never reflect live particle values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticInfo {
    ints: InfoEntries<i64>,
    floats: InfoEntries<f64>,
    strings: InfoEntries<String>,
    filenames: InfoEntries<String>,
    int_lists: InfoEntries<Vec<i64>>,
    float_lists: InfoEntries<Vec<f64>>,
    string_lists: InfoEntries<Vec<String>>,
    filename_lists: InfoEntries<Vec<String>>,
    particle_lists: InfoEntries<Vec<ParticleIndex>>,
}

impl StaticInfo {
    pub fn builder() -> StaticInfoBuilder {
        StaticInfoBuilder::default()
    }

    pub fn number_of_int(&self) -> usize {
        self.ints.len()
    }
    pub fn int_key(&self, index: usize) -> Option<&str> {
        self.ints.key(index)
    }
    pub fn int_value(&self, index: usize) -> Option<i64> {
        self.ints.value(index).copied()
    }

    pub fn number_of_float(&self) -> usize {
        self.floats.len()
    }
    pub fn float_key(&self, index: usize) -> Option<&str> {
        self.floats.key(index)
    }
    pub fn float_value(&self, index: usize) -> Option<f64> {
        self.floats.value(index).copied()
    }

    pub fn number_of_string(&self) -> usize {
        self.strings.len()
    }
    pub fn string_key(&self, index: usize) -> Option<&str> {
        self.strings.key(index)
    }
    pub fn string_value(&self, index: usize) -> Option<&str> {
        self.strings.value(index).map(String::as_str)
    }

    pub fn number_of_filename(&self) -> usize {
        self.filenames.len()
    }
    pub fn filename_key(&self, index: usize) -> Option<&str> {
        self.filenames.key(index)
    }
    pub fn filename_value(&self, index: usize) -> Option<&str> {
        self.filenames.value(index).map(String::as_str)
    }

    pub fn ints(&self) -> &InfoEntries<i64> {
        &self.ints
    }
    pub fn floats(&self) -> &InfoEntries<f64> {
        &self.floats
    }
    pub fn strings(&self) -> &InfoEntries<String> {
        &self.strings
    }
    pub fn filenames(&self) -> &InfoEntries<String> {
        &self.filenames
    }
    pub fn int_lists(&self) -> &InfoEntries<Vec<i64>> {
        &self.int_lists
    }
    pub fn float_lists(&self) -> &InfoEntries<Vec<f64>> {
        &self.float_lists
    }
    pub fn string_lists(&self) -> &InfoEntries<Vec<String>> {
        &self.string_lists
    }
    pub fn filename_lists(&self) -> &InfoEntries<Vec<String>> {
        &self.filename_lists
    }
    pub fn particle_lists(&self) -> &InfoEntries<Vec<ParticleIndex>> {
        &self.particle_lists
    }
}

/// Append-only builder for [`StaticInfo`].
#[derive(Debug, Default)]
pub struct StaticInfoBuilder {
    info: StaticInfo,
}

impl StaticInfoBuilder {
    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.info.ints.push(key, value);
        self
    }
    pub fn float(mut self, key: &str, value: f64) -> Self {
        self.info.floats.push(key, value);
        self
    }
    pub fn string(mut self, key: &str, value: &str) -> Self {
        self.info.strings.push(key, value.to_string());
        self
    }
    pub fn filename(mut self, key: &str, value: &str) -> Self {
        self.info.filenames.push(key, value.to_string());
        self
    }
    pub fn ints(mut self, key: &str, values: Vec<i64>) -> Self {
        self.info.int_lists.push(key, values);
        self
    }
    pub fn floats(mut self, key: &str, values: Vec<f64>) -> Self {
        self.info.float_lists.push(key, values);
        self
    }
    pub fn strings(mut self, key: &str, values: Vec<String>) -> Self {
        self.info.string_lists.push(key, values);
        self
    }
    pub fn filenames(mut self, key: &str, values: Vec<String>) -> Self {
        self.info.filename_lists.push(key, values);
        self
    }
    pub fn particles(mut self, key: &str, values: Vec<ParticleIndex>) -> Self {
        self.info.particle_lists.push(key, values);
        self
    }

    pub fn build(self) -> StaticInfo {
        self.info
    }
}
