use gmlx_core_types::FeatureId;

use super::value::{FeatureMapEntry, Value};

/// Ordered sequence of tagged entries shared by several member features
///
/// The full entry order is document order. Per-member access goes through
/// filtered projections that keep the members' relative order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMap {
    entries: Vec<FeatureMapEntry>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in document order
    pub fn entries(&self) -> &[FeatureMapEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureMapEntry> {
        self.entries.iter()
    }

    /// Values tagged with `feature`, in their relative document order
    pub fn values_of(&self, feature: FeatureId) -> impl Iterator<Item = &Value> {
        self.entries
            .iter()
            .filter(move |e| e.feature == feature)
            .map(|e| &e.value)
    }

    pub fn count_of(&self, feature: FeatureId) -> usize {
        self.values_of(feature).count()
    }

    /// First value tagged with `feature`
    pub fn first_of(&self, feature: FeatureId) -> Option<&Value> {
        self.values_of(feature).next()
    }

    /// Full-map position of the first entry `(feature, value)`
    pub fn position_of(&self, feature: FeatureId, value: &Value) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.feature == feature && &e.value == value)
    }

    /// Full-map position of the `view_index`-th entry tagged with `feature`
    pub fn full_index(&self, feature: FeatureId, view_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.feature == feature)
            .nth(view_index)
            .map(|(i, _)| i)
    }

    pub(crate) fn push(&mut self, entry: FeatureMapEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub(crate) fn insert(&mut self, index: usize, entry: FeatureMapEntry) {
        self.entries.insert(index, entry);
    }

    pub(crate) fn remove(&mut self, index: usize) -> FeatureMapEntry {
        self.entries.remove(index)
    }

    pub(crate) fn replace_value(&mut self, index: usize, value: Value) -> Value {
        std::mem::replace(&mut self.entries[index].value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F1: FeatureId = FeatureId::new(1);
    const F2: FeatureId = FeatureId::new(2);

    fn sample() -> FeatureMap {
        let mut map = FeatureMap::new();
        map.push(FeatureMapEntry::new(F1, "a"));
        map.push(FeatureMapEntry::new(F2, "b"));
        map.push(FeatureMapEntry::new(F1, "c"));
        map
    }

    #[test]
    fn test_projection_keeps_relative_order() {
        let map = sample();
        let f1: Vec<_> = map.values_of(F1).cloned().collect();
        assert_eq!(f1, vec![Value::from("a"), Value::from("c")]);
        assert_eq!(map.count_of(F2), 1);
    }

    #[test]
    fn test_full_index_translation() {
        let map = sample();
        assert_eq!(map.full_index(F1, 0), Some(0));
        assert_eq!(map.full_index(F1, 1), Some(2));
        assert_eq!(map.full_index(F1, 2), None);
        assert_eq!(map.position_of(F2, &Value::from("b")), Some(1));
    }
}
