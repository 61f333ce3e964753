//! Hash-based property index for fast lookups

use super::property::PropertyValue;
use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

/// Index over one property key: value -> set of element ids.
///
/// Generic over the id type so vertex and edge indexes share the
/// implementation.
#[derive(Debug, Clone)]
pub struct PropertyIndex<I> {
    index: FxHashMap<PropertyValue, FxHashSet<I>>,
}

impl<I: Copy + Eq + Hash> PropertyIndex<I> {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, value: PropertyValue, id: I) {
        self.index.entry(value).or_default().insert(id);
    }

    pub fn remove(&mut self, value: &PropertyValue, id: I) {
        if let Some(ids) = self.index.get_mut(value) {
            ids.remove(&id);
            if ids.is_empty() {
                self.index.remove(value);
            }
        }
    }

    pub fn get(&self, value: &PropertyValue) -> Vec<I> {
        self.index
            .get(value)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl<I: Copy + Eq + Hash> Default for PropertyIndex<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::VertexId;

    #[test]
    fn test_property_index_ops() {
        let mut index: PropertyIndex<VertexId> = PropertyIndex::new();
        let v1 = VertexId::new(1);
        let v2 = VertexId::new(2);
        let val = PropertyValue::String("U http://example.org/a".to_string());

        // Insert
        index.insert(val.clone(), v1);
        index.insert(val.clone(), v2);

        // Get
        let results = index.get(&val);
        assert_eq!(results.len(), 2);
        assert!(results.contains(&v1));
        assert!(results.contains(&v2));

        // Remove
        index.remove(&val, v1);
        let results = index.get(&val);
        assert_eq!(results.len(), 1);
        assert!(results.contains(&v2));
    }

    #[test]
    fn test_empty_bucket_is_dropped() {
        let mut index: PropertyIndex<VertexId> = PropertyIndex::new();
        let val = PropertyValue::String("x".to_string());

        index.insert(val.clone(), VertexId::new(1));
        index.remove(&val, VertexId::new(1));

        assert!(index.get(&val).is_empty());
        assert!(index.index.is_empty());
    }
}
