// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Arena storage for model elements.
//!
//! Entity types, properties, foreign keys and tables all live in arenas and refer to each other
//! by index. Entity types and tables are additionally looked up by name (when building the model
//! and when resolving a store object), so those use a [`MappedArena`].

use std::{collections::HashMap, ops};

use serde::{Deserialize, Serialize};
use typed_generational_arena::{Arena, IgnoreGeneration, Index};

pub type SerializableSlab<T> = Arena<T, usize, IgnoreGeneration>;
pub type SerializableSlabIndex<T> = Index<T, usize, IgnoreGeneration>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappedArena<V> {
    values: SerializableSlab<V>,
    map: HashMap<String, SerializableSlabIndex<V>>,
}

impl<V> MappedArena<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_id(&self, key: &str) -> Option<SerializableSlabIndex<V>> {
        self.map.get(key).copied()
    }

    pub fn get(&self, id: SerializableSlabIndex<V>) -> Option<&V> {
        self.values.get(id)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&V> {
        self.get_id(key).map(|id| &self[id])
    }

    /// Add a value under `key`. Returns `None` (and leaves the arena untouched) if the key is
    /// already taken.
    pub fn try_add(&mut self, key: &str, value: V) -> Option<SerializableSlabIndex<V>> {
        if self.map.contains_key(key) {
            return None;
        }

        let id = self.values.insert(value);
        self.map.insert(key.to_string(), id);
        Some(id)
    }

    pub fn ids(&self) -> Vec<SerializableSlabIndex<V>> {
        self.values.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> typed_generational_arena::Iter<'_, V, usize, IgnoreGeneration> {
        self.values.iter()
    }
}

impl<V> Default for MappedArena<V> {
    fn default() -> Self {
        MappedArena {
            values: SerializableSlab::new(),
            map: HashMap::default(),
        }
    }
}

impl<V> ops::Index<SerializableSlabIndex<V>> for MappedArena<V> {
    type Output = V;

    #[inline]
    fn index(&self, id: SerializableSlabIndex<V>) -> &V {
        &self.values[id]
    }
}

impl<V> ops::IndexMut<SerializableSlabIndex<V>> for MappedArena<V> {
    #[inline]
    fn index_mut(&mut self, id: SerializableSlabIndex<V>) -> &mut V {
        &mut self.values[id]
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut arena = MappedArena::default();
        let first = arena.try_add("Animals", 1).unwrap();
        assert!(arena.try_add("Animals", 2).is_none());
        assert_eq!(arena[first], 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get_by_key("Animals"), Some(&1));
    }
}
