//! Identifier-keyed entity storage.

use std::collections::{btree_map, BTreeMap};

use yatd_core::{EnemyId, ProjectileId, TowerId};

/// Identifier type that a [`Registry`] can allocate.
pub trait RegistryKey: Copy + Ord {
    /// Builds the identifier from its raw counter value.
    fn from_raw(raw: u32) -> Self;
}

impl RegistryKey for EnemyId {
    fn from_raw(raw: u32) -> Self {
        EnemyId::new(raw)
    }
}

impl RegistryKey for TowerId {
    fn from_raw(raw: u32) -> Self {
        TowerId::new(raw)
    }
}

impl RegistryKey for ProjectileId {
    fn from_raw(raw: u32) -> Self {
        ProjectileId::new(raw)
    }
}

/// Arena that stores entities and manages identifier allocation.
///
/// Identifiers grow monotonically and are never reused, so a stale handle
/// resolves to `None` instead of aliasing a newer entity. Once the last
/// identifier is handed out the registry refuses further insertions.
/// Iteration follows identifier order, which equals creation order.
#[derive(Clone, Debug)]
pub struct Registry<K, V> {
    entries: BTreeMap<K, V>,
    next_raw: Option<u32>,
}

impl<K: RegistryKey, V> Registry<K, V> {
    /// Creates an empty registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_raw: Some(0),
        }
    }

    /// Identifier the next insertion will receive, if any remain.
    #[must_use]
    pub fn next_key(&self) -> Option<K> {
        self.next_raw.map(K::from_raw)
    }

    /// Allocates an identifier and stores the entity built for it.
    ///
    /// Returns `None` without calling `build` when identifiers are exhausted.
    pub fn insert_with<F>(&mut self, build: F) -> Option<K>
    where
        F: FnOnce(K) -> V,
    {
        let raw = self.next_raw?;
        let key = K::from_raw(raw);
        self.next_raw = raw.checked_add(1);
        let _ = self.entries.insert(key, build(key));
        Some(key)
    }

    /// Resolves a handle to the stored entity.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&V> {
        self.entries.get(&key)
    }

    /// Resolves a handle to the stored entity for mutation.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.entries.get_mut(&key)
    }

    /// Reports whether the handle still resolves.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Removes and returns the entity stored under the handle.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.entries.remove(&key)
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the registry holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the stored identifiers in ascending order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().copied().collect()
    }

    /// Iterator over identifiers and entities in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Mutable iterator over entities in ascending identifier order.
    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, K, V> {
        self.entries.values_mut()
    }
}

impl<K: RegistryKey, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
