use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

/// Errors that can occur during OrderedMap operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderedMapError {
    /// Attempted to insert a key that is already present
    #[error("Cannot insert a key that already exists in the OrderedMap")]
    DuplicateKey,
}

/// Insertion-ordered sequence with an auxiliary key -> position lookup.
/// Entries are never removed, so positions are stable for the map's life.
#[derive(Clone, Debug)]
pub struct OrderedMap<K: Eq + Hash + Clone, V> {
    entries: Vec<(K, V)>,
    positions: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Appends a new entry, returning its position.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize, OrderedMapError> {
        if self.positions.contains_key(&key) {
            return Err(OrderedMapError::DuplicateKey);
        }

        let position = self.entries.len();
        self.positions.insert(key.clone(), position);
        self.entries.push((key, value));
        Ok(position)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.positions.contains_key(key)
    }

    pub fn position_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.positions.get(key).copied()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let position = self.position_of(key)?;
        self.get_at(position)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let position = self.position_of(key)?;
        self.get_at_mut(position)
    }

    pub fn get_at(&self, position: usize) -> Option<&V> {
        self.entries.get(position).map(|(_, value)| value)
    }

    pub fn get_at_mut(&mut self, position: usize) -> Option<&mut V> {
        self.entries.get_mut(position).map(|(_, value)| value)
    }

    pub fn key_at(&self, position: usize) -> Option<&K> {
        self.entries.get(position).map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
