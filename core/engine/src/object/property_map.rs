//! The insertion-ordered property table of an object.

use crate::property::{PropertyDescriptor, PropertyKey};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// An insertion-ordered map from property keys to descriptors.
///
/// Iteration order is the order of first insertion, which is what makes
/// `Object.keys` and `for…in` deterministic.
#[derive(Debug, Default)]
pub struct PropertyMap {
    map: IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>,
}

impl PropertyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a property.
    #[must_use]
    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.map.get(key)
    }

    /// Gets a property mutably.
    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        self.map.get_mut(key)
    }

    /// Inserts a property, replacing and returning any previous one.
    pub fn insert(
        &mut self,
        key: PropertyKey,
        property: PropertyDescriptor,
    ) -> Option<PropertyDescriptor> {
        self.map.insert(key, property)
    }

    /// Removes a property while keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.map.shift_remove(key)
    }

    /// Checks for a property.
    #[must_use]
    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.map.contains_key(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyDescriptor)> {
        self.map.iter()
    }

    /// Iterates entries mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PropertyKey, &mut PropertyDescriptor)> {
        self.map.iter_mut()
    }

    /// Iterates the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.map.keys()
    }

    /// Number of entries, including whiteouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
