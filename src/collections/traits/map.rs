use crate::collections::hash::Comparer;
use crate::collections::ordered::map::{
    DuplicateKeyError, IndexOutOfBounds, InsertError, Iter, OrderedMap, ReadOnly,
};

/// Keyed read access to a map.
pub trait MapRead<K, V> {
    type Iter<'a>: Iterator<Item = (&'a K, &'a V)> where Self: 'a, K: 'a, V: 'a;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns true if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value associated with `key`, if there is one.
    fn get(&self, key: &K) -> Option<&V>;

    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns true if any entry's value is equal to `value`.
    fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Returns an iterator over all entries, as references.
    fn iter<'a>(&'a self) -> Self::Iter<'a>;
}

/// Keyed write access to a map.
pub trait MapMut<K, V>: MapRead<K, V> {
    /// Adds a new entry, failing if an equal key is already present.
    fn add(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError>;

    /// Replaces the value for `key` if present, otherwise adds a new entry. Returns the old value.
    fn set(&mut self, key: K, value: V) -> Option<V>;

    /// Removes the entry for `key`, returning its value. Does nothing if `key` isn't present.
    fn remove(&mut self, key: &K) -> Option<V>;

    fn clear(&mut self);
}

/// Read access to a map whose entries have positions.
pub trait OrderedRead<K, V>: MapRead<K, V> {
    /// Returns the entry at `index`, or None if the index is out of bounds.
    fn get_index(&self, index: usize) -> Option<(&K, &V)>;

    /// Returns the position of the entry for `key`.
    fn index_of(&self, key: &K) -> Option<usize>;

    /// Returns the key at `index`.
    fn key_at(&self, index: usize) -> Result<&K, IndexOutOfBounds>;

    /// Returns the value at `index`.
    fn get_at(&self, index: usize) -> Result<&V, IndexOutOfBounds>;
}

/// Write access to a map whose entries have positions.
pub trait OrderedMut<K, V>: OrderedRead<K, V> + MapMut<K, V> {
    /// Inserts a new entry at `index`, shifting the following entries up by one.
    fn insert_at(&mut self, index: usize, key: K, value: V) -> Result<(), InsertError>;

    /// Replaces the value at `index`, returning the old one.
    fn set_at(&mut self, index: usize, value: V) -> Result<V, IndexOutOfBounds>;

    /// Removes the entry at `index`, shifting the following entries down by one.
    fn remove_at(&mut self, index: usize) -> Result<(K, V), IndexOutOfBounds>;
}

impl<K, V, C: Comparer<K>> MapRead<K, V> for OrderedMap<K, V, C> {
    type Iter<'a> = Iter<'a, K, V> where Self: 'a, K: 'a, V: 'a;

    fn len(&self) -> usize {
        OrderedMap::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        OrderedMap::get(self, key)
    }

    fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        OrderedMap::contains_value(self, value)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        OrderedMap::iter(self)
    }
}

impl<K, V, C: Comparer<K>> MapMut<K, V> for OrderedMap<K, V, C> {
    fn add(&mut self, key: K, value: V) -> Result<(), DuplicateKeyError> {
        OrderedMap::add(self, key, value)
    }

    fn set(&mut self, key: K, value: V) -> Option<V> {
        OrderedMap::set(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        OrderedMap::remove(self, key)
    }

    fn clear(&mut self) {
        OrderedMap::clear(self)
    }
}

impl<K, V, C: Comparer<K>> OrderedRead<K, V> for OrderedMap<K, V, C> {
    fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        OrderedMap::get_index(self, index)
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        OrderedMap::get_index_of(self, key)
    }

    fn key_at(&self, index: usize) -> Result<&K, IndexOutOfBounds> {
        OrderedMap::key_at(self, index)
    }

    fn get_at(&self, index: usize) -> Result<&V, IndexOutOfBounds> {
        OrderedMap::get_at(self, index)
    }
}

impl<K, V, C: Comparer<K>> OrderedMut<K, V> for OrderedMap<K, V, C> {
    fn insert_at(&mut self, index: usize, key: K, value: V) -> Result<(), InsertError> {
        OrderedMap::insert_at(self, index, key, value)
    }

    fn set_at(&mut self, index: usize, value: V) -> Result<V, IndexOutOfBounds> {
        OrderedMap::set_at(self, index, value)
    }

    fn remove_at(&mut self, index: usize) -> Result<(K, V), IndexOutOfBounds> {
        OrderedMap::remove_at(self, index)
    }
}

impl<'m, K, V, C: Comparer<K>> MapRead<K, V> for ReadOnly<'m, K, V, C> {
    type Iter<'a> = Iter<'a, K, V> where Self: 'a, K: 'a, V: 'a;

    fn len(&self) -> usize {
        ReadOnly::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        ReadOnly::get(self, key)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        ReadOnly::iter(self)
    }
}

impl<'m, K, V, C: Comparer<K>> OrderedRead<K, V> for ReadOnly<'m, K, V, C> {
    fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        ReadOnly::get_index(self, index)
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        ReadOnly::get_index_of(self, key)
    }

    fn key_at(&self, index: usize) -> Result<&K, IndexOutOfBounds> {
        ReadOnly::key_at(self, index)
    }

    fn get_at(&self, index: usize) -> Result<&V, IndexOutOfBounds> {
        ReadOnly::get_at(self, index)
    }
}
