//! Generic keyed storage shared by every entity kind
//!
//! Reads take the shared lock and clone the value out, writes take the
//! exclusive lock and overwrite unconditionally (last writer wins). Nothing
//! is ever evicted.

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

pub struct KeyedCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Clone of the value stored under `key`, if present.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.read().get(key).cloned()
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn set(&self, key: K, value: V) {
        self.entries.write().insert(key, value);
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.read().contains_key(key)
    }

    /// Snapshot of every stored value, in no particular order.
    pub fn values(&self) -> Vec<V> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for KeyedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedCache")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}
