// Single-entry memo cache keyed by its dependency.

/// Holds the last dependency key and the value derived from it.
///
/// The value is recomputed only when [`Memo::update`] sees a key different
/// from the stored one; otherwise the cached value is kept as-is, so callers
/// holding `Arc` values can use pointer equality as a change signal.
#[derive(Debug)]
pub(crate) struct Memo<K, V> {
    key: K,
    value: V,
    computations: u64,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub(crate) fn new<F>(key: K, compute: F) -> Self
    where
        F: FnOnce(&K) -> V,
    {
        let value = compute(&key);
        Self {
            key,
            value,
            computations: 1,
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn get(&self) -> &V {
        &self.value
    }

    /// Number of times the value has been computed, including the first.
    pub(crate) fn computations(&self) -> u64 {
        self.computations
    }

    /// Store `key`, recomputing the value only if it changed.
    ///
    /// Returns `true` when the value was recomputed.
    pub(crate) fn update<F>(&mut self, key: K, compute: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        if self.key == key {
            return false;
        }
        self.value = compute(&key);
        self.key = key;
        self.computations += 1;
        true
    }
}
