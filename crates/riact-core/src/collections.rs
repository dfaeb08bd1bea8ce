//! Hash containers used by the reconciler.
//!
//! The default build keys lookups with `hashbrown` + `ahash`; the `std-hash`
//! feature swaps both for the standard library versions.

#[cfg(feature = "std-hash")]
pub mod map {
    pub type HashMap<K, V> = std::collections::HashMap<K, V>;
    pub type HashSet<K> = std::collections::HashSet<K>;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
    pub type HashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
}

use std::hash::Hash;

pub use map::{HashMap, HashSet};

/// Map sized for `capacity` entries with whichever hasher is active.
#[inline]
pub fn map_with_capacity<K: Eq + Hash, V>(capacity: usize) -> HashMap<K, V> {
    let mut map = HashMap::default();
    map.reserve(capacity);
    map
}

/// Set sized for `capacity` entries with whichever hasher is active.
#[inline]
pub fn set_with_capacity<K: Eq + Hash>(capacity: usize) -> HashSet<K> {
    let mut set = HashSet::default();
    set.reserve(capacity);
    set
}
