//! Scan ranges over sorted keys.
//!
//! Bounds use [`std::ops::Bound`]; an unbounded side stands for "from the first
//! key" or "to the last key" of the source.

use std::ops::Bound;

/// Start and end bounds a source is restricted to; the range owns its keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRange<K> {
    /// Start bound (inclusive/exclusive/unbounded).
    pub start: Bound<K>,
    /// End bound (inclusive/exclusive/unbounded).
    pub end: Bound<K>,
}

impl<K> KeyRange<K> {
    /// Create an unbounded range (all keys).
    pub fn all() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Create a new range from explicit bounds.
    pub fn new(start: Bound<K>, end: Bound<K>) -> Self {
        Self { start, end }
    }

    /// Start key, if the range has one.
    pub fn start_key(&self) -> Option<&K> {
        bound_key(&self.start)
    }

    /// End key, if the range has one.
    pub fn end_key(&self) -> Option<&K> {
        bound_key(&self.end)
    }
}

impl<K: Ord> KeyRange<K> {
    /// Whether this range contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.after_start(key) && self.before_end(key)
    }

    /// Whether `key` satisfies the start bound.
    pub fn after_start(&self, key: &K) -> bool {
        match &self.start {
            Bound::Unbounded => true,
            Bound::Included(bound) => key >= bound,
            Bound::Excluded(bound) => key > bound,
        }
    }

    /// Whether `key` satisfies the end bound.
    pub fn before_end(&self, key: &K) -> bool {
        match &self.end {
            Bound::Unbounded => true,
            Bound::Included(bound) => key <= bound,
            Bound::Excluded(bound) => key < bound,
        }
    }

    /// Whether no key can satisfy both bounds.
    pub fn is_empty(&self) -> bool {
        use Bound as B;
        match (&self.start, &self.end) {
            (B::Unbounded, _) | (_, B::Unbounded) => false,
            (B::Included(a), B::Included(b)) => a > b,
            (B::Included(a), B::Excluded(b)) => a >= b,
            (B::Excluded(a), B::Included(b)) => a >= b,
            (B::Excluded(a), B::Excluded(b)) => a >= b,
        }
    }
}

fn bound_key<K>(bound: &Bound<K>) -> Option<&K> {
    match bound {
        Bound::Included(key) | Bound::Excluded(key) => Some(key),
        Bound::Unbounded => None,
    }
}
