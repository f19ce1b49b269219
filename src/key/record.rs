//! Owned posting key backed by reference-counted byte buffers.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use bytes::Bytes;

/// One sorted key: `(partition, family, qualifier, visibility, timestamp, tombstone)`.
///
/// Byte parts are [`Bytes`], so cloning a key out of a source shares the
/// underlying buffer instead of copying it. Ordering matches the store: byte
/// parts ascending, newer timestamps first, tombstones before live entries at
/// the same coordinates.
#[derive(Clone)]
pub struct RecordKey {
    partition: Bytes,
    family: Bytes,
    qualifier: Bytes,
    visibility: Bytes,
    timestamp: i64,
    tombstone: bool,
}

impl RecordKey {
    /// Key addressing the start of `(partition, family)`.
    ///
    /// The timestamp is `i64::MAX`, so the key sorts before every stored entry
    /// with the same partition, family and an empty qualifier.
    pub fn new(partition: impl Into<Bytes>, family: impl Into<Bytes>) -> Self {
        Self {
            partition: partition.into(),
            family: family.into(),
            qualifier: Bytes::new(),
            visibility: Bytes::new(),
            timestamp: i64::MAX,
            tombstone: false,
        }
    }

    /// Fully specified live key.
    pub fn from_parts(
        partition: impl Into<Bytes>,
        family: impl Into<Bytes>,
        qualifier: impl Into<Bytes>,
        visibility: impl Into<Bytes>,
        timestamp: i64,
    ) -> Self {
        Self {
            partition: partition.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: visibility.into(),
            timestamp,
            tombstone: false,
        }
    }

    /// Replace the qualifier.
    pub fn with_qualifier(self, qualifier: impl Into<Bytes>) -> Self {
        Self {
            qualifier: qualifier.into(),
            ..self
        }
    }

    /// Replace the visibility label.
    pub fn with_visibility(self, visibility: impl Into<Bytes>) -> Self {
        Self {
            visibility: visibility.into(),
            ..self
        }
    }

    /// Replace the timestamp.
    pub fn with_timestamp(self, timestamp: i64) -> Self {
        Self { timestamp, ..self }
    }

    /// Mark the key as a deletion marker.
    pub fn with_tombstone(self, tombstone: bool) -> Self {
        Self { tombstone, ..self }
    }

    /// Partition (row) bytes.
    pub fn partition(&self) -> &[u8] {
        &self.partition
    }

    /// Column family bytes.
    pub fn family(&self) -> &[u8] {
        &self.family
    }

    /// Column qualifier bytes.
    pub fn qualifier(&self) -> &[u8] {
        &self.qualifier
    }

    /// Visibility label bytes.
    pub fn visibility(&self) -> &[u8] {
        &self.visibility
    }

    /// Shared handle to the partition buffer.
    pub fn partition_bytes(&self) -> &Bytes {
        &self.partition
    }

    /// Shared handle to the visibility buffer.
    pub fn visibility_bytes(&self) -> &Bytes {
        &self.visibility
    }

    /// Entry timestamp.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Whether the key is a deletion marker.
    pub fn is_tombstone(&self) -> bool {
        self.tombstone
    }

    /// Whether every byte part is empty.
    pub fn is_empty(&self) -> bool {
        self.partition.is_empty()
            && self.family.is_empty()
            && self.qualifier.is_empty()
            && self.visibility.is_empty()
    }
}

impl Default for RecordKey {
    fn default() -> Self {
        RecordKey::new(Bytes::new(), Bytes::new())
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RecordKey {}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partition
            .cmp(&other.partition)
            .then_with(|| self.family.cmp(&other.family))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| self.visibility.cmp(&other.visibility))
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| other.tombstone.cmp(&self.tombstone))
    }
}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.partition.hash(state);
        self.family.hash(state);
        self.qualifier.hash(state);
        self.visibility.hash(state);
        self.timestamp.hash(state);
        self.tombstone.hash(state);
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} [{}] {}",
            self.partition.escape_ascii(),
            self.family.escape_ascii(),
            self.qualifier.escape_ascii(),
            self.visibility.escape_ascii(),
            self.timestamp
        )?;
        if self.tombstone {
            f.write_str(" (deleted)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_timestamps_sort_first() {
        let older = RecordKey::from_parts("row", "fam", "q", "", 1);
        let newer = RecordKey::from_parts("row", "fam", "q", "", 2);
        assert!(newer < older);
    }

    #[test]
    fn tombstone_precedes_live_entry() {
        let live = RecordKey::from_parts("row", "fam", "q", "", 7);
        let deleted = live.clone().with_tombstone(true);
        assert!(deleted < live);
        assert_ne!(deleted, live);
    }

    #[test]
    fn family_start_key_precedes_stored_entries() {
        let start = RecordKey::new("row", "fam");
        let stored = RecordKey::from_parts("row", "fam", "", "", 10);
        assert!(start < stored);
        assert!(start < RecordKey::from_parts("row", "fam", "a", "", i64::MAX));
    }

    #[test]
    fn default_key_is_empty() {
        assert!(RecordKey::default().is_empty());
        assert!(!RecordKey::new("row", "").is_empty());
    }
}
