//! Step-based access to a positioned, sorted run of postings.
//!
//! The rollups never own their input: they drive a [`SortedSource`] through
//! `has_current -> current_key/current_value -> advance`, and may reposition
//! it with `seek`. Borrowed keys and values are tied to `&self`, so anything a
//! caller wants to keep across an `advance` has to be cloned out first.

mod memory;

use bytes::Bytes;
use thiserror::Error;

pub use self::memory::MemorySource;
use crate::{key::RecordKey, scan::KeyRange};

/// Errors surfaced by a sorted source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source was forked before it was ever seeked.
    #[error("cannot fork a source that has not been seeked")]
    Unopened,
    /// Failure reported by the underlying storage, passed through untouched.
    #[error("sorted source failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The arguments of the most recent seek.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeekParams {
    /// Range the source is restricted to.
    pub range: KeyRange<RecordKey>,
    /// Column families to include or exclude.
    pub families: Vec<Bytes>,
    /// `true` keeps only `families`; `false` skips them.
    pub inclusive: bool,
}

impl SeekParams {
    /// Whether a key with `family` passes the column family filter.
    pub fn admits_family(&self, family: &[u8]) -> bool {
        let listed = self.families.iter().any(|f| f.as_ref() == family);
        listed == self.inclusive
    }
}

/// A positioned cursor over sorted postings.
pub trait SortedSource {
    /// Whether the cursor rests on an entry.
    fn has_current(&self) -> bool;

    /// Key under the cursor.
    fn current_key(&self) -> Option<&RecordKey>;

    /// Value under the cursor.
    fn current_value(&self) -> Option<&Bytes>;

    /// Move to the next entry admitted by the last seek.
    fn advance(&mut self) -> Result<(), SourceError>;

    /// Restrict the source to `range` and position it on the first admitted entry.
    fn seek(
        &mut self,
        range: KeyRange<RecordKey>,
        families: &[Bytes],
        inclusive: bool,
    ) -> Result<(), SourceError>;

    /// Arguments of the most recent seek, if any.
    fn last_seek(&self) -> Option<&SeekParams>;

    /// Independent cursor at the same position, sharing only immutable state.
    ///
    /// # Errors
    /// Returns [`SourceError::Unopened`] when the source was never seeked.
    fn fork(&self) -> Result<Self, SourceError>
    where
        Self: Sized;

    /// Estimated number of entries behind the source.
    fn size_hint(&self) -> Option<usize>;
}
