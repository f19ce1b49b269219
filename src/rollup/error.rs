use thiserror::Error;

use crate::{
    key::{CodecError, PostingShape, RecordKey},
    source::SourceError,
};

/// Errors raised while merging a posting group.
#[derive(Debug, Error)]
pub enum RollupError {
    /// A posting inside the group did not decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The sorted source failed to advance or seek.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The source had no current entry.
    #[error("rollup requires a source positioned on a posting")]
    NotPositioned,
    /// The current entry is not of the shape the rollup merges.
    #[error("rollup expected a {expected:?} posting, found {key:?}")]
    UnexpectedShape {
        /// Shape the rollup merges.
        expected: PostingShape,
        /// Offending key.
        key: RecordKey,
    },
}
