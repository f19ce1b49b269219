#![deny(missing_docs)]
//! Document rollups over sorted shard postings.
//!
//! A sharded index stores each logical document as many adjacent postings:
//! field index (`fi`) entries keyed by value, term frequency (`tf`) entries
//! and event entries keyed by document. This crate decodes the byte layout of
//! those postings, collapses the contiguous run belonging to one top-level
//! document into a single synthetic key, and rewrites scan ranges so a scan
//! never lands inside a document's children.
//!
//! The building blocks are:
//! - [`key`]: the posting key type and its codec.
//! - [`source`]: the step-based cursor the rollups drive, plus an in-memory
//!   implementation.
//! - [`rollup`]: the field index and term frequency rollups.
//! - [`range`]: document-aware range adjustment.

/// Posting keys, delimiters and pointer reductions.
pub mod key;

/// Key ranges shared by sources and the range adjuster.
pub mod scan;

/// Sorted sources the rollups read from.
pub mod source;

/// Field index and term frequency rollups.
pub mod rollup;

/// Range adjustment at document boundaries.
pub mod range;

mod observability;

pub use crate::{
    key::{CodecError, PostingShape, RecordKey},
    rollup::{Document, FieldIndexRollup, RollupError, RollupOptions, TermFrequencyRollup},
    scan::KeyRange,
    source::{MemorySource, SortedSource, SourceError},
};
