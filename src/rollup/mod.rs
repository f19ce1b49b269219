//! Sorted-merge rollups.
//!
//! A logical document is stored as many physically adjacent postings, one per
//! field/value pair and child record. A rollup consumes the run of postings
//! that share one root pointer in a single forward pass and returns one
//! synthetic key, optionally filling a [`Document`] on the way. Only the
//! current group is ever held in memory.

mod document;
mod error;
mod field_index;
mod group;
mod options;
mod term_frequency;

pub use document::{
    Attribute, AttributeFactory, AttributeFilter, DefaultAttributeFactory, Document,
    PROVENANCE_FIELD,
};
pub use error::RollupError;
pub use field_index::FieldIndexRollup;
pub use options::RollupOptions;
pub use term_frequency::TermFrequencyRollup;
