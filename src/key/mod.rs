//! Posting keys and the byte-level codec over them.
//!
//! Decoders work on borrowed slices of a [`RecordKey`]; the key itself holds
//! shared [`bytes::Bytes`] buffers so copying one out of a source before the
//! next advance is a reference-count bump.
mod codec;
mod error;
mod record;
mod shape;

pub use codec::{
    build_child_key, decode_datatype_and_root_uid_from_event_family,
    decode_field_and_value_from_fi, decode_field_and_value_from_tf, decode_field_from_tf,
    decode_field_index_pointer, estimate_root_pointer, event_key, field_index_key,
    find_first_nul, find_last_nul, find_second_last_nul, find_second_nul, immediate_parent_of,
    next_sibling_start_key, nth_instance_of, nth_last_instance_of, root_pointer_of,
    split_field_and_value, term_frequency_id, term_frequency_key, term_frequency_pointer,
    CHILD_SEPARATOR, ESTIMATE_THRESHOLD, FI_FAMILY_PREFIX, MAX_SENTINEL, MAX_SENTINEL_BYTES, NUL,
    TF_FAMILY,
};
pub(crate) use codec::join;
pub use error::CodecError;
pub use record::RecordKey;
pub use shape::{current_field, document_id, is_root_pointer, PostingShape};
