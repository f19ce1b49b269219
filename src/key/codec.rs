//! Byte-exact codec for shard postings.
//!
//! Three posting shapes share one store:
//!
//! ```text
//! FI family    = "fi" 0x00 field
//! FI qualifier = value 0x00 datatype 0x00 uid
//! TF family    = "tf"
//! TF qualifier = datatype 0x00 uid 0x00 value 0x00 field
//! Event family    = datatype 0x00 uid
//! Event qualifier = field 0x00 value
//! ```
//!
//! A uid is a dotted lineage: the top-level document id carries two dots and
//! every child level appends `.segment`. All decoders borrow from their input
//! and only allocate when they have to splice parts together.

use bytes::{Bytes, BytesMut};

use super::{CodecError, RecordKey};

/// Field delimiter.
pub const NUL: u8 = 0x00;

/// Separator between lineage levels of a uid.
pub const CHILD_SEPARATOR: u8 = b'.';

/// Highest code point, appended to a prefix to sort after all of its continuations.
pub const MAX_SENTINEL: &str = "\u{FFFF}";

/// UTF-8 encoding of [`MAX_SENTINEL`].
pub const MAX_SENTINEL_BYTES: &[u8] = MAX_SENTINEL.as_bytes();

/// Family prefix of field index postings.
pub const FI_FAMILY_PREFIX: &[u8] = b"fi\0";

/// Family of term frequency postings.
pub const TF_FAMILY: &[u8] = b"tf";

/// Ids longer than this are reduced by [`estimate_root_pointer`] with a plain scan.
pub const ESTIMATE_THRESHOLD: usize = 21;

// The dot that ends a top-level uid.
const ROOT_DOT: usize = 3;

/// Index of the `n`th (1-based) occurrence of `delimiter`, scanning forward.
pub fn nth_instance_of(delimiter: u8, bytes: &[u8], n: usize) -> Option<usize> {
    let skip = n.checked_sub(1)?;
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == delimiter)
        .nth(skip)
        .map(|(idx, _)| idx)
}

/// Index of the `n`th (1-based) occurrence of `delimiter`, scanning backward.
pub fn nth_last_instance_of(delimiter: u8, bytes: &[u8], n: usize) -> Option<usize> {
    let skip = n.checked_sub(1)?;
    bytes
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, b)| **b == delimiter)
        .nth(skip)
        .map(|(idx, _)| idx)
}

/// First NUL.
pub fn find_first_nul(bytes: &[u8]) -> Option<usize> {
    nth_instance_of(NUL, bytes, 1)
}

/// Second NUL from the start.
pub fn find_second_nul(bytes: &[u8]) -> Option<usize> {
    nth_instance_of(NUL, bytes, 2)
}

/// Last NUL.
pub fn find_last_nul(bytes: &[u8]) -> Option<usize> {
    nth_last_instance_of(NUL, bytes, 1)
}

/// Second NUL from the end.
pub fn find_second_last_nul(bytes: &[u8]) -> Option<usize> {
    nth_last_instance_of(NUL, bytes, 2)
}

/// Reduce a dotted id to its top-level ancestor.
///
/// Cuts at the third `.`; ids with fewer dots are already top-level and are
/// returned unchanged. Every descendant level is discarded.
pub fn root_pointer_of(id: &[u8]) -> &[u8] {
    match nth_instance_of(CHILD_SEPARATOR, id, ROOT_DOT) {
        Some(idx) => &id[..idx],
        None => id,
    }
}

/// Strip exactly one trailing lineage level.
///
/// Ids with at most two dots are top-level and are returned unchanged. Unlike
/// [`root_pointer_of`], intermediate ancestors survive: `a.b.c.d.e` becomes
/// `a.b.c.d`.
pub fn immediate_parent_of(id: &[u8]) -> &[u8] {
    let mut dots = 0usize;
    let mut last_dot = 0usize;
    for (idx, byte) in id.iter().enumerate() {
        if *byte == CHILD_SEPARATOR {
            dots += 1;
            last_dot = idx;
        }
    }
    if dots > 2 {
        &id[..last_dot]
    } else {
        id
    }
}

/// The `datatype 0x00 uid` suffix of a field index qualifier.
pub fn decode_field_index_pointer(qualifier: &[u8]) -> Result<&[u8], CodecError> {
    let start = find_second_last_nul(qualifier)
        .ok_or_else(|| CodecError::missing("field index qualifier", NUL, 2, qualifier))?;
    Ok(&qualifier[start + 1..])
}

/// `field 0x00 value` of a field index posting.
pub fn decode_field_and_value_from_fi(
    family: &[u8],
    qualifier: &[u8],
) -> Result<Bytes, CodecError> {
    let field_start = find_first_nul(family)
        .ok_or_else(|| CodecError::missing("field index family", NUL, 1, family))?;
    let value_end = find_second_last_nul(qualifier)
        .ok_or_else(|| CodecError::missing("field index qualifier", NUL, 2, qualifier))?;
    Ok(join(&[&family[field_start + 1..], &[NUL], &qualifier[..value_end]]))
}

/// `field 0x00 value` of a term frequency posting.
///
/// The wire order is value then field; the output is field then value. The
/// value runs from the second NUL to the last one, so it may contain NULs.
pub fn decode_field_and_value_from_tf(qualifier: &[u8]) -> Result<Bytes, CodecError> {
    let (value, field) = split_tf_value_and_field(qualifier)?;
    Ok(join(&[field, &[NUL], value]))
}

/// The field name of a term frequency qualifier.
pub fn decode_field_from_tf(qualifier: &[u8]) -> Result<&[u8], CodecError> {
    split_tf_value_and_field(qualifier).map(|(_, field)| field)
}

fn split_tf_value_and_field(qualifier: &[u8]) -> Result<(&[u8], &[u8]), CodecError> {
    let missing = || CodecError::missing("term frequency qualifier", NUL, 3, qualifier);
    nth_instance_of(NUL, qualifier, 3).ok_or_else(missing)?;
    match (find_second_nul(qualifier), find_last_nul(qualifier)) {
        (Some(value_start), Some(field_start)) => Ok((
            &qualifier[value_start + 1..field_start],
            &qualifier[field_start + 1..],
        )),
        _ => Err(missing()),
    }
}

/// The `datatype 0x00 rootUid` pointer of a term frequency qualifier.
///
/// Counts NULs and dots together and stops at whichever comes first, the
/// second NUL or the third dot, because the uid segment of a child posting
/// already carries descendant levels.
pub fn term_frequency_pointer(qualifier: &[u8]) -> Result<&[u8], CodecError> {
    let mut nuls = 0usize;
    let mut dots = 0usize;
    for (idx, byte) in qualifier.iter().enumerate() {
        match *byte {
            NUL => {
                nuls += 1;
                if nuls == 2 {
                    return Ok(&qualifier[..idx]);
                }
            }
            CHILD_SEPARATOR => {
                dots += 1;
                if dots == ROOT_DOT {
                    return Ok(&qualifier[..idx]);
                }
            }
            _ => {}
        }
    }
    Err(CodecError::missing("term frequency qualifier", NUL, 2, qualifier))
}

/// The `datatype 0x00 uid` of a term frequency qualifier, without reduction.
pub fn term_frequency_id(qualifier: &[u8]) -> Result<&[u8], CodecError> {
    let end = find_second_nul(qualifier)
        .ok_or_else(|| CodecError::missing("term frequency qualifier", NUL, 2, qualifier))?;
    Ok(&qualifier[..end])
}

/// The top-level `datatype 0x00 rootUid` of an event family.
pub fn decode_datatype_and_root_uid_from_event_family(family: &[u8]) -> &[u8] {
    root_pointer_of(family)
}

/// Best-effort root pointer of an id.
///
/// Ids longer than [`ESTIMATE_THRESHOLD`] bytes are cut at the first `.` that
/// follows the first 21 bytes, i.e. at index 21 or later (or returned whole),
/// which assumes the top-level part of the id ends there. Shorter inputs are read as a field index
/// qualifier and reduced exactly. The result is not guaranteed to agree with
/// [`root_pointer_of`].
pub fn estimate_root_pointer(id: &[u8]) -> Result<&[u8], CodecError> {
    if id.len() > ESTIMATE_THRESHOLD {
        let cut = id[ESTIMATE_THRESHOLD..]
            .iter()
            .position(|b| *b == CHILD_SEPARATOR)
            .map(|offset| ESTIMATE_THRESHOLD + offset);
        return Ok(match cut {
            Some(idx) => &id[..idx],
            None => id,
        });
    }
    Ok(root_pointer_of(decode_field_index_pointer(id)?))
}

/// Split `field 0x00 value` at its first NUL.
pub fn split_field_and_value(field_value: &[u8]) -> Result<(&[u8], &[u8]), CodecError> {
    let split = find_first_nul(field_value)
        .ok_or_else(|| CodecError::missing("field/value pair", NUL, 1, field_value))?;
    Ok((&field_value[..split], &field_value[split + 1..]))
}

/// Synthetic key carrying a rolled-up result, laid out like an event posting.
pub fn build_child_key(
    partition: &Bytes,
    pointer: &[u8],
    qualifier: impl Into<Bytes>,
    visibility: &Bytes,
    timestamp: i64,
) -> RecordKey {
    RecordKey::from_parts(
        partition.clone(),
        Bytes::copy_from_slice(pointer),
        qualifier,
        visibility.clone(),
        timestamp,
    )
}

/// Key sorting after every descendant of the document addressed by `doc_key`.
///
/// The family becomes `datatype 0x00 rootUid . MAX_SENTINEL`. Keys whose family
/// carries no NUL do not address a document and are returned unchanged.
pub fn next_sibling_start_key(doc_key: &RecordKey) -> RecordKey {
    let family = doc_key.family();
    match find_first_nul(family) {
        Some(split) => {
            let datatype = &family[..split];
            let root = root_pointer_of(&family[split + 1..]);
            let family = join(&[
                datatype,
                &[NUL],
                root,
                &[CHILD_SEPARATOR],
                MAX_SENTINEL_BYTES,
            ]);
            RecordKey::new(doc_key.partition_bytes().clone(), family)
        }
        None => doc_key.clone(),
    }
}

/// Field index posting for `uid`.
pub fn field_index_key(
    partition: impl AsRef<[u8]>,
    field: impl AsRef<[u8]>,
    value: impl AsRef<[u8]>,
    datatype: impl AsRef<[u8]>,
    uid: impl AsRef<[u8]>,
) -> RecordKey {
    let family = join(&[FI_FAMILY_PREFIX, field.as_ref()]);
    let qualifier = join(&[
        value.as_ref(),
        &[NUL],
        datatype.as_ref(),
        &[NUL],
        uid.as_ref(),
    ]);
    RecordKey::from_parts(
        Bytes::copy_from_slice(partition.as_ref()),
        family,
        qualifier,
        Bytes::new(),
        0,
    )
}

/// Term frequency posting for `uid`.
pub fn term_frequency_key(
    partition: impl AsRef<[u8]>,
    datatype: impl AsRef<[u8]>,
    uid: impl AsRef<[u8]>,
    value: impl AsRef<[u8]>,
    field: impl AsRef<[u8]>,
) -> RecordKey {
    let qualifier = join(&[
        datatype.as_ref(),
        &[NUL],
        uid.as_ref(),
        &[NUL],
        value.as_ref(),
        &[NUL],
        field.as_ref(),
    ]);
    RecordKey::from_parts(
        Bytes::copy_from_slice(partition.as_ref()),
        Bytes::from_static(TF_FAMILY),
        qualifier,
        Bytes::new(),
        0,
    )
}

/// Event posting for `uid`.
pub fn event_key(
    partition: impl AsRef<[u8]>,
    datatype: impl AsRef<[u8]>,
    uid: impl AsRef<[u8]>,
    field: impl AsRef<[u8]>,
    value: impl AsRef<[u8]>,
) -> RecordKey {
    let family = join(&[datatype.as_ref(), &[NUL], uid.as_ref()]);
    let qualifier = join(&[field.as_ref(), &[NUL], value.as_ref()]);
    RecordKey::from_parts(
        Bytes::copy_from_slice(partition.as_ref()),
        family,
        qualifier,
        Bytes::new(),
        0,
    )
}

pub(crate) fn join(parts: &[&[u8]]) -> Bytes {
    let len = parts.iter().map(|part| part.len()).sum();
    let mut buf = BytesMut::with_capacity(len);
    for part in parts {
        buf.extend_from_slice(part);
    }
    buf.freeze()
}
