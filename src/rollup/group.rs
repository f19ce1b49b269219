//! The merge loop shared by both rollups.

use std::ops::Bound;

use bytes::Bytes;

use super::{Attribute, AttributeFactory, Document, RollupError, RollupOptions};
use crate::{
    key::{build_child_key, CodecError, PostingShape, RecordKey},
    observability::{log_debug, log_trace},
    scan::KeyRange,
    source::{SortedSource, SourceError},
};

/// What distinguishes one posting shape's rollup from another.
pub(crate) trait GroupRules {
    /// Shape of every posting in a group.
    const SHAPE: PostingShape;
    /// Component name used in log events.
    const COMPONENT: &'static str;

    fn options(&self) -> &RollupOptions;

    /// Root pointer every posting of a group shares.
    fn pointer<'k>(&self, key: &'k RecordKey) -> Result<&'k [u8], CodecError>;

    /// Full id of the sub-record a posting belongs to.
    fn sub_id<'k>(&self, key: &'k RecordKey) -> Result<&'k [u8], CodecError>;

    /// `field 0x00 value` carried into the result key.
    fn field_and_value(&self, key: &RecordKey) -> Result<Bytes, CodecError>;

    /// Attribute for the document, or `None` if the posting is only walked.
    fn attribute(
        &self,
        key: &RecordKey,
        factory: &dyn AttributeFactory,
    ) -> Result<Option<Attribute>, CodecError>;

    /// Key to seek to once a group has been advanced through too often.
    fn seek_boundary(
        &self,
        _key: &RecordKey,
        _pointer: &[u8],
    ) -> Result<Option<RecordKey>, CodecError> {
        Ok(None)
    }
}

/// Merge the contiguous group under the cursor into one result key.
///
/// On return the source rests on the first posting past the group, or is
/// exhausted.
pub(crate) fn merge_group<R, S>(
    rules: &R,
    source: &mut S,
    mut document: Option<&mut Document>,
    factory: &dyn AttributeFactory,
) -> Result<RecordKey, RollupError>
where
    R: GroupRules,
    S: SortedSource + ?Sized,
{
    let first = source
        .current_key()
        .ok_or(RollupError::NotPositioned)?
        .clone();
    if PostingShape::of(&first) != Some(R::SHAPE) {
        return Err(RollupError::UnexpectedShape {
            expected: R::SHAPE,
            key: first,
        });
    }
    let pointer = Bytes::copy_from_slice(rules.pointer(&first)?);
    let seek_ahead = rules.options().seek_ahead_enabled();
    let max_next_count = rules.options().seek_ahead_cap();

    let mut last_key = first.clone();
    let mut last_sub_id: Option<Bytes> = None;
    let mut next_count: i64 = 0;
    let mut sought = false;
    let mut postings = 0usize;

    while let Some(current) = source.current_key() {
        let current = current.clone();
        if let Some(document) = document.as_deref_mut() {
            if let Some(attribute) = rules.attribute(&current, factory)? {
                document.put(attribute);
            }
            let sub_id = rules.sub_id(&current)?;
            if last_sub_id.as_deref() != Some(sub_id) {
                document.record_provenance(sub_id, &current);
                last_sub_id = Some(Bytes::copy_from_slice(sub_id));
            }
        }
        postings += 1;
        last_key = current;

        source.advance()?;
        next_count += 1;
        if !in_group(rules, &*source, first.partition(), &pointer)? {
            break;
        }
        if seek_ahead && !sought && next_count > max_next_count {
            let boundary = match source.current_key() {
                Some(key) => rules.seek_boundary(key, &pointer)?,
                None => None,
            };
            if let Some(boundary) = boundary {
                sought = seek_from(source, boundary)?;
                if sought {
                    log_debug!(
                        component = R::COMPONENT,
                        event = "rollup_seek_ahead",
                        next_count,
                        max_next_count
                    );
                }
                if !in_group(rules, &*source, first.partition(), &pointer)? {
                    break;
                }
            }
        }
    }

    log_trace!(
        component = R::COMPONENT,
        event = "rollup_group_complete",
        postings,
        attributes = document.as_deref().map_or(0, Document::len)
    );

    Ok(build_child_key(
        first.partition_bytes(),
        &pointer,
        rules.field_and_value(&last_key)?,
        last_key.visibility_bytes(),
        last_key.timestamp(),
    ))
}

fn in_group<R, S>(
    rules: &R,
    source: &S,
    partition: &[u8],
    pointer: &[u8],
) -> Result<bool, CodecError>
where
    R: GroupRules,
    S: SortedSource + ?Sized,
{
    let Some(key) = source.current_key() else {
        return Ok(false);
    };
    if key.partition() != partition || PostingShape::of(key) != Some(R::SHAPE) {
        return Ok(false);
    }
    Ok(rules.pointer(key)? == pointer)
}

// Reissue the last seek from `boundary`, keeping its end and family filter.
fn seek_from<S>(source: &mut S, boundary: RecordKey) -> Result<bool, SourceError>
where
    S: SortedSource + ?Sized,
{
    let Some(params) = source.last_seek() else {
        return Ok(false);
    };
    let range = KeyRange::new(Bound::Included(boundary), params.range.end.clone());
    let families = params.families.clone();
    let inclusive = params.inclusive;
    source.seek(range, &families, inclusive)?;
    Ok(true)
}
