//! Document-aware rewriting of scan ranges.
//!
//! A range handed to a rollup scan must not cut a document's child set in
//! half. The end of a range is widened to cover every child of the end
//! document, and an exclusive start is moved past every child of the start
//! document, so a re-seek after fully consuming one document never re-enters
//! it.

use std::ops::Bound;

use crate::{
    key::{join, RecordKey, MAX_SENTINEL_BYTES, NUL},
    observability::log_debug,
    scan::KeyRange,
};

/// Rewrite `range` so neither bound falls inside a document's children.
///
/// - An inclusive end, or an end whose family ends in NUL, becomes the
///   exclusive key `(endRow, endFamily + MAX_SENTINEL)` with trailing NULs
///   stripped from the family first.
/// - A non-empty exclusive start becomes `(startRow, startFamily +
///   MAX_SENTINEL)`, exclusive, when that key is still inside the range.
///   Otherwise the range collapses to `(end, end)` with both bounds
///   exclusive, which holds no key.
///
/// Starts already ending in `MAX_SENTINEL` are left alone, so adjusting an
/// adjusted range is a no-op.
pub fn adjust(range: &KeyRange<RecordKey>) -> KeyRange<RecordKey> {
    let mut adjusted = KeyRange::new(range.start.clone(), adjust_end(&range.end));

    let Bound::Excluded(start) = &range.start else {
        return adjusted;
    };
    if start.is_empty() || start.family().ends_with(MAX_SENTINEL_BYTES) {
        return adjusted;
    }

    let past_start = past_family(start, start.family());
    if adjusted.contains(&past_start) {
        adjusted.start = Bound::Excluded(past_start);
        return adjusted;
    }

    // Nothing sorts past an unbounded end, so only a bounded range collapses.
    let Some(end) = adjusted.end_key().cloned() else {
        return adjusted;
    };
    log_debug!(
        component = "range",
        event = "range_collapsed",
        start = ?start,
        end = ?end
    );
    KeyRange::new(Bound::Excluded(end.clone()), Bound::Excluded(end))
}

fn adjust_end(end: &Bound<RecordKey>) -> Bound<RecordKey> {
    match end {
        Bound::Included(key) => Bound::Excluded(past_family(key, trim_nuls(key.family()))),
        Bound::Excluded(key) if key.family().last() == Some(&NUL) => {
            Bound::Excluded(past_family(key, trim_nuls(key.family())))
        }
        other => other.clone(),
    }
}

fn trim_nuls(family: &[u8]) -> &[u8] {
    let keep = family
        .iter()
        .rposition(|b| *b != NUL)
        .map_or(0, |idx| idx + 1);
    &family[..keep]
}

fn past_family(key: &RecordKey, family: &[u8]) -> RecordKey {
    RecordKey::new(
        key.partition_bytes().clone(),
        join(&[family, MAX_SENTINEL_BYTES]),
    )
}
