use std::{ops::Bound, sync::Arc};

use bytes::Bytes;
use crossbeam_skiplist::SkipMap;

use super::{SeekParams, SortedSource, SourceError};
use crate::{key::RecordKey, observability::log_warn, scan::KeyRange};

/// Sorted source over an in-memory skip list.
///
/// The skip list is shared through an [`Arc`] and never mutated by the cursor,
/// so forks on other threads see the same postings while each keeps its own
/// position and seek arguments.
#[derive(Debug)]
pub struct MemorySource {
    data: Arc<SkipMap<RecordKey, Bytes>>,
    params: Option<SeekParams>,
    current: Option<(RecordKey, Bytes)>,
    seeks: usize,
}

impl MemorySource {
    /// Cursor over a shared skip list. The cursor is unpositioned until seeked.
    pub fn new(data: Arc<SkipMap<RecordKey, Bytes>>) -> Self {
        Self {
            data,
            params: None,
            current: None,
            seeks: 0,
        }
    }

    /// Build the skip list from `entries`; later duplicates replace earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (RecordKey, Bytes)>,
    {
        let data = SkipMap::new();
        for (key, value) in entries {
            data.insert(key, value);
        }
        Self::new(Arc::new(data))
    }

    /// Build the skip list from keys carrying empty values.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = RecordKey>,
    {
        Self::from_entries(keys.into_iter().map(|key| (key, Bytes::new())))
    }

    /// Shared postings behind this cursor.
    pub fn data(&self) -> &Arc<SkipMap<RecordKey, Bytes>> {
        &self.data
    }

    /// Number of seeks issued on this cursor since it was created or forked.
    pub fn seek_count(&self) -> usize {
        self.seeks
    }

    fn settle(&mut self, from: Bound<&RecordKey>) {
        self.current = None;
        let Some(params) = &self.params else {
            return;
        };
        let mut entry = self.data.lower_bound(from);
        while let Some(candidate) = entry {
            if !params.range.before_end(candidate.key()) {
                return;
            }
            if params.admits_family(candidate.key().family()) {
                self.current = Some((candidate.key().clone(), candidate.value().clone()));
                return;
            }
            entry = candidate.next();
        }
    }
}

impl SortedSource for MemorySource {
    fn has_current(&self) -> bool {
        self.current.is_some()
    }

    fn current_key(&self) -> Option<&RecordKey> {
        self.current.as_ref().map(|(key, _)| key)
    }

    fn current_value(&self) -> Option<&Bytes> {
        self.current.as_ref().map(|(_, value)| value)
    }

    fn advance(&mut self) -> Result<(), SourceError> {
        if let Some((last, _)) = self.current.take() {
            self.settle(Bound::Excluded(&last));
        }
        Ok(())
    }

    fn seek(
        &mut self,
        range: KeyRange<RecordKey>,
        families: &[Bytes],
        inclusive: bool,
    ) -> Result<(), SourceError> {
        let start = range.start.clone();
        self.params = Some(SeekParams {
            range,
            families: families.to_vec(),
            inclusive,
        });
        self.seeks += 1;
        self.settle(start.as_ref());
        Ok(())
    }

    fn last_seek(&self) -> Option<&SeekParams> {
        self.params.as_ref()
    }

    fn fork(&self) -> Result<Self, SourceError> {
        if self.params.is_none() {
            log_warn!(
                component = "memory_source",
                event = "source_fork_rejected",
                entries = self.data.len()
            );
            return Err(SourceError::Unopened);
        }
        Ok(Self {
            data: Arc::clone(&self.data),
            params: self.params.clone(),
            current: self.current.clone(),
            seeks: 0,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.data.len())
    }
}
