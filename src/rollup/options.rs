use std::{collections::HashSet, fmt, sync::Arc};

use super::AttributeFilter;
use crate::key::RecordKey;

/// Immutable configuration shared by every rollup of one scan and its forks.
#[derive(Clone)]
pub struct RollupOptions {
    pub(crate) allow_fields: Option<HashSet<String>>,
    pub(crate) filter: Option<Arc<dyn AttributeFilter>>,
    pub(crate) max_next_count: i64,
    pub(crate) target_fields: HashSet<String>,
}

impl Default for RollupOptions {
    fn default() -> Self {
        RollupOptions {
            allow_fields: None,
            filter: None,
            max_next_count: -1,
            target_fields: HashSet::new(),
        }
    }
}

impl RollupOptions {
    /// Only attributes of these fields are kept by the field index rollup.
    pub fn allow_fields<I, F>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        RollupOptions {
            allow_fields: Some(fields.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    /// Per-posting keep decision applied on top of the allow-list.
    pub fn filter(self, filter: impl AttributeFilter + 'static) -> Self {
        RollupOptions {
            filter: Some(Arc::new(filter)),
            ..self
        }
    }

    /// Advances allowed inside one group before the rollup seeks past it.
    ///
    /// Negative values disable seeking.
    pub fn max_next_count(self, max_next_count: i64) -> Self {
        RollupOptions {
            max_next_count,
            ..self
        }
    }

    /// Fields the term frequency rollup adds to documents.
    pub fn target_fields<I, F>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        RollupOptions {
            target_fields: fields.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

impl RollupOptions {
    /// Configured seek-ahead cap.
    pub fn seek_ahead_cap(&self) -> i64 {
        self.max_next_count
    }

    pub(crate) fn seek_ahead_enabled(&self) -> bool {
        self.max_next_count >= 0
    }

    pub(crate) fn allows(&self, field: &str) -> bool {
        self.allow_fields
            .as_ref()
            .map_or(true, |fields| fields.contains(field))
    }

    pub(crate) fn keeps(&self, key: &RecordKey) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter.keep(key))
    }

    pub(crate) fn targets(&self, field: &str) -> bool {
        self.target_fields.contains(field)
    }
}

impl fmt::Debug for RollupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollupOptions")
            .field("allow_fields", &self.allow_fields)
            .field("filter", &self.filter.is_some())
            .field("max_next_count", &self.max_next_count)
            .field("target_fields", &self.target_fields)
            .finish()
    }
}
