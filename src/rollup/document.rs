//! Logical documents rebuilt from postings.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::key::RecordKey;

/// Reserved field naming the sub-record that last contributed to a document.
pub const PROVENANCE_FIELD: &str = "RECORD_ID";

/// One field value of a document, remembering the posting it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    field: String,
    value: Bytes,
    source_key: RecordKey,
    keep: bool,
    index_posting: bool,
}

impl Attribute {
    /// New attribute, kept by default.
    pub fn new(
        field: impl Into<String>,
        value: impl Into<Bytes>,
        source_key: RecordKey,
        index_posting: bool,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            source_key,
            keep: true,
            index_posting,
        }
    }

    /// Field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Posting that produced the value.
    pub fn source_key(&self) -> &RecordKey {
        &self.source_key
    }

    /// Whether the attribute survives into the returned document.
    pub fn keep(&self) -> bool {
        self.keep
    }

    /// Whether the value was read from an index posting rather than event data.
    pub fn is_index_posting(&self) -> bool {
        self.index_posting
    }

    /// Set the keep flag.
    pub fn set_keep(&mut self, keep: bool) {
        self.keep = keep;
    }
}

/// Builds attributes for decoded postings.
pub trait AttributeFactory {
    /// Attribute for `value` of `field`, read from `origin`.
    fn create(
        &self,
        field: &str,
        value: &[u8],
        origin: &RecordKey,
        is_index_posting: bool,
    ) -> Attribute;
}

/// Factory producing plain byte-valued attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAttributeFactory;

impl AttributeFactory for DefaultAttributeFactory {
    fn create(
        &self,
        field: &str,
        value: &[u8],
        origin: &RecordKey,
        is_index_posting: bool,
    ) -> Attribute {
        Attribute::new(
            field,
            Bytes::copy_from_slice(value),
            origin.clone(),
            is_index_posting,
        )
    }
}

/// Decides whether the attribute built from a posting is kept.
pub trait AttributeFilter: Send + Sync {
    /// `true` keeps attributes built from `key`.
    fn keep(&self, key: &RecordKey) -> bool;
}

impl<F> AttributeFilter for F
where
    F: Fn(&RecordKey) -> bool + Send + Sync,
{
    fn keep(&self, key: &RecordKey) -> bool {
        self(key)
    }
}

/// Mapping of field name to the set of its distinct values.
///
/// Attributes are deduplicated per `(field, value)`; a duplicate only widens
/// the keep flag of the attribute already present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    fields: BTreeMap<String, BTreeMap<Bytes, Attribute>>,
}

impl Document {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `attribute`; returns `true` if its `(field, value)` was not present yet.
    pub fn put(&mut self, attribute: Attribute) -> bool {
        let values = self.fields.entry(attribute.field.clone()).or_default();
        match values.get_mut(&attribute.value) {
            Some(existing) => {
                existing.keep |= attribute.keep;
                false
            }
            None => {
                values.insert(attribute.value.clone(), attribute);
                true
            }
        }
    }

    /// Point the provenance field at `key`, the posting of sub-record `id`.
    pub fn record_provenance(&mut self, id: &[u8], key: &RecordKey) {
        let attribute = Attribute::new(
            PROVENANCE_FIELD,
            Bytes::copy_from_slice(id),
            key.clone(),
            false,
        );
        let values = self.fields.entry(PROVENANCE_FIELD.to_string()).or_default();
        values.clear();
        values.insert(attribute.value.clone(), attribute);
    }

    /// Posting recorded by the last [`Document::record_provenance`].
    pub fn provenance(&self) -> Option<&RecordKey> {
        self.get(PROVENANCE_FIELD).next().map(Attribute::source_key)
    }

    /// Attributes of `field` in value order.
    pub fn get(&self, field: &str) -> impl Iterator<Item = &Attribute> {
        self.fields.get(field).into_iter().flat_map(|values| values.values())
    }

    /// Whether `field` holds `value`.
    pub fn contains(&self, field: &str, value: &[u8]) -> bool {
        self.fields
            .get(field)
            .is_some_and(|values| values.contains_key(value))
    }

    /// Field names, provenance included.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of attributes, provenance included.
    pub fn len(&self) -> usize {
        self.fields.values().map(BTreeMap::len).sum()
    }

    /// Whether the document holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every attribute whose keep flag is unset. Provenance is never dropped.
    pub fn retain_kept(&mut self) {
        for (field, values) in self.fields.iter_mut() {
            if field != PROVENANCE_FIELD {
                values.retain(|_, attribute| attribute.keep);
            }
        }
        self.fields.retain(|_, values| !values.is_empty());
    }
}
