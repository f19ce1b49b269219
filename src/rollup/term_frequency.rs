use std::sync::Arc;

use bytes::Bytes;

use super::{
    group::{merge_group, GroupRules},
    Attribute, AttributeFactory, DefaultAttributeFactory, Document, RollupError, RollupOptions,
};
use crate::{
    key::{
        decode_field_and_value_from_tf, decode_field_from_tf, split_field_and_value,
        term_frequency_id, term_frequency_pointer, CodecError, PostingShape, RecordKey,
    },
    source::SortedSource,
};

/// Rolls term frequency postings of one top-level document into one key.
///
/// Walks every `tf` posting of the document to find the group boundary but
/// only turns postings of the configured target fields into attributes.
#[derive(Clone, Debug, Default)]
pub struct TermFrequencyRollup {
    options: Arc<RollupOptions>,
}

impl TermFrequencyRollup {
    /// Rollup owning `options`.
    pub fn new(options: RollupOptions) -> Self {
        Self::with_shared(Arc::new(options))
    }

    /// Rollup sharing `options` with other rollups and forks.
    pub fn with_shared(options: Arc<RollupOptions>) -> Self {
        Self { options }
    }

    /// Shared configuration.
    pub fn shared_options(&self) -> &Arc<RollupOptions> {
        &self.options
    }

    /// Merge the group under the cursor.
    pub fn apply<S>(
        &self,
        source: &mut S,
        document: Option<&mut Document>,
        factory: Option<&dyn AttributeFactory>,
    ) -> Result<RecordKey, RollupError>
    where
        S: SortedSource + ?Sized,
    {
        let factory = factory.unwrap_or(&DefaultAttributeFactory);
        merge_group(self, source, document, factory)
    }

    /// Find the group boundary without decoding attributes.
    pub fn apply_key_only<S>(&self, source: &mut S) -> Result<RecordKey, RollupError>
    where
        S: SortedSource + ?Sized,
    {
        merge_group(self, source, None, &DefaultAttributeFactory)
    }
}

impl GroupRules for TermFrequencyRollup {
    const SHAPE: PostingShape = PostingShape::TermFrequency;
    const COMPONENT: &'static str = "term_frequency_rollup";

    fn options(&self) -> &RollupOptions {
        &self.options
    }

    fn pointer<'k>(&self, key: &'k RecordKey) -> Result<&'k [u8], CodecError> {
        term_frequency_pointer(key.qualifier())
    }

    fn sub_id<'k>(&self, key: &'k RecordKey) -> Result<&'k [u8], CodecError> {
        term_frequency_id(key.qualifier())
    }

    fn field_and_value(&self, key: &RecordKey) -> Result<Bytes, CodecError> {
        decode_field_and_value_from_tf(key.qualifier())
    }

    fn attribute(
        &self,
        key: &RecordKey,
        factory: &dyn AttributeFactory,
    ) -> Result<Option<Attribute>, CodecError> {
        let field = String::from_utf8_lossy(decode_field_from_tf(key.qualifier())?);
        if !self.options.targets(&field) {
            return Ok(None);
        }
        let field_value = decode_field_and_value_from_tf(key.qualifier())?;
        let (_, value) = split_field_and_value(&field_value)?;
        let mut attribute = factory.create(&field, value, key, false);
        attribute.set_keep(self.options.keeps(key));
        Ok(Some(attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        key::{event_key, term_frequency_key},
        scan::KeyRange,
        source::MemorySource,
    };

    fn seeked(keys: Vec<RecordKey>) -> MemorySource {
        let mut source = MemorySource::from_keys(keys);
        source.seek(KeyRange::all(), &[], false).unwrap();
        source
    }

    #[test]
    fn only_target_fields_reach_the_document() {
        let mut source = seeked(vec![
            term_frequency_key("p", "dt", "a.b.c", "fox", "BODY"),
            term_frequency_key("p", "dt", "a.b.c", "red", "TITLE"),
            term_frequency_key("p", "dt", "a.b.c.1", "dog", "BODY"),
            term_frequency_key("p", "dt", "a.b.e", "cat", "BODY"),
        ]);
        let rollup = TermFrequencyRollup::new(RollupOptions::default().target_fields(["BODY"]));
        let mut doc = Document::new();
        let key = rollup.apply(&mut source, Some(&mut doc), None).unwrap();

        assert_eq!(key.family(), b"dt\0a.b.c");
        assert_eq!(key.qualifier(), b"BODY\0dog");
        assert_eq!(doc.get("BODY").count(), 2);
        assert!(doc.contains("BODY", b"fox"));
        assert!(doc.contains("BODY", b"dog"));
        assert_eq!(doc.get("TITLE").count(), 0);
        assert!(!doc.get("BODY").next().unwrap().is_index_posting());
        assert_eq!(
            source.current_key(),
            Some(&term_frequency_key("p", "dt", "a.b.e", "cat", "BODY"))
        );
    }

    #[test]
    fn pointer_ends_at_second_nul_for_roots() {
        let mut source = seeked(vec![
            term_frequency_key("p", "dt", "a.b.c", "v.w.x.y", "F"),
            term_frequency_key("p", "dt", "a.b.c.2", "v", "F"),
            term_frequency_key("p", "dt", "a.b.cc", "v", "F"),
        ]);
        let rollup = TermFrequencyRollup::default();
        let key = rollup.apply_key_only(&mut source).unwrap();
        assert_eq!(key.family(), b"dt\0a.b.c");
        assert_eq!(key.qualifier(), b"F\0v");
        assert_eq!(
            source.current_key(),
            Some(&term_frequency_key("p", "dt", "a.b.cc", "v", "F"))
        );
    }

    #[test]
    fn stops_before_event_postings() {
        let mut source = seeked(vec![
            event_key("p", "dt", "a.b.c", "F", "v"),
            term_frequency_key("p", "dt", "a.b.c", "v", "F"),
        ]);
        // Event families sort before "tf"; position on the tf posting.
        source.advance().unwrap();
        let rollup = TermFrequencyRollup::default();
        rollup.apply_key_only(&mut source).unwrap();
        assert!(!source.has_current());
    }
}
