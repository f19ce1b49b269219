use std::sync::Arc;

use bytes::Bytes;

use super::{
    group::{merge_group, GroupRules},
    Attribute, AttributeFactory, DefaultAttributeFactory, Document, RollupError, RollupOptions,
};
use crate::{
    key::{
        decode_field_and_value_from_fi, decode_field_index_pointer, find_second_last_nul, join,
        root_pointer_of, split_field_and_value, CodecError, PostingShape, RecordKey,
        CHILD_SEPARATOR, MAX_SENTINEL_BYTES, NUL,
    },
    source::SortedSource,
};

/// Rolls field index postings of one top-level document into one key.
///
/// A group is the contiguous run of `fi` postings whose uids reduce to the same
/// root pointer. Children of the document contribute their values to the
/// group; the reserved provenance field remembers which child came last.
#[derive(Clone, Debug, Default)]
pub struct FieldIndexRollup {
    options: Arc<RollupOptions>,
}

impl FieldIndexRollup {
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
    ///
    /// With a `document`, every posting adds an attribute for its
    /// `(field, value)`, marked kept when the field passes the allow-list and
    /// the key passes the filter. Returns a key of the form
    /// `(partition, datatype 0x00 rootUid, field 0x00 value)` built from the
    /// last posting of the group; the source is left on the first posting
    /// past it.
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

impl GroupRules for FieldIndexRollup {
    const SHAPE: PostingShape = PostingShape::FieldIndex;
    const COMPONENT: &'static str = "field_index_rollup";

    fn options(&self) -> &RollupOptions {
        &self.options
    }

    fn pointer<'k>(&self, key: &'k RecordKey) -> Result<&'k [u8], CodecError> {
        decode_field_index_pointer(key.qualifier()).map(root_pointer_of)
    }

    fn sub_id<'k>(&self, key: &'k RecordKey) -> Result<&'k [u8], CodecError> {
        decode_field_index_pointer(key.qualifier())
    }

    fn field_and_value(&self, key: &RecordKey) -> Result<Bytes, CodecError> {
        decode_field_and_value_from_fi(key.family(), key.qualifier())
    }

    fn attribute(
        &self,
        key: &RecordKey,
        factory: &dyn AttributeFactory,
    ) -> Result<Option<Attribute>, CodecError> {
        let field_value = decode_field_and_value_from_fi(key.family(), key.qualifier())?;
        let (field, value) = split_field_and_value(&field_value)?;
        let field = String::from_utf8_lossy(field);
        let mut attribute = factory.create(&field, value, key, true);
        attribute.set_keep(self.options.allows(&field) && self.options.keeps(key));
        Ok(Some(attribute))
    }

    // value 0x00 pointer . MAX_SENTINEL sorts after every child of the root for
    // this value but before sibling roots that extend the root's text.
    fn seek_boundary(
        &self,
        key: &RecordKey,
        pointer: &[u8],
    ) -> Result<Option<RecordKey>, CodecError> {
        let qualifier = key.qualifier();
        let value_end = find_second_last_nul(qualifier)
            .ok_or_else(|| CodecError::missing("field index qualifier", NUL, 2, qualifier))?;
        let boundary = join(&[
            &qualifier[..value_end],
            &[NUL],
            pointer,
            &[CHILD_SEPARATOR],
            MAX_SENTINEL_BYTES,
        ]);
        Ok(Some(RecordKey::new(
            key.partition_bytes().clone(),
            Bytes::copy_from_slice(key.family()),
        )
        .with_qualifier(boundary)))
    }
}
