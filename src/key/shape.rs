//! Posting shape classification and shape-dispatched key helpers.

use super::{
    codec::{
        decode_field_from_tf, decode_field_index_pointer, find_first_nul, root_pointer_of,
        term_frequency_id, CHILD_SEPARATOR, FI_FAMILY_PREFIX, NUL, TF_FAMILY,
    },
    CodecError, RecordKey,
};

/// The physical layout a posting key follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PostingShape {
    /// `fi 0x00 field` / `value 0x00 datatype 0x00 uid`.
    FieldIndex,
    /// `tf` / `datatype 0x00 uid 0x00 value 0x00 field`.
    TermFrequency,
    /// `datatype 0x00 uid` / `field 0x00 value`.
    Event,
}

impl PostingShape {
    /// Classify `key` by its family.
    pub fn of(key: &RecordKey) -> Option<Self> {
        Self::of_family(key.family())
    }

    /// Classify a raw family.
    pub fn of_family(family: &[u8]) -> Option<Self> {
        if family.starts_with(FI_FAMILY_PREFIX) {
            Some(PostingShape::FieldIndex)
        } else if family == TF_FAMILY {
            Some(PostingShape::TermFrequency)
        } else if find_first_nul(family).is_some() {
            Some(PostingShape::Event)
        } else {
            None
        }
    }
}

fn classify(key: &RecordKey) -> Result<PostingShape, CodecError> {
    PostingShape::of(key).ok_or_else(|| CodecError::UnknownShape {
        family: key.family().escape_ascii().to_string(),
    })
}

/// Full `datatype 0x00 uid` of the (sub-)record a posting belongs to.
pub fn document_id(key: &RecordKey) -> Result<&[u8], CodecError> {
    match classify(key)? {
        PostingShape::FieldIndex => decode_field_index_pointer(key.qualifier()),
        PostingShape::TermFrequency => term_frequency_id(key.qualifier()),
        PostingShape::Event => Ok(key.family()),
    }
}

/// Whether the posting belongs to a top-level record rather than a child.
pub fn is_root_pointer(key: &RecordKey) -> Result<bool, CodecError> {
    let id = document_id(key)?;
    Ok(root_pointer_of(id).len() == id.len())
}

/// Field name carried by a posting of any shape.
///
/// Event qualifiers may use grouping notation (`FIELD.group`); the grouping
/// suffix is not part of the field name.
pub fn current_field(key: &RecordKey) -> Result<&[u8], CodecError> {
    match classify(key)? {
        PostingShape::FieldIndex => {
            let family = key.family();
            Ok(&family[FI_FAMILY_PREFIX.len()..])
        }
        PostingShape::TermFrequency => decode_field_from_tf(key.qualifier()),
        PostingShape::Event => {
            let qualifier = key.qualifier();
            let stop = qualifier
                .iter()
                .position(|b| *b == NUL || *b == CHILD_SEPARATOR)
                .ok_or_else(|| CodecError::missing("event qualifier", NUL, 1, qualifier))?;
            Ok(&qualifier[..stop])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{event_key, field_index_key, term_frequency_key};

    #[test]
    fn classifies_each_shape() {
        let fi = field_index_key("p", "NAME", "bob", "dt", "a.b.c");
        let tf = term_frequency_key("p", "dt", "a.b.c", "bob", "NAME");
        let event = event_key("p", "dt", "a.b.c", "NAME", "bob");
        assert_eq!(PostingShape::of(&fi), Some(PostingShape::FieldIndex));
        assert_eq!(PostingShape::of(&tf), Some(PostingShape::TermFrequency));
        assert_eq!(PostingShape::of(&event), Some(PostingShape::Event));
        assert_eq!(PostingShape::of(&RecordKey::new("p", "d")), None);
        assert_eq!(PostingShape::of_family(b"tfx"), None);
    }

    #[test]
    fn root_detection_per_shape() {
        assert!(is_root_pointer(&field_index_key("p", "F", "v", "dt", "a.b.c")).unwrap());
        assert!(!is_root_pointer(&field_index_key("p", "F", "v", "dt", "a.b.c.1")).unwrap());
        assert!(is_root_pointer(&term_frequency_key("p", "dt", "a.b.c", "v", "F")).unwrap());
        assert!(!is_root_pointer(&term_frequency_key("p", "dt", "a.b.c.2", "v", "F")).unwrap());
        assert!(is_root_pointer(&event_key("p", "dt", "a.b.c", "F", "v")).unwrap());
        assert!(!is_root_pointer(&event_key("p", "dt", "a.b.c.1.1", "F", "v")).unwrap());
    }

    #[test]
    fn field_name_per_shape() {
        let fi = field_index_key("p", "NAME", "bob", "dt", "a.b.c");
        let tf = term_frequency_key("p", "dt", "a.b.c", "bob", "BODY");
        let grouped = event_key("p", "dt", "a.b.c", "NAME.0", "bob");
        assert_eq!(current_field(&fi).unwrap(), b"NAME");
        assert_eq!(current_field(&tf).unwrap(), b"BODY");
        assert_eq!(current_field(&grouped).unwrap(), b"NAME");
    }

    #[test]
    fn unknown_shape_is_an_error() {
        let key = RecordKey::new("p", "plain").with_qualifier("q");
        assert!(matches!(
            document_id(&key),
            Err(CodecError::UnknownShape { .. })
        ));
    }
}
