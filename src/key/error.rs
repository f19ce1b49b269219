use thiserror::Error;

/// Errors raised by structured key decoders.
///
/// The delimiter scans themselves report "not found" as `None`; a decoder turns
/// that into a [`CodecError`] because its caller claimed a posting shape the key
/// does not actually have.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A key part lacked a delimiter its posting shape guarantees.
    #[error("{part} is missing delimiter {delimiter:#04x}: needed {needed}, found {found}")]
    MissingDelimiter {
        /// Which key part was being decoded.
        part: &'static str,
        /// Delimiter byte that was searched for.
        delimiter: u8,
        /// Number of occurrences the layout requires.
        needed: usize,
        /// Number of occurrences actually present.
        found: usize,
    },
    /// The key does not belong to any known posting shape.
    #[error("key family {family:?} is not a field index, term frequency or event posting")]
    UnknownShape {
        /// Escaped family bytes of the offending key.
        family: String,
    },
}

impl CodecError {
    pub(crate) fn missing(part: &'static str, delimiter: u8, needed: usize, bytes: &[u8]) -> Self {
        CodecError::MissingDelimiter {
            part,
            delimiter,
            needed,
            found: bytes.iter().filter(|b| **b == delimiter).count(),
        }
    }
}
