//! Error taxonomy for the EXIF codec.
//!
//! Decode errors ([`ExifError::InvalidFormat`], [`ExifError::UnexpectedEndOfData`])
//! abort the whole decode. The value errors are local to a single tag call and
//! leave parser and writer state untouched.

use std::io;

use crate::exif::DataType;

/// Errors produced by the codec core.
#[derive(Debug, thiserror::Error)]
pub enum ExifError {
    /// Malformed JPEG or TIFF structure.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The stream ended before an expected field.
    #[error("unexpected end of data")]
    UnexpectedEndOfData,

    /// A tag id that the registry does not know.
    #[error("unknown tag id 0x{0:04x}")]
    UnknownTag(u16),

    /// Accessor or setter used against a tag of another data type.
    #[error("tag 0x{tag:04x}: expected {expected} but got {found}")]
    TypeMismatch {
        tag: u16,
        expected: DataType,
        found: &'static str,
    },

    /// A value whose component count differs from the count the tag mandates.
    #[error("tag 0x{tag:04x}: required {required} components but was given {given}")]
    ComponentCountViolation { tag: u16, required: u32, given: u32 },

    /// A numeric value outside the range of the tag's data type.
    #[error("tag 0x{tag:04x}: value {value} is illegal for type {data_type}")]
    ValueOverflow {
        tag: u16,
        value: String,
        data_type: DataType,
    },

    /// The tag has no value, or fewer components than the index asked for.
    #[error("tag 0x{tag:04x}: no value at component {index}")]
    MissingValue { tag: u16, index: usize },

    /// Any other I/O failure from the underlying stream.
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for ExifError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ExifError::UnexpectedEndOfData
        } else {
            ExifError::Io(err)
        }
    }
}

impl ExifError {
    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        ExifError::InvalidFormat(reason.into())
    }
}

/// Result alias used throughout the codec core.
pub type Result<T> = std::result::Result<T, ExifError>;
