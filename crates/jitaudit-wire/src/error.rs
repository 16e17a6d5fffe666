//! Error types for jitaudit-wire
//!
//! Encoding errors are contract violations by the caller (a value that does
//! not fit its token). Decoding errors describe a malformed or truncated log.

use thiserror::Error;

/// Errors that can occur while encoding or decoding audit log tokens
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// A fixmap header was requested for more pairs than the single-byte form holds
    #[error("Map with {0} entries exceeds fixmap capacity of 15")]
    MapTooLarge(usize),

    /// A string does not fit the 16-bit length field
    #[error("String of {0} bytes exceeds str16 capacity of 65535")]
    StringTooLong(usize),

    /// A blob does not fit the 32-bit length field
    #[error("Blob of {0} bytes exceeds bin32 capacity")]
    BlobTooLarge(usize),

    /// An event carries more attributes than fit beside `type` and `event`
    #[error("Event with {0} attributes exceeds the limit of 13")]
    TooManyAttributes(usize),

    /// Input ended in the middle of a token
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A tag byte outside the supported token set
    #[error("Unknown token tag: {0:#04x}")]
    UnknownTag(u8),

    /// A valid token of the wrong kind for its position
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    /// A map key out of its fixed position
    #[error("Expected key {expected:?}, found {found:?}")]
    UnexpectedKey { expected: &'static str, found: String },

    /// String content that is not valid UTF-8
    #[error("Invalid UTF-8 in string token")]
    InvalidUtf8,

    /// A record whose `type` value is neither `memory` nor `event`
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    /// A record whose shape is inconsistent with its type
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl WireError {
    /// Create a new MalformedRecord error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Whether this error describes a caller contract violation during encoding
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            WireError::MapTooLarge(_)
                | WireError::StringTooLong(_)
                | WireError::BlobTooLarge(_)
                | WireError::TooManyAttributes(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_errors() {
        assert!(WireError::MapTooLarge(16).is_capacity());
        assert!(WireError::StringTooLong(70_000).is_capacity());
        assert!(WireError::TooManyAttributes(14).is_capacity());
        assert!(!WireError::InvalidUtf8.is_capacity());
    }

    #[test]
    fn test_error_messages() {
        let err = WireError::UnexpectedEof {
            needed: 8,
            remaining: 3,
        };
        assert!(err.to_string().contains("needed 8"));

        let err = WireError::UnknownTag(0xc0);
        assert_eq!(err.to_string(), "Unknown token tag: 0xc0");

        let err = WireError::malformed("memory record with 3 fields");
        assert!(matches!(err, WireError::MalformedRecord(_)));
    }
}
