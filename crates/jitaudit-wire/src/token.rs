//! Token tags and capacities
//!
//! The log uses four msgpack token forms. Every multi-byte integer is
//! big-endian regardless of host byte order.

use bytes::Bytes;

/// Base tag of a fixmap; the low nibble holds the pair count
pub const FIXMAP_TAG: u8 = 0x80;

/// Mask selecting the fixmap tag bits
pub const FIXMAP_MASK: u8 = 0xf0;

/// Tag of a string with a 16-bit length
pub const STR16_TAG: u8 = 0xda;

/// Tag of a 64-bit unsigned integer
pub const UINT64_TAG: u8 = 0xcf;

/// Tag of a blob with a 32-bit length
pub const BIN32_TAG: u8 = 0xc6;

/// Largest number of key/value pairs a fixmap header can announce
pub const MAX_MAP_LEN: usize = 15;

/// Largest string a str16 token can carry
pub const MAX_STR_LEN: usize = u16::MAX as usize;

/// Largest blob a bin32 token can carry
pub const MAX_BIN_LEN: usize = u32::MAX as usize;

/// Encoded size of a uint64 token
pub const UINT64_TOKEN_LEN: usize = 9;

/// Encoded size of a bin32 header (tag plus length)
pub const BIN32_HEADER_LEN: usize = 5;

/// Encoded size of a str16 header (tag plus length)
pub const STR16_HEADER_LEN: usize = 3;

/// A single decoded token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Fixmap header announcing this many key/value pairs
    Map(u8),
    /// str16 content, verbatim
    Str(Bytes),
    /// uint64 value
    UInt(u64),
    /// bin32 content, verbatim
    Bin(Bytes),
}

impl Token {
    /// Short name of the token kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Map(_) => "map",
            Token::Str(_) => "str16",
            Token::UInt(_) => "uint64",
            Token::Bin(_) => "bin32",
        }
    }

    /// Number of bytes this token occupies on the wire
    pub fn encoded_len(&self) -> usize {
        match self {
            Token::Map(_) => 1,
            Token::Str(s) => STR16_HEADER_LEN + s.len(),
            Token::UInt(_) => UINT64_TOKEN_LEN,
            Token::Bin(b) => BIN32_HEADER_LEN + b.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixmap_tag_range() {
        assert_eq!(FIXMAP_TAG | MAX_MAP_LEN as u8, 0x8f);
        assert_eq!((FIXMAP_TAG | 4) & FIXMAP_MASK, FIXMAP_TAG);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(Token::Map(4).encoded_len(), 1);
        assert_eq!(Token::Str(Bytes::from_static(b"type")).encoded_len(), 7);
        assert_eq!(Token::UInt(0).encoded_len(), 9);
        assert_eq!(Token::Bin(Bytes::from_static(&[1, 2, 3])).encoded_len(), 8);
    }
}
