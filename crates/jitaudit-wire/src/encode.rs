//! Token encoder
//!
//! Each function appends exactly one token to `buf`. Capacity is checked
//! before anything is written, so a rejected value leaves `buf` untouched.

use bytes::BufMut;

use crate::error::WireError;
use crate::token::{
    BIN32_HEADER_LEN, BIN32_TAG, FIXMAP_TAG, MAX_MAP_LEN, STR16_HEADER_LEN, STR16_TAG,
    UINT64_TAG,
};

/// Write a fixmap header announcing `field_count` key/value pairs
pub fn write_map_header<B: BufMut>(buf: &mut B, field_count: usize) -> Result<(), WireError> {
    if field_count > MAX_MAP_LEN {
        return Err(WireError::MapTooLarge(field_count));
    }
    buf.put_u8(FIXMAP_TAG | field_count as u8);
    Ok(())
}

/// Write a length-prefixed string; bytes are copied verbatim with no terminator
pub fn write_str16<B: BufMut>(buf: &mut B, s: &str) -> Result<(), WireError> {
    let len = u16::try_from(s.len()).map_err(|_| WireError::StringTooLong(s.len()))?;
    buf.put_u8(STR16_TAG);
    buf.put_u16(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}

/// Write a 64-bit unsigned integer as tag plus 8 big-endian bytes
pub fn write_u64<B: BufMut>(buf: &mut B, n: u64) {
    buf.put_u8(UINT64_TAG);
    buf.put_u64(n);
}

/// Write a blob as tag, 32-bit big-endian length, then the raw bytes
pub fn write_bin32<B: BufMut>(buf: &mut B, data: &[u8]) -> Result<(), WireError> {
    write_bin32_header(buf, data.len())?;
    buf.put_slice(data);
    Ok(())
}

/// Write only the tag and length of a blob of `len` bytes
///
/// The caller is responsible for emitting exactly `len` bytes of content
/// right after the header.
pub fn write_bin32_header<B: BufMut>(buf: &mut B, len: usize) -> Result<(), WireError> {
    let len = bin32_len(len)?;
    buf.put_u8(BIN32_TAG);
    buf.put_u32(len);
    Ok(())
}

/// Encoded size of a str16 token for `s`
pub fn str16_len(s: &str) -> usize {
    STR16_HEADER_LEN + s.len()
}

/// Encoded size of a bin32 token for `n` bytes of data
pub fn bin32_encoded_len(n: usize) -> usize {
    BIN32_HEADER_LEN + n
}

fn bin32_len(len: usize) -> Result<u32, WireError> {
    u32::try_from(len).map_err(|_| WireError::BlobTooLarge(len))
}
