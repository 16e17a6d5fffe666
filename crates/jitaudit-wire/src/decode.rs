//! Token decoder
//!
//! Reads tokens back from a [`Buf`]. Every read checks the remaining length
//! first, so truncated input is reported as [`WireError::UnexpectedEof`]
//! instead of panicking inside `bytes`.

use bytes::{Buf, Bytes};

use crate::error::WireError;
use crate::token::{BIN32_TAG, FIXMAP_MASK, FIXMAP_TAG, STR16_TAG, Token, UINT64_TAG};

fn ensure<B: Buf>(buf: &B, needed: usize) -> Result<(), WireError> {
    if buf.remaining() < needed {
        return Err(WireError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Read the next token of any supported kind
pub fn read_token<B: Buf>(buf: &mut B) -> Result<Token, WireError> {
    ensure(buf, 1)?;
    let tag = buf.get_u8();
    match tag {
        t if t & FIXMAP_MASK == FIXMAP_TAG => Ok(Token::Map(t & !FIXMAP_MASK)),
        STR16_TAG => {
            ensure(buf, 2)?;
            let len = buf.get_u16() as usize;
            ensure(buf, len)?;
            Ok(Token::Str(buf.copy_to_bytes(len)))
        }
        UINT64_TAG => {
            ensure(buf, 8)?;
            Ok(Token::UInt(buf.get_u64()))
        }
        BIN32_TAG => {
            ensure(buf, 4)?;
            let len = buf.get_u32() as usize;
            ensure(buf, len)?;
            Ok(Token::Bin(buf.copy_to_bytes(len)))
        }
        other => Err(WireError::UnknownTag(other)),
    }
}

/// Read a fixmap header and return its pair count
pub fn read_map_header<B: Buf>(buf: &mut B) -> Result<usize, WireError> {
    match read_token(buf)? {
        Token::Map(n) => Ok(n as usize),
        other => Err(unexpected("map", &other)),
    }
}

/// Read a str16 token and return its raw bytes
pub fn read_str16_bytes<B: Buf>(buf: &mut B) -> Result<Bytes, WireError> {
    match read_token(buf)? {
        Token::Str(s) => Ok(s),
        other => Err(unexpected("str16", &other)),
    }
}

/// Read a str16 token as UTF-8 text
pub fn read_str16<B: Buf>(buf: &mut B) -> Result<String, WireError> {
    let raw = read_str16_bytes(buf)?;
    String::from_utf8(raw.to_vec()).map_err(|_| WireError::InvalidUtf8)
}

/// Read a uint64 token
pub fn read_u64<B: Buf>(buf: &mut B) -> Result<u64, WireError> {
    match read_token(buf)? {
        Token::UInt(n) => Ok(n),
        other => Err(unexpected("uint64", &other)),
    }
}

/// Read a bin32 token
pub fn read_bin32<B: Buf>(buf: &mut B) -> Result<Bytes, WireError> {
    match read_token(buf)? {
        Token::Bin(b) => Ok(b),
        other => Err(unexpected("bin32", &other)),
    }
}

/// Read a str16 key and check it matches `expected`
pub fn expect_key<B: Buf>(buf: &mut B, expected: &'static str) -> Result<(), WireError> {
    let key = read_str16(buf)?;
    if key != expected {
        return Err(WireError::UnexpectedKey {
            expected,
            found: key,
        });
    }
    Ok(())
}

fn unexpected(expected: &'static str, found: &Token) -> WireError {
    WireError::UnexpectedToken {
        expected,
        found: found.kind(),
    }
}
