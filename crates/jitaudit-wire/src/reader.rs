//! Streaming record reader
//!
//! A log is a flat concatenation of records with no framing, so reading is
//! simply decoding records until the input is exhausted. A record cut short
//! by the end of input is an error, never silently dropped.

use bytes::{Buf, Bytes};

use crate::error::WireError;
use crate::record::Record;

/// Iterator over the records in a byte buffer
#[derive(Debug, Clone)]
pub struct RecordReader {
    buf: Bytes,
    offset: usize,
    failed: bool,
}

impl RecordReader {
    /// Create a reader over a complete log image
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            offset: 0,
            failed: false,
        }
    }

    /// Byte offset of the next record
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }
}

impl Iterator for RecordReader {
    type Item = Result<(usize, Record), WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.buf.has_remaining() {
            return None;
        }
        let start = self.offset;
        let before = self.buf.remaining();
        match Record::decode(&mut self.buf) {
            Ok(record) => {
                self.offset += before - self.buf.remaining();
                Some(Ok((start, record)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every record in `buf`
pub fn decode_all(buf: impl Into<Bytes>) -> Result<Vec<Record>, WireError> {
    RecordReader::new(buf)
        .map(|r| r.map(|(_, record)| record))
        .collect()
}
