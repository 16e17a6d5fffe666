//! # jitaudit-wire
//!
//! Binary token format for the JIT audit log.
//!
//! The format is a four-token subset of msgpack, chosen so that any msgpack
//! reader can consume the log:
//!
//! | Token  | Tag          | Layout                           |
//! |--------|--------------|----------------------------------|
//! | fixmap | `0x80 \| N`  | tag only, N ≤ 15 key/value pairs |
//! | str16  | `0xda`       | tag, u16 length, bytes           |
//! | uint64 | `0xcf`       | tag, u64                         |
//! | bin32  | `0xc6`       | tag, u32 length, bytes           |
//!
//! All integers are big-endian on every host.
//!
//! ## Example
//!
//! ```rust
//! use jitaudit_wire::{EventRecord, Record, decode_all, encode_memory};
//!
//! let mut buf = Vec::new();
//! encode_memory(&mut buf, "GCtrace", 0x7f00_0000_1000, &[1, 2, 3, 4]).unwrap();
//! EventRecord::new("trace_stop")
//!     .with_attr("GCtrace", 0x7f00_0000_1000)
//!     .encode(&mut buf)
//!     .unwrap();
//!
//! let records = decode_all(buf).unwrap();
//! assert_eq!(records.len(), 2);
//! assert!(matches!(records[1], Record::Event(_)));
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod reader;
pub mod record;
pub mod token;

pub use error::WireError;
pub use reader::{RecordReader, decode_all};
pub use record::{
    EVENT_TYPE, EventRecord, MAX_EVENT_ATTRIBUTES, MEMORY_TYPE, MemorySnapshot, Record,
    encode_memory, encode_memory_head, memory_encoded_len,
};
pub use token::{MAX_BIN_LEN, MAX_MAP_LEN, MAX_STR_LEN, Token};
