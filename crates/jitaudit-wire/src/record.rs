//! Record shapes
//!
//! A record is a fixmap whose first key is `type`. Two kinds exist:
//!
//! - memory: `{type: "memory", hint, address, data}`
//! - event: `{type: "event", event, <attr>: u64, ...}`
//!
//! Keys are always written, and expected on decode, in exactly that order.

use bytes::{Buf, BufMut, Bytes};

use crate::decode::{expect_key, read_bin32, read_map_header, read_str16, read_u64};
use crate::encode::{
    bin32_encoded_len, str16_len, write_bin32_header, write_map_header, write_str16, write_u64,
};
use crate::error::WireError;
use crate::token::{MAX_MAP_LEN, UINT64_TOKEN_LEN};

/// `type` value of a memory snapshot record
pub const MEMORY_TYPE: &str = "memory";

/// `type` value of an event record
pub const EVENT_TYPE: &str = "event";

/// Pairs every event spends on `type` and `event`
const EVENT_FIXED_FIELDS: usize = 2;

/// Largest number of attributes an event can carry
pub const MAX_EVENT_ATTRIBUTES: usize = MAX_MAP_LEN - EVENT_FIXED_FIELDS;

const MEMORY_FIELDS: usize = 4;

/// Append a memory snapshot record for `data`, captured from `address`
///
/// The bytes are copied into `buf` as-is; nothing is retained afterwards.
pub fn encode_memory<B: BufMut>(
    buf: &mut B,
    hint: &str,
    address: u64,
    data: &[u8],
) -> Result<(), WireError> {
    encode_memory_head(buf, hint, address, data.len())?;
    buf.put_slice(data);
    Ok(())
}

/// Append a memory snapshot record up to and including the blob length
///
/// Writers streaming large regions emit this head and then the `data_len`
/// content bytes themselves, without copying them through `buf`.
pub fn encode_memory_head<B: BufMut>(
    buf: &mut B,
    hint: &str,
    address: u64,
    data_len: usize,
) -> Result<(), WireError> {
    write_map_header(buf, MEMORY_FIELDS)?;
    write_str16(buf, "type")?;
    write_str16(buf, MEMORY_TYPE)?;
    write_str16(buf, "hint")?;
    write_str16(buf, hint)?;
    write_str16(buf, "address")?;
    write_u64(buf, address);
    write_str16(buf, "data")?;
    write_bin32_header(buf, data_len)
}

/// Exact encoded size of a memory snapshot record
pub fn memory_encoded_len(hint: &str, data_len: usize) -> usize {
    1 + str16_len("type")
        + str16_len(MEMORY_TYPE)
        + str16_len("hint")
        + str16_len(hint)
        + str16_len("address")
        + UINT64_TOKEN_LEN
        + str16_len("data")
        + bin32_encoded_len(data_len)
}

/// A decoded memory snapshot record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// Display label for the region's role
    pub hint: String,
    /// Where the region lived when it was captured
    pub address: u64,
    /// Byte copy of the region
    pub data: Bytes,
}

impl MemorySnapshot {
    /// Create a snapshot record
    pub fn new(hint: impl Into<String>, address: u64, data: impl Into<Bytes>) -> Self {
        Self {
            hint: hint.into(),
            address,
            data: data.into(),
        }
    }

    /// Append this record to `buf`
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<(), WireError> {
        encode_memory(buf, &self.hint, self.address, &self.data)
    }
}

/// An event record: a name plus scalar attributes in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event name, e.g. `trace_stop`
    pub name: String,
    /// Attribute keys and values, in the order they are written
    pub attributes: Vec<(String, u64)>,
}

impl EventRecord {
    /// Create an event with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: u64) -> Self {
        self.attributes.push((key.into(), value));
        self
    }

    /// Look up an attribute by key
    pub fn attr(&self, key: &str) -> Option<u64> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Append this record to `buf`
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<(), WireError> {
        let count = self.attributes.len();
        if count > MAX_EVENT_ATTRIBUTES {
            return Err(WireError::TooManyAttributes(count));
        }
        write_map_header(buf, count + EVENT_FIXED_FIELDS)?;
        write_str16(buf, "type")?;
        write_str16(buf, EVENT_TYPE)?;
        write_str16(buf, "event")?;
        write_str16(buf, &self.name)?;
        for (key, value) in &self.attributes {
            write_str16(buf, key)?;
            write_u64(buf, *value);
        }
        Ok(())
    }

    /// Exact encoded size of this record
    pub fn encoded_len(&self) -> usize {
        1 + str16_len("type")
            + str16_len(EVENT_TYPE)
            + str16_len("event")
            + str16_len(&self.name)
            + self
                .attributes
                .iter()
                .map(|(k, _)| str16_len(k) + UINT64_TOKEN_LEN)
                .sum::<usize>()
    }
}

/// Any record found in an audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Memory(MemorySnapshot),
    Event(EventRecord),
}

impl Record {
    /// Append this record to `buf`
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<(), WireError> {
        match self {
            Record::Memory(m) => m.encode(buf),
            Record::Event(e) => e.encode(buf),
        }
    }

    /// Read one record from the front of `buf`
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, WireError> {
        let fields = read_map_header(buf)?;
        if fields == 0 {
            return Err(WireError::malformed("empty record map"));
        }
        expect_key(buf, "type")?;
        let kind = read_str16(buf)?;
        match kind.as_str() {
            MEMORY_TYPE => {
                if fields != MEMORY_FIELDS {
                    return Err(WireError::malformed(format!(
                        "memory record with {fields} fields"
                    )));
                }
                expect_key(buf, "hint")?;
                let hint = read_str16(buf)?;
                expect_key(buf, "address")?;
                let address = read_u64(buf)?;
                expect_key(buf, "data")?;
                let data = read_bin32(buf)?;
                Ok(Record::Memory(MemorySnapshot {
                    hint,
                    address,
                    data,
                }))
            }
            EVENT_TYPE => {
                if fields < EVENT_FIXED_FIELDS {
                    return Err(WireError::malformed("event record without a name"));
                }
                expect_key(buf, "event")?;
                let name = read_str16(buf)?;
                let mut attributes = Vec::with_capacity(fields - EVENT_FIXED_FIELDS);
                for _ in EVENT_FIXED_FIELDS..fields {
                    let key = read_str16(buf)?;
                    let value = read_u64(buf)?;
                    attributes.push((key, value));
                }
                Ok(Record::Event(EventRecord { name, attributes }))
            }
            _ => Err(WireError::UnknownRecordType(kind)),
        }
    }

    /// The memory snapshot, if this is one
    pub fn as_memory(&self) -> Option<&MemorySnapshot> {
        match self {
            Record::Memory(m) => Some(m),
            Record::Event(_) => None,
        }
    }

    /// The event, if this is one
    pub fn as_event(&self) -> Option<&EventRecord> {
        match self {
            Record::Event(e) => Some(e),
            Record::Memory(_) => None,
        }
    }
}

impl From<MemorySnapshot> for Record {
    fn from(m: MemorySnapshot) -> Self {
        Record::Memory(m)
    }
}

impl From<EventRecord> for Record {
    fn from(e: EventRecord) -> Self {
        Record::Event(e)
    }
}
