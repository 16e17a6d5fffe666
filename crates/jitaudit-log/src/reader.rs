//! Reading an audit log back
//!
//! [`LogReader`] decodes a complete log and offers the lookups an offline
//! tool needs: checking the definitions preamble and resolving an address
//! seen in an event to the most recent snapshot taken at that address.

use std::path::Path;

use bytes::Bytes;

use jitaudit_wire::{EventRecord, MemorySnapshot, Record, decode_all};

use crate::error::AuditError;

/// A decoded audit log
#[derive(Debug, Clone)]
pub struct LogReader {
    records: Vec<Record>,
}

impl LogReader {
    /// Read and decode a log file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Decode a log image; trailing or truncated bytes are an error
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, AuditError> {
        let records = decode_all(bytes)?;
        Ok(Self { records })
    }

    /// All records in log order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records in the log
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that the log opens with memory snapshots carrying exactly these hints
    pub fn verify_preamble(&self, hints: &[&str]) -> Result<(), AuditError> {
        if self.records.len() < hints.len() {
            return Err(AuditError::invalid_preamble(format!(
                "expected {} definition records, log has {}",
                hints.len(),
                self.records.len()
            )));
        }

        for (i, (record, expected)) in self.records.iter().zip(hints).enumerate() {
            match record {
                Record::Memory(m) if m.hint == *expected => {}
                Record::Memory(m) => {
                    return Err(AuditError::invalid_preamble(format!(
                        "record {i} has hint {:?}, expected {expected:?}",
                        m.hint
                    )));
                }
                Record::Event(e) => {
                    return Err(AuditError::invalid_preamble(format!(
                        "record {i} is event {:?}, expected definition {expected:?}",
                        e.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Events in log order, each with its record index
    pub fn events(&self) -> impl Iterator<Item = (usize, &EventRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_event().map(|e| (i, e)))
    }

    /// Memory snapshots in log order, each with its record index
    pub fn snapshots(&self) -> impl Iterator<Item = (usize, &MemorySnapshot)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_memory().map(|m| (i, m)))
    }

    /// The latest snapshot at `address` recorded before record index `before`
    ///
    /// Addresses are reused by the runtime, so only the most recent capture
    /// describes the object an event refers to.
    pub fn resolve(&self, address: u64, before: usize) -> Option<&MemorySnapshot> {
        self.records[..before.min(self.records.len())]
            .iter()
            .rev()
            .filter_map(Record::as_memory)
            .find(|m| m.address == address)
    }

    /// Resolve an event attribute holding an address
    pub fn resolve_attr(&self, event_index: usize, key: &str) -> Option<&MemorySnapshot> {
        let event = self.records.get(event_index)?.as_event()?;
        self.resolve(event.attr(key)?, event_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jitaudit_wire::encode_memory;

    fn sample() -> Vec<u8> {
        let mut buf = Vec::new();
        encode_memory(&mut buf, "lj_ir_mode", 0x10, &[1]).unwrap();
        encode_memory(&mut buf, "jit_State", 0x20, &[2]).unwrap();
        EventRecord::new("first")
            .with_attr("jit_State", 0x20)
            .encode(&mut buf)
            .unwrap();
        encode_memory(&mut buf, "jit_State", 0x20, &[3]).unwrap();
        EventRecord::new("second")
            .with_attr("jit_State", 0x20)
            .encode(&mut buf)
            .unwrap();
        buf
    }

    #[test]
    fn test_preamble_ok() {
        let reader = LogReader::from_bytes(sample()).unwrap();
        reader.verify_preamble(&["lj_ir_mode"]).unwrap();
        assert_eq!(reader.len(), 5);
    }

    #[test]
    fn test_preamble_wrong_hint() {
        let reader = LogReader::from_bytes(sample()).unwrap();
        let err = reader.verify_preamble(&["lj_ir_mode", "other"]).unwrap_err();
        assert!(matches!(err, AuditError::InvalidPreamble(_)));
    }

    #[test]
    fn test_preamble_missing() {
        let mut buf = Vec::new();
        EventRecord::new("orphan").encode(&mut buf).unwrap();
        let reader = LogReader::from_bytes(buf).unwrap();
        assert!(reader.verify_preamble(&["lj_ir_mode"]).is_err());

        let empty = LogReader::from_bytes(Vec::new()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.verify_preamble(&["lj_ir_mode"]).is_err());
    }

    #[test]
    fn test_resolve_uses_latest_capture() {
        let reader = LogReader::from_bytes(sample()).unwrap();
        let events: Vec<usize> = reader.events().map(|(i, _)| i).collect();
        assert_eq!(events, vec![2, 4]);

        let first = reader.resolve_attr(2, "jit_State").unwrap();
        assert_eq!(first.data.as_ref(), &[2]);
        let second = reader.resolve_attr(4, "jit_State").unwrap();
        assert_eq!(second.data.as_ref(), &[3]);

        assert!(reader.resolve(0x99, reader.len()).is_none());
        assert!(reader.resolve_attr(0, "jit_State").is_none());
    }

    #[test]
    fn test_truncated_log_is_rejected() {
        let mut buf = sample();
        buf.truncate(buf.len() - 3);
        assert!(matches!(
            LogReader::from_bytes(buf),
            Err(AuditError::Wire(_))
        ));
    }
}
