//! # jitaudit-log
//!
//! Append-only binary audit log for a tracing JIT compiler.
//!
//! The host runtime creates one [`AuditLog`] at startup and calls it at trace
//! lifecycle points. Each call snapshots the raw bytes of the objects involved
//! and then writes an event tying them together by address, so an offline
//! tool can replay the log and rebuild the structures behind every event.
//!
//! ## Features
//!
//! - **Lazy open**: the log file is created on the first logging call, never before
//! - **Self-describing**: VM definition tables are recorded once at the head of the log
//! - **Fixed record order**: sub-buffers first, then the owning structure, then the event
//! - **Explicit failures**: open and write failures are returned, and a torn
//!   write poisons the session instead of leaving an undecodable tail
//!
//! ## Example
//!
//! ```rust
//! use jitaudit_log::{AuditLog, InterpreterState, LogReader, MemoryRegion, MemorySink, VmDefinition};
//!
//! static IR_MODE: [u8; 4] = [0x00, 0x01, 0x8a, 0x0c];
//!
//! struct State {
//!     bclog: Vec<u8>,
//!     raw: [u8; 16],
//! }
//!
//! impl InterpreterState for State {
//!     fn region(&self) -> MemoryRegion<'_> {
//!         MemoryRegion::from_slice(&self.raw)
//!     }
//!     fn bytecode_log(&self) -> MemoryRegion<'_> {
//!         MemoryRegion::from_slice(&self.bclog)
//!     }
//! }
//!
//! let sink = MemorySink::new();
//! let mut log = AuditLog::with_opener(sink.clone(), vec![VmDefinition::ir_mode(&IR_MODE)]);
//!
//! let state = State { bclog: vec![1, 2, 3], raw: [0; 16] };
//! log.log_trace_abort(&state, 7).unwrap();
//!
//! let reader = LogReader::from_bytes(sink.contents()).unwrap();
//! reader.verify_preamble(&["lj_ir_mode"]).unwrap();
//! assert_eq!(reader.len(), 4);
//! ```

pub mod config;
pub mod error;
pub mod object;
pub mod reader;
pub mod region;
pub mod session;
pub mod sink;

// Re-exports
pub use config::{AuditLogConfig, DEFAULT_LOG_PATH};
pub use error::AuditError;
pub use object::{CompiledTrace, InterpreterState, VmDefinition, events, hints};
pub use reader::LogReader;
pub use region::MemoryRegion;
pub use session::{AuditLog, AuditLogStats};
pub use sink::{FileOpener, FileSink, LogSink, MemorySink, SinkOpener};

// Re-export the record model for readers
pub use jitaudit_wire::{EventRecord, MemorySnapshot, Record};
