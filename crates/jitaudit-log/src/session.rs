//! Audit log session
//!
//! [`AuditLog`] owns the one output sink of a process. The sink is opened on
//! the first logging call, and the VM definitions are recorded immediately
//! after, so every log starts with them. Each entry point then writes its
//! snapshots and closing event straight through; nothing is deferred.
//!
//! Each record's tokens are assembled in a small scratch buffer and handed to
//! the sink in one call, with snapshot contents passed straight from the
//! borrowed region rather than copied. A record that does not fit its tokens
//! is rejected before any of its bytes reach the sink. A failed write poisons
//! the session, since the stream after a torn record cannot be decoded.

use bytes::BytesMut;
use tracing::{debug, info, instrument, warn};

use jitaudit_wire::{EventRecord, WireError, encode_memory_head};

use crate::config::AuditLogConfig;
use crate::error::AuditError;
use crate::object::{CompiledTrace, InterpreterState, VmDefinition, events, hints};
use crate::region::MemoryRegion;
use crate::sink::{FileOpener, LogSink, SinkOpener};

/// Scratch capacity kept between records; anything larger is released
const SCRATCH_RETAIN: usize = 4096;

enum SinkState<S> {
    Closed,
    Open(S),
    Poisoned,
}

/// Counters for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditLogStats {
    /// Times the sink has been opened (0 or 1)
    pub opens: u64,
    /// Records written, definitions included
    pub records: u64,
    /// Bytes written
    pub bytes: u64,
}

/// A process-wide audit log session
///
/// Logging calls take `&mut self`; a multi-threaded host shares the session
/// behind a mutex so calls are serialized.
pub struct AuditLog<O: SinkOpener = FileOpener> {
    opener: O,
    state: SinkState<O::Sink>,
    definitions: Vec<VmDefinition>,
    scratch: BytesMut,
    stats: AuditLogStats,
}

impl AuditLog<FileOpener> {
    /// Create a file-backed session; the file is not touched until the first logging call
    pub fn new(config: &AuditLogConfig, definitions: Vec<VmDefinition>) -> Self {
        Self::with_opener(FileOpener::from_config(config), definitions)
    }
}

impl<O: SinkOpener> AuditLog<O> {
    /// Create a session over any sink
    pub fn with_opener(opener: O, definitions: Vec<VmDefinition>) -> Self {
        Self {
            opener,
            state: SinkState::Closed,
            definitions,
            scratch: BytesMut::new(),
            stats: AuditLogStats::default(),
        }
    }

    /// Whether the sink is open and usable
    pub fn is_open(&self) -> bool {
        matches!(self.state, SinkState::Open(_))
    }

    /// Whether an earlier write failure has disabled the session
    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, SinkState::Poisoned)
    }

    /// Opens, records and bytes written so far
    pub fn stats(&self) -> AuditLogStats {
        self.stats
    }

    /// Definitions recorded at the head of the log
    pub fn definitions(&self) -> &[VmDefinition] {
        &self.definitions
    }

    /// Open the sink if needed
    ///
    /// The first successful call truncates the target and records the VM
    /// definitions. Later calls do nothing. If opening fails the session stays
    /// closed, so no record is ever written without the definitions before it,
    /// and the next logging call retries the open. A log started by such a
    /// retry lacks the events whose calls returned [`AuditError::Open`]; hosts
    /// that need a complete log should treat `Open` as fatal.
    /// If recording the definitions fails, the session is poisoned.
    pub fn ensure_open(&mut self) -> Result<(), AuditError> {
        match self.state {
            SinkState::Open(_) => return Ok(()),
            SinkState::Poisoned => return Err(AuditError::Poisoned),
            SinkState::Closed => {}
        }

        let sink = self.opener.open()?;
        self.state = SinkState::Open(sink);
        self.stats.opens += 1;
        info!(target_path = %self.opener.target(), "Opened audit log");

        self.log_vm_definitions()
    }

    fn log_vm_definitions(&mut self) -> Result<(), AuditError> {
        let definitions = std::mem::take(&mut self.definitions);
        let result = definitions
            .iter()
            .try_for_each(|def| self.write_memory(def.hint(), def.region()));
        self.definitions = definitions;
        if let Err(e) = result {
            // A log with a partial preamble is unreadable.
            warn!(error = %e, "Failed to record VM definitions; poisoning session");
            self.state = SinkState::Poisoned;
            return Err(e);
        }

        debug!(count = self.definitions.len(), "Recorded VM definitions");
        Ok(())
    }

    /// Record a compiled trace together with the state that produced it
    ///
    /// Writes the state's bytecode log and the state, then the trace's
    /// machine code, snapshot list, snapshot map, IR instructions and the
    /// trace itself, then a `trace_stop` event referencing both addresses.
    #[instrument(skip_all, fields(trace = trace.region().address()))]
    pub fn log_trace_stop<J, T>(&mut self, state: &J, trace: &T) -> Result<(), AuditError>
    where
        J: InterpreterState + ?Sized,
        T: CompiledTrace + ?Sized,
    {
        self.ensure_open()?;
        self.write_jit_state(state)?;
        self.write_trace(trace)?;
        self.write_event(
            &EventRecord::new(events::TRACE_STOP)
                .with_attr(events::ATTR_TRACE, trace.region().address())
                .with_attr(events::ATTR_JIT_STATE, state.region().address()),
        )
    }

    /// Record an aborted trace attempt
    ///
    /// Writes the state's bytecode log and the state, then a `trace_abort`
    /// event carrying the error code and the state address.
    #[instrument(skip_all, fields(error_code = error_code))]
    pub fn log_trace_abort<J>(&mut self, state: &J, error_code: u64) -> Result<(), AuditError>
    where
        J: InterpreterState + ?Sized,
    {
        self.ensure_open()?;
        self.write_jit_state(state)?;
        self.write_event(
            &EventRecord::new(events::TRACE_ABORT)
                .with_attr(events::ATTR_TRACE_ERROR, error_code)
                .with_attr(events::ATTR_JIT_STATE, state.region().address()),
        )
    }

    /// Record a single memory snapshot
    pub fn log_memory(&mut self, hint: &str, region: MemoryRegion<'_>) -> Result<(), AuditError> {
        self.ensure_open()?;
        self.write_memory(hint, region)
    }

    /// Record a single event
    pub fn log_event(&mut self, event: &EventRecord) -> Result<(), AuditError> {
        self.ensure_open()?;
        self.write_event(event)
    }

    fn write_jit_state<J: InterpreterState + ?Sized>(&mut self, state: &J) -> Result<(), AuditError> {
        self.write_memory(hints::BYTECODE_LOG, state.bytecode_log())?;
        self.write_memory(hints::JIT_STATE, state.region())
    }

    fn write_trace<T: CompiledTrace + ?Sized>(&mut self, trace: &T) -> Result<(), AuditError> {
        self.write_memory(hints::MACHINE_CODE, trace.machine_code())?;
        self.write_memory(hints::SNAPSHOTS, trace.snapshots())?;
        self.write_memory(hints::SNAPSHOT_MAP, trace.snapshot_map())?;
        self.write_memory(hints::IR_INSTRUCTIONS, trace.instructions())?;
        self.write_memory(hints::TRACE, trace.region())
    }

    fn write_memory(&mut self, hint: &str, region: MemoryRegion<'_>) -> Result<(), AuditError> {
        debug!(hint, address = region.address(), len = region.len(), "Snapshot");
        let data = region.data();
        self.write_record(
            |buf| encode_memory_head(buf, hint, region.address(), data.len()),
            data,
        )
    }

    fn write_event(&mut self, event: &EventRecord) -> Result<(), AuditError> {
        debug!(event = %event.name, attributes = event.attributes.len(), "Event");
        self.write_record(|buf| event.encode(buf), &[])
    }

    /// Write the tokens produced by `encode`, followed by `body`, as one record
    fn write_record<F>(&mut self, encode: F, body: &[u8]) -> Result<(), AuditError>
    where
        F: FnOnce(&mut BytesMut) -> Result<(), WireError>,
    {
        let result = self.append_record(encode, body);
        if self.scratch.capacity() > SCRATCH_RETAIN {
            self.scratch = BytesMut::with_capacity(SCRATCH_RETAIN);
        }
        result
    }

    fn append_record<F>(&mut self, encode: F, body: &[u8]) -> Result<(), AuditError>
    where
        F: FnOnce(&mut BytesMut) -> Result<(), WireError>,
    {
        let sink = match &mut self.state {
            SinkState::Open(sink) => sink,
            SinkState::Poisoned => return Err(AuditError::Poisoned),
            SinkState::Closed => return Err(AuditError::write("audit log is not open")),
        };

        self.scratch.clear();
        encode(&mut self.scratch)?;

        if let Err(e) = sink.append_parts(&[&self.scratch[..], body]) {
            warn!(error = %e, records = self.stats.records, "Audit log write failed; poisoning session");
            self.state = SinkState::Poisoned;
            return Err(AuditError::write(e));
        }

        self.stats.records += 1;
        self.stats.bytes += (self.scratch.len() + body.len()) as u64;
        Ok(())
    }
}
