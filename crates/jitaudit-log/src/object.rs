//! Views of the runtime objects that get audited
//!
//! The host runtime owns the interpreter state and compiled traces. It
//! implements these traits to expose each owned buffer as a borrowed
//! [`MemoryRegion`]; the session decides which regions are recorded and in
//! which order.

use bytes::Bytes;

use crate::region::MemoryRegion;

/// Labels written into the `hint` field of memory snapshots
pub mod hints {
    /// The IR mode table, recorded once as a VM definition
    pub const IR_MODE: &str = "lj_ir_mode";
    /// Bytecode recording log owned by the interpreter state
    pub const BYTECODE_LOG: &str = "BCRecLog[]";
    /// The interpreter state structure
    pub const JIT_STATE: &str = "jit_State";
    /// Machine code of a trace
    pub const MACHINE_CODE: &str = "MCode[]";
    /// Snapshot list of a trace
    pub const SNAPSHOTS: &str = "SnapShot[]";
    /// Snapshot map entries of a trace
    pub const SNAPSHOT_MAP: &str = "SnapEntry[]";
    /// IR instructions of a trace, constants included
    pub const IR_INSTRUCTIONS: &str = "IRIns[]";
    /// The trace structure
    pub const TRACE: &str = "GCtrace";
}

/// Event names and attribute keys
pub mod events {
    /// A trace finished compiling
    pub const TRACE_STOP: &str = "trace_stop";
    /// A trace attempt was abandoned
    pub const TRACE_ABORT: &str = "trace_abort";

    /// Address of the compiled trace
    pub const ATTR_TRACE: &str = "GCtrace";
    /// Address of the interpreter state
    pub const ATTR_JIT_STATE: &str = "jit_State";
    /// Abort reason code
    pub const ATTR_TRACE_ERROR: &str = "TraceError";
}

/// The compiler's per-context working state
pub trait InterpreterState {
    /// The state structure itself; its address identifies the state in events
    fn region(&self) -> MemoryRegion<'_>;

    /// The bytecode recording log, sized to the entries currently in use
    fn bytecode_log(&self) -> MemoryRegion<'_>;
}

/// A compiled trace and the buffers it owns
pub trait CompiledTrace {
    /// The trace structure itself; its address identifies the trace in events
    fn region(&self) -> MemoryRegion<'_>;

    /// Generated machine code
    fn machine_code(&self) -> MemoryRegion<'_>;

    /// Snapshot list
    fn snapshots(&self) -> MemoryRegion<'_>;

    /// Snapshot map entries
    fn snapshot_map(&self) -> MemoryRegion<'_>;

    /// IR instructions from the lowest constant up to and including the last instruction
    fn instructions(&self) -> MemoryRegion<'_>;
}

/// A static table recorded at the head of every log
///
/// Definitions describe layouts that later snapshots can only be interpreted
/// with, such as the IR mode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmDefinition {
    hint: String,
    address: u64,
    data: Bytes,
}

impl VmDefinition {
    /// Create a definition with an explicit address
    pub fn new(hint: impl Into<String>, address: u64, data: impl Into<Bytes>) -> Self {
        Self {
            hint: hint.into(),
            address,
            data: data.into(),
        }
    }

    /// Create a definition over a static table, recorded at the table's address
    pub fn from_static(hint: impl Into<String>, table: &'static [u8]) -> Self {
        Self {
            hint: hint.into(),
            address: table.as_ptr() as usize as u64,
            data: Bytes::from_static(table),
        }
    }

    /// The IR mode table definition
    pub fn ir_mode(table: &'static [u8]) -> Self {
        Self::from_static(hints::IR_MODE, table)
    }

    /// Label the table is recorded under
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// The table's bytes, tagged with its address
    pub fn region(&self) -> MemoryRegion<'_> {
        MemoryRegion::new(self.address, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static MODES: [u8; 4] = [0x01, 0x02, 0x81, 0x0c];

    #[test]
    fn test_ir_mode_definition() {
        let def = VmDefinition::ir_mode(&MODES);
        assert_eq!(def.hint(), "lj_ir_mode");
        assert_eq!(def.region().address(), MODES.as_ptr() as usize as u64);
        assert_eq!(def.region().data(), &MODES);
    }

    #[test]
    fn test_explicit_definition() {
        let def = VmDefinition::new("custom", 0x42, vec![1u8, 2]);
        assert_eq!(def.region().address(), 0x42);
        assert_eq!(def.region().len(), 2);
    }
}
