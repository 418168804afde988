//! VM error types

use thiserror::Error;

use crate::cursor::SourcePos;

/// Interpreter faults
///
/// Every fault is detected at its point of origin and unwinds immediately to
/// the top-level run loop; nothing is swallowed or retried. Output emitted
/// before the fault has already reached the sink and stays there.
#[derive(Debug, Error)]
pub enum VmError {
    /// Underlying read/open failure, with the OS-level cause
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Closing bracket with no matching opening bracket
    #[error("unmatched closing bracket at {pos}")]
    UnmatchedClose {
        /// Where the stray bracket was found
        pos: SourcePos,
    },

    /// Input ended inside an open bracket scope
    #[error("unclosed bracket scope at end of input ({pos})")]
    UnbalancedOpen {
        /// End-of-input position
        pos: SourcePos,
    },

    /// Data pointer moved below the start of the tape
    #[error("data pointer moved below cell 0 at {pos}")]
    PointerUnderflow {
        /// Where the offending move was scheduled
        pos: SourcePos,
    },

    /// Data pointer moved past the end of the tape
    #[error("data pointer moved past the end of the tape at {pos}")]
    PointerOverflow {
        /// Where the offending move was scheduled
        pos: SourcePos,
    },

    /// Tape allocation failed at startup, before any instruction executed
    #[error("failed to allocate interpreter memory: {0}")]
    Allocation(#[from] std::collections::TryReserveError),

    /// Malformed packed batch
    #[error("bytecode error: {0}")]
    Bytecode(#[from] badger_bytecode::BytecodeError),
}

/// Result type for VM operations
pub type VmResult<T> = std::result::Result<T, VmError>;
