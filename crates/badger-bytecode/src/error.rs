//! Bytecode errors

use thiserror::Error;

/// Errors that can occur while decoding packed batches
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// A batch whose slot count exceeds seven
    #[error("invalid slot count: {0}")]
    InvalidSlotCount(u8),

    /// A jump sharing a batch with other instructions or a repeat count
    #[error("jump instructions must occupy a batch alone")]
    JumpNotSolo,
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
