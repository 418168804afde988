//! Instruction tags (opcodes)

use serde::{Deserialize, Serialize};

/// The eight Brainfuck primitives
///
/// Each opcode fits in 3 bits; the discriminant is the wire tag used by the
/// packed batch encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Emit the byte at the data pointer (`.`)
    Output = 0,
    /// Read one byte into the cell at the data pointer (`,`)
    Input = 1,
    /// Move the data pointer one cell left (`<`)
    PtrLeft = 2,
    /// Move the data pointer one cell right (`>`)
    PtrRight = 3,
    /// Increment the current cell, wrapping modulo 256 (`+`)
    CellInc = 4,
    /// Decrement the current cell, wrapping modulo 256 (`-`)
    CellDec = 5,
    /// Loop open: skip past the matching close when the cell is zero (`[`)
    JumpFwd = 6,
    /// Loop close: jump back past the matching open when non-zero (`]`)
    JumpBack = 7,
}

impl Opcode {
    /// Decode a 3-bit wire tag
    #[inline]
    pub const fn from_tag(tag: u8) -> Option<Opcode> {
        match tag {
            0 => Some(Opcode::Output),
            1 => Some(Opcode::Input),
            2 => Some(Opcode::PtrLeft),
            3 => Some(Opcode::PtrRight),
            4 => Some(Opcode::CellInc),
            5 => Some(Opcode::CellDec),
            6 => Some(Opcode::JumpFwd),
            7 => Some(Opcode::JumpBack),
            _ => None,
        }
    }

    /// Wire tag of this opcode
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Whether this opcode is a loop bracket
    ///
    /// Jump opcodes always occupy a batch alone so the engine has a
    /// batch-granularity boundary to resolve jump targets against.
    #[inline]
    pub const fn is_jump(self) -> bool {
        matches!(self, Opcode::JumpFwd | Opcode::JumpBack)
    }
}
