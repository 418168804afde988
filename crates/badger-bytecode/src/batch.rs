//! Packed instruction batches
//!
//! A batch is a fixed-width record bundling up to seven instructions, or one
//! instruction plus a repeat count, so per-instruction dispatch overhead is
//! amortized. The wire form is a single little-endian `u32`:
//!
//! ```text
//! bits  0..3   slot count (0-7)
//! bits  3..24  seven 3-bit opcode tags, slot 0 lowest
//! bits 24..32  repeat count
//! ```
//!
//! A batch executes its `len` instructions `repeat + 1` total times. Slots at
//! index `>= len` are unspecified and must never be interpreted.

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};
use crate::opcode::Opcode;

/// A fixed-width packed instruction batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    slots: [Opcode; 7],
    len: u8,
    repeat: u8,
}

impl Batch {
    /// Maximum number of instruction slots per batch
    pub const MAX_SLOTS: usize = 7;

    /// Maximum repeat count (so 256 total plays of a repeated instruction)
    pub const MAX_REPEAT: u8 = u8::MAX;

    /// Create an empty batch
    pub const fn new() -> Self {
        Self {
            slots: [Opcode::Output; 7],
            len: 0,
            repeat: 0,
        }
    }

    /// Create a batch holding a single instruction
    pub const fn solo(op: Opcode) -> Self {
        let mut batch = Self::new();
        batch.slots[0] = op;
        batch.len = 1;
        batch
    }

    /// Create a single-instruction batch that plays `repeat + 1` times
    ///
    /// The packer only emits these after verifying that many consecutive
    /// repetitions exist in the source. Jump opcodes are never repeated.
    pub const fn repeated(op: Opcode, repeat: u8) -> Self {
        debug_assert!(!op.is_jump());
        let mut batch = Self::solo(op);
        batch.repeat = repeat;
        batch
    }

    /// Build a batch from an opcode slice and a repeat count
    ///
    /// Rejects more than seven slots, and rejects any batch where a jump
    /// shares the word with other instructions or carries a repeat.
    pub fn from_parts(ops: &[Opcode], repeat: u8) -> Result<Self> {
        if ops.len() > Self::MAX_SLOTS {
            return Err(BytecodeError::InvalidSlotCount(ops.len() as u8));
        }
        if ops.iter().any(|op| op.is_jump()) && (ops.len() > 1 || repeat > 0) {
            return Err(BytecodeError::JumpNotSolo);
        }
        let mut batch = Self::new();
        for &op in ops {
            batch.slots[batch.len as usize] = op;
            batch.len += 1;
        }
        batch.repeat = repeat;
        Ok(batch)
    }

    /// Append an instruction slot
    ///
    /// Returns `false` when the batch is full, or when the append would put
    /// a jump in the same word as another instruction.
    pub fn push(&mut self, op: Opcode) -> bool {
        if self.len as usize == Self::MAX_SLOTS {
            return false;
        }
        if !self.is_empty() && (op.is_jump() || self.slots[0].is_jump()) {
            return false;
        }
        self.slots[self.len as usize] = op;
        self.len += 1;
        true
    }

    /// Number of meaningful slots (0-7)
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the batch has no slots
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Repeat count: the batch plays `repeat() + 1` total times
    #[inline]
    pub const fn repeat(&self) -> u8 {
        self.repeat
    }

    /// The opcode in slot `i`
    ///
    /// Callers must not read past `len()`.
    #[inline]
    pub fn op(&self, i: usize) -> Opcode {
        debug_assert!(i < self.len());
        self.slots[i]
    }

    /// Iterate over the meaningful slots
    pub fn ops(&self) -> impl Iterator<Item = Opcode> + '_ {
        self.slots[..self.len()].iter().copied()
    }

    /// Encode to the little-endian wire word
    pub fn pack(&self) -> u32 {
        let mut word = self.len as u32;
        for (i, op) in self.ops().enumerate() {
            word |= (op.tag() as u32) << (3 + 3 * i);
        }
        word | (self.repeat as u32) << 24
    }

    /// Decode a wire word
    ///
    /// Every 3-bit field decodes to a valid opcode and the count field
    /// cannot exceed seven, so decoding is total; slots past the count are
    /// restored as unspecified filler.
    pub fn unpack(word: u32) -> Self {
        let len = (word & 0b111) as u8;
        let mut batch = Self::new();
        for i in 0..len as usize {
            let tag = ((word >> (3 + 3 * i)) & 0b111) as u8;
            // Tag is masked to 3 bits; all eight values are opcodes.
            if let Some(op) = Opcode::from_tag(tag) {
                batch.slots[i] = op;
            }
        }
        batch.len = len;
        batch.repeat = (word >> 24) as u8;
        batch
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}
