//! Instruction packer
//!
//! Consumes classified instructions from the cursor and produces packed
//! batches. Commentary bytes are invisible at this stage: a run of the same
//! instruction separated only by commentary still counts as one run.
//!
//! Compression rule: a single instruction repeating [`REPEAT_THRESHOLD`]
//! or more times consecutively collapses into a solo batch whose repeat
//! count is the repetition count minus one, capped so one batch plays at
//! most 256 times; longer runs spill into a fresh batch. Jump instructions
//! always travel alone so the engine has a batch-granularity boundary for
//! resolving jump targets.

use std::io::Read;

use badger_bytecode::{Batch, Opcode, classify};

use crate::cursor::{SourceCursor, SourcePos};
use crate::error::VmResult;

/// Minimum consecutive repetitions before run-length encoding kicks in
///
/// Below the threshold the repeats are cheaper as plain slots; a run of
/// four or more wins as a repeat batch.
pub const REPEAT_THRESHOLD: u32 = 4;

/// Most plays a single repeat batch can encode (`repeat` is 8 bits)
const MAX_RUN: u32 = Batch::MAX_REPEAT as u32 + 1;

/// Packs classified instructions into fixed-width batches
#[derive(Default)]
pub struct Packer {
    /// A measured run that did not fit the batch being filled
    pending: Option<(Opcode, u32, SourcePos)>,
}

impl Packer {
    /// Create a packer
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next batch, or `None` once input is exhausted
    ///
    /// The returned position is the line/column of the batch's first
    /// instruction.
    pub fn next_batch<R: Read>(
        &mut self,
        cursor: &mut SourceCursor<R>,
    ) -> VmResult<Option<(Batch, SourcePos)>> {
        let mut batch = Batch::new();
        let mut origin: Option<SourcePos> = None;

        loop {
            let Some((op, run, pos)) = self.take_run(cursor)? else {
                break;
            };

            if op.is_jump() {
                if batch.is_empty() {
                    return Ok(Some((Batch::solo(op), pos)));
                }
                self.pending = Some((op, run, pos));
                break;
            }

            if run >= REPEAT_THRESHOLD {
                if batch.is_empty() {
                    return Ok(Some((Batch::repeated(op, (run - 1) as u8), pos)));
                }
                self.pending = Some((op, run, pos));
                break;
            }

            if origin.is_none() {
                origin = Some(pos);
            }
            let mut remaining = run;
            while remaining > 0 && batch.push(op) {
                remaining -= 1;
            }
            if remaining > 0 {
                self.pending = Some((op, remaining, pos));
                break;
            }
            if batch.len() == Batch::MAX_SLOTS {
                break;
            }
        }

        match origin {
            Some(pos) if !batch.is_empty() => Ok(Some((batch, pos))),
            _ => Ok(None),
        }
    }

    /// Next run: the leftover from a previous call, or a fresh measurement
    fn take_run<R: Read>(
        &mut self,
        cursor: &mut SourceCursor<R>,
    ) -> VmResult<Option<(Opcode, u32, SourcePos)>> {
        if let Some(run) = self.pending.take() {
            return Ok(Some(run));
        }
        measure_run(cursor)
    }
}

/// Consume one instruction and however many immediate repetitions follow
///
/// Jumps are never extended into runs. Measurement caps at [`MAX_RUN`] so
/// the repeat count always fits its 8-bit field.
fn measure_run<R: Read>(
    cursor: &mut SourceCursor<R>,
) -> VmResult<Option<(Opcode, u32, SourcePos)>> {
    let Some(op) = peek_instruction(cursor)? else {
        return Ok(None);
    };
    let pos = cursor.pos();
    consume(cursor);
    if op.is_jump() {
        return Ok(Some((op, 1, pos)));
    }
    let mut run = 1u32;
    while run < MAX_RUN && peek_instruction(cursor)? == Some(op) {
        consume(cursor);
        run += 1;
    }
    Ok(Some((op, run, pos)))
}

/// Skip commentary and peek the next instruction without consuming it
fn peek_instruction<R: Read>(cursor: &mut SourceCursor<R>) -> VmResult<Option<Opcode>> {
    while let Some(byte) = cursor.peek()? {
        match classify(byte) {
            Some(op) => return Ok(Some(op)),
            None => cursor.advance(),
        }
    }
    Ok(None)
}

/// Consume the peeked instruction and count it as scheduled
fn consume<R: Read>(cursor: &mut SourceCursor<R>) {
    cursor.advance();
    cursor.note_scheduled();
}
