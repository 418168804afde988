//! Execution engine
//!
//! Walks packed batches against the memory tape. While any loop is live,
//! consumed batches are recorded in the scope table so a closing bracket can
//! replay the loop body without re-reading raw bytes; the record is dropped
//! as soon as the outermost loop closes.

use std::io::{Read, Write};

use badger_bytecode::{Batch, Opcode};
use tracing::{debug, trace};

use crate::cursor::{SourceCursor, SourcePos};
use crate::error::{VmError, VmResult};
use crate::packer::Packer;
use crate::scope::{ScopeTable, prime, skip_scope};

/// Tape extent, in cells
pub const TAPE_LEN: usize = 30_000;

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Executing batches
    Running,
    /// Fast-forwarding past a loop body whose entry condition was false
    SkippingBody,
    /// Input exhausted with balanced scopes
    HaltedOk,
    /// A structural or runtime fault stopped execution
    HaltedError,
}

/// Where a batch came from, and its index in the scope table if recorded
enum Fetched {
    /// Fresh from the packer; `Some` when the batch was recorded
    Fresh(Option<usize>),
    /// Replayed from the scope table at this index
    Replayed(usize),
}

/// The interpreter: tape, data pointer, cursor, packer and loop bookkeeping
pub struct Interpreter<R: Read, I: Read, O: Write> {
    cursor: SourceCursor<R>,
    packer: Packer,
    scopes: ScopeTable,
    /// Record indices of the opens of every active loop, innermost last
    loops: Vec<usize>,
    /// Next record index to serve when replaying a loop body
    replay: Option<usize>,
    tape: Vec<u8>,
    ptr: usize,
    state: State,
    input: I,
    output: O,
}

impl<R: Read, I: Read, O: Write> Interpreter<R, I, O> {
    /// Create an interpreter over a program source, an input source and an
    /// output sink
    ///
    /// The tape is allocated fallibly; failure is an allocation fault
    /// reported before any instruction executes.
    pub fn new(program: R, input: I, output: O) -> VmResult<Self> {
        let mut tape = Vec::new();
        tape.try_reserve_exact(TAPE_LEN)?;
        tape.resize(TAPE_LEN, 0);
        Ok(Self {
            cursor: SourceCursor::new(program),
            packer: Packer::new(),
            scopes: ScopeTable::new(),
            loops: Vec::new(),
            replay: None,
            tape,
            ptr: 0,
            state: State::Running,
            input,
            output,
        })
    }

    /// Run the program to completion
    ///
    /// Performs the priming pass, then consumes batches until input is
    /// exhausted or a fault unwinds. The output sink is flushed on every
    /// exit path; bytes emitted before a fault stay emitted.
    pub fn run(&mut self) -> VmResult<()> {
        let result = self.run_inner();
        let flushed = self.output.flush();
        let result = result.and_then(|()| flushed.map_err(VmError::from));
        match &result {
            Ok(()) => {
                self.state = State::HaltedOk;
                debug!(
                    bytes = self.cursor.actual_position(),
                    instructions = self.cursor.virtual_position(),
                    "halted ok"
                );
            }
            Err(err) => {
                self.state = State::HaltedError;
                debug!(error = %err, "halted with fault");
            }
        }
        result
    }

    fn run_inner(&mut self) -> VmResult<()> {
        prime(&mut self.cursor)?;
        self.state = State::Running;

        loop {
            let Some((batch, pos, fetched)) = self.next_batch()? else {
                break;
            };
            if batch.len() == 1 {
                match batch.op(0) {
                    Opcode::JumpFwd => {
                        self.enter_loop(fetched)?;
                        continue;
                    }
                    Opcode::JumpBack => {
                        self.close_loop(pos)?;
                        continue;
                    }
                    _ => {}
                }
            }
            self.play(batch, pos)?;
        }

        if !self.loops.is_empty() {
            return Err(VmError::UnbalancedOpen {
                pos: self.cursor.pos(),
            });
        }
        Ok(())
    }

    /// Engine state; terminal after [`run`](Self::run) returns
    pub fn state(&self) -> State {
        self.state
    }

    /// The memory tape
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    /// Current data pointer
    pub fn pointer(&self) -> usize {
        self.ptr
    }

    fn cell(&self) -> u8 {
        self.tape[self.ptr]
    }

    /// Next batch, replayed from the scope table when a loop jumped back,
    /// otherwise pulled fresh from the packer (and recorded while any loop
    /// is live, so closes can replay it later).
    fn next_batch(&mut self) -> VmResult<Option<(Batch, SourcePos, Fetched)>> {
        if let Some(idx) = self.replay {
            if let Some((batch, pos)) = self.scopes.get(idx) {
                self.replay = Some(idx + 1);
                return Ok(Some((batch, pos, Fetched::Replayed(idx))));
            }
            // Caught up with the consumption frontier.
            self.replay = None;
        }

        let Some((batch, pos)) = self.packer.next_batch(&mut self.cursor)? else {
            return Ok(None);
        };
        let is_open = batch.len() == 1 && batch.op(0) == Opcode::JumpFwd;
        let recorded = if !self.loops.is_empty() || is_open {
            Some(self.scopes.record(batch, pos))
        } else {
            None
        };
        Ok(Some((batch, pos, Fetched::Fresh(recorded))))
    }

    /// Handle a loop-open batch
    fn enter_loop(&mut self, fetched: Fetched) -> VmResult<()> {
        let idx = match fetched {
            Fetched::Replayed(idx) => idx,
            // Opens are always recorded when fetched fresh.
            Fetched::Fresh(idx) => idx.unwrap_or_default(),
        };

        if self.cell() != 0 {
            self.loops.push(idx);
            trace!(idx, depth = self.loops.len(), "entered loop");
            return Ok(());
        }

        // Entry condition false: skip the body.
        if let Some(close) = self.scopes.close_of(idx) {
            // Fully recorded scope; jump straight past its close.
            self.replay = Some(close + 1);
        } else if !self.loops.is_empty() {
            self.skip_recorded()?;
        } else {
            // Top level, nothing beyond this open recorded yet: skip raw
            // bytes and drop the lone recorded open.
            self.state = State::SkippingBody;
            skip_scope(&mut self.cursor)?;
            self.state = State::Running;
            self.scopes.clear();
        }
        Ok(())
    }

    /// Consume and record batches until the skipped scope balances
    ///
    /// Used when the false loop sits inside an active region: the body must
    /// still land in the scope table because an outer iteration may need it.
    fn skip_recorded(&mut self) -> VmResult<()> {
        self.state = State::SkippingBody;
        let mut depth = 1usize;
        while depth > 0 {
            let Some((batch, _, _)) = self.next_batch()? else {
                return Err(VmError::UnbalancedOpen {
                    pos: self.cursor.pos(),
                });
            };
            if batch.len() == 1 {
                match batch.op(0) {
                    Opcode::JumpFwd => depth += 1,
                    Opcode::JumpBack => depth -= 1,
                    _ => {}
                }
            }
        }
        self.state = State::Running;
        Ok(())
    }

    /// Handle a loop-close batch
    fn close_loop(&mut self, pos: SourcePos) -> VmResult<()> {
        let Some(&open_idx) = self.loops.last() else {
            return Err(VmError::UnmatchedClose { pos });
        };

        if self.cell() != 0 {
            // Re-enter: replay from just past the matching open.
            self.replay = Some(open_idx + 1);
            return Ok(());
        }

        self.loops.pop();
        if self.loops.is_empty() {
            // Outermost loop closed; bookkeeping for the region is done.
            trace!(records = self.scopes.len(), "cleared loop region");
            self.scopes.clear();
            self.replay = None;
        }
        Ok(())
    }

    /// Execute a non-jump batch: its slots, `repeat + 1` times over
    fn play(&mut self, batch: Batch, pos: SourcePos) -> VmResult<()> {
        for _ in 0..=batch.repeat() {
            for op in batch.ops() {
                self.step(op, pos)?;
            }
        }
        Ok(())
    }

    /// Execute one primitive
    fn step(&mut self, op: Opcode, pos: SourcePos) -> VmResult<()> {
        match op {
            Opcode::PtrLeft => {
                if self.ptr == 0 {
                    return Err(VmError::PointerUnderflow { pos });
                }
                self.ptr -= 1;
            }
            Opcode::PtrRight => {
                if self.ptr + 1 >= self.tape.len() {
                    return Err(VmError::PointerOverflow { pos });
                }
                self.ptr += 1;
            }
            Opcode::CellInc => self.tape[self.ptr] = self.cell().wrapping_add(1),
            Opcode::CellDec => self.tape[self.ptr] = self.cell().wrapping_sub(1),
            Opcode::Output => self.output.write_all(&[self.cell()])?,
            Opcode::Input => {
                let mut byte = [0u8; 1];
                // On end of input the cell is left unchanged.
                if self.input.read(&mut byte)? == 1 {
                    self.tape[self.ptr] = byte[0];
                }
            }
            Opcode::JumpFwd | Opcode::JumpBack => {
                unreachable!("jumps are dispatched at batch granularity")
            }
        }
        Ok(())
    }
}
