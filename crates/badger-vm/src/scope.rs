//! Bracket scope matching
//!
//! One reentrant depth-tracking routine serves both call sites that need to
//! move past a bracketed region without executing it: the one-time priming
//! pass over a leading comment group, and the runtime skip of a loop body
//! whose entry condition is false. Keeping a single implementation
//! guarantees identical bracket-matching behavior in both.
//!
//! The module also holds [`ScopeTable`], the arena-style record of packed
//! batches inside the currently active loop region.

use std::io::Read;

use badger_bytecode::{Batch, Opcode, classify};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cursor::{SourceCursor, SourcePos};
use crate::error::{VmError, VmResult};

/// Skip a bracketed region the cursor is already inside
///
/// Call with the cursor positioned just past an opening bracket; consumes
/// up to and including the matching closing bracket, tracking nested depth.
/// End of input before the scope balances is a structural fault.
pub fn skip_scope<R: Read>(cursor: &mut SourceCursor<R>) -> VmResult<()> {
    let mut depth = 1usize;
    while let Some(byte) = cursor.next_byte()? {
        match classify(byte) {
            Some(Opcode::JumpFwd) => depth += 1,
            Some(Opcode::JumpBack) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
    Err(VmError::UnbalancedOpen { pos: cursor.pos() })
}

/// The priming pass, run once before any instruction executes
///
/// Skips commentary from the start of input. If the first meaningful
/// instruction is an opening bracket, the whole leading top-level group is
/// a header comment and is skipped unconditionally, independent of any cell
/// value; the convention applies to the leading group only, inner loops
/// keep the normal cell-conditional semantics. A leading closing bracket is
/// a structural fault. Any other instruction stops priming and is left
/// unconsumed for the packer.
pub fn prime<R: Read>(cursor: &mut SourceCursor<R>) -> VmResult<()> {
    while let Some(byte) = cursor.peek()? {
        match classify(byte) {
            None => cursor.advance(),
            Some(Opcode::JumpFwd) => {
                cursor.advance();
                skip_scope(cursor)?;
                debug!(pos = %cursor.pos(), "skipped leading comment group");
                return Ok(());
            }
            Some(Opcode::JumpBack) => {
                return Err(VmError::UnmatchedClose { pos: cursor.pos() });
            }
            Some(_) => return Ok(()),
        }
    }
    Ok(())
}

/// Recorded batches for the active loop region
///
/// While any loop is live, every batch consumed from the packer is recorded
/// here so closing brackets can replay the loop body without re-reading raw
/// bytes. Bracket batches are paired as they arrive; the whole table is
/// cleared when nesting returns to depth zero, so bookkeeping never grows
/// across a long straight-line program.
#[derive(Default)]
pub struct ScopeTable {
    records: Vec<(Batch, SourcePos)>,
    open_stack: Vec<usize>,
    close_of: FxHashMap<usize, usize>,
}

impl ScopeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded batches
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a consumed batch, pairing bracket batches, and return its index
    pub fn record(&mut self, batch: Batch, pos: SourcePos) -> usize {
        let idx = self.records.len();
        self.records.push((batch, pos));
        if batch.len() == 1 {
            match batch.op(0) {
                Opcode::JumpFwd => self.open_stack.push(idx),
                Opcode::JumpBack => {
                    // A close with nothing to pop is reported by the engine;
                    // it simply stays unpaired here.
                    if let Some(open) = self.open_stack.pop() {
                        self.close_of.insert(open, idx);
                    }
                }
                _ => {}
            }
        }
        idx
    }

    /// The recorded batch at `idx`, if present
    pub fn get(&self, idx: usize) -> Option<(Batch, SourcePos)> {
        self.records.get(idx).copied()
    }

    /// Index of the close batch matching the open recorded at `open_idx`
    ///
    /// `None` while the close has not been consumed yet.
    pub fn close_of(&self, open_idx: usize) -> Option<usize> {
        self.close_of.get(&open_idx).copied()
    }

    /// Drop all records; invoked when nesting returns to depth zero
    pub fn clear(&mut self) {
        self.records.clear();
        self.open_stack.clear();
        self.close_of.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(src: &[u8]) -> SourceCursor<&[u8]> {
        SourceCursor::new(src)
    }

    /// Consume the opening bracket the test source starts with
    fn advance_past_open(c: &mut SourceCursor<&[u8]>) {
        assert_eq!(c.peek().unwrap(), Some(b'['));
        c.advance();
    }

    #[test]
    fn test_skip_scope_flat() {
        let mut c = cursor(b"[+++]after");
        advance_past_open(&mut c);
        skip_scope(&mut c).unwrap();
        assert_eq!(c.peek().unwrap(), Some(b'a'));
    }

    #[test]
    fn test_skip_scope_nested() {
        let mut c = cursor(b"[+[->]+[[]]].");
        advance_past_open(&mut c);
        skip_scope(&mut c).unwrap();
        assert_eq!(c.peek().unwrap(), Some(b'.'));
    }

    #[test]
    fn test_skip_scope_unbalanced() {
        let mut c = cursor(b"[+[->]");
        advance_past_open(&mut c);
        assert!(matches!(
            skip_scope(&mut c),
            Err(VmError::UnbalancedOpen { .. })
        ));
    }

    #[test]
    fn test_prime_skips_leading_group() {
        let mut c = cursor(b"comment [more +.- comment] +");
        prime(&mut c).unwrap();
        assert_eq!(c.peek().unwrap(), Some(b' '));
    }

    #[test]
    fn test_prime_stops_at_first_instruction() {
        let mut c = cursor(b"note: +[-]");
        prime(&mut c).unwrap();
        assert_eq!(c.peek().unwrap(), Some(b'+'));
    }

    #[test]
    fn test_prime_reports_stray_close() {
        let mut c = cursor(b"ab\nc]");
        let err = prime(&mut c).unwrap_err();
        match err {
            VmError::UnmatchedClose { pos } => {
                assert_eq!((pos.line, pos.column), (2, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prime_comment_only_source() {
        let mut c = cursor(b"nothing to run here\n");
        prime(&mut c).unwrap();
        assert_eq!(c.peek().unwrap(), None);
    }

    #[test]
    fn test_scope_table_pairs_brackets() {
        let mut table = ScopeTable::new();
        let pos = SourcePos { line: 1, column: 1 };
        let open = table.record(Batch::solo(Opcode::JumpFwd), pos);
        table.record(Batch::solo(Opcode::CellDec), pos);
        let inner_open = table.record(Batch::solo(Opcode::JumpFwd), pos);
        let inner_close = table.record(Batch::solo(Opcode::JumpBack), pos);
        let close = table.record(Batch::solo(Opcode::JumpBack), pos);

        assert_eq!(table.close_of(open), Some(close));
        assert_eq!(table.close_of(inner_open), Some(inner_close));
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.close_of(open), None);
    }
}
