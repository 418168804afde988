//! Buffered source cursor and position tracker
//!
//! Wraps the underlying byte source behind a small lookahead window that is
//! refilled from a larger block read, so system-level reads are amortized.
//! The cursor also owns the three position counters: actual bytes consumed,
//! instructions scheduled for execution, and line/column for diagnostics.

use std::fmt;
use std::io::Read;

use crate::error::VmResult;

/// Lookahead window size
const WINDOW: usize = 64;

/// Underlying block read size
const BLOCK: usize = 16 * 1024;

/// A 1-based line/column source position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    /// Line number, starting at 1
    pub line: u32,
    /// Column number, starting at 1
    pub column: u32,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Streaming source reader with a fixed lookahead window
pub struct SourceCursor<R: Read> {
    reader: R,
    block: Box<[u8]>,
    block_len: usize,
    block_pos: usize,
    window: [u8; WINDOW],
    window_len: usize,
    window_pos: usize,
    eof: bool,
    line: u32,
    column: u32,
    actual: u64,
    scheduled: u64,
}

impl<R: Read> SourceCursor<R> {
    /// Wrap a byte source
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            block: vec![0u8; BLOCK].into_boxed_slice(),
            block_len: 0,
            block_pos: 0,
            window: [0u8; WINDOW],
            window_len: 0,
            window_pos: 0,
            eof: false,
            line: 1,
            column: 1,
            actual: 0,
            scheduled: 0,
        }
    }

    /// Peek the next raw byte, or `None` at end of input
    ///
    /// Read failures are fatal I/O errors surfaced to the caller; nothing is
    /// retried.
    pub fn peek(&mut self) -> VmResult<Option<u8>> {
        if self.window_pos == self.window_len {
            self.refill()?;
        }
        if self.window_pos < self.window_len {
            Ok(Some(self.window[self.window_pos]))
        } else {
            Ok(None)
        }
    }

    /// Consume the previously peeked byte
    ///
    /// Advances the actual-position counter always, and line/column
    /// according to whether the byte is a newline.
    pub fn advance(&mut self) {
        debug_assert!(self.window_pos < self.window_len, "advance without peek");
        let byte = self.window[self.window_pos];
        self.window_pos += 1;
        self.actual += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Peek and consume in one step
    pub fn next_byte(&mut self) -> VmResult<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.advance();
        }
        Ok(byte)
    }

    /// Line/column of the next unconsumed byte
    pub fn pos(&self) -> SourcePos {
        SourcePos {
            line: self.line,
            column: self.column,
        }
    }

    /// Count of raw bytes consumed, instructions and commentary alike
    pub fn actual_position(&self) -> u64 {
        self.actual
    }

    /// Count of instructions scheduled for execution
    pub fn virtual_position(&self) -> u64 {
        self.scheduled
    }

    /// Record that one instruction was scheduled for execution
    ///
    /// Called by the packer for every instruction it packs; raw-skipped
    /// loop bodies never count.
    pub fn note_scheduled(&mut self) {
        self.scheduled += 1;
    }

    /// Refill the lookahead window from the block buffer, pulling a fresh
    /// block from the reader when the buffer is drained.
    fn refill(&mut self) -> VmResult<()> {
        self.window_pos = 0;
        self.window_len = 0;
        while self.window_len < WINDOW {
            if self.block_pos == self.block_len {
                if self.eof {
                    break;
                }
                let n = self.reader.read(&mut self.block)?;
                if n == 0 {
                    self.eof = true;
                    break;
                }
                self.block_len = n;
                self.block_pos = 0;
            }
            let take = (WINDOW - self.window_len).min(self.block_len - self.block_pos);
            self.window[self.window_len..self.window_len + take]
                .copy_from_slice(&self.block[self.block_pos..self.block_pos + take]);
            self.window_len += take;
            self.block_pos += take;
        }
        Ok(())
    }
}
