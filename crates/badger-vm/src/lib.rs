//! # Badger VM
//!
//! Execution pipeline for the Badger Brainfuck interpreter: a buffered
//! source cursor with position tracking, the bracket-matching scope pass,
//! the run-length instruction packer, and the engine that walks packed
//! batches against a fixed 30,000-cell tape.
//!
//! The pipeline is a single-threaded linear pull chain:
//!
//! ```text
//! raw bytes -> cursor -> classifier -> packer -> engine -> tape / stdio
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cursor;
pub mod error;
pub mod interpreter;
pub mod packer;
pub mod scope;

pub use cursor::{SourceCursor, SourcePos};
pub use error::{VmError, VmResult};
pub use interpreter::{Interpreter, State, TAPE_LEN};
pub use packer::{Packer, REPEAT_THRESHOLD};
pub use scope::{ScopeTable, prime, skip_scope};
