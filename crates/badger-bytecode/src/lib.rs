//! # Badger Bytecode
//!
//! This crate defines the packed instruction encoding for the Badger
//! Brainfuck interpreter.
//!
//! ## Design Principles
//!
//! - **Dense**: up to seven 3-bit instruction tags share one 32-bit word
//! - **Run-length aware**: a repeated single instruction collapses into one
//!   word with an 8-bit repeat count
//! - **Reproducible**: the bit layout is explicit and little-endian, with
//!   `pack`/`unpack` functions rather than implicit struct packing

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod batch;
pub mod classify;
pub mod error;
pub mod opcode;

pub use batch::Batch;
pub use classify::{classify, is_instruction};
pub use error::BytecodeError;
pub use opcode::Opcode;
