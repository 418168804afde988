//! Byte classification tables
//!
//! Two fixed 256-entry lookup tables built at compile time. Any byte that is
//! not one of the eight instruction characters is commentary and is skipped
//! by every consumer; that is the language's sole comment mechanism.

use crate::opcode::Opcode;

const fn opcode_table() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    table[b'.' as usize] = Some(Opcode::Output);
    table[b',' as usize] = Some(Opcode::Input);
    table[b'<' as usize] = Some(Opcode::PtrLeft);
    table[b'>' as usize] = Some(Opcode::PtrRight);
    table[b'+' as usize] = Some(Opcode::CellInc);
    table[b'-' as usize] = Some(Opcode::CellDec);
    table[b'[' as usize] = Some(Opcode::JumpFwd);
    table[b']' as usize] = Some(Opcode::JumpBack);
    table
}

const fn flag_table() -> [bool; 256] {
    let ops = opcode_table();
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = ops[i].is_some();
        i += 1;
    }
    table
}

static OPCODES: [Option<Opcode>; 256] = opcode_table();
static IS_INSTRUCTION: [bool; 256] = flag_table();

/// Whether a raw byte denotes a primitive instruction
#[inline]
pub fn is_instruction(byte: u8) -> bool {
    IS_INSTRUCTION[byte as usize]
}

/// Map a raw byte to its instruction tag, if it has one
#[inline]
pub fn classify(byte: u8) -> Option<Opcode> {
    OPCODES[byte as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_bytes() {
        assert_eq!(classify(b'.'), Some(Opcode::Output));
        assert_eq!(classify(b','), Some(Opcode::Input));
        assert_eq!(classify(b'<'), Some(Opcode::PtrLeft));
        assert_eq!(classify(b'>'), Some(Opcode::PtrRight));
        assert_eq!(classify(b'+'), Some(Opcode::CellInc));
        assert_eq!(classify(b'-'), Some(Opcode::CellDec));
        assert_eq!(classify(b'['), Some(Opcode::JumpFwd));
        assert_eq!(classify(b']'), Some(Opcode::JumpBack));
    }

    #[test]
    fn test_commentary_bytes() {
        for byte in 0..=255u8 {
            let expected = b".,<>+-[]".contains(&byte);
            assert_eq!(is_instruction(byte), expected, "byte {byte}");
            assert_eq!(classify(byte).is_some(), expected, "byte {byte}");
        }
    }
}
