//! End-to-end interpreter tests
//!
//! Each test runs a complete program through the cursor/packer/engine
//! pipeline and checks the observable tape and output effects.

use std::io::empty;

use badger_vm::{Interpreter, State, TAPE_LEN, VmError};

/// Run a program to completion, returning its output
fn run_ok(program: &str, input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut vm = Interpreter::new(program.as_bytes(), input, &mut out).unwrap();
    vm.run().unwrap();
    assert_eq!(vm.state(), State::HaltedOk);
    drop(vm);
    out
}

/// Run a program expected to fault, returning the fault
fn run_err(program: &str) -> VmError {
    let mut vm = Interpreter::new(program.as_bytes(), empty(), Vec::new()).unwrap();
    let err = vm.run().unwrap_err();
    assert_eq!(vm.state(), State::HaltedError);
    err
}

#[test]
fn test_comment_only_source_halts_immediately() {
    let out = run_ok("hello world\nthis text has no instructions at all\n", &[]);
    assert!(out.is_empty());
}

#[test]
fn test_empty_source() {
    assert!(run_ok("", &[]).is_empty());
}

#[test]
fn test_leading_group_is_never_executed() {
    // The group would emit output if it ran; it must not.
    assert!(run_ok("[.+.]", &[]).is_empty());
}

#[test]
fn test_execution_starts_after_leading_group() {
    let out = run_ok("[a header with + and . inside]+.", &[]);
    assert_eq!(out, vec![1]);
}

#[test]
fn test_inner_loops_keep_conditional_semantics() {
    // Only the leading group is a comment; the second loop runs normally.
    let mut out = Vec::new();
    let mut vm =
        Interpreter::new(&b"[comment]+++[->+<]"[..], empty(), &mut out).unwrap();
    vm.run().unwrap();
    assert_eq!(vm.tape()[0], 0);
    assert_eq!(vm.tape()[1], 3);
}

#[test]
fn test_stray_close_position() {
    match run_err(" ]") {
        VmError::UnmatchedClose { pos } => assert_eq!((pos.line, pos.column), (1, 2)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_runtime_stray_close_position() {
    match run_err("+\n]") {
        VmError::UnmatchedClose { pos } => assert_eq!((pos.line, pos.column), (2, 1)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_run_length_packing_is_unobservable() {
    // 300 increments cross both the repeat threshold and the 256-play cap;
    // 3 increments stay below the threshold and go through plain slots.
    // Net tape effect must be the arithmetic result either way.
    let compressed = format!("{}.", "+".repeat(300));
    assert_eq!(run_ok(&compressed, &[]), vec![(300 % 256) as u8]);

    let plain = "+++.";
    assert_eq!(run_ok(plain, &[]), vec![3]);
}

#[test]
fn test_cell_increment_wraps() {
    let program = format!("{}.", "+".repeat(256));
    assert_eq!(run_ok(&program, &[]), vec![0]);
}

#[test]
fn test_cell_decrement_wraps() {
    assert_eq!(run_ok("-.", &[]), vec![255]);
}

#[test]
fn test_transfer_loop() {
    let mut out = Vec::new();
    let mut vm = Interpreter::new(&b"+++[->+<]"[..], empty(), &mut out).unwrap();
    vm.run().unwrap();
    assert_eq!(vm.tape()[0], 0);
    assert_eq!(vm.tape()[1], 3);
    assert_eq!(vm.pointer(), 0);
}

#[test]
fn test_pointer_underflow() {
    assert!(matches!(run_err("<"), VmError::PointerUnderflow { .. }));
}

#[test]
fn test_pointer_overflow() {
    let program = ">".repeat(TAPE_LEN);
    let mut vm = Interpreter::new(program.as_bytes(), empty(), Vec::new()).unwrap();
    assert!(matches!(
        vm.run(),
        Err(VmError::PointerOverflow { .. })
    ));
}

#[test]
fn test_pointer_reaches_last_cell() {
    let program = format!("{}+", ">".repeat(TAPE_LEN - 1));
    let mut vm = Interpreter::new(program.as_bytes(), empty(), Vec::new()).unwrap();
    vm.run().unwrap();
    assert_eq!(vm.pointer(), TAPE_LEN - 1);
    assert_eq!(vm.tape()[TAPE_LEN - 1], 1);
}

#[test]
fn test_single_output_instruction() {
    let program = format!("{}.", "+".repeat(65));
    let out = run_ok(&program, &[]);
    assert_eq!(out, b"A");
}

#[test]
fn test_input_reads_one_byte() {
    assert_eq!(run_ok(",.", b"Z"), b"Z");
}

#[test]
fn test_input_at_eof_leaves_cell_unchanged() {
    assert_eq!(run_ok("+++,.", &[]), vec![3]);
}

#[test]
fn test_cat_until_zero_byte() {
    assert_eq!(run_ok(",[.,]", b"hi\0"), b"hi");
}

#[test]
fn test_nested_loops_multiply() {
    let mut out = Vec::new();
    let mut vm =
        Interpreter::new(&b"++[>+++[>++<-]<-]"[..], empty(), &mut out).unwrap();
    vm.run().unwrap();
    assert_eq!(&vm.tape()[..3], &[0, 0, 12]);
}

#[test]
fn test_false_inner_loop_inside_active_loop() {
    // The inner loop body is skipped on the only iteration but must still
    // leave the outer loop's bookkeeping intact.
    let mut vm = Interpreter::new(&b"+[>[-]<-]"[..], empty(), Vec::new()).unwrap();
    vm.run().unwrap();
    assert_eq!(vm.state(), State::HaltedOk);
    assert_eq!(vm.tape()[0], 0);
}

#[test]
fn test_unclosed_scope_at_eof() {
    assert!(matches!(run_err("+[-"), VmError::UnbalancedOpen { .. }));
}

#[test]
fn test_hello_world() {
    let program = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]\
                   >>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
    assert_eq!(run_ok(program, &[]), b"Hello World!\n");
}
