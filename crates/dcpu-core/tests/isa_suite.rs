//! Instruction-set conformance scenarios run through the public driver.

use dcpu_core::{Dcpu, Register, SnapshotIndex, StepOutcome};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// Builds an instruction word from its opcode and operand fields.
const fn word(op: u8, b: u8, a: u8) -> u16 {
    ((a as u16) << 10) | ((b as u16) << 5) | (op as u16)
}

/// Builds a special-form word from its opcode and "a" field.
const fn special(op: u8, a: u8) -> u16 {
    word(0, op, a)
}

/// Embedded-literal operand code for small values (`-1..=30`).
const fn lit(value: i16) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let code = (value + 0x21) as u8;
    code
}

fn step_cycles(cpu: &Dcpu) -> u16 {
    match cpu.step() {
        StepOutcome::Retired { cycles } => cycles,
        StepOutcome::Fault { cause } => panic!("unexpected fault: {cause}"),
    }
}

#[test]
fn set_a_to_a_short_program_constant() {
    let cpu = Dcpu::new();
    cpu.write(0, &[0x7C01, 0x0030]); // SET A, 0x30

    let cycles = step_cycles(&cpu);

    let registers = cpu.registers();
    assert_eq!(registers[Register::A.index()], 0x0030);
    assert_eq!(registers[SnapshotIndex::Pc.index()], 2);
    assert_eq!(registers[SnapshotIndex::Tick.index()], cycles);
}

#[test]
fn countdown_loop_terminates_with_i_zero() {
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x01, 0x06, lit(10)), // SET I, 10
            word(0x03, 0x06, lit(1)),  // :loop SUB I, 1
            word(0x13, 0x06, lit(0)),  // IFN I, 0
            word(0x01, 0x1C, lit(1)),  // SET PC, loop
        ],
    );

    for _ in 0..64 {
        if cpu.registers()[SnapshotIndex::Pc.index()] == 4 {
            break;
        }
        let _ = step_cycles(&cpu);
    }

    let registers = cpu.registers();
    assert_eq!(registers[Register::I.index()], 0);
    assert_eq!(registers[SnapshotIndex::Pc.index()], 4);
}

#[test]
fn call_and_return_restore_the_stack() {
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x01, 0x03, lit(4)),  // SET X, 4
            special(0x01, lit(3)),     // JSR sub
            word(0x01, 0x1C, lit(5)),  // SET PC, end
            word(0x0F, 0x03, lit(4)),  // :sub SHL X, 4
            word(0x01, 0x1C, 0x18),    // SET PC, POP
                                       // :end
        ],
    );

    for _ in 0..5 {
        let _ = step_cycles(&cpu);
    }

    let registers = cpu.registers();
    assert_eq!(registers[Register::X.index()], 0x0040);
    assert_eq!(registers[SnapshotIndex::Pc.index()], 5);
    assert_eq!(registers[SnapshotIndex::Sp.index()], 0);
}

#[test]
fn software_interrupt_round_trip() {
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            special(0x0A, lit(3)), // IAS handler
            special(0x08, 0x1F),   // INT 0x1234
            0x1234,
            special(0x0B, lit(0)), // :handler RFI
        ],
    );

    let _ = step_cycles(&cpu);
    let _ = step_cycles(&cpu);

    let registers = cpu.registers();
    assert_eq!(registers[SnapshotIndex::Pc.index()], 3);
    assert_eq!(registers[Register::A.index()], 0x1234);
    assert_eq!(registers[SnapshotIndex::Iq.index()], 1);
    assert_eq!(
        cpu.read(0xFFFE, 2),
        vec![0x0000, 0x0003],
        "saved A below saved PC"
    );

    let _ = step_cycles(&cpu);
    let registers = cpu.registers();
    assert_eq!(registers[SnapshotIndex::Iq.index()], 0);
    assert_eq!(registers[Register::A.index()], 0);
    assert_eq!(registers[SnapshotIndex::Pc.index()], 3);
    assert_eq!(registers[SnapshotIndex::Sp.index()], 0);
}

#[test]
fn assigning_to_a_literal_changes_nothing_but_pc_and_tick() {
    let cpu = Dcpu::new();
    cpu.write(0, &[word(0x01, 0x1F, 0x1F), 0x0030, 0x0005]);
    let before = cpu.read(0, 8);

    let cycles = step_cycles(&cpu);

    let registers = cpu.registers();
    assert_eq!(cpu.read(0, 8), before);
    assert_eq!(registers[SnapshotIndex::Pc.index()], 3);
    assert_eq!(registers[SnapshotIndex::Ex.index()], 0);
    assert_eq!(cycles, 3);
}

#[test]
fn skip_chain_guards_both_conditionals_as_one() {
    // Both conditions true: the guarded SET executes.
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x12, 0x00, 0x00),   // IFE A, A
            word(0x12, 0x01, 0x01),   // IFE B, B
            word(0x01, 0x02, lit(1)), // SET C, 1
        ],
    );
    for _ in 0..3 {
        let _ = step_cycles(&cpu);
    }
    assert_eq!(cpu.registers()[Register::C.index()], 1);

    // First condition false: the whole chain is skipped.
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x13, 0x00, 0x00),   // IFN A, A (false)
            word(0x12, 0x01, 0x01),   // IFE B, B
            word(0x01, 0x02, lit(1)), // SET C, 1
            word(0x01, 0x03, lit(5)), // SET X, 5
        ],
    );
    let _ = step_cycles(&cpu);
    let _ = step_cycles(&cpu);

    let registers = cpu.registers();
    assert_eq!(registers[Register::C.index()], 0);
    assert_eq!(registers[Register::X.index()], 5);
}

#[test]
fn push_pop_round_trip_restores_sp() {
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x01, 0x00, 0x1F), // SET A, 0x7F3F
            0x7F3F,
            word(0x01, 0x18, 0x00), // SET PUSH, A
            word(0x01, 0x01, 0x18), // SET B, POP
        ],
    );

    let _ = step_cycles(&cpu);
    let _ = step_cycles(&cpu);
    assert_eq!(cpu.registers()[SnapshotIndex::Sp.index()], 0xFFFF);
    assert_eq!(cpu.read(0xFFFF, 1), vec![0x7F3F]);

    let _ = step_cycles(&cpu);
    let registers = cpu.registers();
    assert_eq!(registers[Register::B.index()], 0x7F3F);
    assert_eq!(registers[SnapshotIndex::Sp.index()], 0);
}

#[test]
fn add_then_sub_returns_to_the_original_value() {
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x01, 0x00, 0x1F), // SET A, 0xFFF0
            0xFFF0,
            word(0x02, 0x00, lit(17)), // ADD A, 17 (carries)
            word(0x03, 0x00, lit(17)), // SUB A, 17
        ],
    );

    let _ = step_cycles(&cpu);
    let _ = step_cycles(&cpu);
    let registers = cpu.registers();
    assert_eq!(registers[Register::A.index()], 0x0001);
    assert_eq!(registers[SnapshotIndex::Ex.index()], 1);

    let _ = step_cycles(&cpu);
    let registers = cpu.registers();
    assert_eq!(registers[Register::A.index()], 0xFFF0);
    assert_eq!(registers[SnapshotIndex::Ex.index()], 0xFFFF, "borrow back out");
}

#[test]
fn embedded_minus_one_writes_all_ones() {
    let cpu = Dcpu::new();
    cpu.write(0, &[word(0x01, 0x00, lit(-1))]); // SET A, -1

    let cycles = step_cycles(&cpu);
    assert_eq!(cpu.registers()[Register::A.index()], 0xFFFF);
    assert_eq!(cycles, 1, "embedded literals fetch nothing");
}

#[rstest]
#[case::set_register(&[word(0x01, 0x00, lit(5))], 1)]
#[case::set_next_word(&[0x7C01, 0x0030], 2)]
#[case::add(&[word(0x02, 0x00, lit(1))], 1)]
#[case::mul(&[word(0x04, 0x00, lit(2))], 2)]
#[case::div_by_zero(&[word(0x06, 0x00, lit(0))], 3)]
#[case::shift(&[word(0x0F, 0x00, lit(4))], 2)]
#[case::conditional_taken(&[word(0x12, 0x00, 0x00)], 2)]
#[case::conditional_skipped(&[word(0x13, 0x00, 0x00), word(0x01, 0x01, lit(1))], 3)]
#[case::sti(&[word(0x1E, 0x00, lit(1))], 2)]
#[case::jsr(&[special(0x01, lit(9))], 3)]
#[case::ias(&[special(0x0A, lit(9))], 1)]
#[case::iaq(&[special(0x0C, lit(1))], 2)]
#[case::hwn(&[special(0x10, 0x00)], 2)]
#[case::hwq_unattached(&[special(0x11, lit(0))], 4)]
#[case::hwi_unattached(&[special(0x12, lit(0))], 4)]
fn claimed_cycles_match_the_instruction_set(#[case] program: &[u16], #[case] expected: u16) {
    let cpu = Dcpu::new();
    cpu.write(0, program);
    assert_eq!(step_cycles(&cpu), expected);
}

#[test]
fn hwq_on_an_unattached_index_zeroes_the_identity_registers() {
    let cpu = Dcpu::new();
    cpu.write(
        0,
        &[
            word(0x01, 0x00, lit(7)), // SET A, 7
            word(0x01, 0x01, lit(7)), // SET B, 7
            word(0x01, 0x02, lit(7)), // SET C, 7
            word(0x01, 0x03, lit(7)), // SET X, 7
            word(0x01, 0x04, lit(7)), // SET Y, 7
            special(0x11, lit(9)),    // HWQ 9
        ],
    );

    for _ in 0..6 {
        let _ = step_cycles(&cpu);
    }

    let registers = cpu.registers();
    for reg in [Register::A, Register::B, Register::C, Register::X, Register::Y] {
        assert_eq!(registers[reg.index()], 0, "{reg:?}");
    }
}
