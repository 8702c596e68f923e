//! Instruction execution pipeline.
//!
//! [`step_one`] is one complete instruction boundary: opcode fetch, operand
//! resolution ("a" before "b"), the instruction body, conditional-skip
//! chaining, and interrupt delivery. The caller provides the
//! mutual-exclusion boundary; everything here assumes exclusive access.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use crate::cpu::{CpuConfig, UndefinedOpcodePolicy};
use crate::device::Device;
use crate::encoding::{self, BasicOpcode, SpecialOpcode};
use crate::fault::FaultCode;
use crate::operand::{resolve, OperandRole};
use crate::state::{CpuState, Register};
use crate::timing;

/// Outcome of one instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The instruction retired; `cycles` is the claimed tick delta,
    /// reconstructed modulo 2^16 across counter wrap.
    Retired {
        /// Ticks claimed by the instruction, including all fetches.
        cycles: u16,
    },
    /// A fatal fault latched the core; no further instruction will run.
    Fault {
        /// The latched cause.
        cause: FaultCode,
    },
}

/// Executes exactly one instruction, including boundary interrupt delivery.
///
/// On a latched instance this is a no-op that keeps reporting the fault.
pub fn step_one(
    state: &mut CpuState,
    devices: &mut [Box<dyn Device>],
    config: &CpuConfig,
) -> StepOutcome {
    if let Some(cause) = state.run_state().latched_fault() {
        return StepOutcome::Fault { cause };
    }

    let tick_before = state.tick();
    let word = state.next_word();
    let (op_field, b_field, a_field) = encoding::split_word(word);

    let executed = if op_field == 0 {
        execute_special(state, devices, config, b_field, a_field)
    } else {
        execute_basic(state, config, op_field, b_field, a_field)
    };

    if let Err(cause) = executed {
        state.latch_fault(cause);
        return StepOutcome::Fault { cause };
    }

    deliver_pending_interrupt(state);

    StepOutcome::Retired {
        cycles: state.tick().wrapping_sub(tick_before),
    }
}

#[allow(clippy::too_many_lines)]
fn execute_basic(
    state: &mut CpuState,
    config: &CpuConfig,
    op_field: u8,
    b_field: u8,
    a_field: u8,
) -> Result<(), FaultCode> {
    let Some(op) = BasicOpcode::from_u5(op_field) else {
        return match config.undefined_opcode {
            UndefinedOpcodePolicy::Fault => Err(FaultCode::UndefinedOpcode),
            UndefinedOpcodePolicy::Nop => {
                consume_operand_words(state, a_field, Some(b_field));
                Ok(())
            }
        };
    };

    let a = resolve(state, a_field, OperandRole::A);
    let b = resolve(state, b_field, OperandRole::B);
    let av = a.read(state);
    let bv = b.read(state);

    match op {
        BasicOpcode::Set => b.write(state, av),
        BasicOpcode::Add => {
            let sum = u32::from(bv) + u32::from(av);
            state.set_ex(u16::from(sum > 0xFFFF));
            b.write(state, sum as u16);
        }
        BasicOpcode::Sub => {
            let diff = i32::from(bv) - i32::from(av);
            state.set_ex(if diff < 0 { 0xFFFF } else { 0 });
            b.write(state, diff as u16);
        }
        BasicOpcode::Mul => {
            let product = u32::from(bv) * u32::from(av);
            state.set_ex((product >> 16) as u16);
            b.write(state, product as u16);
        }
        BasicOpcode::Mli => {
            let product = i32::from(bv as i16) * i32::from(av as i16);
            state.set_ex((product >> 16) as u16);
            b.write(state, product as u16);
        }
        BasicOpcode::Div => {
            if av == 0 {
                state.set_ex(0);
                b.write(state, 0);
            } else {
                let fraction = (u32::from(bv) << 16) / u32::from(av);
                state.set_ex(fraction as u16);
                b.write(state, bv / av);
            }
        }
        BasicOpcode::Dvi => {
            if av == 0 {
                state.set_ex(0);
                b.write(state, 0);
            } else {
                // i64 keeps -0x8000 / -1 and the <<16 widening in range.
                let lhs = i64::from(bv as i16);
                let rhs = i64::from(av as i16);
                state.set_ex(((lhs << 16) / rhs) as u16);
                b.write(state, (lhs / rhs) as u16);
            }
        }
        BasicOpcode::Mod => b.write(state, if av == 0 { 0 } else { bv % av }),
        BasicOpcode::Mdi => {
            let remainder = if av == 0 {
                0
            } else {
                (bv as i16).wrapping_rem(av as i16) as u16
            };
            b.write(state, remainder);
        }
        BasicOpcode::And => b.write(state, bv & av),
        BasicOpcode::Bor => b.write(state, bv | av),
        BasicOpcode::Xor => b.write(state, bv ^ av),
        BasicOpcode::Shr => {
            let shift = u32::from(av).min(63);
            let widened = (u64::from(bv) << 16) >> shift;
            state.set_ex(widened as u16);
            b.write(state, (widened >> 16) as u16);
        }
        BasicOpcode::Asr => {
            let shift = u32::from(av).min(63);
            let widened = (i64::from(bv as i16) << 16) >> shift;
            state.set_ex(widened as u16);
            b.write(state, (widened >> 16) as u16);
        }
        BasicOpcode::Shl => {
            let shift = u32::from(av);
            let widened = if shift > 31 { 0 } else { u64::from(bv) << shift };
            state.set_ex((widened >> 16) as u16);
            b.write(state, widened as u16);
        }
        BasicOpcode::Ifb => skip_unless(state, (bv & av) != 0),
        BasicOpcode::Ifc => skip_unless(state, (bv & av) == 0),
        BasicOpcode::Ife => skip_unless(state, bv == av),
        BasicOpcode::Ifn => skip_unless(state, bv != av),
        BasicOpcode::Ifg => skip_unless(state, bv > av),
        BasicOpcode::Ifa => skip_unless(state, (bv as i16) > (av as i16)),
        BasicOpcode::Ifl => skip_unless(state, bv < av),
        BasicOpcode::Ifu => skip_unless(state, (bv as i16) < (av as i16)),
        BasicOpcode::Adx => {
            let sum = u32::from(bv) + u32::from(av) + u32::from(state.ex());
            state.set_ex(u16::from(sum > 0xFFFF));
            b.write(state, sum as u16);
        }
        BasicOpcode::Sbx => {
            let diff = i32::from(bv) - i32::from(av) + i32::from(state.ex());
            state.set_ex(if diff < 0 { 0xFFFF } else { 0 });
            b.write(state, diff as u16);
        }
        BasicOpcode::Sti => {
            b.write(state, av);
            state.set_gpr(Register::I, state.gpr(Register::I).wrapping_add(1));
            state.set_gpr(Register::J, state.gpr(Register::J).wrapping_add(1));
        }
        BasicOpcode::Std => {
            b.write(state, av);
            state.set_gpr(Register::I, state.gpr(Register::I).wrapping_sub(1));
            state.set_gpr(Register::J, state.gpr(Register::J).wrapping_sub(1));
        }
    }

    state.add_cycles(timing::basic_extra_cycles(op));
    Ok(())
}

fn execute_special(
    state: &mut CpuState,
    devices: &mut [Box<dyn Device>],
    config: &CpuConfig,
    op_field: u8,
    a_field: u8,
) -> Result<(), FaultCode> {
    let Some(op) = SpecialOpcode::from_u5(op_field) else {
        return match config.undefined_opcode {
            UndefinedOpcodePolicy::Fault => Err(FaultCode::UndefinedSpecialOpcode),
            UndefinedOpcodePolicy::Nop => {
                consume_operand_words(state, a_field, None);
                Ok(())
            }
        };
    };

    let a = resolve(state, a_field, OperandRole::A);
    let av = a.read(state);

    match op {
        SpecialOpcode::Jsr => {
            let return_to = state.pc();
            state.push_word(return_to);
            state.set_pc(av);
        }
        SpecialOpcode::Int => state.interrupts_mut().enqueue(av)?,
        SpecialOpcode::Iag => a.write(state, state.ia()),
        SpecialOpcode::Ias => state.set_ia(av),
        SpecialOpcode::Rfi => {
            state.interrupts_mut().set_queueing(false);
            let saved_a = state.pop_word();
            state.set_gpr(Register::A, saved_a);
            let saved_pc = state.pop_word();
            state.set_pc(saved_pc);
        }
        SpecialOpcode::Iaq => state.interrupts_mut().set_queueing(av != 0),
        SpecialOpcode::Hwn => {
            let count = u16::try_from(devices.len()).unwrap_or(u16::MAX);
            a.write(state, count);
        }
        SpecialOpcode::Hwq => hardware_query(state, devices, av),
        SpecialOpcode::Hwi => {
            if let Some(device) = devices.get_mut(usize::from(av)) {
                device.interrupt(state);
            }
        }
    }

    state.add_cycles(timing::special_extra_cycles(op));
    Ok(())
}

/// Fills `A,B,C,X,Y` from the device's identity, or zeroes for an
/// unattached index.
fn hardware_query(state: &mut CpuState, devices: &[Box<dyn Device>], index: u16) {
    let (id, version, manufacturer) = devices.get(usize::from(index)).map_or((0, 0, 0), |device| {
        (device.hardware_id(), device.version(), device.manufacturer())
    });
    state.set_gpr(Register::A, id as u16);
    state.set_gpr(Register::B, (id >> 16) as u16);
    state.set_gpr(Register::C, version);
    state.set_gpr(Register::X, manufacturer as u16);
    state.set_gpr(Register::Y, (manufacturer >> 16) as u16);
}

fn skip_unless(state: &mut CpuState, condition: bool) {
    if !condition {
        skip_chain(state);
    }
}

/// Skips the next instruction's full word footprint, chaining through
/// consecutive conditionals so a chain acts as one composite guard.
///
/// Skipped words advance `PC` without fetch charges; each skipped
/// instruction costs [`timing::SKIP_CYCLES`] flat.
fn skip_chain(state: &mut CpuState) {
    // An address space consisting entirely of conditionals would chain
    // forever once PC wraps; one full pass is the hard ceiling.
    for _ in 0..crate::memory::MEMORY_WORDS {
        let word = state.memory().word(state.pc());
        state.set_pc(state.pc().wrapping_add(encoding::instruction_words(word)));
        state.add_cycles(timing::SKIP_CYCLES);

        let (op_field, _, _) = encoding::split_word(word);
        let chained =
            matches!(BasicOpcode::from_u5(op_field), Some(op) if op.is_conditional());
        if !chained {
            break;
        }
    }
}

/// Advances `PC` over the operand words of an instruction retired as a
/// no-op, charging the usual fetch cycles.
fn consume_operand_words(state: &mut CpuState, a_field: u8, b_field: Option<u8>) {
    if encoding::operand_consumes_word(a_field) {
        let _ = state.next_word();
    }
    if let Some(b_field) = b_field {
        if encoding::operand_consumes_word(b_field) {
            let _ = state.next_word();
        }
    }
}

/// Delivers at most one queued interrupt at the instruction boundary.
///
/// With `IA = 0` the head message is dequeued and discarded; it must not
/// linger in the queue.
fn deliver_pending_interrupt(state: &mut CpuState) {
    if state.interrupts().queueing() {
        return;
    }
    let Some(message) = state.interrupts_mut().dequeue() else {
        return;
    };
    if state.ia() == 0 {
        return;
    }

    state.interrupts_mut().set_queueing(true);
    let pc = state.pc();
    state.push_word(pc);
    let a = state.gpr(Register::A);
    state.push_word(a);
    state.set_pc(state.ia());
    state.set_gpr(Register::A, message);
}
