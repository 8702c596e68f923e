//! Cycle-accurate DCPU-16 emulator core.
//!
//! The crate models the 16-bit word-addressed DCPU-16: 64 Ki words of RAM,
//! eight general registers plus `PC`/`SP`/`EX`/`IA`, the full basic and
//! special instruction sets with their per-opcode cycle costs, the queued
//! interrupt pipeline, and a paced, thread-safe execution driver. The
//! assembler, disassembler and concrete hardware devices live outside this
//! crate and integrate through [`Dcpu`]'s memory/register operations and the
//! [`Device`] port.

/// Word-addressed RAM and the program-word loading contract.
pub mod memory;
pub use memory::{words_from_be_bytes, Memory, MEMORY_WORDS};

/// Architectural CPU state model.
pub mod state;
pub use state::{
    CpuState, Register, RunState, SnapshotIndex, GENERAL_REGISTER_COUNT, SNAPSHOT_WORDS,
};

/// Instruction word layout and the assigned opcode tables.
pub mod encoding;
pub use encoding::{
    instruction_words, operand_consumes_word, split_word, BasicOpcode, SpecialOpcode,
};

/// Operand resolution to read/write targets.
pub mod operand;
pub use operand::{OperandRole, Target};

/// Fault taxonomy.
pub mod fault;
pub use fault::FaultCode;

/// Per-opcode cycle costs.
pub mod timing;
pub use timing::{basic_extra_cycles, special_extra_cycles, SKIP_CYCLES};

/// Interrupt controller state.
pub mod interrupt;
pub use interrupt::{InterruptQueue, INTERRUPT_QUEUE_CAPACITY};

/// Instruction execution pipeline.
pub mod exec;
pub use exec::{step_one, StepOutcome};

/// Hardware device port.
pub mod device;
pub use device::Device;

/// Execution driver and host-facing API.
pub mod cpu;
pub use cpu::{CpuConfig, Dcpu, UndefinedOpcodePolicy, DEFAULT_CLOCK_HZ};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
