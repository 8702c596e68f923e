//! Execution driver: the run loop, cycle pacing, and the single
//! mutual-exclusion boundary that makes CPU state observable from other
//! threads only between instructions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::device::Device;
use crate::exec::{step_one, StepOutcome};
use crate::fault::FaultCode;
use crate::state::{CpuState, RunState, SNAPSHOT_WORDS};

/// Default pacing rate in ticks per second.
pub const DEFAULT_CLOCK_HZ: u32 = 1_000;

/// Behavior when the fetched word names no defined instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum UndefinedOpcodePolicy {
    /// Latch a fatal fault and halt the driver.
    #[default]
    Fault,
    /// Retire the word as a no-op, consuming its operand words.
    Nop,
}

/// Immutable configuration for one CPU instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuConfig {
    /// Pacing rate for [`Dcpu::run`], in ticks per second.
    pub clock_hz: u32,
    /// Undefined-opcode handling policy.
    pub undefined_opcode: UndefinedOpcodePolicy,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            undefined_opcode: UndefinedOpcodePolicy::Fault,
        }
    }
}

struct Machine {
    state: CpuState,
    devices: Vec<Box<dyn Device>>,
}

/// One DCPU-16 instance behind its mutual-exclusion boundary.
///
/// The execution thread and any number of observer threads share a `Dcpu`
/// (typically through an `Arc`). Every public operation acquires the one
/// internal lock, so observers only ever see instruction boundaries:
/// `read` returns a snapshot consistent with some boundary, `write` takes
/// effect at one, and overlapping writes serialize.
pub struct Dcpu {
    machine: Mutex<Machine>,
    halt: AtomicBool,
    config: CpuConfig,
    tick_duration: Duration,
}

impl Default for Dcpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Dcpu {
    /// Creates an instance with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    /// Creates an instance with an explicit configuration.
    #[must_use]
    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            machine: Mutex::new(Machine {
                state: CpuState::new(),
                devices: Vec::new(),
            }),
            halt: AtomicBool::new(false),
            config,
            tick_duration: Duration::from_secs(1) / config.clock_hz.max(1),
        }
    }

    /// A poisoned lock only means another thread panicked mid-observation;
    /// the machine state itself is only ever mutated one whole instruction
    /// at a time, so recover the guard.
    fn lock(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites memory starting at `addr`, truncating at the end of
    /// memory. Takes effect at an instruction boundary.
    pub fn write(&self, addr: u16, data: &[u16]) {
        self.lock().state.memory_mut().load(addr, data);
    }

    /// Copies up to `len` words starting at `addr`, truncated at the end of
    /// memory. The snapshot is consistent with an instruction boundary.
    #[must_use]
    pub fn read(&self, addr: u16, len: usize) -> Vec<u16> {
        self.lock().state.memory().copy_out(addr, len)
    }

    /// Register snapshot in the order `A,B,C,X,Y,Z,I,J,PC,SP,EX,IA,TICK,IQ`.
    #[must_use]
    pub fn registers(&self) -> [u16; SNAPSHOT_WORDS] {
        self.lock().state.register_snapshot()
    }

    /// Current execution state; reports the cause once a fault has latched.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.lock().state.run_state()
    }

    /// Attaches a hardware device. Devices must be attached before the run
    /// loop starts; hot-plug behavior is undefined.
    pub fn attach(&self, device: Box<dyn Device>) {
        self.lock().devices.push(device);
    }

    /// Number of attached devices (what `HWN` reports).
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.lock().devices.len()
    }

    /// Enqueues a hardware-originated interrupt message from any thread.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InterruptQueueOverflow`] when the queue is full;
    /// the fault is latched exactly as if the overflow happened in `INT`.
    pub fn interrupt(&self, message: u16) -> Result<(), FaultCode> {
        let mut machine = self.lock();
        let result = machine.state.interrupts_mut().enqueue(message);
        if let Err(cause) = result {
            machine.state.latch_fault(cause);
        }
        result
    }

    /// Executes exactly one instruction and returns its outcome. Never
    /// sleeps.
    pub fn step(&self) -> StepOutcome {
        let mut machine = self.lock();
        let Machine { state, devices } = &mut *machine;
        step_one(state, devices, &self.config)
    }

    /// Requests that [`Dcpu::run`] return at the next instruction boundary.
    pub fn halt(&self) {
        self.halt.store(true, Ordering::Release);
    }

    /// Clears a previous halt request so the run loop can be entered again.
    pub fn clear_halt(&self) {
        self.halt.store(false, Ordering::Release);
    }

    /// Executes instructions until halted or a fatal fault latches.
    ///
    /// Each instruction is paced to its claimed tick count: claimed ticks ×
    /// the per-tick duration, minus the measured execution time, is slept
    /// off when positive. The sleep happens with the lock released, so
    /// observers meet an instruction boundary instead of the pacing gap.
    ///
    /// # Errors
    ///
    /// Returns the latched [`FaultCode`] when execution hit a fatal fault;
    /// the same cause stays visible through [`Dcpu::run_state`].
    pub fn run(&self) -> Result<(), FaultCode> {
        while !self.halt.load(Ordering::Acquire) {
            let started = Instant::now();
            let cycles = match self.step() {
                StepOutcome::Retired { cycles } => cycles,
                StepOutcome::Fault { cause } => return Err(cause),
            };

            let budget = self.tick_duration.saturating_mul(u32::from(cycles));
            if let Some(remaining) = budget.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }
        Ok(())
    }
}
