//! Interrupt controller state: the pending FIFO and the queueing flag.

use std::collections::VecDeque;

use crate::fault::FaultCode;

/// Maximum number of pending interrupt messages.
pub const INTERRUPT_QUEUE_CAPACITY: usize = 256;

/// Bounded FIFO of pending 16-bit interrupt messages plus the queueing flag.
///
/// While the flag is set, delivery is suppressed and messages accumulate;
/// while clear, the execution pipeline drains at most one message per
/// instruction boundary.
#[derive(Debug)]
pub struct InterruptQueue {
    pending: VecDeque<u16>,
    queueing: bool,
}

impl Default for InterruptQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptQueue {
    /// Creates an empty queue with delivery enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(INTERRUPT_QUEUE_CAPACITY),
            queueing: false,
        }
    }

    /// Appends a message in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InterruptQueueOverflow`] when the queue already
    /// holds [`INTERRUPT_QUEUE_CAPACITY`] messages; the overflow is fatal, the
    /// message is never dropped silently.
    pub fn enqueue(&mut self, message: u16) -> Result<(), FaultCode> {
        if self.pending.len() == INTERRUPT_QUEUE_CAPACITY {
            return Err(FaultCode::InterruptQueueOverflow);
        }
        self.pending.push_back(message);
        Ok(())
    }

    /// Removes and returns the oldest pending message.
    pub fn dequeue(&mut self) -> Option<u16> {
        self.pending.pop_front()
    }

    /// Number of pending messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when no message is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True while delivery is suppressed.
    #[must_use]
    pub const fn queueing(&self) -> bool {
        self.queueing
    }

    /// Enables or disables queued-only mode.
    pub const fn set_queueing(&mut self, queueing: bool) {
        self.queueing = queueing;
    }
}
