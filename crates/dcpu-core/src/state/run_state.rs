use crate::FaultCode;

/// Host-observable execution state of one CPU instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// A fatal fault is latched; no further instruction will execute.
    FaultLatched(FaultCode),
}

impl RunState {
    /// Returns the latched fault, if the instance has halted on one.
    #[must_use]
    pub const fn latched_fault(self) -> Option<FaultCode> {
        match self {
            Self::FaultLatched(cause) => Some(cause),
            Self::Running => None,
        }
    }
}
