use thiserror::Error;

/// Fatal machine faults.
///
/// Every fault in this taxonomy latches the core into a terminal state:
/// execution stops, the driver's run loop exits, and the latched cause stays
/// observable through [`crate::RunState`] for the lifetime of the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// The fetched word carries a primary opcode with no assigned instruction.
    #[error("undefined basic opcode")]
    UndefinedOpcode,
    /// The fetched word selects the special form with an unassigned opcode.
    #[error("undefined special opcode")]
    UndefinedSpecialOpcode,
    /// A 257th pending message was enqueued.
    #[error("interrupt queue overflow: the processor has caught fire")]
    InterruptQueueOverflow,
}

#[cfg(test)]
mod tests {
    use super::FaultCode;

    #[test]
    fn overflow_fault_names_the_fire() {
        let rendered = FaultCode::InterruptQueueOverflow.to_string();
        assert!(rendered.contains("caught fire"), "got: {rendered}");
    }

    #[test]
    fn fault_codes_are_distinguishable() {
        assert_ne!(FaultCode::UndefinedOpcode, FaultCode::UndefinedSpecialOpcode);
        assert_ne!(
            FaultCode::UndefinedOpcode,
            FaultCode::InterruptQueueOverflow
        );
    }
}
