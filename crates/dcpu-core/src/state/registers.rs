/// Number of general-purpose registers (`A` through `J`).
pub const GENERAL_REGISTER_COUNT: usize = 8;

/// Number of words in a register snapshot.
pub const SNAPSHOT_WORDS: usize = 14;

/// General-purpose register, named by operand codes `0x00`..=`0x07`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    A = 0,
    B = 1,
    C = 2,
    X = 3,
    Y = 4,
    Z = 5,
    I = 6,
    J = 7,
}

impl Register {
    /// Ordered list matching the operand-code numbering.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::A,
        Self::B,
        Self::C,
        Self::X,
        Self::Y,
        Self::Z,
        Self::I,
        Self::J,
    ];

    /// Returns the register-file index (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a register operand code (`0x00`..=`0x07`).
    #[must_use]
    pub const fn from_operand_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            3 => Some(Self::X),
            4 => Some(Self::Y),
            5 => Some(Self::Z),
            6 => Some(Self::I),
            7 => Some(Self::J),
            _ => None,
        }
    }
}

/// Position of each word in the output of
/// [`CpuState::register_snapshot`](crate::CpuState::register_snapshot).
///
/// The order is `A,B,C,X,Y,Z,I,J,PC,SP,EX,IA,TICK,IQ`, where `IQ` is 1 iff
/// interrupt queueing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(usize)]
#[allow(missing_docs)]
pub enum SnapshotIndex {
    A = 0,
    B = 1,
    C = 2,
    X = 3,
    Y = 4,
    Z = 5,
    I = 6,
    J = 7,
    Pc = 8,
    Sp = 9,
    Ex = 10,
    Ia = 11,
    Tick = 12,
    Iq = 13,
}

impl SnapshotIndex {
    /// Returns the snapshot array index for this field.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}
