//! Instruction word layout and the assigned opcode tables.
//!
//! The layout is bit-exact with the public DCPU-16 encoding: with the LSB on
//! the right, a word is `aaaaaa bbbbb ooooo`. A zero primary opcode selects
//! the special form `aaaaaa ooooo 00000`, whose 5-bit opcode sits in the "b"
//! slot and whose single operand sits in the "a" slot.

/// Primary opcode field mask (bits 4..=0).
pub const OPCODE_MASK: u16 = 0x001F;
/// "b" operand field mask (bits 9..=5).
pub const B_FIELD_MASK: u16 = 0x03E0;
/// "a" operand field mask (bits 15..=10).
pub const A_FIELD_MASK: u16 = 0xFC00;
/// "b" operand field shift.
pub const B_FIELD_SHIFT: u16 = 5;
/// "a" operand field shift.
pub const A_FIELD_SHIFT: u16 = 10;

/// Splits an instruction word into `(opcode, b field, a field)`.
#[must_use]
pub const fn split_word(word: u16) -> (u8, u8, u8) {
    (
        (word & OPCODE_MASK) as u8,
        ((word & B_FIELD_MASK) >> B_FIELD_SHIFT) as u8,
        ((word & A_FIELD_MASK) >> A_FIELD_SHIFT) as u8,
    )
}

/// Basic two-operand opcode (`b` is the destination, `a` the source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum BasicOpcode {
    Set = 0x01,
    Add = 0x02,
    Sub = 0x03,
    Mul = 0x04,
    Mli = 0x05,
    Div = 0x06,
    Dvi = 0x07,
    Mod = 0x08,
    Mdi = 0x09,
    And = 0x0A,
    Bor = 0x0B,
    Xor = 0x0C,
    Shr = 0x0D,
    Asr = 0x0E,
    Shl = 0x0F,
    Ifb = 0x10,
    Ifc = 0x11,
    Ife = 0x12,
    Ifn = 0x13,
    Ifg = 0x14,
    Ifa = 0x15,
    Ifl = 0x16,
    Ifu = 0x17,
    Adx = 0x1A,
    Sbx = 0x1B,
    Sti = 0x1E,
    Std = 0x1F,
}

impl BasicOpcode {
    /// Every assigned basic opcode, in encoding order.
    pub const ALL: [Self; 27] = [
        Self::Set,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Mli,
        Self::Div,
        Self::Dvi,
        Self::Mod,
        Self::Mdi,
        Self::And,
        Self::Bor,
        Self::Xor,
        Self::Shr,
        Self::Asr,
        Self::Shl,
        Self::Ifb,
        Self::Ifc,
        Self::Ife,
        Self::Ifn,
        Self::Ifg,
        Self::Ifa,
        Self::Ifl,
        Self::Ifu,
        Self::Adx,
        Self::Sbx,
        Self::Sti,
        Self::Std,
    ];

    /// Decodes a 5-bit primary opcode value. Zero (the special form) and the
    /// unassigned values return `None`.
    #[must_use]
    pub const fn from_u5(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Set),
            0x02 => Some(Self::Add),
            0x03 => Some(Self::Sub),
            0x04 => Some(Self::Mul),
            0x05 => Some(Self::Mli),
            0x06 => Some(Self::Div),
            0x07 => Some(Self::Dvi),
            0x08 => Some(Self::Mod),
            0x09 => Some(Self::Mdi),
            0x0A => Some(Self::And),
            0x0B => Some(Self::Bor),
            0x0C => Some(Self::Xor),
            0x0D => Some(Self::Shr),
            0x0E => Some(Self::Asr),
            0x0F => Some(Self::Shl),
            0x10 => Some(Self::Ifb),
            0x11 => Some(Self::Ifc),
            0x12 => Some(Self::Ife),
            0x13 => Some(Self::Ifn),
            0x14 => Some(Self::Ifg),
            0x15 => Some(Self::Ifa),
            0x16 => Some(Self::Ifl),
            0x17 => Some(Self::Ifu),
            0x1A => Some(Self::Adx),
            0x1B => Some(Self::Sbx),
            0x1E => Some(Self::Sti),
            0x1F => Some(Self::Std),
            _ => None,
        }
    }

    /// True for the conditional family `IFB`..=`IFU`.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            Self::Ifb
                | Self::Ifc
                | Self::Ife
                | Self::Ifn
                | Self::Ifg
                | Self::Ifa
                | Self::Ifl
                | Self::Ifu
        )
    }
}

/// Special single-operand opcode (primary opcode zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum SpecialOpcode {
    Jsr = 0x01,
    Int = 0x08,
    Iag = 0x09,
    Ias = 0x0A,
    Rfi = 0x0B,
    Iaq = 0x0C,
    Hwn = 0x10,
    Hwq = 0x11,
    Hwi = 0x12,
}

impl SpecialOpcode {
    /// Every assigned special opcode, in encoding order.
    pub const ALL: [Self; 9] = [
        Self::Jsr,
        Self::Int,
        Self::Iag,
        Self::Ias,
        Self::Rfi,
        Self::Iaq,
        Self::Hwn,
        Self::Hwq,
        Self::Hwi,
    ];

    /// Decodes a 5-bit special opcode value.
    #[must_use]
    pub const fn from_u5(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Jsr),
            0x08 => Some(Self::Int),
            0x09 => Some(Self::Iag),
            0x0A => Some(Self::Ias),
            0x0B => Some(Self::Rfi),
            0x0C => Some(Self::Iaq),
            0x10 => Some(Self::Hwn),
            0x11 => Some(Self::Hwq),
            0x12 => Some(Self::Hwi),
            _ => None,
        }
    }
}

/// True when an operand code consumes the word after the opcode word
/// (`[next word + register]`, `PICK n`, `[next word]`, next-word literal).
#[must_use]
pub const fn operand_consumes_word(code: u8) -> bool {
    matches!(code, 0x10..=0x17 | 0x1A | 0x1E | 0x1F)
}

/// Word footprint of the instruction starting with `word`: the opcode word
/// plus every operand-fetch word its operand codes imply.
///
/// This is the walk a disassembler uses to advance through an opcode stream,
/// and the walk the executor uses to skip over a failed conditional's target.
#[must_use]
pub const fn instruction_words(word: u16) -> u16 {
    let (op, b_field, a_field) = split_word(word);
    let mut words = 1;
    if operand_consumes_word(a_field) {
        words += 1;
    }
    if op != 0 && operand_consumes_word(b_field) {
        words += 1;
    }
    words
}
