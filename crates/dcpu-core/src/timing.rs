//! Per-opcode cycle costs.
//!
//! Fetch cycles are accounted where the fetch happens: the opcode word and
//! every operand word cost one tick each as they are read. The tables here
//! hold only the cycles an opcode charges beyond its fetches.

use crate::encoding::{BasicOpcode, SpecialOpcode};

/// Cycle cost of skipping one instruction after a false conditional.
///
/// Skipped words advance `PC` without per-word fetch charges; each skipped
/// instruction in a chain costs this flat amount instead.
pub const SKIP_CYCLES: u16 = 1;

/// Extra cycles charged by a basic opcode beyond its word fetches.
#[must_use]
pub const fn basic_extra_cycles(op: BasicOpcode) -> u16 {
    match op {
        BasicOpcode::Set
        | BasicOpcode::Add
        | BasicOpcode::Sub
        | BasicOpcode::And
        | BasicOpcode::Bor
        | BasicOpcode::Xor => 0,
        BasicOpcode::Mul
        | BasicOpcode::Mli
        | BasicOpcode::Shr
        | BasicOpcode::Asr
        | BasicOpcode::Shl
        | BasicOpcode::Adx
        | BasicOpcode::Sbx
        | BasicOpcode::Sti
        | BasicOpcode::Std => 1,
        BasicOpcode::Div | BasicOpcode::Dvi | BasicOpcode::Mod | BasicOpcode::Mdi => 2,
        BasicOpcode::Ifb
        | BasicOpcode::Ifc
        | BasicOpcode::Ife
        | BasicOpcode::Ifn
        | BasicOpcode::Ifg
        | BasicOpcode::Ifa
        | BasicOpcode::Ifl
        | BasicOpcode::Ifu => 1,
    }
}

/// Extra cycles charged by a special opcode beyond its word fetches.
#[must_use]
pub const fn special_extra_cycles(op: SpecialOpcode) -> u16 {
    match op {
        SpecialOpcode::Iag | SpecialOpcode::Ias => 0,
        SpecialOpcode::Iaq | SpecialOpcode::Hwn => 1,
        SpecialOpcode::Jsr | SpecialOpcode::Rfi => 2,
        SpecialOpcode::Int | SpecialOpcode::Hwq | SpecialOpcode::Hwi => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::{basic_extra_cycles, special_extra_cycles, SKIP_CYCLES};
    use crate::encoding::{BasicOpcode, SpecialOpcode};

    #[test]
    fn data_movement_and_logic_cost_only_their_fetches() {
        for op in [
            BasicOpcode::Set,
            BasicOpcode::Add,
            BasicOpcode::Sub,
            BasicOpcode::And,
            BasicOpcode::Bor,
            BasicOpcode::Xor,
        ] {
            assert_eq!(basic_extra_cycles(op), 0, "{op:?}");
        }
    }

    #[test]
    fn multiply_shift_and_carry_forms_cost_one_extra() {
        for op in [
            BasicOpcode::Mul,
            BasicOpcode::Mli,
            BasicOpcode::Shr,
            BasicOpcode::Asr,
            BasicOpcode::Shl,
            BasicOpcode::Adx,
            BasicOpcode::Sbx,
            BasicOpcode::Sti,
            BasicOpcode::Std,
        ] {
            assert_eq!(basic_extra_cycles(op), 1, "{op:?}");
        }
    }

    #[test]
    fn division_family_costs_two_extra() {
        for op in [
            BasicOpcode::Div,
            BasicOpcode::Dvi,
            BasicOpcode::Mod,
            BasicOpcode::Mdi,
        ] {
            assert_eq!(basic_extra_cycles(op), 2, "{op:?}");
        }
    }

    #[test]
    fn conditionals_cost_one_extra_plus_skip() {
        for op in BasicOpcode::ALL {
            if op.is_conditional() {
                assert_eq!(basic_extra_cycles(op), 1, "{op:?}");
            }
        }
        assert_eq!(SKIP_CYCLES, 1);
    }

    #[test]
    fn special_costs_match_the_instruction_set() {
        assert_eq!(special_extra_cycles(SpecialOpcode::Jsr), 2);
        assert_eq!(special_extra_cycles(SpecialOpcode::Int), 3);
        assert_eq!(special_extra_cycles(SpecialOpcode::Iag), 0);
        assert_eq!(special_extra_cycles(SpecialOpcode::Ias), 0);
        assert_eq!(special_extra_cycles(SpecialOpcode::Rfi), 2);
        assert_eq!(special_extra_cycles(SpecialOpcode::Iaq), 1);
        assert_eq!(special_extra_cycles(SpecialOpcode::Hwn), 1);
        assert_eq!(special_extra_cycles(SpecialOpcode::Hwq), 3);
        assert_eq!(special_extra_cycles(SpecialOpcode::Hwi), 3);
    }
}
