//! The 32 Arithmetic-class opcodes, packed into the word's top 5 bits.
//!
//! Unlike the permuted P-set/P-test tables, this opcode assignment is not a
//! fixed external ABI — it documents behavior rather than one specific
//! mask-ROM's bit layout. The table below is this crate's own concrete
//! assignment (recorded in `DESIGN.md`): zero/exchange/copy ops occupy the
//! low end, add/sub/test ops the upper two thirds, and shifts trail the
//! test group.

use crate::act::register::{self, Base, Register};

/// One of the 32 Arithmetic-class operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
  ZeroA,
  ZeroB,
  ZeroC,
  ExchAb,
  ExchBc,
  ExchAc,
  CopyAFromC,
  CopyBFromA,
  CopyCFromB,
  AddAbToA,
  AddAcToA,
  AddCcToC,
  AddAcToC,
  IncrementA,
  IncrementC,
  SubAbToA,
  SubAcToC,
  DecrementA,
  DecrementC,
  NegateC,
  NegateCMinusOne,
  TestBZero,
  TestCZero,
  TestAGeC,
  TestAGeB,
  TestANonzero,
  TestCNonzero,
  SubAcToA,
  ShiftRightA,
  ShiftRightB,
  ShiftRightC,
  ShiftLeftA,
}

impl ArithOp {
  pub fn decode(code: u8) -> Option<ArithOp> {
    use ArithOp::*;
    Some(match code & 0b1_1111 {
      0 => ZeroA,
      1 => ZeroB,
      2 => ZeroC,
      3 => ExchAb,
      4 => ExchBc,
      5 => ExchAc,
      6 => CopyAFromC,
      7 => CopyBFromA,
      8 => CopyCFromB,
      9 => AddAbToA,
      10 => AddAcToA,
      11 => AddCcToC,
      12 => AddAcToC,
      13 => IncrementA,
      14 => IncrementC,
      15 => SubAbToA,
      16 => SubAcToC,
      17 => DecrementA,
      18 => DecrementC,
      19 => NegateC,
      20 => NegateCMinusOne,
      21 => TestBZero,
      22 => TestCZero,
      23 => TestAGeC,
      24 => TestAGeB,
      25 => TestANonzero,
      26 => TestCNonzero,
      27 => SubAcToA,
      28 => ShiftRightA,
      29 => ShiftRightB,
      30 => ShiftRightC,
      31 => ShiftLeftA,
      _ => return None,
    })
  }

  pub fn mnemonic(self) -> &'static str {
    use ArithOp::*;
    match self {
      ZeroA => "0->A",
      ZeroB => "0->B",
      ZeroC => "0->C",
      ExchAb => "A<->B",
      ExchBc => "B<->C",
      ExchAc => "A<->C",
      CopyAFromC => "C->A",
      CopyBFromA => "A->B",
      CopyCFromB => "B->C",
      AddAbToA => "A+B->A",
      AddAcToA => "A+C->A",
      AddCcToC => "C+C->C",
      AddAcToC => "A+C->C",
      IncrementA => "A+1->A",
      IncrementC => "C+1->C",
      SubAbToA => "A-B->A",
      SubAcToC => "A-C->C",
      DecrementA => "A-1->A",
      DecrementC => "C-1->C",
      NegateC => "0-C->C",
      NegateCMinusOne => "0-C-1->C",
      TestBZero => "IF B=0",
      TestCZero => "IF C=0",
      TestAGeC => "IF A>=C",
      TestAGeB => "IF A>=B",
      TestANonzero => "IF A#0",
      TestCNonzero => "IF C#0",
      SubAcToA => "A-C->A",
      ShiftRightA => "A SHR",
      ShiftRightB => "B SHR",
      ShiftRightC => "C SHR",
      ShiftLeftA => "A SHL",
    }
  }

  /// Whether this op is a field test (the "if ..." family); these leave
  /// their verdict in carry and do not write any register.
  pub fn is_test(self) -> bool {
    use ArithOp::*;
    matches!(self, TestBZero | TestCZero | TestAGeC | TestAGeB | TestANonzero | TestCNonzero)
  }

  /// Whether this op shifts left (clears both CARRY and PREV_CARRY) rather
  /// than right (clears only CARRY).
  pub fn is_shift_left(self) -> bool {
    matches!(self, ArithOp::ShiftLeftA)
  }

  pub fn is_shift(self) -> bool {
    use ArithOp::*;
    matches!(self, ShiftRightA | ShiftRightB | ShiftRightC | ShiftLeftA)
  }
}

/// Result of executing an `ArithOp` against the field `[first..=last]`.
/// Only the registers actually written carry a new value. `carry_out` is
/// `None` for ops that do not touch `CARRY` at all (Copy, Exchange) — the
/// caller must leave `CARRY` untouched rather than clear it.
#[derive(Debug, Clone, Copy)]
pub struct ArithResult {
  pub new_a: Option<Register>,
  pub new_b: Option<Register>,
  pub new_c: Option<Register>,
  pub carry_out: Option<bool>,
}

/// Execute one Arithmetic-class op over `[first..=last]`. `carry_in` is the
/// incoming `CARRY` — always 0 except for the Increment ops, which are
/// "Add with CARRY pre-set".
pub fn execute(
  op: ArithOp,
  a: Register,
  b: Register,
  c: Register,
  first: usize,
  last: usize,
  base: Base,
  carry_in: bool,
) -> ArithResult {
  use ArithOp::*;

  let none = ArithResult {
    new_a: None,
    new_b: None,
    new_c: None,
    carry_out: None,
  };

  match op {
    ZeroA => ArithResult {
      new_a: Some(a.copy_field(None, first, last)),
      ..none
    },
    ZeroB => ArithResult {
      new_b: Some(b.copy_field(None, first, last)),
      ..none
    },
    ZeroC => ArithResult {
      new_c: Some(c.copy_field(None, first, last)),
      ..none
    },
    ExchAb => {
      let (na, nb) = Register::exchange_field(a, b, first, last);
      ArithResult {
        new_a: Some(na),
        new_b: Some(nb),
        ..none
      }
    }
    ExchBc => {
      let (nb, nc) = Register::exchange_field(b, c, first, last);
      ArithResult {
        new_b: Some(nb),
        new_c: Some(nc),
        ..none
      }
    }
    ExchAc => {
      let (na, nc) = Register::exchange_field(a, c, first, last);
      ArithResult {
        new_a: Some(na),
        new_c: Some(nc),
        ..none
      }
    }
    CopyAFromC => ArithResult {
      new_a: Some(a.copy_field(Some(c), first, last)),
      ..none
    },
    CopyBFromA => ArithResult {
      new_b: Some(b.copy_field(Some(a), first, last)),
      ..none
    },
    CopyCFromB => ArithResult {
      new_c: Some(c.copy_field(Some(b), first, last)),
      ..none
    },
    AddAbToA => {
      let (sum, carry) = register::add_field(Some(a), Some(b), first, last, base, false);
      ArithResult {
        new_a: Some(a.copy_field(Some(sum), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    AddAcToA => {
      let (sum, carry) = register::add_field(Some(a), Some(c), first, last, base, false);
      ArithResult {
        new_a: Some(a.copy_field(Some(sum), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    AddCcToC => {
      let (sum, carry) = register::add_field(Some(c), Some(c), first, last, base, false);
      ArithResult {
        new_c: Some(c.copy_field(Some(sum), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    AddAcToC => {
      let (sum, carry) = register::add_field(Some(a), Some(c), first, last, base, false);
      ArithResult {
        new_c: Some(c.copy_field(Some(sum), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    IncrementA => {
      let (sum, carry) = register::add_field(Some(a), None, first, last, base, true);
      ArithResult {
        new_a: Some(a.copy_field(Some(sum), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    IncrementC => {
      let (sum, carry) = register::add_field(Some(c), None, first, last, base, true);
      ArithResult {
        new_c: Some(c.copy_field(Some(sum), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    SubAbToA => {
      let (diff, carry) = register::sub_field(Some(a), Some(b), first, last, base, carry_in);
      ArithResult {
        new_a: Some(a.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    SubAcToC => {
      let (diff, carry) = register::sub_field(Some(a), Some(c), first, last, base, carry_in);
      ArithResult {
        new_c: Some(c.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    DecrementA => {
      let (diff, carry) = register::sub_field(Some(a), None, first, last, base, true);
      ArithResult {
        new_a: Some(a.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    DecrementC => {
      let (diff, carry) = register::sub_field(Some(c), None, first, last, base, true);
      ArithResult {
        new_c: Some(c.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    NegateC => {
      let (diff, carry) = register::sub_field(None, Some(c), first, last, base, false);
      ArithResult {
        new_c: Some(c.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    NegateCMinusOne => {
      let (diff, carry) = register::sub_field(None, Some(c), first, last, base, true);
      ArithResult {
        new_c: Some(c.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    TestBZero => {
      let carry = register::test_eq_field(b, Register::new(), first, last);
      ArithResult { carry_out: Some(carry), ..none }
    }
    TestCZero => {
      let carry = register::test_eq_field(c, Register::new(), first, last);
      ArithResult { carry_out: Some(carry), ..none }
    }
    TestAGeC => {
      // "a >= c" carries the discarded subtraction's borrow: no borrow
      // (a >= c) clears carry.
      let (_, borrow) = register::sub_field(Some(a), Some(c), first, last, base, false);
      ArithResult { carry_out: Some(borrow), ..none }
    }
    TestAGeB => {
      let (_, borrow) = register::sub_field(Some(a), Some(b), first, last, base, false);
      ArithResult { carry_out: Some(borrow), ..none }
    }
    TestANonzero => {
      let carry = register::test_ne_field(a, Register::new(), first, last);
      ArithResult { carry_out: Some(carry), ..none }
    }
    TestCNonzero => {
      let carry = register::test_ne_field(c, Register::new(), first, last);
      ArithResult { carry_out: Some(carry), ..none }
    }
    SubAcToA => {
      let (diff, carry) = register::sub_field(Some(a), Some(c), first, last, base, carry_in);
      ArithResult {
        new_a: Some(a.copy_field(Some(diff), first, last)),
        carry_out: Some(carry),
        ..none
      }
    }
    ShiftRightA => ArithResult {
      new_a: Some(register::shift_right_field(a, first, last)),
      carry_out: Some(false),
      ..none
    },
    ShiftRightB => ArithResult {
      new_b: Some(register::shift_right_field(b, first, last)),
      carry_out: Some(false),
      ..none
    },
    ShiftRightC => ArithResult {
      new_c: Some(register::shift_right_field(c, first, last)),
      carry_out: Some(false),
      ..none
    },
    ShiftLeftA => ArithResult {
      new_a: Some(register::shift_left_field(a, first, last)),
      carry_out: Some(false),
      ..none
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use arbitrary_int::u4;

  #[test]
  fn increment_c_wraps_with_carry_in_decimal() {
    let mut c = Register::new();
    for i in 0..4 {
      c.set_nibble(10 + i, u4::new(9));
    }
    let result = execute(ArithOp::IncrementC, Register::new(), Register::new(), c, 0, 13, Base::Decimal, false);
    assert_eq!(result.carry_out, Some(true));
    assert_eq!(result.new_c.unwrap(), Register::new());
  }

  #[test]
  fn increment_c_in_hex_wraps_at_sixteen() {
    let mut c = Register::new();
    c.set_nibble(0, u4::new(0xF));
    let result = execute(ArithOp::IncrementC, Register::new(), Register::new(), c, 0, 0, Base::Hex, false);
    assert_eq!(result.carry_out, Some(true));
    assert_eq!(result.new_c.unwrap().nibble(0), u4::new(0));
  }

  #[test]
  fn copy_and_exchange_leave_carry_untouched() {
    let mut c = Register::new();
    c.set_nibble(0, u4::new(5));
    let copy = execute(ArithOp::CopyAFromC, Register::new(), Register::new(), c, 0, 13, Base::Decimal, false);
    assert_eq!(copy.carry_out, None);
    let exch = execute(ArithOp::ExchAb, Register::new(), Register::new(), c, 0, 13, Base::Decimal, false);
    assert_eq!(exch.carry_out, None);
  }
}
