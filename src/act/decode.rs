//! Instruction decoding: one 10-bit word to one [`Instruction`].
//!
//! Bit numbering is little-endian within the word: bit 0 is the class LSB.
//! Four classes are selected by the low two bits, with Special further
//! split by the next two.

use crate::act::arithmetic::ArithOp;
use crate::act::field::FieldModifier;
use crate::act::tables::{P_SET_TABLE, P_TEST_TABLE};
use arbitrary_int::u10;

/// A fully decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
  Arithmetic { op: ArithOp, field: FieldModifier },
  /// Class `01`: push return address, jump within the current page.
  ShortCall { target_byte: u8 },
  /// Class `11`: "if nc goto" — the only implemented class-11 subclass; a
  /// 10-bit word leaves no room for an independent subclass selector
  /// alongside a full 8-bit branch target.
  LongBranchIfNoCarry { target_byte: u8 },
  Special(SpecialOp),
}

/// Special-class (`00`) operations, grouped into four subgroups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialOp {
  Nop,
  KeysToRomAddress,
  Binary,
  Decimal,
  IncrementP,
  DecrementP,
  Return,
  CToDataAddress,
  ClearDataRegisters,
  Woodstock,
  SelectRom { bank: u8 },

  SetStatusBit { bit: u8 },
  IfStatusBitSet { bit: u8 },
  IfPEquals { table_index: u8 },
  DelayedSelectRom { bank: u8 },

  ClearRegisters,
  ClearS,
  ToggleDisplay,
  DisplayOff,
  M1ExchC,
  M1ToC,
  M2ExchC,
  M2ToC,
  StackDownIntoA,
  DownRotate,
  YToA,
  CToStack,
  DecimalAlias,
  FToA,
  FExchA,
  LoadN { digit: u8 },

  ClearStatusBit { bit: u8 },
  IfStatusBitClear { bit: u8 },
  IfPNotEquals { table_index: u8 },
  SetP { table_index: u8 },
}

impl SpecialOp {
  pub fn mnemonic(self) -> &'static str {
    use SpecialOp::*;
    match self {
      Nop => "NOP",
      KeysToRomAddress => "KEYS->ROM ADDR",
      Binary => "BINARY",
      Decimal => "DECIMAL",
      IncrementP => "P+1->P",
      DecrementP => "P-1->P",
      Return => "RETURN",
      CToDataAddress => "C->DATA ADDR",
      ClearDataRegisters => "CLEAR DATA REGS",
      Woodstock => "HI I'M WOODSTOCK",
      SelectRom { .. } => "SELECT ROM N",
      SetStatusBit { .. } => "1->S(N)",
      IfStatusBitSet { .. } => "IF 1=S(N)",
      IfPEquals { .. } => "IF P=N",
      DelayedSelectRom { .. } => "DELAYED SELECT ROM N",
      ClearRegisters => "CLEAR REGS",
      ClearS => "CLEAR S",
      ToggleDisplay => "TOGGLE DISPLAY",
      DisplayOff => "DISPLAY OFF",
      M1ExchC => "M1<->C",
      M1ToC => "M1->C",
      M2ExchC => "M2<->C",
      M2ToC => "M2->C",
      StackDownIntoA => "STACK->A",
      DownRotate => "DOWN ROTATE",
      YToA => "Y->A",
      CToStack => "C->STACK",
      DecimalAlias => "DECIMAL",
      FToA => "F->A",
      FExchA => "F<->A",
      LoadN { .. } => "LOAD N",
      ClearStatusBit { .. } => "0->S(N)",
      IfStatusBitClear { .. } => "IF 0=S(N)",
      IfPNotEquals { .. } => "IF P#N",
      SetP { .. } => "P:=N",
    }
  }
}

/// Decode one 10-bit word. `None` means a decoder fault: the caller must
/// report it with the offending `(bank, pc, opcode)`.
pub fn decode(word: u10) -> Option<Instruction> {
  let raw = word.value();
  let class = raw & 0b11;
  let top_byte = ((raw >> 2) & 0xFF) as u8;

  match class {
    0b00 => decode_special(raw).map(Instruction::Special),
    0b01 => Some(Instruction::ShortCall { target_byte: top_byte }),
    0b10 => {
      let field = FieldModifier::decode(((raw >> 2) & 0b111) as u8)?;
      let op = ArithOp::decode(((raw >> 5) & 0b1_1111) as u8)?;
      Some(Instruction::Arithmetic { op, field })
    }
    0b11 => Some(Instruction::LongBranchIfNoCarry { target_byte: top_byte }),
    _ => None,
  }
}

fn decode_special(raw: u16) -> Option<SpecialOp> {
  let group = (raw >> 2) & 0b11;
  let sub = (raw >> 4) & 0b11;
  let param = ((raw >> 6) & 0b1111) as u8;

  match group {
    0b00 => decode_group0(sub, param),
    0b01 => decode_group1(sub, param),
    0b10 => decode_group2(sub, param),
    0b11 => decode_group3(sub, param),
    _ => None,
  }
}

fn decode_group0(sub: u16, param: u8) -> Option<SpecialOp> {
  use SpecialOp::*;
  match sub {
    0b00 => Some(match param {
      0 => Nop,
      1 => KeysToRomAddress,
      2 => Binary,
      3 => Decimal,
      4 => IncrementP,
      5 => DecrementP,
      6 => Return,
      7 => CToDataAddress,
      8 => ClearDataRegisters,
      9 => Woodstock,
      _ => return None,
    }),
    0b01 => Some(SelectRom { bank: param }),
    _ => None,
  }
}

fn decode_group1(sub: u16, param: u8) -> Option<SpecialOp> {
  use SpecialOp::*;
  match sub {
    0b00 => Some(SetStatusBit { bit: param }),
    0b01 => Some(IfStatusBitSet { bit: param }),
    0b10 => Some(IfPEquals { table_index: param }),
    0b11 => Some(DelayedSelectRom { bank: param }),
    _ => None,
  }
}

fn decode_group2(sub: u16, param: u8) -> Option<SpecialOp> {
  use SpecialOp::*;
  match sub {
    0b00 => Some(match param {
      0 => ClearRegisters,
      1 => ClearS,
      2 => ToggleDisplay,
      3 => DisplayOff,
      4 => M1ExchC,
      5 => M1ToC,
      6 => M2ExchC,
      7 => M2ToC,
      8 => StackDownIntoA,
      9 => DownRotate,
      10 => YToA,
      11 => CToStack,
      12 => DecimalAlias,
      13 => FToA,
      14 => FExchA,
      _ => return None,
    }),
    0b01 => Some(LoadN { digit: param }),
    _ => None,
  }
}

fn decode_group3(sub: u16, param: u8) -> Option<SpecialOp> {
  use SpecialOp::*;
  match sub {
    0b00 => Some(ClearStatusBit { bit: param }),
    0b01 => Some(IfStatusBitClear { bit: param }),
    0b10 => Some(IfPNotEquals { table_index: param }),
    0b11 => Some(SetP { table_index: param }),
    _ => None,
  }
}

/// Resolve a "p := n" table index to the literal `n` via [`P_SET_TABLE`].
pub fn resolve_p_set(table_index: u8) -> u8 {
  P_SET_TABLE[(table_index & 0b1111) as usize]
}

/// Resolve a "if p =/!= n" table index to the literal `n` via [`P_TEST_TABLE`].
pub fn resolve_p_test(table_index: u8) -> u8 {
  P_TEST_TABLE[(table_index & 0b1111) as usize]
}
