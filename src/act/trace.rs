//! Model-independent trace formatting: `"<bank>-<pc4> <word4>  <mnemonic>"`.
//!
//! Has no semantic effect; `Processor::tick` only calls this when `TRACE` is
//! set, so formatting cost is paid only when a host has opted in.

extern crate alloc;
use alloc::format;
use alloc::string::String;

use crate::act::decode::Instruction;

pub fn format(bank: usize, pc: usize, word: u16, instruction: Instruction) -> String {
  format!("{}-{:04X} {:04X}  {}", bank, pc, word, mnemonic(instruction))
}

fn mnemonic(instruction: Instruction) -> String {
  match instruction {
    Instruction::Arithmetic { op, field } => format!("{} [{:?}]", op.mnemonic(), field),
    Instruction::ShortCall { target_byte } => format!("JSB 0x{:02X}", target_byte),
    Instruction::LongBranchIfNoCarry { target_byte } => format!("IF NC GOTO 0x{:02X}", target_byte),
    Instruction::Special(op) => String::from(op.mnemonic()),
  }
}
