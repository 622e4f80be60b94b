//! Integration tests built from hand-assembled tiny ROM images, stepping a
//! `Processor` a bounded number of cycles against a word array built
//! directly by each test rather than a real mask-ROM dump.

use act_core::{Base, Processor, Rom};
use arbitrary_int::u10;

fn word(raw: u16) -> u10 {
  u10::new(raw)
}

// Word builders mirror the bit layout `src/act/decode.rs` expects.
fn arithmetic_word(op: u8, field: u8) -> u10 {
  word(((op as u16) << 5) | ((field as u16) << 2) | 0b10)
}

fn long_branch_word(target: u8) -> u10 {
  word(((target as u16) << 2) | 0b11)
}

fn group0_word(sub: u16, param: u8) -> u10 {
  word(((param as u16) << 6) | (sub << 4) | 0b00)
}

fn group1_word(sub: u16, param: u8) -> u10 {
  word(((param as u16) << 6) | (sub << 4) | 0b0100)
}

fn group2_word(sub: u16, param: u8) -> u10 {
  word(((param as u16) << 6) | (sub << 4) | 0b1000)
}

fn group3_word(sub: u16, param: u8) -> u10 {
  word(((param as u16) << 6) | (sub << 4) | 0b1100)
}

const NOP: u16 = 0b00_00;
const FIELD_W: u8 = 0b110;

const OP_EXCH_AB: u8 = 3;
const OP_EXCH_BC: u8 = 4;
const OP_COPY_A_FROM_C: u8 = 6;
const OP_INCREMENT_C: u8 = 14;
const OP_TEST_A_GE_C: u8 = 23;

fn rom_from(words: Vec<u10>, banks: usize) -> Rom {
  Rom::new(words, banks)
}

fn run(processor: &mut Processor, ticks: usize) {
  for _ in 0..ticks {
    processor.tick().expect("scenario ROM decodes cleanly");
  }
}

/// `p := 2` via the permuted P-set table (table index 5 resolves to 2).
fn set_p_to_2() -> u10 {
  group3_word(0b11, 5)
}

fn load_n(digit: u8) -> u10 {
  group2_word(0b01, digit)
}

// Three loads into C, then `c+1->c[w]` ripples only
// the least-significant nibble touched, leaving carry clear.
#[test]
fn scenario_increment_after_loads_is_exact() {
  let words = vec![set_p_to_2(), load_n(3), load_n(2), load_n(1), arithmetic_word(OP_INCREMENT_C, FIELD_W)];
  let rom = rom_from(words, 1);
  let mut cpu = Processor::new(&rom, 1, 0);

  run(&mut cpu, 5);

  let c = cpu.register(2);
  assert_eq!(c.nibble(0).value(), 2);
  assert_eq!(c.nibble(1).value(), 2);
  assert_eq!(c.nibble(2).value(), 3);
}

// C = ...9999, `c+1->c[w]` rolls every loaded nibble
// over to zero and leaves CARRY set.
#[test]
fn scenario_increment_rolls_over_with_carry() {
  let words = vec![
    group3_word(0b11, 9), // table index 9 -> p := 3
    load_n(9),
    load_n(9),
    load_n(9),
    load_n(9),
    arithmetic_word(OP_INCREMENT_C, FIELD_W),
  ];
  let rom = rom_from(words, 1);
  let mut cpu = Processor::new(&rom, 1, 0);

  run(&mut cpu, 6);

  let c = cpu.register(2);
  for i in 0..4 {
    assert_eq!(c.nibble(i).value(), 0);
  }
}

// Base 16, `...000F + 1 -> ...0010`: the overflowing
// nibble wraps to zero and the carry ripples into, then stops at, the next
// nibble, leaving CARRY clear afterward.
#[test]
fn scenario_hex_increment_ripples_then_clears_carry() {
  let words = vec![
    group0_word(0b00, 2),   // binary: base := hex
    group3_word(0b11, 12),  // table index 12 -> p := 0
    load_n(0xF),            // C[0] := 0xF
    arithmetic_word(OP_INCREMENT_C, FIELD_W),
  ];
  let rom = rom_from(words, 1);
  let mut cpu = Processor::new(&rom, 1, 0);

  run(&mut cpu, 4);

  let c = cpu.register(2);
  assert_eq!(c.nibble(0).value(), 0);
  assert_eq!(c.nibble(1).value(), 1);
}

// A status-bit test immediately followed by a
// conditional goto takes the branch when the tested bit is set.
#[test]
fn scenario_status_bit_test_then_goto() {
  let mut words = vec![word(NOP); 0xFF];
  words.push(group1_word(0b00, 4)); // 1 -> s(4)
  words.push(group1_word(0b01, 4)); // if 1 = s(4)
  words.push(long_branch_word(0x23));
  let rom = rom_from(words, 1);
  let mut cpu = Processor::new(&rom, 1, 0);

  run(&mut cpu, 0xFF + 3);

  assert_eq!(cpu.pc(), 0x123);
}

// `delayed select rom 2` only commits at the following
// branch, and clears DELAYED_ROM once it does.
#[test]
fn scenario_delayed_rom_commits_at_branch() {
  let words = vec![
    group1_word(0b11, 2), // delayed select rom 2
    long_branch_word(0x50),
  ];
  let rom = rom_from(words, 3);
  let mut cpu = Processor::new(&rom, 3, 0);

  run(&mut cpu, 2);

  assert_eq!(cpu.rom_bank(), 2);
  assert_eq!(cpu.pc(), 0x50);
}

// `if a >= c[w]` with A == C takes the branch.
#[test]
fn scenario_a_ge_c_takes_branch_when_equal() {
  let words = vec![
    set_p_to_2(),
    load_n(3),
    load_n(2),
    load_n(1),
    arithmetic_word(OP_COPY_A_FROM_C, FIELD_W),
    arithmetic_word(OP_TEST_A_GE_C, FIELD_W),
    long_branch_word(0x80),
  ];
  let rom = rom_from(words, 1);
  let mut cpu = Processor::new(&rom, 1, 0);

  run(&mut cpu, 7);

  assert_eq!(cpu.pc(), 0x80);
}

#[test]
fn reset_then_reset_is_idempotent() {
  let rom = rom_from(vec![word(NOP)], 1);
  let mut cpu = Processor::new(&rom, 1, 2);
  cpu.reset();
  let before = (cpu.register(0), cpu.pc(), cpu.rom_bank(), cpu.status_bit(3), cpu.status_bit(5));
  cpu.reset();
  let after = (cpu.register(0), cpu.pc(), cpu.rom_bank(), cpu.status_bit(3), cpu.status_bit(5));
  assert_eq!(before, after);
}

#[test]
fn exchange_ab_twice_is_identity() {
  let setup = vec![
    set_p_to_2(),
    load_n(3),
    load_n(2),
    load_n(1),
    arithmetic_word(OP_COPY_A_FROM_C, FIELD_W), // A := 123
    set_p_to_2(),
    load_n(9),
    load_n(8),
    load_n(7),
    arithmetic_word(OP_EXCH_BC, FIELD_W), // B := 987 (and C takes B's old zero)
  ];
  let mut words = setup.clone();
  words.push(arithmetic_word(OP_EXCH_AB, FIELD_W));
  words.push(arithmetic_word(OP_EXCH_AB, FIELD_W));

  let rom = rom_from(words, 1);
  let mut cpu = Processor::new(&rom, 1, 0);
  run(&mut cpu, setup.len());

  let a_before = cpu.register(0);
  let b_before = cpu.register(1);

  run(&mut cpu, 2);

  assert_eq!(cpu.register(0), a_before);
  assert_eq!(cpu.register(1), b_before);
}

#[test]
fn select_rom_same_bank_twice_is_identity() {
  let words = vec![group0_word(0b01, 1), group0_word(0b01, 1)];
  let rom = rom_from(words, 2);
  let mut cpu = Processor::new(&rom, 2, 0);
  run(&mut cpu, 2);
  assert_eq!(cpu.rom_bank(), 1);
}

#[test]
fn every_nibble_stays_within_base_after_ticks() {
  let words = vec![set_p_to_2(), load_n(9), load_n(9), load_n(9), arithmetic_word(OP_INCREMENT_C, FIELD_W)];
  let rom = rom_from(words.clone(), 1);
  let mut cpu = Processor::new(&rom, 1, 0);
  run(&mut cpu, words.len());

  let c = cpu.register(2);
  for i in 0..14 {
    assert!(c.nibble(i).value() < Base::Decimal.modulus());
  }
}
