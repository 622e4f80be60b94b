//! The ACT processor: state, tick loop, and the host-facing entry points
//! (`new`, `reset`, `tick`, `set_key`, `set_trace`).

pub mod arithmetic;
pub mod decode;
pub mod error;
pub mod field;
pub mod register;
pub mod rom;
pub mod tables;
pub mod trace;

use arbitrary_int::u4;
use bitbybit::bitfield;
use log::{debug, info, trace, warn};

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use arithmetic::ArithOp;
use decode::{decode, resolve_p_set, resolve_p_test, Instruction, SpecialOp};
use error::Fault;
use field::{FieldModifier, NAMED_REGISTER_COUNT, REG_A, REG_B, REG_C, REG_M, REG_N, REG_T, REG_Y, REG_Z};
use register::{Base, Register, WIDTH};
use rom::{Rom, ROM_SIZE};

/// Depth of the subroutine return-address stack. Chosen to match the
/// shallow (3-4 level) call stacks this processor family is documented to
/// carry; recorded as an open decision in `DESIGN.md`.
pub const STACK_SIZE: usize = 4;

/// `MODE`/`CARRY`/`PREV_CARRY`/`DELAYED_ROM`/`DISPLAY_ENABLE`/`TIMER`/`TRACE`,
/// packed into a single byte-wide status register.
#[bitfield(u8, default: 0)]
pub struct Flags {
  #[bit(0, rw)]
  pub mode: bool,
  #[bit(1, rw)]
  pub carry: bool,
  #[bit(2, rw)]
  pub prev_carry: bool,
  #[bit(3, rw)]
  pub delayed_rom: bool,
  #[bit(4, rw)]
  pub display_enable: bool,
  #[bit(5, rw)]
  pub timer: bool,
  #[bit(6, rw)]
  pub trace: bool,
}

/// The processor's full mutable state. The ROM is borrowed, not owned, so
/// tests and a host can run several processors against one image.
pub struct Processor<'rom> {
  rom: &'rom Rom,
  banks: usize,

  reg: [Register; NAMED_REGISTER_COUNT],
  ram: Vec<Register>,

  stack: [usize; STACK_SIZE],
  sp: usize,

  pc: usize,
  rom_bank: usize,
  delayed_bank: usize,

  p: usize,
  f: u4,
  first: usize,
  last: usize,
  base: Base,

  status: [bool; 16],
  flags: Flags,

  keycode: u8,
  keydown: bool,
  address: usize,

  last_opcode: u16,
}

impl<'rom> Processor<'rom> {
  /// Build a processor against a borrowed ROM image, then reset it.
  pub fn new(rom: &'rom Rom, bank_count: usize, memory_count: usize) -> Self {
    let mut processor = Self {
      rom,
      banks: bank_count,
      reg: [Register::new(); NAMED_REGISTER_COUNT],
      ram: vec![Register::new(); memory_count],
      stack: [0; STACK_SIZE],
      sp: 0,
      pc: 0,
      rom_bank: 0,
      delayed_bank: 0,
      p: 0,
      f: u4::new(0),
      first: 0,
      last: WIDTH - 1,
      base: Base::Decimal,
      status: [false; 16],
      flags: Flags::default(),
      keycode: 0,
      keydown: false,
      address: 0,
      last_opcode: 0,
    };
    processor.reset();
    processor
  }

  /// Reinitialise all state: registers, stack, pc, and status bits 3 and 5
  /// (which power-on set), base decimal, `MODE` set.
  pub fn reset(&mut self) {
    self.reg = [Register::new(); NAMED_REGISTER_COUNT];
    for slot in self.ram.iter_mut() {
      *slot = Register::new();
    }
    self.stack = [0; STACK_SIZE];
    self.sp = 0;
    self.pc = 0;
    self.rom_bank = 0;
    self.delayed_bank = 0;
    self.p = 0;
    self.f = u4::new(0);
    self.first = 0;
    self.last = WIDTH - 1;
    self.base = Base::Decimal;
    self.status = [false; 16];
    self.status[3] = true;
    self.status[5] = true;
    self.flags = Flags::default().with_mode(true);
    self.keycode = 0;
    self.keydown = false;
    self.address = 0;
    self.last_opcode = 0;
    info!("reset");
  }

  /// Latch a keypress. Setting a key down also sets status bit 15.
  pub fn set_key(&mut self, keycode: u8, down: bool) {
    self.keycode = keycode;
    self.keydown = down;
    if down {
      self.status[15] = true;
    }
    info!("key {} {}", keycode, if down { "down" } else { "up" });
  }

  /// Toggle per-instruction trace logging.
  pub fn set_trace(&mut self, enabled: bool) {
    self.flags = self.flags.with_trace(enabled);
  }

  /// `DISPLAY_ENABLE`, polled by the host between ticks.
  pub fn display_enabled(&self) -> bool {
    self.flags.display_enable()
  }

  pub fn register(&self, index: usize) -> Register {
    self.reg[index]
  }

  pub fn status_bit(&self, bit: usize) -> bool {
    self.status[bit]
  }

  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn rom_bank(&self) -> usize {
    self.rom_bank
  }

  fn flat_address(&self, bank: usize, pc: usize) -> usize {
    bank * ROM_SIZE + pc
  }

  /// Fetch, decode, and execute one instruction, then advance `pc`.
  pub fn tick(&mut self) -> Result<(), Fault> {
    let address = self.flat_address(self.rom_bank, self.pc);
    let word = self.rom.fetch(address).ok_or(Fault::Address {
      bank: self.rom_bank,
      pc: self.pc,
      address,
    })?;

    self.last_opcode = word.value();
    let instruction = decode(word).ok_or(Fault::Decoder {
      bank: self.rom_bank,
      pc: self.pc,
      opcode: word.value(),
    })?;

    if self.flags.trace() {
      trace!("{}", trace::format(self.rom_bank, self.pc, word.value(), instruction));
    }

    self.execute(instruction)?;
    self.advance_pc();
    debug!(
      "pc={}-{:04X} a={:?} c={:?} carry={} status15={}",
      self.rom_bank,
      self.pc,
      self.reg[REG_A],
      self.reg[REG_C],
      self.flags.carry(),
      self.status[15]
    );
    Ok(())
  }

  /// The PC-advance primitive: wraps within the current bank's window, then
  /// latches `CARRY` into `PREV_CARRY` and clears `CARRY`. This is the
  /// *only* place `CARRY` is cleared along the fetch path.
  fn advance_pc(&mut self) {
    self.pc = (self.pc + 1) % ROM_SIZE;
    let carry = self.flags.carry();
    self.flags = self.flags.with_prev_carry(carry).with_carry(false);
  }

  fn field_window(&mut self, modifier: FieldModifier) -> Result<(usize, usize), Fault> {
    modifier.window(self.p).ok_or(Fault::Decoder {
      bank: self.rom_bank,
      pc: self.pc,
      opcode: self.last_opcode,
    })
  }

  fn execute(&mut self, instruction: Instruction) -> Result<(), Fault> {
    match instruction {
      Instruction::Arithmetic { op, field } => self.execute_arithmetic(op, field),
      Instruction::ShortCall { target_byte } => {
        self.call(target_byte);
        Ok(())
      }
      Instruction::LongBranchIfNoCarry { target_byte } => {
        if !self.flags.prev_carry() {
          self.branch_to(target_byte);
        }
        Ok(())
      }
      Instruction::Special(op) => self.execute_special(op),
    }
  }

  fn execute_arithmetic(&mut self, op: ArithOp, field: FieldModifier) -> Result<(), Fault> {
    let (first, last) = self.field_window(field)?;
    self.first = first;
    self.last = last;

    let carry_in = self.increment_carry_in(op);
    let result = arithmetic::execute(
      op,
      self.reg[REG_A],
      self.reg[REG_B],
      self.reg[REG_C],
      first,
      last,
      self.base,
      carry_in,
    );

    if let Some(a) = result.new_a {
      self.reg[REG_A] = a;
    }
    if let Some(b) = result.new_b {
      self.reg[REG_B] = b;
    }
    if let Some(c) = result.new_c {
      self.reg[REG_C] = c;
    }
    if let Some(carry) = result.carry_out {
      self.flags = self.flags.with_carry(carry);
    }

    if op.is_shift_left() {
      self.flags = self.flags.with_prev_carry(false);
    }
    Ok(())
  }

  /// Increment/decrement ops run as "add/sub with CARRY pre-set".
  fn increment_carry_in(&self, op: ArithOp) -> bool {
    matches!(
      op,
      ArithOp::IncrementA | ArithOp::IncrementC | ArithOp::DecrementA | ArithOp::DecrementC | ArithOp::NegateCMinusOne
    )
  }

  fn call(&mut self, target_byte: u8) {
    self.stack[self.sp] = self.pc;
    self.sp = (self.sp + 1) % STACK_SIZE;
    self.branch_to(target_byte);
  }

  /// Replace the low byte of `pc` with `target_byte - 1` (the universal
  /// post-increment in `advance_pc` lands exactly on `target_byte`), then
  /// apply any pending delayed ROM-bank commit.
  fn branch_to(&mut self, target_byte: u8) {
    let page = self.pc & !0xFF;
    self.pc = page | (target_byte.wrapping_sub(1) as usize);
    if self.flags.delayed_rom() {
      self.rom_bank = self.delayed_bank;
      self.flags = self.flags.with_delayed_rom(false);
    }
  }

  fn execute_special(&mut self, op: SpecialOp) -> Result<(), Fault> {
    match op {
      SpecialOp::Nop => {}
      SpecialOp::KeysToRomAddress => {
        let page = self.pc & !0xFF;
        self.pc = page | ((self.keycode.wrapping_sub(1)) as usize & 0xFF);
      }
      SpecialOp::Binary => self.base = Base::Hex,
      SpecialOp::Decimal | SpecialOp::DecimalAlias => self.base = Base::Decimal,
      SpecialOp::IncrementP => self.p = (self.p + 1) % (WIDTH + 1),
      SpecialOp::DecrementP => self.p = (self.p + WIDTH) % (WIDTH + 1),
      SpecialOp::Return => {
        self.sp = (self.sp + STACK_SIZE - 1) % STACK_SIZE;
        self.pc = self.stack[self.sp];
      }
      SpecialOp::SelectRom { bank } => self.select_rom_now(bank)?,
      SpecialOp::CToDataAddress => {
        let low = self.reg[REG_C].nibble(0).value() as usize;
        let high = self.reg[REG_C].nibble(1).value() as usize;
        self.address = (high << 4) | low;
      }
      SpecialOp::ClearDataRegisters => {
        for slot in self.ram.iter_mut() {
          *slot = Register::new();
        }
      }
      SpecialOp::Woodstock => {
        // model ping; semantic no-op.
      }

      SpecialOp::SetStatusBit { bit } => self.status[bit as usize & 0xF] = true,
      SpecialOp::IfStatusBitSet { bit } => {
        let carry = !self.status[bit as usize & 0xF];
        self.flags = self.flags.with_carry(carry);
      }
      SpecialOp::IfPEquals { table_index } => {
        let n = resolve_p_test(table_index) as usize;
        self.flags = self.flags.with_carry(self.p != n);
      }
      SpecialOp::DelayedSelectRom { bank } => {
        if bank as usize >= self.banks {
          return Err(Fault::Address {
            bank: self.rom_bank,
            pc: self.pc,
            address: bank as usize * ROM_SIZE,
          });
        }
        self.delayed_bank = bank as usize;
        self.flags = self.flags.with_delayed_rom(true);
      }

      SpecialOp::ClearRegisters => {
        self.reg[REG_A] = Register::new();
        self.reg[REG_B] = Register::new();
        self.reg[REG_C] = Register::new();
      }
      SpecialOp::ClearS => {
        for bit in 0..16 {
          if !tables::is_sticky_status_bit(bit) {
            self.status[bit] = false;
          }
        }
      }
      SpecialOp::ToggleDisplay => {
        let enabled = self.flags.display_enable();
        self.flags = self.flags.with_display_enable(!enabled);
      }
      SpecialOp::DisplayOff => self.flags = self.flags.with_display_enable(false),
      SpecialOp::M1ExchC => core::mem::swap(&mut self.reg[REG_M], &mut self.reg[REG_C]),
      SpecialOp::M1ToC => self.reg[REG_C] = self.reg[REG_M],
      SpecialOp::M2ExchC => core::mem::swap(&mut self.reg[REG_N], &mut self.reg[REG_C]),
      SpecialOp::M2ToC => self.reg[REG_C] = self.reg[REG_N],
      SpecialOp::StackDownIntoA => {
        self.reg[REG_A] = self.reg[REG_Y];
        self.reg[REG_Y] = self.reg[REG_Z];
        self.reg[REG_Z] = self.reg[REG_T];
      }
      SpecialOp::DownRotate => {
        let t = self.reg[REG_T];
        self.reg[REG_T] = self.reg[REG_C];
        self.reg[REG_C] = self.reg[REG_Y];
        self.reg[REG_Y] = self.reg[REG_Z];
        self.reg[REG_Z] = t;
      }
      SpecialOp::YToA => self.reg[REG_A] = self.reg[REG_Y],
      SpecialOp::CToStack => {
        self.reg[REG_T] = self.reg[REG_Z];
        self.reg[REG_Z] = self.reg[REG_Y];
        self.reg[REG_Y] = self.reg[REG_C];
      }
      SpecialOp::FToA => {
        let f = self.f;
        self.reg[REG_A].set_nibble(0, f);
      }
      SpecialOp::FExchA => {
        let a0 = self.reg[REG_A].nibble(0);
        self.reg[REG_A].set_nibble(0, self.f);
        self.f = a0;
      }
      SpecialOp::LoadN { digit } => {
        if self.p >= WIDTH {
          return Err(Fault::Decoder {
            bank: self.rom_bank,
            pc: self.pc,
            opcode: self.last_opcode,
          });
        }
        self.reg[REG_C].set_nibble(self.p, u4::new(digit & 0xF));
        self.p = (self.p + WIDTH) % (WIDTH + 1);
      }

      SpecialOp::ClearStatusBit { bit } => {
        let idx = bit as usize & 0xF;
        if !(tables::is_sticky_status_bit(idx) && self.keydown) {
          self.status[idx] = false;
        }
      }
      SpecialOp::IfStatusBitClear { bit } => {
        let carry = self.status[bit as usize & 0xF];
        self.flags = self.flags.with_carry(carry);
      }
      SpecialOp::IfPNotEquals { table_index } => {
        let n = resolve_p_test(table_index) as usize;
        self.flags = self.flags.with_carry(self.p == n);
      }
      SpecialOp::SetP { table_index } => {
        self.p = resolve_p_set(table_index) as usize;
      }
    }
    Ok(())
  }

  fn select_rom_now(&mut self, bank: u8) -> Result<(), Fault> {
    if bank as usize >= self.banks {
      warn!("select rom {} out of range ({} banks)", bank, self.banks);
      return Err(Fault::Address {
        bank: self.rom_bank,
        pc: self.pc,
        address: bank as usize * ROM_SIZE,
      });
    }
    self.rom_bank = bank as usize;
    Ok(())
  }
}
