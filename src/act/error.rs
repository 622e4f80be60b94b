//! Fault reporting for the two documented error conditions.
//!
//! Everything else the processor does when arithmetic overflows, the
//! subroutine stack wraps, or a `return` pops stale contents is in-model
//! hardware behavior, not an error, and is never surfaced here.

/// A fatal condition surfaced to the host. The processor does not corrupt
/// its state before raising one of these; the host may inspect state and
/// resume with [`crate::act::Processor::reset`] if it chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  /// An opcode outside the documented set, or a P-family field modifier
  /// used while `p` is outside the register's nibble range.
  Decoder {
    bank: usize,
    pc: usize,
    opcode: u16,
  },
  /// A computed memory address fell outside `banks * ROM_SIZE`.
  Address {
    bank: usize,
    pc: usize,
    address: usize,
  },
}
