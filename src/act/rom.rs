//! The flat, read-only ROM image the host supplies.
//!
//! A plain data holder with no `run_cycle`/select-line behavior of its own —
//! bank selection is entirely a [`crate::act::Processor`] concern, not the
//! ROM's.

extern crate alloc;
use alloc::vec::Vec;
use arbitrary_int::u10;

/// Number of 10-bit words per ROM bank.
pub const ROM_SIZE: usize = 4096;

/// A flat, read-only indexable store of 10-bit words organized as
/// `banks * ROM_SIZE` words. Borrowed read-only for the processor's
/// lifetime.
pub struct Rom {
  words: Vec<u10>,
  banks: usize,
}

impl Rom {
  /// Build a ROM image from `banks` banks worth of words. `words` is padded
  /// with zero words up to `banks * ROM_SIZE` if shorter, and truncated if
  /// longer.
  pub fn new(words: impl IntoIterator<Item = u10>, banks: usize) -> Self {
    let mut data: Vec<u10> = words.into_iter().collect();
    data.resize(banks * ROM_SIZE, u10::new(0));
    Self { words: data, banks }
  }

  #[inline]
  pub fn banks(&self) -> usize {
    self.banks
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.words.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Fetch the word at a flat `bank * ROM_SIZE + offset` address. `None` if
  /// the address is outside the image (an address fault).
  #[inline]
  pub fn fetch(&self, address: usize) -> Option<u10> {
    self.words.get(address).copied()
  }
}
