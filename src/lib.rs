#![no_std]
#![forbid(unsafe_code)]

pub mod act;

pub use act::arithmetic::ArithOp;
pub use act::decode::{decode, Instruction, SpecialOp};
pub use act::error::Fault;
pub use act::field::{FieldModifier, RegisterId};
pub use act::register::{Base, Register};
pub use act::rom::Rom;
pub use act::{Flags, Processor, STACK_SIZE};
