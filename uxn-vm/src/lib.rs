//! A small uxn stack machine.
//!
//! The [`Machine`] owns two bounded stacks, 64KiB of linear memory and a
//! 256 byte device bus. Device side effects are supplied by a [`Host`]
//! binding handed to the machine at construction.

pub mod error;
pub mod host;
pub mod runtime;

pub use error::{Error, Result};
pub use host::{Console, Host, NullHost};
pub use runtime::decode::{Instruction, Op, decode};
pub use runtime::device::DeviceBus;
pub use runtime::machine::{Machine, Step};
pub use runtime::memory::{Memory, PROGRAM_ORIGIN};
pub use runtime::stack::{Stack, StackKind};
