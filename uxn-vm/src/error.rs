//! Errors raised while loading or running a machine.
//!
//! Stack and arithmetic faults are fatal to the `run` that raised them. The
//! machine is not rolled back, so its state should be treated as unusable
//! once one of these has been returned.

use std::io;

use thiserror::Error;

use crate::runtime::stack::StackKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A push would grow the stack past its capacity.
    #[error("{0} stack overflow")]
    StackOverflow(StackKind),

    /// A pop asked for more bytes than the stack holds.
    #[error("{0} stack underflow")]
    StackUnderflow(StackKind),

    /// `DIV` with a zero divisor. `pc` points just past the instruction.
    #[error("division by zero at {pc:#06x}")]
    DivisionByZero { pc: u16 },

    #[error("image of {len} bytes does not fit in memory at origin {origin:#06x}")]
    ImageTooLarge { len: usize, origin: u16 },

    /// `run_bounded` executed its whole budget without reaching a halt.
    #[error("instruction budget of {budget} exhausted before halt")]
    BudgetExhausted { budget: u64 },

    /// A host device hook failed.
    #[error("device i/o failed: {0}")]
    Device(#[from] io::Error),
}
