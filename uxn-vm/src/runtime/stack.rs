//! Bounded 256 byte stacks
//!
//! Words are stored big-endian, high byte first. While keep mode is active
//! pops read through a separate cursor and leave the real pointer alone, so
//! an instruction in keep mode can only grow the stack.

use std::fmt;

use crate::error::{Error, Result};

pub const STACK_SIZE: usize = 0x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Working,
    Return,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Working => write!(f, "working"),
            StackKind::Return => write!(f, "return"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stack {
    kind: StackKind,
    data: [u8; STACK_SIZE],
    ptr: usize,
    keep: Option<usize>, // keep cursor, only set during a keep mode instruction
}

impl Stack {
    pub fn new(kind: StackKind) -> Self {
        Self {
            kind,
            data: [0; STACK_SIZE],
            ptr: 0,
            keep: None,
        }
    }

    pub fn kind(&self) -> StackKind {
        self.kind
    }

    /// Number of occupied bytes. Keep mode pops do not change this.
    pub fn len(&self) -> usize {
        self.ptr
    }

    pub fn is_empty(&self) -> bool {
        self.ptr == 0
    }

    /// Occupied bytes, bottom of the stack first.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.ptr]
    }

    pub fn push_byte(&mut self, value: u8) -> Result<()> {
        if self.ptr >= STACK_SIZE - 1 {
            return Err(Error::StackOverflow(self.kind));
        }

        self.data[self.ptr] = value;
        self.ptr += 1;
        Ok(())
    }

    pub fn push_word(&mut self, value: u16) -> Result<()> {
        if self.ptr >= STACK_SIZE - 2 {
            return Err(Error::StackOverflow(self.kind));
        }

        let [hi, lo] = value.to_be_bytes();
        self.data[self.ptr] = hi;
        self.data[self.ptr + 1] = lo;
        self.ptr += 2;
        Ok(())
    }

    pub fn pop_byte(&mut self) -> Result<u8> {
        let top = self.top();
        if top < 1 {
            return Err(Error::StackUnderflow(self.kind));
        }

        self.set_top(top - 1);
        Ok(self.data[top - 1])
    }

    pub fn pop_word(&mut self) -> Result<u16> {
        let top = self.top();
        if top < 2 {
            return Err(Error::StackUnderflow(self.kind));
        }

        self.set_top(top - 2);
        Ok(u16::from_be_bytes([self.data[top - 2], self.data[top - 1]]))
    }

    /// Width aware push, truncating `value` to a byte unless `short` is set.
    pub fn push(&mut self, short: bool, value: u16) -> Result<()> {
        if short {
            self.push_word(value)
        } else {
            self.push_byte(value as u8)
        }
    }

    /// Width aware pop, a byte is zero extended.
    pub fn pop(&mut self, short: bool) -> Result<u16> {
        if short {
            self.pop_word()
        } else {
            self.pop_byte().map(u16::from)
        }
    }

    /// Snapshot the pointer into the keep cursor. Pops become non-destructive
    /// until [`Stack::leave_keep_mode`] is called.
    pub fn enter_keep_mode(&mut self) {
        self.keep = Some(self.ptr);
    }

    pub fn leave_keep_mode(&mut self) {
        self.keep = None;
    }

    pub fn in_keep_mode(&self) -> bool {
        self.keep.is_some()
    }

    fn top(&self) -> usize {
        self.keep.unwrap_or(self.ptr)
    }

    fn set_top(&mut self, top: usize) {
        match self.keep.as_mut() {
            Some(cursor) => *cursor = top,
            None => self.ptr = top,
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, byte) in self.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_is_big_endian() {
        let mut stack = Stack::new(StackKind::Working);
        stack.push_word(0x1234).unwrap();

        assert_eq!(stack.as_slice(), &[0x12, 0x34]);
        assert_eq!(stack.pop_byte().unwrap(), 0x34);
        assert_eq!(stack.pop_byte().unwrap(), 0x12);
    }

    #[test]
    fn test_overflow_boundaries() {
        let mut stack = Stack::new(StackKind::Return);
        assert_eq!(stack.kind(), StackKind::Return);
        for i in 0..255 {
            stack.push_byte(i as u8).unwrap();
        }
        assert_eq!(stack.len(), 255);

        assert!(matches!(
            stack.push_byte(0),
            Err(Error::StackOverflow(StackKind::Return))
        ));
        assert!(matches!(stack.push_word(0), Err(Error::StackOverflow(_))));
        assert_eq!(stack.len(), 255);
    }

    #[test]
    fn test_word_push_needs_two_free_slots() {
        let mut stack = Stack::new(StackKind::Working);
        for _ in 0..254 {
            stack.push_byte(0xAA).unwrap();
        }

        assert!(matches!(stack.push_word(1), Err(Error::StackOverflow(_))));
        stack.push_byte(0xBB).unwrap();
    }

    #[test]
    fn test_underflow() {
        let mut stack = Stack::new(StackKind::Working);
        assert!(matches!(
            stack.pop_byte(),
            Err(Error::StackUnderflow(StackKind::Working))
        ));

        stack.push_byte(1).unwrap();
        assert!(matches!(stack.pop_word(), Err(Error::StackUnderflow(_))));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_keep_mode_pops_leave_pointer() {
        let mut stack = Stack::new(StackKind::Working);
        stack.push_byte(3).unwrap();
        stack.push_byte(4).unwrap();

        assert!(!stack.in_keep_mode());
        stack.enter_keep_mode();
        assert!(stack.in_keep_mode());
        assert_eq!(stack.pop_byte().unwrap(), 4);
        assert_eq!(stack.pop_byte().unwrap(), 3);
        assert!(stack.pop_byte().is_err());
        stack.push_byte(7).unwrap();
        stack.leave_keep_mode();
        assert!(!stack.in_keep_mode());

        assert_eq!(stack.as_slice(), &[3, 4, 7]);
    }

    #[test]
    fn test_display() {
        let mut stack = Stack::new(StackKind::Working);
        assert_eq!(stack.to_string(), "[]");

        stack.push_word(0x0a0b).unwrap();
        assert_eq!(stack.to_string(), "[0a 0b]");
    }
}
