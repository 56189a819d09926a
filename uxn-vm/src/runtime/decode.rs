//! Opcode decoding
//!
//! An opcode byte is a 5-bit base operation plus three mode flags:
//!
//! ```text
//! k r s o o o o o
//! | | | +-+-+-+-+-- base operation (0..31)
//! | | +------------ short: operate on words instead of bytes
//! | +-------------- return: swap the working and return stacks
//! +---------------- keep: pops do not consume their operands
//! ```

use std::fmt;

pub const OP_MASK: u8 = 0x1F;
pub const SHORT_FLAG: u8 = 0x20;
pub const RETURN_FLAG: u8 = 0x40;
pub const KEEP_FLAG: u8 = 0x80;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Literal, or BRK when the byte has no flags
    LIT = 0x00,

    // Stack
    INC = 0x01,
    POP = 0x02,
    DUP = 0x03,
    NIP = 0x04,
    SWP = 0x05,
    OVR = 0x06,
    ROT = 0x07,

    // Logic
    EQU = 0x08,
    NEQ = 0x09,
    GTH = 0x0A,
    LTH = 0x0B,

    // Control flow
    JMP = 0x0C,
    JCN = 0x0D,
    JSR = 0x0E,
    STH = 0x0F,

    // Memory
    LDZ = 0x10,
    STZ = 0x11,
    LDR = 0x12,
    STR = 0x13,
    LDA = 0x14,
    STA = 0x15,
    DEI = 0x16,
    DEO = 0x17,

    // Arithmetic
    ADD = 0x18,
    SUB = 0x19,
    MUL = 0x1A,
    DIV = 0x1B,
    AND = 0x1C,
    ORA = 0x1D,
    EOR = 0x1E,
    SFT = 0x1F,
}

impl From<u8> for Op {
    /// Only the low five bits are looked at, mode flags are ignored.
    fn from(byte: u8) -> Self {
        match byte & OP_MASK {
            0x00 => Op::LIT,
            0x01 => Op::INC,
            0x02 => Op::POP,
            0x03 => Op::DUP,
            0x04 => Op::NIP,
            0x05 => Op::SWP,
            0x06 => Op::OVR,
            0x07 => Op::ROT,
            0x08 => Op::EQU,
            0x09 => Op::NEQ,
            0x0A => Op::GTH,
            0x0B => Op::LTH,
            0x0C => Op::JMP,
            0x0D => Op::JCN,
            0x0E => Op::JSR,
            0x0F => Op::STH,
            0x10 => Op::LDZ,
            0x11 => Op::STZ,
            0x12 => Op::LDR,
            0x13 => Op::STR,
            0x14 => Op::LDA,
            0x15 => Op::STA,
            0x16 => Op::DEI,
            0x17 => Op::DEO,
            0x18 => Op::ADD,
            0x19 => Op::SUB,
            0x1A => Op::MUL,
            0x1B => Op::DIV,
            0x1C => Op::AND,
            0x1D => Op::ORA,
            0x1E => Op::EOR,
            _ => Op::SFT,
        }
    }
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::LIT => "LIT",
            Op::INC => "INC",
            Op::POP => "POP",
            Op::DUP => "DUP",
            Op::NIP => "NIP",
            Op::SWP => "SWP",
            Op::OVR => "OVR",
            Op::ROT => "ROT",
            Op::EQU => "EQU",
            Op::NEQ => "NEQ",
            Op::GTH => "GTH",
            Op::LTH => "LTH",
            Op::JMP => "JMP",
            Op::JCN => "JCN",
            Op::JSR => "JSR",
            Op::STH => "STH",
            Op::LDZ => "LDZ",
            Op::STZ => "STZ",
            Op::LDR => "LDR",
            Op::STR => "STR",
            Op::LDA => "LDA",
            Op::STA => "STA",
            Op::DEI => "DEI",
            Op::DEO => "DEO",
            Op::ADD => "ADD",
            Op::SUB => "SUB",
            Op::MUL => "MUL",
            Op::DIV => "DIV",
            Op::AND => "AND",
            Op::ORA => "ORA",
            Op::EOR => "EOR",
            Op::SFT => "SFT",
        }
    }
}

/// A decoded opcode byte. Flags live here only for the duration of one
/// instruction and are never stored on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub op: Op,
    pub short: bool,
    pub ret: bool,
    pub keep: bool,
}

pub fn decode(byte: u8) -> Instruction {
    Instruction {
        op: Op::from(byte),
        short: byte & SHORT_FLAG != 0,
        ret: byte & RETURN_FLAG != 0,
        keep: byte & KEEP_FLAG != 0,
    }
}

impl Instruction {
    pub fn encode(self) -> u8 {
        let mut byte = self.op as u8;
        if self.short {
            byte |= SHORT_FLAG;
        }
        if self.ret {
            byte |= RETURN_FLAG;
        }
        if self.keep {
            byte |= KEEP_FLAG;
        }
        byte
    }

    /// The reserved all-zero byte.
    pub fn is_break(self) -> bool {
        self.encode() == 0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_break() {
            return write!(f, "BRK");
        }

        write!(f, "{}", self.op.mnemonic())?;
        if self.short {
            write!(f, "2")?;
        }
        if self.keep {
            write!(f, "k")?;
        }
        if self.ret {
            write!(f, "r")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flags() {
        let ins = decode(0xF8);
        assert_eq!(ins.op, Op::ADD);
        assert!(ins.short && ins.ret && ins.keep);

        let ins = decode(0x17);
        assert_eq!(ins.op, Op::DEO);
        assert!(!ins.short && !ins.ret && !ins.keep);
    }

    #[test]
    fn test_every_byte_round_trips() {
        for byte in 0..=u8::MAX {
            assert_eq!(decode(byte).encode(), byte, "byte {byte:#04x}");
        }
    }

    #[test]
    fn test_op_discriminants_match_decoding() {
        for byte in 0..=OP_MASK {
            assert_eq!(Op::from(byte) as u8, byte);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(decode(0x00).to_string(), "BRK");
        assert_eq!(decode(0x80).to_string(), "LITk");
        assert_eq!(decode(0x6C).to_string(), "JMP2r");
        assert_eq!(decode(0xB8).to_string(), "ADD2k");
        assert_eq!(decode(0x1F).to_string(), "SFT");
    }
}
