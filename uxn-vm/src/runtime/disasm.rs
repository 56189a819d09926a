use std::fmt::Write;

use crate::runtime::decode::{Op, decode};
use crate::runtime::memory::{MEMORY_SIZE, Memory};

/// Disassemble the instruction at `addr`, returning its text and length.
pub fn disasm_instruction(memory: &Memory, addr: u16) -> (String, usize) {
    let ins = decode(memory.read_byte(addr));
    if ins.op != Op::LIT || ins.is_break() {
        return (ins.to_string(), 1);
    }

    let operand = addr.wrapping_add(1);
    let (literal, size) = if ins.short {
        (format!("#{:04x}", memory.read_word(operand)), 3)
    } else {
        (format!("#{:02x}", memory.read_byte(operand)), 2)
    };

    // The keep flag is what normally marks a literal, others spell it out
    if ins.keep {
        (literal, size)
    } else {
        (format!("{} {}", ins, literal), size)
    }
}

/// Disassembly listing of `start..end`, one instruction per line. `end` may
/// be `0x10000` to include the last byte of memory.
pub fn dump_memory(memory: &Memory, start: u16, end: usize) -> String {
    let mut out = String::new();
    let mut addr = start as usize;
    let end = end.min(MEMORY_SIZE);

    while addr < end {
        let (text, size) = disasm_instruction(memory, addr as u16);
        let _ = write!(out, "{:04x}: ", addr);
        for i in 0..size {
            let _ = write!(out, "{:02x} ", memory.read_byte((addr + i) as u16));
        }
        let _ = writeln!(out, "{:>width$}{}", "", text, width = (3 - size) * 3 + 1);

        addr += size;
    }

    out
}
