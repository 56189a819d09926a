//! Core of the uxn VM
//! A stack machine with 32 base operations, each modified by the short,
//! return and keep flags of its opcode byte.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::host::{Host, NullHost};
use crate::runtime::decode::{Instruction, Op, decode};
use crate::runtime::device::{CONSOLE_READ, DeviceBus};
use crate::runtime::memory::{Memory, PROGRAM_ORIGIN};
use crate::runtime::stack::{Stack, StackKind};

// Pop b then a from the active stack and push the result of $body.
macro_rules! binary {
    ($self:expr, $ins:expr, |$a:ident, $b:ident| $body:expr) => {{
        let $b = $self.src($ins).pop($ins.short)?;
        let $a = $self.src($ins).pop($ins.short)?;
        $self.src($ins).push($ins.short, $body)?;
    }};
}

// Like `binary!`, but the result is always a single boolean byte.
macro_rules! compare {
    ($self:expr, $ins:expr, |$a:ident, $b:ident| $body:expr) => {{
        let $b = $self.src($ins).pop($ins.short)?;
        let $a = $self.src($ins).pop($ins.short)?;
        $self.src($ins).push_byte(u8::from($body))?;
    }};
}

/// Outcome of a single [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Halted,
    Executed(Instruction),
}

#[derive(Debug, Clone)]
pub struct Machine<H = NullHost> {
    pc: u16, // program counter
    halted: bool,

    memory: Memory,
    working: Stack,
    ret: Stack,
    devices: DeviceBus<H>,
}

impl Default for Machine<NullHost> {
    fn default() -> Self {
        Self::new(NullHost)
    }
}

impl<H: Host> Machine<H> {
    pub fn new(host: H) -> Self {
        Self {
            pc: 0,
            halted: false,
            memory: Memory::new(),
            working: Stack::new(StackKind::Working),
            ret: Stack::new(StackKind::Return),
            devices: DeviceBus::new(host),
        }
    }

    /// Load a program image at [`PROGRAM_ORIGIN`].
    pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
        self.memory.load_image(image, PROGRAM_ORIGIN)?;
        debug!(len = image.len(), "loaded image at {:#06x}", PROGRAM_ORIGIN);
        Ok(())
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn working_stack(&self) -> &Stack {
        &self.working
    }

    pub fn return_stack(&self) -> &Stack {
        &self.ret
    }

    pub fn devices(&self) -> &DeviceBus<H> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut DeviceBus<H> {
        &mut self.devices
    }

    pub fn host(&self) -> &H {
        self.devices.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.devices.host_mut()
    }

    /// Run from `start` until the machine halts or faults.
    pub fn run(&mut self, start: u16) -> Result<()> {
        self.pc = start;
        self.halted = false;
        debug!("run from {:#06x}", start);

        while self.step()? != Step::Halted {}

        debug!("halted at {:#06x}", self.pc);
        Ok(())
    }

    /// Like [`Machine::run`], but give up after `budget` instructions.
    /// Returns the number of instructions executed.
    pub fn run_bounded(&mut self, start: u16, budget: u64) -> Result<u64> {
        self.pc = start;
        self.halted = false;
        debug!(budget, "bounded run from {:#06x}", start);

        let mut executed = 0;
        loop {
            if executed == budget {
                // One more halt check so a program that fits exactly still succeeds
                if self.at_halt() {
                    self.halted = true;
                    return Ok(executed);
                }
                return Err(Error::BudgetExhausted { budget });
            }

            match self.step()? {
                Step::Halted => return Ok(executed),
                Step::Executed(_) => executed += 1,
            }
        }
    }

    /// Write `payload` to `port` and, if the port's device has a vector,
    /// run it to completion before returning. Returns whether a vector ran.
    pub fn dispatch(&mut self, port: u8, payload: u8) -> Result<bool> {
        self.dispatch_bounded(port, payload, None)
    }

    /// Like [`Machine::dispatch`], running the vector with
    /// [`Machine::run_bounded`] when a budget is given.
    pub fn dispatch_bounded(
        &mut self,
        port: u8,
        payload: u8,
        budget: Option<u64>,
    ) -> Result<bool> {
        self.devices.write_raw(port, payload);

        let vector = self.devices.vector(port);
        if vector == 0 {
            trace!(port, payload, "no vector, event dropped");
            return Ok(false);
        }

        debug!(port, payload, "dispatch to {:#06x}", vector);
        let result = match budget {
            Some(budget) => self.run_bounded(vector, budget).map(|_| ()),
            None => self.run(vector),
        };
        if let Err(err) = result {
            warn!(port, "vector {:#06x} failed: {}", vector, err);
            return Err(err);
        }
        Ok(true)
    }

    /// Deliver each byte of `input` as a console input event, each vector
    /// run limited to `budget` instructions if given.
    pub fn dispatch_console_input<I>(&mut self, input: I, budget: Option<u64>) -> Result<()>
    where
        I: IntoIterator<Item = u8>,
    {
        for byte in input {
            self.dispatch_bounded(CONSOLE_READ, byte, budget)?;
        }
        Ok(())
    }

    fn at_halt(&self) -> bool {
        self.pc == 0 || self.memory.read_byte(self.pc) == 0x00
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<Step> {
        if self.at_halt() {
            self.halted = true;
            return Ok(Step::Halted);
        }

        let at = self.pc;
        let ins = decode(self.memory.read_byte(at));
        self.pc = self.pc.wrapping_add(1);
        trace!(pc = at, "{}", ins);

        if ins.keep {
            self.src(ins).enter_keep_mode();
        }

        let result = self.execute(ins);
        self.src(ins).leave_keep_mode();
        result?;

        Ok(Step::Executed(ins))
    }

    fn src(&mut self, ins: Instruction) -> &mut Stack {
        if ins.ret { &mut self.ret } else { &mut self.working }
    }

    fn dst(&mut self, ins: Instruction) -> &mut Stack {
        if ins.ret { &mut self.working } else { &mut self.ret }
    }

    /// Short mode jumps are absolute, byte mode jumps are signed offsets
    /// from the current program counter.
    fn jump(&mut self, ins: Instruction, target: u16) {
        self.pc = if ins.short {
            target
        } else {
            relative(self.pc, target as u8)
        };
    }

    fn load(&self, ins: Instruction, addr: u16) -> u16 {
        if ins.short {
            self.memory.read_word(addr)
        } else {
            u16::from(self.memory.read_byte(addr))
        }
    }

    fn store(&mut self, ins: Instruction, addr: u16, value: u16) {
        if ins.short {
            self.memory.write_word(addr, value);
        } else {
            self.memory.write_byte(addr, value as u8);
        }
    }

    fn execute(&mut self, ins: Instruction) -> Result<()> {
        match ins.op {
            Op::LIT => {
                let value = self.load(ins, self.pc);
                self.src(ins).push(ins.short, value)?;
                self.pc = self.pc.wrapping_add(if ins.short { 2 } else { 1 });
            }

            // Stack
            Op::INC => {
                let a = self.src(ins).pop(ins.short)?;
                self.src(ins).push(ins.short, a.wrapping_add(1))?;
            }
            Op::POP => {
                self.src(ins).pop(ins.short)?;
            }
            Op::DUP => {
                let stack = self.src(ins);
                let a = stack.pop(ins.short)?;
                stack.push(ins.short, a)?;
                stack.push(ins.short, a)?;
            }
            Op::NIP => {
                let stack = self.src(ins);
                let b = stack.pop(ins.short)?;
                stack.pop(ins.short)?;
                stack.push(ins.short, b)?;
            }
            Op::SWP => {
                let stack = self.src(ins);
                let b = stack.pop(ins.short)?;
                let a = stack.pop(ins.short)?;
                stack.push(ins.short, b)?;
                stack.push(ins.short, a)?;
            }
            Op::OVR => {
                let stack = self.src(ins);
                let b = stack.pop(ins.short)?;
                let a = stack.pop(ins.short)?;
                stack.push(ins.short, a)?;
                stack.push(ins.short, b)?;
                stack.push(ins.short, a)?;
            }
            Op::ROT => {
                let stack = self.src(ins);
                let c = stack.pop(ins.short)?;
                let b = stack.pop(ins.short)?;
                let a = stack.pop(ins.short)?;
                stack.push(ins.short, b)?;
                stack.push(ins.short, c)?;
                stack.push(ins.short, a)?;
            }

            // Logic
            Op::EQU => compare!(self, ins, |a, b| a == b),
            Op::NEQ => compare!(self, ins, |a, b| a != b),
            Op::GTH => compare!(self, ins, |a, b| a > b),
            Op::LTH => compare!(self, ins, |a, b| a < b),

            // Control flow
            Op::JMP => {
                let addr = self.src(ins).pop(ins.short)?;
                self.jump(ins, addr);
            }
            Op::JCN => {
                let addr = self.src(ins).pop(ins.short)?;
                let cond = self.src(ins).pop_byte()?;
                if cond != 0 {
                    self.jump(ins, addr);
                }
            }
            Op::JSR => {
                let addr = self.src(ins).pop(ins.short)?;
                let ret = self.pc;
                self.dst(ins).push_word(ret)?;
                self.jump(ins, addr);
            }
            Op::STH => {
                let a = self.src(ins).pop(ins.short)?;
                self.dst(ins).push(ins.short, a)?;
            }

            // Memory
            Op::LDZ => {
                let addr = self.src(ins).pop_byte()?;
                let value = self.load(ins, u16::from(addr));
                self.src(ins).push(ins.short, value)?;
            }
            Op::STZ => {
                let addr = self.src(ins).pop_byte()?;
                let value = self.src(ins).pop(ins.short)?;
                self.store(ins, u16::from(addr), value);
            }
            Op::LDR => {
                let offset = self.src(ins).pop_byte()?;
                let value = self.load(ins, relative(self.pc, offset));
                self.src(ins).push(ins.short, value)?;
            }
            Op::STR => {
                let offset = self.src(ins).pop_byte()?;
                let value = self.src(ins).pop(ins.short)?;
                self.store(ins, relative(self.pc, offset), value);
            }
            Op::LDA => {
                let addr = self.src(ins).pop_word()?;
                let value = self.load(ins, addr);
                self.src(ins).push(ins.short, value)?;
            }
            Op::STA => {
                let addr = self.src(ins).pop_word()?;
                let value = self.src(ins).pop(ins.short)?;
                self.store(ins, addr, value);
            }
            Op::DEI => {
                let port = self.src(ins).pop_byte()?;
                let value = if ins.short {
                    let hi = self.devices.read(port);
                    let lo = self.devices.read(port.wrapping_add(1));
                    u16::from_be_bytes([hi, lo])
                } else {
                    u16::from(self.devices.read(port))
                };
                self.src(ins).push(ins.short, value)?;
            }
            Op::DEO => {
                let port = self.src(ins).pop_byte()?;
                let value = self.src(ins).pop(ins.short)?;
                if ins.short {
                    let [hi, lo] = value.to_be_bytes();
                    self.devices.write(port, hi)?;
                    self.devices.write(port.wrapping_add(1), lo)?;
                } else {
                    self.devices.write(port, value as u8)?;
                }
            }

            // Arithmetic
            Op::ADD => binary!(self, ins, |a, b| a.wrapping_add(b)),
            Op::SUB => binary!(self, ins, |a, b| a.wrapping_sub(b)),
            Op::MUL => binary!(self, ins, |a, b| a.wrapping_mul(b)),
            Op::DIV => {
                let b = self.src(ins).pop(ins.short)?;
                let a = self.src(ins).pop(ins.short)?;
                if b == 0 {
                    return Err(Error::DivisionByZero { pc: self.pc });
                }
                self.src(ins).push(ins.short, a / b)?;
            }
            Op::AND => binary!(self, ins, |a, b| a & b),
            Op::ORA => binary!(self, ins, |a, b| a | b),
            Op::EOR => binary!(self, ins, |a, b| a ^ b),
            Op::SFT => {
                let shift = self.src(ins).pop_byte()?;
                let value = self.src(ins).pop(ins.short)?;
                let (left, right) = (shift >> 4, shift & 0x0F);
                let shifted = (u32::from(value) >> right) << left;
                self.src(ins).push(ins.short, shifted as u16)?;
            }
        }

        Ok(())
    }
}

/// `base` moved by `offset` read as a two's complement byte.
fn relative(base: u16, offset: u8) -> u16 {
    base.wrapping_add(offset as i8 as u16)
}

impl<H> fmt::Display for Machine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pc: {:04x}\thalted: {}", self.pc, self.halted)?;
        writeln!(f, "wst: {}", self.working)?;
        write!(f, "rst: {}", self.ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(image: &[u8]) -> Machine {
        let mut mach = Machine::new(NullHost);
        mach.load_image(image).unwrap();
        mach.run(PROGRAM_ORIGIN).unwrap();
        mach
    }

    #[test]
    fn test_machine_initialization() {
        let mach: Machine = Machine::default();
        assert!(!mach.is_halted());
        assert_eq!(mach.pc(), 0);
        assert!(mach.working_stack().is_empty());
        assert!(mach.return_stack().is_empty());
    }

    #[test]
    fn test_literal_then_break() {
        let mach = run(&[0x80, 0x05, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x05]);
        assert!(mach.is_halted());
        assert_eq!(mach.pc(), 0x0102);
    }

    #[test]
    fn test_literal_with_any_flag() {
        // LIT2, LITr and LIT2r all take operands, keep or not
        let mach = run(&[0x20, 0x12, 0x34, 0x40, 0x09, 0x60, 0xAB, 0xCD, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x12, 0x34]);
        assert_eq!(mach.return_stack().as_slice(), &[0x09, 0xAB, 0xCD]);
    }

    #[test]
    fn test_stack_shuffling() {
        // #01 #02 #03 ROT
        let mach = run(&[0x80, 0x01, 0x80, 0x02, 0x80, 0x03, 0x07, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x02, 0x03, 0x01]);

        // #01 #02 OVR SWP NIP DUP INC
        let mach = run(&[0x80, 0x01, 0x80, 0x02, 0x06, 0x05, 0x04, 0x03, 0x01, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_short_mode_shuffling() {
        // #1234 #abcd SWP2 POP
        let mach = run(&[0xA0, 0x12, 0x34, 0xA0, 0xAB, 0xCD, 0x25, 0x02, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0xAB, 0xCD, 0x12]);
    }

    #[test]
    fn test_keep_mode_preserves_operands() {
        // #03 #04 ADDk
        let mach = run(&[0x80, 0x03, 0x80, 0x04, 0x98, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x03, 0x04, 0x07]);

        // #05 POPk
        let mach = run(&[0x80, 0x05, 0x82, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x05]);
    }

    #[test]
    fn test_comparison_is_byte_wide() {
        // #0100 #00ff GTH2 #0100 #0100 EQU2
        let mach = run(&[
            0xA0, 0x01, 0x00, 0xA0, 0x00, 0xFF, 0x2A, 0xA0, 0x01, 0x00, 0xA0, 0x01, 0x00, 0x28,
            0x00,
        ]);
        assert_eq!(mach.working_stack().as_slice(), &[0x01, 0x01]);

        // #02 #03 LTH #02 #03 NEQ #02 #03 GTH
        let mach = run(&[
            0x80, 0x02, 0x80, 0x03, 0x0B, 0x80, 0x02, 0x80, 0x03, 0x09, 0x80, 0x02, 0x80, 0x03,
            0x0A, 0x00,
        ]);
        assert_eq!(mach.working_stack().as_slice(), &[0x01, 0x01, 0x00]);
    }

    #[test]
    fn test_arithmetic_wraps_within_width() {
        // #ff #02 ADD #01 #02 SUB #10 #20 MUL
        let mach = run(&[
            0x80, 0xFF, 0x80, 0x02, 0x18, 0x80, 0x01, 0x80, 0x02, 0x19, 0x80, 0x10, 0x80, 0x20,
            0x1A, 0x00,
        ]);
        assert_eq!(mach.working_stack().as_slice(), &[0x01, 0xFF, 0x00]);

        // #ffff #0002 ADD2
        let mach = run(&[0xA0, 0xFF, 0xFF, 0xA0, 0x00, 0x02, 0x38, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x00, 0x01]);
    }

    #[test]
    fn test_division_and_bitwise() {
        // #07 #02 DIV #0c #0a AND #0c #0a ORA #0c #0a EOR
        let mach = run(&[
            0x80, 0x07, 0x80, 0x02, 0x1B, 0x80, 0x0C, 0x80, 0x0A, 0x1C, 0x80, 0x0C, 0x80, 0x0A,
            0x1D, 0x80, 0x0C, 0x80, 0x0A, 0x1E, 0x00,
        ]);
        assert_eq!(mach.working_stack().as_slice(), &[0x03, 0x08, 0x0E, 0x06]);
    }

    #[test]
    fn test_division_by_zero() {
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0x80, 0x06, 0x80, 0x00, 0x1B, 0x00]).unwrap();

        let err = mach.run(PROGRAM_ORIGIN).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero { pc: 0x0105 }));
        assert!(mach.working_stack().is_empty());
    }

    #[test]
    fn test_shift() {
        // #34 #12 SFT: right 2, left 1
        let mach = run(&[0x80, 0x34, 0x80, 0x12, 0x1F, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x1A]);

        // #0001 #f0 SFT2: left 15
        let mach = run(&[0xA0, 0x00, 0x01, 0x80, 0xF0, 0x3F, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x80, 0x00]);

        // #81 #40 SFT: high bits fall off the byte
        let mach = run(&[0x80, 0x81, 0x80, 0x40, 0x1F, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x10]);
    }

    #[test]
    fn test_absolute_jump() {
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0xA0, 0x02, 0x00, 0x2C]).unwrap();
        mach.pc = PROGRAM_ORIGIN;

        mach.step().unwrap();
        mach.step().unwrap();
        assert_eq!(mach.pc(), 0x0200);
    }

    #[test]
    fn test_relative_jump_backwards() {
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0x80, 0xFF, 0x0C]).unwrap();
        mach.pc = PROGRAM_ORIGIN;

        mach.step().unwrap();
        mach.step().unwrap();
        // After JMP the pc was 0x0103, -1 lands back on the JMP itself
        assert_eq!(mach.pc(), 0x0102);
    }

    #[test]
    fn test_conditional_jump() {
        // #01 #03 JCN #aa BRK #bb
        let mach = run(&[0x80, 0x01, 0x80, 0x03, 0x0D, 0x80, 0xAA, 0x00, 0x80, 0xBB, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0xBB]);

        // #00 #03 JCN #aa BRK #bb
        let mach = run(&[0x80, 0x00, 0x80, 0x03, 0x0D, 0x80, 0xAA, 0x00, 0x80, 0xBB, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0xAA]);
    }

    #[test]
    fn test_conditional_jump_keep() {
        // #01 #02 JCNk #aa BRK: operands stay, the jump lands on the BRK
        let mach = run(&[0x80, 0x01, 0x80, 0x02, 0x8D, 0x80, 0xAA, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x01, 0x02]);
        assert_eq!(mach.pc(), 0x0107);
    }

    #[test]
    fn test_subroutine_return_mode() {
        // 0100: LIT2r 0108 JSR2r BRK
        // 0108: #07 BRK
        let mach = run(&[
            0x60, 0x01, 0x08, 0x6E, 0x00, 0x00, 0x00, 0x00, 0x80, 0x07, 0x00,
        ]);
        assert_eq!(mach.working_stack().as_slice(), &[0x01, 0x04, 0x07]);
        assert!(mach.return_stack().is_empty());
        assert_eq!(mach.pc(), 0x010A);
    }

    #[test]
    fn test_subroutine_call_and_return() {
        // 0100: #0108 JSR2 BRK
        // 0108: #07 JMP2r
        let mach = run(&[
            0xA0, 0x01, 0x08, 0x2E, 0x00, 0x00, 0x00, 0x00, 0x80, 0x07, 0x6C,
        ]);
        assert_eq!(mach.working_stack().as_slice(), &[0x07]);
        assert!(mach.return_stack().is_empty());
        assert_eq!(mach.pc(), 0x0104);
    }

    #[test]
    fn test_jump_to_zero_halts() {
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0xA0, 0x00, 0x00, 0x2C]).unwrap();

        mach.run(PROGRAM_ORIGIN).unwrap();
        assert!(mach.is_halted());
        assert_eq!(mach.pc(), 0);
    }

    #[test]
    fn test_stash_moves_between_stacks() {
        // #12 STH #34 STHr
        let mach = run(&[0x80, 0x12, 0x0F, 0x80, 0x34, 0x4F, 0x00]);
        assert_eq!(mach.working_stack().as_slice(), &[0x34, 0x12]);
        assert!(mach.return_stack().is_empty());
    }

    #[test]
    fn test_zero_page_and_absolute_memory() {
        // #abcd #10 STZ2 #10 LDZ #1234 #0300 STA2 #0301 LDA
        let mach = run(&[
            0xA0, 0xAB, 0xCD, 0x80, 0x10, 0x31, 0x80, 0x10, 0x10, 0xA0, 0x12, 0x34, 0xA0, 0x03,
            0x00, 0x35, 0xA0, 0x03, 0x01, 0x14, 0x00,
        ]);
        assert_eq!(mach.memory().read_word(0x0010), 0xABCD);
        assert_eq!(mach.memory().read_word(0x0300), 0x1234);
        assert_eq!(mach.working_stack().as_slice(), &[0xAB, 0x34]);
    }

    #[test]
    fn test_relative_memory() {
        // 0100: #2a #04 STR  -> writes 0x0109
        // 0105: #03 LDR BRK  -> reads 0x0108 + 3 = 0x010b
        // 010b: 77
        let mach = run(&[
            0x80, 0x2A, 0x80, 0x04, 0x13, 0x80, 0x03, 0x12, 0x00, 0x00, 0x00, 0x77,
        ]);
        assert_eq!(mach.memory().read_byte(0x0109), 0x2A);
        assert_eq!(mach.working_stack().as_slice(), &[0x77]);
    }

    #[test]
    fn test_device_round_trip_in_short_mode() {
        // #1234 #20 DEO2 #20 DEI2 #21 DEI
        let mach = run(&[
            0xA0, 0x12, 0x34, 0x80, 0x20, 0x37, 0x80, 0x20, 0x36, 0x80, 0x21, 0x16, 0x00,
        ]);
        assert_eq!(mach.devices().read_raw(0x20), 0x12);
        assert_eq!(mach.devices().read_raw(0x21), 0x34);
        assert_eq!(mach.working_stack().as_slice(), &[0x12, 0x34, 0x34]);
    }

    #[test]
    fn test_underflow_propagates() {
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0x18, 0x00]).unwrap();

        assert!(matches!(
            mach.run(PROGRAM_ORIGIN),
            Err(Error::StackUnderflow(StackKind::Working))
        ));
    }

    #[test]
    fn test_run_bounded() {
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0x80, 0x01, 0x80, 0x02, 0x00]).unwrap();
        assert_eq!(mach.run_bounded(PROGRAM_ORIGIN, 2).unwrap(), 2);

        // #fd JMP loops forever
        let mut mach = Machine::new(NullHost);
        mach.load_image(&[0x80, 0xFD, 0x0C]).unwrap();
        assert!(matches!(
            mach.run_bounded(PROGRAM_ORIGIN, 100),
            Err(Error::BudgetExhausted { budget: 100 })
        ));
    }

    #[test]
    fn test_display() {
        let mach = run(&[0x80, 0x05, 0x00]);
        assert_eq!(
            mach.to_string(),
            "pc: 0102\thalted: true\nwst: [05]\nrst: []"
        );
    }
}
