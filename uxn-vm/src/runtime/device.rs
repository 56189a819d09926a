//! Memory mapped device bus
//!
//! 256 ports split into 16 slots of 16 bytes. The first two bytes of a slot
//! hold that device's vector, the address execution resumes at when the
//! device raises an event.

use crate::error::Result;
use crate::host::Host;

pub const DEVICE_PORTS: usize = 0x100;
pub const SLOT_SIZE: u8 = 0x10;

pub const CONSOLE_VECTOR: u8 = 0x10;
pub const CONSOLE_READ: u8 = 0x12;
pub const CONSOLE_WRITE: u8 = 0x18;

/// Port storage plus the host hooks that observe it.
#[derive(Debug, Clone)]
pub struct DeviceBus<H> {
    ports: [u8; DEVICE_PORTS],
    host: H,
}

impl<H: Host> DeviceBus<H> {
    pub fn new(host: H) -> Self {
        Self {
            ports: [0; DEVICE_PORTS],
            host,
        }
    }

    /// Read a port without involving the host.
    pub fn read_raw(&self, port: u8) -> u8 {
        self.ports[port as usize]
    }

    /// Store a port without involving the host. Used to inject event data.
    pub fn write_raw(&mut self, port: u8, value: u8) {
        self.ports[port as usize] = value;
    }

    /// `DEI` path: the host gets to replace the stored byte.
    pub fn read(&mut self, port: u8) -> u8 {
        let stored = self.read_raw(port);
        self.host.on_read(port, stored)
    }

    /// `DEO` path: store, then let the host react before the instruction
    /// completes.
    pub fn write(&mut self, port: u8, value: u8) -> Result<()> {
        self.write_raw(port, value);
        self.host.on_write(port, value)?;
        Ok(())
    }

    /// Vector of the slot containing `port`.
    pub fn vector(&self, port: u8) -> u16 {
        let base = port & !(SLOT_SIZE - 1);
        u16::from_be_bytes([self.read_raw(base), self.read_raw(base + 1)])
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ports
    }
}
