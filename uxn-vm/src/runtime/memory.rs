use crate::error::{Error, Result};

pub const MEMORY_SIZE: usize = 0x10000;

/// Where program images are loaded and where execution starts.
pub const PROGRAM_ORIGIN: u16 = 0x0100;

/// 64KiB of byte addressable memory. Every 16-bit address is valid, word
/// accesses wrap around at the end of the address space.
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE],
        }
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.write_byte(addr, hi);
        self.write_byte(addr.wrapping_add(1), lo);
    }

    /// Copy `image` verbatim into memory starting at `origin`.
    pub fn load_image(&mut self, image: &[u8], origin: u16) -> Result<()> {
        let start = origin as usize;
        if image.len() > MEMORY_SIZE - start {
            return Err(Error::ImageTooLarge {
                len: image.len(),
                origin,
            });
        }

        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
