//! Host bindings
//!
//! A [`Host`] supplies the side effects behind device ports. The machine
//! calls it synchronously from `DEI` and `DEO`; everything else about the
//! device bus is plain storage.

use std::io::{self, Write};

use crate::runtime::device::CONSOLE_WRITE;

pub trait Host {
    /// Called on `DEI`. `stored` is the byte currently held by the port.
    fn on_read(&mut self, port: u8, stored: u8) -> u8 {
        let _ = port;
        stored
    }

    /// Called on `DEO` after the byte has been stored.
    fn on_write(&mut self, port: u8, value: u8) -> io::Result<()> {
        let _ = (port, value);
        Ok(())
    }
}

/// Host without any device behaviour.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}

/// Reference console binding: bytes written to the console output port go
/// to `W`.
#[derive(Debug, Clone, Default)]
pub struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn sink(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Host for Console<W> {
    fn on_write(&mut self, port: u8, value: u8) -> io::Result<()> {
        if port == CONSOLE_WRITE {
            self.out.write_all(&[value])?;
            self.out.flush()?;
        }
        Ok(())
    }
}
