use core::convert::Infallible;

use crate::block;
use crate::gpio::Pin;
use crate::pac;
use crate::pac::usart::{cr1, cr3, dr, sr};

/// The transmit direction of a USART, with its pin.
pub struct Tx<'a> {
    regs: &'a pac::usart::RegisterBlock,
    pin: Pin<'a>,
}

impl core::fmt::Debug for Tx<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Tx").field("pin", &self.pin).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tx<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Tx {{ pin: {} }}", self.pin)
    }
}

impl<'a> Tx<'a> {
    #[inline(always)]
    pub(super) fn new(regs: &'a pac::usart::RegisterBlock, pin: Pin<'a>) -> Self {
        Self { regs, pin }
    }

    #[inline(always)]
    pub fn pin(&self) -> &Pin<'a> {
        &self.pin
    }

    /// Give the pin back. The transmitter is left as it is.
    #[inline(always)]
    pub fn free(self) -> Pin<'a> {
        self.pin
    }

    // CR1 and CR3 are shared with the receive side
    #[inline(always)]
    fn shared(&self, f: impl FnOnce(&pac::usart::RegisterBlock)) {
        critical_section::with(|_cs| f(self.regs));
    }

    pub fn enable(&mut self) {
        self.shared(|regs| regs.cr1.set(cr1::TE));
    }

    pub fn disable(&mut self) {
        self.shared(|regs| regs.cr1.clear(cr1::TE));
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.regs.cr1.is_set(cr1::TE)
    }

    /// Queue a break frame after the current byte.
    pub fn send_break(&mut self) {
        self.shared(|regs| regs.cr1.set(cr1::SBK));
    }

    pub fn enable_dma(&mut self) {
        self.shared(|regs| regs.cr3.set(cr3::DMAT));
    }

    pub fn disable_dma(&mut self) {
        self.shared(|regs| regs.cr3.clear(cr3::DMAT));
    }

    /// Can the data register take another byte?
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.regs.sr.is_set(sr::TXE)
    }

    /// Put `data` in the data register without checking
    /// [Tx::is_empty].
    #[inline(always)]
    pub fn write(&mut self, data: u8) {
        self.regs.dr.write(dr::DR.insert(0, data as u32));
    }

    /// Put a 9-bit frame in the data register without checking
    /// [Tx::is_empty]. Bits past the ninth are dropped.
    ///
    /// Only useful with [DataBits::Nine](super::DataBits::Nine) and no
    /// parity, otherwise the top bit is replaced by parity.
    #[inline(always)]
    pub fn write_u16(&mut self, data: u16) {
        self.regs.dr.write(dr::DR.insert(0, data as u32));
    }

    /// Write a single byte to the USART.
    pub fn write_one(&mut self, data: u8) -> block::Result<(), Infallible> {
        self.write_one_u16(data as u16)
    }

    /// Write a single 9-bit frame to the USART.
    pub fn write_one_u16(&mut self, data: u16) -> block::Result<(), Infallible> {
        if self.is_empty() {
            self.write_u16(data);
            Ok(())
        } else {
            Err(block::Error::WouldBlock)
        }
    }

    /// Write all bytes to the USART, blocking as needed.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), Infallible> {
        for b in data {
            block::block!(self.write_one(*b))?;
        }

        Ok(())
    }

    /// Has the last byte left the shift register?
    pub fn flush(&mut self) -> block::Result<(), Infallible> {
        if self.regs.sr.is_set(sr::TC) {
            Ok(())
        } else {
            Err(block::Error::WouldBlock)
        }
    }
}

impl core::fmt::Write for Tx<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_all(s.as_bytes()).unwrap_or_else(|e| match e {});
        Ok(())
    }
}
