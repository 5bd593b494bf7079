use crate::block;
use crate::gpio::Pin;
use crate::pac;
use crate::pac::usart::{cr1, cr3, dr, sr};

use super::Error;

/// The receive direction of a USART, with its pin.
pub struct Rx<'a> {
    regs: &'a pac::usart::RegisterBlock,
    pin: Pin<'a>,
}

impl core::fmt::Debug for Rx<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Rx").field("pin", &self.pin).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Rx<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Rx {{ pin: {} }}", self.pin)
    }
}

impl<'a> Rx<'a> {
    #[inline(always)]
    pub(super) fn new(regs: &'a pac::usart::RegisterBlock, pin: Pin<'a>) -> Self {
        Self { regs, pin }
    }

    #[inline(always)]
    pub fn pin(&self) -> &Pin<'a> {
        &self.pin
    }

    /// Give the pin back. The receiver is left as it is.
    #[inline(always)]
    pub fn free(self) -> Pin<'a> {
        self.pin
    }

    // CR1 and CR3 are shared with the transmit side
    #[inline(always)]
    fn shared(&self, f: impl FnOnce(&pac::usart::RegisterBlock)) {
        critical_section::with(|_cs| f(self.regs));
    }

    pub fn enable(&mut self) {
        self.shared(|regs| regs.cr1.set(cr1::RE));
    }

    pub fn disable(&mut self) {
        self.shared(|regs| regs.cr1.clear(cr1::RE));
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.regs.cr1.is_set(cr1::RE)
    }

    /// Mute the receiver until the configured wake trigger.
    pub fn sleep(&mut self) {
        self.shared(|regs| regs.cr1.set(cr1::RWU));
    }

    pub fn wake(&mut self) {
        self.shared(|regs| regs.cr1.clear(cr1::RWU));
    }

    pub fn enable_dma(&mut self) {
        self.shared(|regs| regs.cr3.set(cr3::DMAR));
    }

    pub fn disable_dma(&mut self) {
        self.shared(|regs| regs.cr3.clear(cr3::DMAR));
    }

    /// Is there nothing to read?
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        !self.regs.sr.is_set(sr::RXNE)
    }

    // popping DR moves the receiver on to the next frame
    #[inline(always)]
    fn take_data(&mut self) -> u32 {
        let data = self.regs.dr.read_field(dr::DR);
        #[cfg(test)]
        block::sim::react();
        data
    }

    /// Take the data register without checking [Rx::is_empty].
    ///
    /// With [DataBits::Nine](super::DataBits::Nine) and no parity the
    /// ninth bit is dropped, use [Rx::read_u16] for those frames.
    #[inline(always)]
    pub fn read(&mut self) -> u8 {
        self.take_data() as u8
    }

    /// Take all nine data bits without checking [Rx::is_empty].
    #[inline(always)]
    pub fn read_u16(&mut self) -> u16 {
        self.take_data() as u16
    }

    // the error a status word flags on the byte in DR
    fn flagged(status: u32) -> Option<Error> {
        if status & sr::PE.mask() != 0 {
            Some(Error::Parity)
        } else if status & sr::FE.mask() != 0 {
            Some(Error::Framing)
        } else if status & sr::NF.mask() != 0 {
            Some(Error::Noise)
        } else if status & sr::ORE.mask() != 0 {
            Some(Error::Overrun)
        } else {
            None
        }
    }

    fn receive(&mut self) -> block::Result<u16, Error> {
        let status = self.regs.sr.read();
        if let Some(error) = Self::flagged(status) {
            self.take_data();
            Err(block::Error::Other(error))
        } else if status & sr::RXNE.mask() != 0 {
            Ok(self.read_u16())
        } else {
            Err(block::Error::WouldBlock)
        }
    }

    /// Read a single byte from the USART.
    ///
    /// A byte flagged with an error is consumed and the error reported
    /// instead. Reading SR then DR clears the flag.
    #[inline(always)]
    pub fn read_one(&mut self) -> block::Result<u8, Error> {
        self.receive().map(|data| data as u8)
    }

    /// Read a single 9-bit frame from the USART, as [Rx::read_one] does.
    #[inline(always)]
    pub fn read_one_u16(&mut self) -> block::Result<u16, Error> {
        self.receive()
    }

    /// Read at least one byte from the USART.
    ///
    /// Stops short at a byte flagged with an error once some bytes are in
    /// `buf`, leaving the error for the next call.
    pub fn read_some(&mut self, buf: &mut [u8]) -> block::Result<usize, Error> {
        let mut amt = 0;
        while amt < buf.len() {
            if amt > 0 && Self::flagged(self.regs.sr.read()).is_some() {
                return Ok(amt);
            }

            match self.read_one() {
                Ok(b) => {
                    buf[amt] = b;
                    amt += 1;
                }
                Err(block::Error::WouldBlock) if amt > 0 => return Ok(amt),
                Err(e) => return Err(e),
            }
        }
        Ok(amt)
    }

    /// Fill the buffer, blocking as needed.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let mut start = 0;
        while start < buf.len() {
            start += block::block!(self.read_some(&mut buf[start..]))?;
        }

        Ok(())
    }
}
