//! Nested vectored interrupt controller.
//!
//! Lines are plain numbers, or anything that converts into one such as
//! [pac::Interrupt]. Every line operation touches exactly bit `n % 32` of
//! word `n / 32` in its register array.
//!
//! # Handler obligations
//!
//! Enabling a line here only lets the request through. The handler must
//! clear whatever raised it before returning, or the line fires again at
//! once:
//!
//! * `FLASH`: write back [Status::EOP](crate::flash::Status::EOP) and any
//!   error flags with [Flash::clear_status](crate::flash::Flash::clear_status).
//! * `USART1`: see [Event](crate::usart::Event) for the flag behind each
//!   source.
//! * `TIM2` to `TIM5`: clear UIF in the timer's SR.
//! * SysTick is an exception, not a line; see [crate::timer].

use crate::pac;
use crate::pac::icb::ictr;
use crate::pac::nvic::{ipr, stir};

/// An interrupt controller error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Line number past [MAX_LINE].
    InvalidLine(u16),
    /// Priorities run 0 to [MAX_PRIORITY].
    InvalidPriority(u8),
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "NVIC Error {:?}", self)
    }
}

/// Highest line number the register arrays can address.
pub const MAX_LINE: u16 = 32 * 15;

/// Highest priority value. Only the top four bits of each priority
/// byte are implemented.
pub const MAX_PRIORITY: u8 = 15;

/// The interrupt controller.
pub struct Nvic<'a> {
    nvic: &'a pac::nvic::RegisterBlock,
    icb: &'a pac::icb::RegisterBlock,
}

impl core::fmt::Debug for Nvic<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Nvic")
            .field("interrupts_count", &self.interrupts_count())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Nvic<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Nvic {{ interrupts_count: {} }}",
            self.interrupts_count()
        )
    }
}

impl Nvic<'static> {
    #[inline(always)]
    pub fn new(_nvic: pac::NVIC, _icb: pac::ICB) -> Self {
        // safety: owning the tokens is owning the blocks
        unsafe { Self::from_registers(&*pac::NVIC::ptr(), &*pac::ICB::ptr()) }
    }
}

// (word, bit) for a line, or an error past MAX_LINE
#[inline(always)]
fn locate(line: u16) -> Result<(usize, u32), Error> {
    if line > MAX_LINE {
        return Err(Error::InvalidLine(line));
    }

    Ok(((line / 32) as usize, 1 << (line % 32)))
}

impl<'a> Nvic<'a> {
    #[inline(always)]
    pub fn from_registers(
        nvic: &'a pac::nvic::RegisterBlock,
        icb: &'a pac::icb::RegisterBlock,
    ) -> Self {
        Self { nvic, icb }
    }

    /// Number of lines this controller implements, read from the
    /// hardware.
    #[inline(always)]
    pub fn interrupts_count(&self) -> u16 {
        (self.icb.ictr.read_field(ictr::INTLINESNUM) as u16 + 1) * 32
    }

    // set and clear arrays ignore zeros, so a single-bit write is enough
    // and never disturbs other lines

    pub fn enable_interrupt(&mut self, line: impl Into<u16>) -> Result<(), Error> {
        let (word, bit) = locate(line.into())?;
        self.nvic.iser[word].write(bit);
        Ok(())
    }

    pub fn disable_interrupt(&mut self, line: impl Into<u16>) -> Result<(), Error> {
        let (word, bit) = locate(line.into())?;
        self.nvic.icer[word].write(bit);
        Ok(())
    }

    pub fn set_pending(&mut self, line: impl Into<u16>) -> Result<(), Error> {
        let (word, bit) = locate(line.into())?;
        self.nvic.ispr[word].write(bit);
        Ok(())
    }

    pub fn clear_pending(&mut self, line: impl Into<u16>) -> Result<(), Error> {
        let (word, bit) = locate(line.into())?;
        self.nvic.icpr[word].write(bit);
        Ok(())
    }

    /// Is the handler for `line` running, or preempted? False for lines
    /// out of range.
    pub fn is_active(&self, line: impl Into<u16>) -> bool {
        match locate(line.into()) {
            Ok((word, bit)) => self.nvic.iabr[word].read() & bit != 0,
            Err(_) => false,
        }
    }

    pub fn is_enabled(&self, line: impl Into<u16>) -> bool {
        match locate(line.into()) {
            Ok((word, bit)) => self.nvic.iser[word].read() & bit != 0,
            Err(_) => false,
        }
    }

    pub fn is_pending(&self, line: impl Into<u16>) -> bool {
        match locate(line.into()) {
            Ok((word, bit)) => self.nvic.ispr[word].read() & bit != 0,
            Err(_) => false,
        }
    }

    /// Set the priority of `line`, 0 (most urgent) to [MAX_PRIORITY].
    pub fn set_priority(&mut self, line: impl Into<u16>, priority: u8) -> Result<(), Error> {
        let line = line.into();
        locate(line)?;
        if priority > MAX_PRIORITY {
            return Err(Error::InvalidPriority(priority));
        }

        let field = ipr::PRIORITY.at((line % 4) as u8);
        self.nvic.ipr[(line / 4) as usize].write_field(field, (priority as u32) << 4);
        Ok(())
    }

    pub fn priority(&self, line: impl Into<u16>) -> Result<u8, Error> {
        let line = line.into();
        locate(line)?;

        let field = ipr::PRIORITY.at((line % 4) as u8);
        Ok((self.nvic.ipr[(line / 4) as usize].read_field(field) >> 4) as u8)
    }

    /// Raise line `n` from software, wrapped to the implemented lines.
    ///
    /// For testing handlers, not for signalling.
    pub fn trigger_interrupt(&mut self, n: u16) {
        let line = n % self.interrupts_count();
        self.nvic.stir.write(stir::INTID.insert(0, line as u32));
    }
}
