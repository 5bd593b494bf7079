//! Embedded flash interface.
//!
//! Erase and program operations only pull their trigger bit. Completion
//! is reported through [Flash::status], which the caller polls.
//!
//! # Interrupts
//!
//! [Flash::enable_interrupts] turns on both the end-of-operation and the
//! error interrupt (line [pac::Interrupt::FLASH]). The handler must clear
//! [Status::EOP] and any error flags by writing them back with
//! [Flash::clear_status], or it fires again as soon as it returns.

use bitflags::bitflags;

use crate::block;
use crate::pac;
use crate::pac::flash::{acr, cr, sr, KEYS, OPT_KEYS};

/// A flash error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Argument does not fit its hardware field.
    OutOfRange,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Flash Error {:?}", self)
    }
}

bitflags! {
    /// A snapshot of the flash status register.
    pub struct Status: u32 {
        /// End of operation.
        const EOP = sr::EOP.mask();
        /// Operation error.
        const OPERR = sr::OPERR.mask();
        /// Write protection error.
        const WRPERR = sr::WRPERR.mask();
        /// Programming alignment error.
        const PGAERR = sr::PGAERR.mask();
        /// Programming parallelism error.
        const PGPERR = sr::PGPERR.mask();
        /// Programming sequence error.
        const PGSERR = sr::PGSERR.mask();
        /// Proprietary readout protection error.
        const RDERR = sr::RDERR.mask();
        /// Busy.
        const BSY = sr::BSY.mask();

        /// Every flag cleared by writing 1.
        const CLEARABLE = Self::EOP.bits | Self::OPERR.bits | Self::WRPERR.bits
            | Self::PGAERR.bits | Self::PGPERR.bits | Self::PGSERR.bits
            | Self::RDERR.bits;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u32:#x})", self.bits());
    }
}

/// Width of each program access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramSize {
    X8 = 0b00,
    X16 = 0b01,
    X32 = 0b10,
    X64 = 0b11,
}

/// Highest sector number on this device.
pub const MAX_SECTOR: u8 = 5;

/// Highest wait-state count ACR can hold.
pub const MAX_WAIT_STATES: u8 = 15;

/// The flash interface.
pub struct Flash<'a> {
    regs: &'a pac::flash::RegisterBlock,
}

impl core::fmt::Debug for Flash<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Flash")
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Flash<'_> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Flash {{ status: {} }}", self.status());
    }
}

impl Flash<'static> {
    /// Take over the flash interface.
    #[inline(always)]
    pub fn new(_flash: pac::FLASH) -> Self {
        // safety: owning the token is owning the block, which lives
        // forever
        Self {
            regs: unsafe { &*pac::FLASH::ptr() },
        }
    }
}

impl<'a> Flash<'a> {
    /// Drive an arbitrary flash register block.
    #[inline(always)]
    pub fn from_registers(regs: &'a pac::flash::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Unlock the control register.
    ///
    /// Writes both keys in order. A wrong sequence locks the control
    /// register until the next reset.
    pub fn unlock_control_register(&mut self) {
        for key in KEYS {
            self.regs.keyr.write(key);
        }
    }

    /// Unlock the option control register, same rules as
    /// [Flash::unlock_control_register].
    pub fn unlock_option_sector(&mut self) {
        for key in OPT_KEYS {
            self.regs.optkeyr.write(key);
        }
    }

    /// Read the status register.
    #[inline(always)]
    pub fn status(&self) -> Status {
        Status::from_bits_truncate(self.regs.sr.read())
    }

    /// Clear status flags. Only [Status::CLEARABLE] flags are written.
    #[inline(always)]
    pub fn clear_status(&mut self, flags: Status) {
        // write-1-to-clear, zeros leave the other flags alone
        self.regs.sr.write((flags & Status::CLEARABLE).bits());
    }

    #[inline(always)]
    pub fn is_busy(&self) -> bool {
        self.status().contains(Status::BSY)
    }

    // control changes are refused while CR bit 31 reads set. only polled,
    // never written.
    #[inline(always)]
    fn wait_for_control(&self) {
        block::wait_while(|| self.regs.cr.is_set(cr::LOCK));
    }

    /// Enable the end-of-operation and error interrupts.
    pub fn enable_interrupts(&mut self) {
        self.wait_for_control();
        self.regs.cr.set(cr::EOPIE);
        self.regs.cr.set(cr::ERRIE);
    }

    /// Disable the end-of-operation and error interrupts.
    pub fn disable_interrupts(&mut self) {
        self.wait_for_control();
        self.regs.cr.clear(cr::EOPIE);
        self.regs.cr.clear(cr::ERRIE);
    }

    /// Start the erase selected by [Flash::mass_erase] or
    /// [Flash::sector_erase].
    pub fn start_erasing(&mut self) {
        self.wait_for_control();
        self.regs.cr.set(cr::STRT);
    }

    /// Set the program parallelism.
    pub fn set_program_size(&mut self, size: ProgramSize) {
        self.wait_for_control();
        self.regs.cr.write_field(cr::PSIZE, size as u32);
    }

    /// Select the sector for a sector erase.
    ///
    /// Sectors above [MAX_SECTOR] are rejected and the register is left
    /// untouched.
    pub fn set_sector_count(&mut self, n: u8) -> Result<(), Error> {
        if n > MAX_SECTOR {
            return Err(Error::OutOfRange);
        }

        self.regs.cr.write_field(cr::SNB, n as u32);
        Ok(())
    }

    /// Select a mass erase.
    #[inline(always)]
    pub fn mass_erase(&mut self) {
        self.regs.cr.set(cr::MER);
    }

    /// Select a sector erase.
    #[inline(always)]
    pub fn sector_erase(&mut self) {
        self.regs.cr.set(cr::SER);
    }

    /// Enter programming mode.
    #[inline(always)]
    pub fn programming(&mut self) {
        self.regs.cr.set(cr::PG);
    }

    /// Set the number of wait states for flash reads.
    pub fn set_wait_states(&mut self, n: u8) -> Result<(), Error> {
        if n > MAX_WAIT_STATES {
            return Err(Error::OutOfRange);
        }

        self.regs.acr.write_field(acr::LATENCY, n as u32);
        Ok(())
    }

    #[inline(always)]
    pub fn wait_states(&self) -> u8 {
        self.regs.acr.read_field(acr::LATENCY) as u8
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use quickcheck_macros::quickcheck;

    fn flash() -> (Flash<'static>, &'static pac::flash::RegisterBlock) {
        let regs = sim::leak(pac::flash::RegisterBlock::new());
        (Flash::from_registers(regs), regs)
    }

    #[test]
    fn unlock_ends_with_second_key() {
        let (mut flash, regs) = flash();

        flash.unlock_control_register();
        // the register only keeps the last write
        assert_eq!(regs.keyr.read(), 0xcdef_89ab);

        flash.unlock_option_sector();
        assert_eq!(regs.optkeyr.read(), 0x4c5d_6e7f);
    }

    #[quickcheck]
    fn sector_count_in_range(init: u32, n: u8) -> bool {
        let (mut flash, regs) = flash();
        let n = n % (MAX_SECTOR + 1);
        regs.cr.write(init);

        flash.set_sector_count(n) == Ok(())
            && (regs.cr.read() >> 3) & 0xf == n as u32
            && regs.cr.read() & !(0xf << 3) == init & !(0xf << 3)
    }

    #[quickcheck]
    fn sector_count_out_of_range(init: u32, n: u8) -> bool {
        let (mut flash, regs) = flash();
        let n = n.max(MAX_SECTOR + 1);
        regs.cr.write(init);

        flash.set_sector_count(n) == Err(Error::OutOfRange) && regs.cr.read() == init
    }

    #[quickcheck]
    fn program_size_preserves_neighbours(init: u32, size: u8) -> bool {
        let (mut flash, regs) = flash();
        let size = [
            ProgramSize::X8,
            ProgramSize::X16,
            ProgramSize::X32,
            ProgramSize::X64,
        ][size as usize % 4];
        // bit 31 must read clear or the setter waits
        let init = init & !(1 << 31);
        regs.cr.write(init);

        flash.set_program_size(size);
        regs.cr.read() & !(0b11 << 8) == init & !(0b11 << 8)
            && (regs.cr.read() >> 8) & 0b11 == size as u32
    }

    #[test]
    fn interrupts_wait_for_control_bit() {
        let (mut flash, regs) = flash();
        regs.cr.write(1 << 31);

        // the interface releases CR after a few polls
        let mut left = 3;
        sim::attach(move || {
            left -= 1;
            if left == 0 {
                regs.cr.clear(cr::LOCK);
            }
        });

        flash.enable_interrupts();
        assert_eq!(regs.cr.read(), (1 << 24) | (1 << 25));
        assert_eq!(sim::polls(), 3);

        flash.disable_interrupts();
        assert_eq!(regs.cr.read(), 0);
    }

    #[test]
    #[should_panic(expected = "did not respond")]
    fn stuck_control_bit_hangs() {
        let (mut flash, regs) = flash();
        regs.cr.write(1 << 31);

        flash.start_erasing();
    }

    #[test]
    fn triggers_set_one_bit() {
        let (mut flash, regs) = flash();

        flash.programming();
        assert_eq!(regs.cr.read(), 1);
        flash.sector_erase();
        assert_eq!(regs.cr.read(), 0b011);
        flash.mass_erase();
        assert_eq!(regs.cr.read(), 0b111);
        flash.start_erasing();
        assert_eq!(regs.cr.read(), 0b111 | (1 << 16));
    }

    #[test]
    fn status_and_clear() {
        let (mut flash, regs) = flash();
        regs.sr.write((1 << 16) | (1 << 4) | 1);

        let status = flash.status();
        assert!(flash.is_busy());
        assert_eq!(status, Status::BSY | Status::WRPERR | Status::EOP);

        flash.clear_status(status);
        // BSY is read-only, never written back
        assert_eq!(regs.sr.read(), (1 << 4) | 1);
    }

    #[test]
    fn wait_states_range() {
        let (mut flash, regs) = flash();
        regs.acr.write(0x700);

        assert_eq!(flash.set_wait_states(3), Ok(()));
        assert_eq!(regs.acr.read(), 0x703);
        assert_eq!(flash.wait_states(), 3);
        assert_eq!(flash.set_wait_states(16), Err(Error::OutOfRange));
        assert_eq!(regs.acr.read(), 0x703);
    }
}
