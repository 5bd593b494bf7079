use crate::block;
use crate::pac;
use crate::pac::syst::{csr, rvr};
use crate::rcc::Clocks;
use crate::time::Hertz;

use super::Error;

/// Largest reload, in ticks, the 24-bit counter supports.
pub const MAX_RELOAD: u32 = 1 << 24;

/// Reload period used by [SysTick::delay].
const DELAY_STEP_MS: u32 = 10;

/// The SysTick down-counter in the core.
pub struct SysTick<'a> {
    regs: &'a pac::syst::RegisterBlock,
    input_clk: Hertz,
}

impl core::fmt::Debug for SysTick<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("SysTick")
            .field("timer", &"SYST")
            .field("input_clk", &self.input_clk)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SysTick<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SysTick {{ timer: SYST, input_clk: {} }}", self.input_clk)
    }
}

impl SysTick<'static> {
    /// Take SysTick, counting at the AHB clock in `clocks`.
    #[inline(always)]
    pub fn new(_syst: pac::SYST, clocks: &Clocks) -> Self {
        // safety: owning the token is owning the block
        Self::from_registers(unsafe { &*pac::SYST::ptr() }, clocks)
    }
}

impl<'a> SysTick<'a> {
    #[inline(always)]
    pub fn from_registers(regs: &'a pac::syst::RegisterBlock, clocks: &Clocks) -> Self {
        Self {
            regs,
            input_clk: clocks.hclk(),
        }
    }

    #[inline(always)]
    pub fn start(&mut self) {
        self.regs.csr.set(csr::ENABLE);
    }

    #[inline(always)]
    pub fn stop(&mut self) {
        self.regs.csr.clear(csr::ENABLE);
    }

    /// Count at the processor clock if `enable`, otherwise at a
    /// eighth of it.
    #[inline(always)]
    pub fn set_processor_clock(&mut self, enable: bool) {
        self.regs.csr.write_field(csr::CLKSOURCE, enable as u32);
    }

    /// Raise the SysTick exception on every reload.
    #[inline(always)]
    pub fn set_interrupt(&mut self, enable: bool) {
        self.regs.csr.write_field(csr::TICKINT, enable as u32);
    }

    /// Has the counter reached zero since the last call?
    ///
    /// Reading clears the flag in hardware.
    #[inline(always)]
    pub fn is_end(&self) -> bool {
        self.regs.csr.is_set(csr::COUNTFLAG)
    }

    /// Count `ticks` per period, 1 to [MAX_RELOAD].
    pub fn set_reload(&mut self, ticks: u32) -> Result<(), Error> {
        if ticks == 0 || ticks > MAX_RELOAD {
            return Err(Error::OutOfRange);
        }

        // the counter runs from RELOAD down to 0 inclusive
        self.regs.rvr.write_field(rvr::RELOAD, ticks - 1);
        Ok(())
    }

    #[inline(always)]
    pub fn current_value(&self) -> u32 {
        self.regs.cvr.read_field(rvr::RELOAD)
    }

    // any write zeroes the counter and COUNTFLAG
    #[inline(always)]
    fn restart_count(&mut self) {
        self.regs.cvr.write(0);
    }

    fn ticks_for(&self, ms: u32) -> Result<u32, Error> {
        let ticks = self.input_clk.raw() as u64 * ms as u64 / 1000;
        u32::try_from(ticks).map_err(|_| Error::OutOfRange)
    }

    /// Block for `ms` milliseconds, in whole steps of 10 ms.
    ///
    /// The remainder below 10 ms is dropped, so `delay(9)` returns at
    /// once.
    pub fn delay(&mut self, ms: u32) -> Result<(), Error> {
        let ticks = self.ticks_for(DELAY_STEP_MS)?;

        self.stop();
        self.set_reload(ticks)?;
        self.set_processor_clock(true);
        self.set_interrupt(false);
        self.restart_count();
        self.start();

        for _ in 0..ms / DELAY_STEP_MS {
            block::wait_while(|| !self.is_end());
        }

        self.stop();
        Ok(())
    }

    /// Start one reload period of `ms` milliseconds with the exception
    /// enabled, and return.
    ///
    /// A period that does not fit the 24-bit counter is rejected with
    /// [Error::OutOfRange] and the counter is left alone. The exception
    /// handler owns what happens next, see the [module docs](super).
    pub fn delay_ms_interrupt(&mut self, ms: u32) -> Result<(), Error> {
        let ticks = self.ticks_for(ms)?;
        if ticks == 0 || ticks > MAX_RELOAD {
            return Err(Error::OutOfRange);
        }

        self.stop();
        self.set_reload(ticks)?;
        self.set_processor_clock(true);
        self.restart_count();
        self.set_interrupt(true);
        self.start();

        #[cfg(feature = "defmt")]
        defmt::debug!("systick reload {=u32} ticks", ticks);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;

    fn systick() -> (SysTick<'static>, &'static pac::syst::RegisterBlock) {
        let regs = sim::leak(pac::syst::RegisterBlock::new());
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        (SysTick::from_registers(regs, &clocks), regs)
    }

    #[test]
    fn reload_is_ticks_minus_one() {
        let (mut tick, regs) = systick();

        assert_eq!(tick.set_reload(1), Ok(()));
        assert_eq!(regs.rvr.read(), 0);
        assert_eq!(tick.set_reload(MAX_RELOAD), Ok(()));
        assert_eq!(regs.rvr.read(), 0x00ff_ffff);

        assert_eq!(tick.set_reload(0), Err(Error::OutOfRange));
        assert_eq!(tick.set_reload(MAX_RELOAD + 1), Err(Error::OutOfRange));
        assert_eq!(regs.rvr.read(), 0x00ff_ffff);
    }

    #[test]
    fn control_bits() {
        let (mut tick, regs) = systick();

        tick.set_processor_clock(true);
        tick.set_interrupt(true);
        tick.start();
        assert_eq!(regs.csr.read(), 0b111);

        tick.set_interrupt(false);
        tick.stop();
        assert_eq!(regs.csr.read(), 0b100);

        regs.cvr.write(0x1234);
        assert_eq!(tick.current_value(), 0x1234);
        regs.csr.set(csr::COUNTFLAG);
        assert!(tick.is_end());
    }

    #[test]
    fn delay_waits_for_count_flag() {
        let (mut tick, regs) = systick();
        regs.cvr.write(77);

        let mut polls = 0;
        sim::attach(move || {
            polls += 1;
            if polls == 4 {
                regs.csr.set(csr::COUNTFLAG);
            }
        });

        assert_eq!(tick.delay(10), Ok(()));
        // 10 ms at 84 MHz
        assert_eq!(regs.rvr.read(), 839_999);
        assert_eq!(regs.cvr.read(), 0);
        assert_eq!(sim::polls(), 4);
        // stopped, processor clock, no interrupt
        assert_eq!(regs.csr.read(), (1 << 16) | 0b100);
    }

    #[test]
    fn short_delay_is_dropped() {
        let (mut tick, _) = systick();

        assert_eq!(tick.delay(9), Ok(()));
        assert_eq!(sim::polls(), 0);
    }

    #[test]
    fn interrupt_delay() {
        let (mut tick, regs) = systick();

        assert_eq!(tick.delay_ms_interrupt(100), Ok(()));
        assert_eq!(regs.rvr.read(), 8_399_999);
        assert_eq!(regs.csr.read(), 0b111);
    }

    #[test]
    fn interrupt_delay_too_long() {
        let (mut tick, regs) = systick();
        regs.rvr.write(5);

        // 200 ms at 84 MHz is past 2^24 ticks
        assert_eq!(tick.delay_ms_interrupt(200), Err(Error::OutOfRange));
        assert_eq!(tick.delay_ms_interrupt(0), Err(Error::OutOfRange));
        assert_eq!(regs.rvr.read(), 5);
        assert_eq!(regs.csr.read(), 0);
    }
}
