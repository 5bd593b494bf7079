use crate::block;
use crate::pac;
use crate::pac::tim::{cr1, egr, sr};
use crate::rcc::{Clocks, Rcc};
use crate::time::Hertz;

use super::Error;

/// Largest prescaler value, PSC is 16 bits on every instance.
const MAX_PRESCALER: u32 = 0xffff;

/// One of the general-purpose timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instance {
    Tim2,
    Tim3,
    Tim4,
    Tim5,
}

impl Instance {
    /// Look up TIM`n`.
    pub fn from_number(n: u8) -> Result<Self, Error> {
        match n {
            2 => Ok(Self::Tim2),
            3 => Ok(Self::Tim3),
            4 => Ok(Self::Tim4),
            5 => Ok(Self::Tim5),
            _ => Err(Error::InvalidInstance(n)),
        }
    }

    #[inline(always)]
    pub fn number(&self) -> u8 {
        match self {
            Self::Tim2 => 2,
            Self::Tim3 => 3,
            Self::Tim4 => 4,
            Self::Tim5 => 5,
        }
    }

    /// Highest count this instance's counter holds.
    #[inline(always)]
    pub fn max_count(&self) -> u32 {
        match self {
            Self::Tim2 | Self::Tim5 => u32::MAX,
            Self::Tim3 | Self::Tim4 => 0xffff,
        }
    }
}

/// A general-purpose timer used as a millisecond delay.
pub struct Timer<'a> {
    regs: &'a pac::tim::RegisterBlock,
    instance: Instance,
    input_clk: Hertz,
}

impl core::fmt::Debug for Timer<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Timer")
            .field("instance", &self.instance)
            .field("input_clk", &self.input_clk)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Timer<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Timer {{ instance: {}, input_clk: {} }}",
            self.instance,
            self.input_clk
        )
    }
}

impl Timer<'static> {
    /// Take TIM`n`, for `n` in 2..=5.
    ///
    /// The timer runs from the APB1 timer clock in `clocks`.
    pub fn new(n: u8, clocks: &Clocks) -> Result<Self, Error> {
        let instance = Instance::from_number(n)?;
        // safety: instance_ptr is valid for every Instance, and the
        // block lives forever
        let regs = unsafe { &*pac::tim::instance_ptr(instance.number()) };
        Ok(Self {
            regs,
            instance,
            input_clk: clocks.timclk1(),
        })
    }
}

impl<'a> Timer<'a> {
    /// Drive an arbitrary timer register block as TIM`n`.
    pub fn from_registers(
        regs: &'a pac::tim::RegisterBlock,
        n: u8,
        clocks: &Clocks,
    ) -> Result<Self, Error> {
        Ok(Self {
            regs,
            instance: Instance::from_number(n)?,
            input_clk: clocks.timclk1(),
        })
    }

    #[inline(always)]
    pub fn instance(&self) -> Instance {
        self.instance
    }

    /// Turn on this timer's clock.
    pub fn clock_enable(&self, rcc: &Rcc) {
        match self.instance {
            Instance::Tim2 => rcc.enable_tim2(),
            Instance::Tim3 => rcc.enable_tim3(),
            Instance::Tim4 => rcc.enable_tim4(),
            Instance::Tim5 => rcc.enable_tim5(),
        }
    }

    /// The live counter value.
    #[inline(always)]
    pub fn count(&self) -> u32 {
        self.regs.cnt.read()
    }

    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.regs.cr1.is_set(cr1::CEN)
    }

    // ticks per millisecond and the matching prescaler. the tick rate is
    // the smallest whole number of kHz that keeps PSC within 16 bits.
    fn timebase(&self) -> Result<(u32, u32), Error> {
        let khz = self.input_clk.raw() / 1000;
        let per_ms = khz.div_ceil(MAX_PRESCALER + 1).max(1);
        let divisor = khz / per_ms;
        if divisor == 0 {
            return Err(Error::OutOfRange);
        }

        Ok((per_ms, divisor - 1))
    }

    /// Longest delay, in milliseconds, a single [Timer::delay] accepts.
    pub fn max_delay_ms(&self) -> Result<u32, Error> {
        let (per_ms, _) = self.timebase()?;
        Ok(self.instance.max_count() / per_ms)
    }

    /// Block for `ms` milliseconds.
    ///
    /// Stops the timer, reprograms it from scratch, counts up to the
    /// target and stops it again. A delay that does not fit the counter
    /// is rejected before any register is touched.
    ///
    /// Not reentrant: a second caller on the same instance, including an
    /// interrupt handler, corrupts the count.
    pub fn delay(&mut self, ms: u32) -> Result<(), Error> {
        let (per_ms, prescaler) = self.timebase()?;
        let ticks = ms as u64 * per_ms as u64;
        if ticks > self.instance.max_count() as u64 {
            return Err(Error::OutOfRange);
        }
        let ticks = ticks as u32;

        self.regs.cr1.clear(cr1::CEN);
        self.reinit(prescaler);
        self.regs.cr1.set(cr1::CEN);

        block::wait_while(|| self.regs.cnt.read() < ticks);

        self.regs.cr1.clear(cr1::CEN);
        Ok(())
    }

    fn reinit(&mut self, prescaler: u32) {
        self.regs.cr1.write(0);
        self.regs.cr2.write(0);
        self.regs.smcr.write(0);
        self.regs.dier.write(0);
        self.regs.psc.write(prescaler);
        self.regs.arr.write(self.instance.max_count());
        self.regs.cnt.write(0);
        // load PSC now instead of at the next overflow
        self.regs.egr.set(egr::UG);
        // UG raises UIF, rc_w0
        self.regs.sr.write(!sr::UIF.mask());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;

    fn timer(n: u8, clocks: &Clocks) -> (Timer<'static>, &'static pac::tim::RegisterBlock) {
        let regs = sim::leak(pac::tim::RegisterBlock::new());
        (Timer::from_registers(regs, n, clocks).unwrap(), regs)
    }

    // counter advances one tick per poll while enabled
    fn counting(regs: &'static pac::tim::RegisterBlock) {
        sim::attach(move || {
            if regs.cr1.is_set(cr1::CEN) {
                regs.cnt.write(regs.cnt.read() + 1);
            }
        });
    }

    #[test]
    fn instance_range() {
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let regs = sim::leak(pac::tim::RegisterBlock::new());

        assert_eq!(
            Timer::from_registers(regs, 6, &clocks).unwrap_err(),
            Error::InvalidInstance(6)
        );
        assert_eq!(
            Timer::from_registers(regs, 1, &clocks).unwrap_err(),
            Error::InvalidInstance(1)
        );
        for n in 2..=5 {
            assert_eq!(
                Timer::from_registers(regs, n, &clocks)
                    .unwrap()
                    .instance()
                    .number(),
                n
            );
        }
    }

    #[test]
    fn delay_at_84mhz() {
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let (mut tim, regs) = timer(3, &clocks);
        regs.cr2.write(0x70);
        regs.dier.write(1);
        counting(regs);

        assert_eq!(tim.delay(10), Ok(()));
        assert_eq!(regs.psc.read(), 41_999);
        assert_eq!(regs.arr.read(), 0xffff);
        assert_eq!(regs.cr2.read(), 0);
        assert_eq!(regs.dier.read(), 0);
        // two ticks per millisecond
        assert_eq!(sim::polls(), 20);
        assert_eq!(tim.count(), 20);
        assert!(!tim.is_running());
    }

    #[test]
    fn delay_at_reset_clock() {
        let (mut tim, regs) = timer(2, &Clocks::reset());
        counting(regs);

        assert_eq!(tim.delay(7), Ok(()));
        assert_eq!(regs.psc.read(), 15_999);
        assert_eq!(regs.arr.read(), u32::MAX);
        assert_eq!(sim::polls(), 7);
    }

    #[test]
    fn zero_delay_returns_at_once() {
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let (mut tim, regs) = timer(4, &clocks);

        assert_eq!(tim.delay(0), Ok(()));
        assert_eq!(sim::polls(), 0);
        assert_eq!(regs.psc.read(), 41_999);
    }

    #[test]
    fn long_delay_on_short_counter() {
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let (mut tim, regs) = timer(3, &clocks);
        regs.psc.write(123);

        assert_eq!(tim.max_delay_ms(), Ok(32_767));
        assert_eq!(tim.delay(32_768), Err(Error::OutOfRange));
        assert_eq!(regs.psc.read(), 123);

        let (tim5, _) = timer(5, &clocks);
        assert_eq!(tim5.max_delay_ms(), Ok(u32::MAX / 2));
    }

    #[test]
    #[should_panic(expected = "did not respond")]
    fn stopped_counter_hangs() {
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let (mut tim, _) = timer(2, &clocks);

        let _ = tim.delay(1);
    }

    #[test]
    fn gate_matches_instance() {
        let clocks = Clocks::reset();
        let rcc_regs = sim::leak(pac::rcc::RegisterBlock::new());
        let rcc = Rcc::from_registers(rcc_regs);

        timer(2, &clocks).0.clock_enable(&rcc);
        assert_eq!(rcc_regs.apb1enr.read(), 1);
        timer(5, &clocks).0.clock_enable(&rcc);
        assert_eq!(rcc_regs.apb1enr.read(), 0b1001);
    }
}
