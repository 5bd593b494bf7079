use embedded_hal_02::blocking::delay as hal02;

use super::Timer;

impl hal02::DelayMs<u32> for Timer<'_> {
    #[inline(always)]
    fn delay_ms(&mut self, ms: u32) {
        self.delay_ms_blocking(ms)
    }
}

impl hal02::DelayMs<u16> for Timer<'_> {
    #[inline(always)]
    fn delay_ms(&mut self, ms: u16) {
        self.delay_ms_blocking(ms as u32)
    }
}

impl hal02::DelayMs<u8> for Timer<'_> {
    #[inline(always)]
    fn delay_ms(&mut self, ms: u8) {
        self.delay_ms_blocking(ms as u32)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use crate::pac;
    use crate::pac::tim::cr1;
    use crate::rcc::Clocks;
    use crate::time::Hertz;
    use hal02::DelayMs;

    fn polls_for(f: impl FnOnce()) -> u32 {
        let before = sim::polls();
        f();
        sim::polls() - before
    }

    #[test]
    fn every_width_waits_the_same() {
        let regs = sim::leak(pac::tim::RegisterBlock::new());
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let mut tim = Timer::from_registers(regs, 4, &clocks).unwrap();

        sim::attach(move || {
            if regs.cr1.is_set(cr1::CEN) {
                regs.cnt.write(regs.cnt.read() + 1);
            }
        });

        let wide = polls_for(|| DelayMs::<u32>::delay_ms(&mut tim, 200));
        let mid = polls_for(|| DelayMs::<u16>::delay_ms(&mut tim, 200));
        let narrow = polls_for(|| DelayMs::<u8>::delay_ms(&mut tim, 200));
        let native = polls_for(|| embedded_hal_1::delay::DelayNs::delay_ms(&mut tim, 200));

        assert!(wide > 0);
        assert_eq!(mid, wide);
        assert_eq!(narrow, wide);
        assert_eq!(native, wide);
    }

    #[test]
    fn zero_does_not_wait() {
        let regs = sim::leak(pac::tim::RegisterBlock::new());
        let mut tim = Timer::from_registers(regs, 5, &Clocks::reset()).unwrap();

        assert_eq!(polls_for(|| DelayMs::<u8>::delay_ms(&mut tim, 0)), 0);
        assert!(!regs.cr1.is_set(cr1::CEN));
    }
}
