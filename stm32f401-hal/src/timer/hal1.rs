use embedded_hal_1::delay as hal1;

use super::Timer;

impl Timer<'_> {
    // split into delays the counter can hold
    pub(super) fn delay_ms_blocking(&mut self, mut ms: u32) {
        let step = match self.max_delay_ms() {
            Ok(step) => step,
            // not great, but panicing is the best we can do
            Err(e) => panic!("{}", e),
        };

        while ms > 0 {
            let chunk = ms.min(step);
            if let Err(e) = self.delay(chunk) {
                panic!("{}", e);
            }
            ms -= chunk;
        }
    }
}

// the timer ticks in fractions of a millisecond but delays are counted
// in whole milliseconds, so shorter requests round up

impl hal1::DelayNs for Timer<'_> {
    #[inline(always)]
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms_blocking(ns.div_ceil(1_000_000))
    }

    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.delay_ms_blocking(us.div_ceil(1_000))
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        self.delay_ms_blocking(ms)
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
    use hal1::DelayNs;

    #[test]
    fn long_delay_is_chunked() {
        let regs = sim::leak(pac::tim::RegisterBlock::new());
        let clocks = Clocks::from_sysclk(Hertz::MHz(84));
        let mut tim = Timer::from_registers(regs, 3, &clocks).unwrap();

        sim::attach(move || {
            if regs.cr1.is_set(cr1::CEN) {
                regs.cnt.write(regs.cnt.read() + 1);
            }
        });

        // one full 32767 ms chunk plus 3 ms
        DelayNs::delay_ms(&mut tim, 32_770);
        assert_eq!(sim::polls(), 65_534 + 6);
        assert_eq!(tim.count(), 6);
    }

    #[test]
    fn sub_millisecond_rounds_up() {
        let regs = sim::leak(pac::tim::RegisterBlock::new());
        let mut tim = Timer::from_registers(regs, 2, &Clocks::reset()).unwrap();

        sim::attach(move || {
            if regs.cr1.is_set(cr1::CEN) {
                regs.cnt.write(regs.cnt.read() + 1);
            }
        });

        tim.delay_us(1);
        assert_eq!(sim::polls(), 1);
        tim.delay_ns(0);
        assert_eq!(sim::polls(), 1);
    }
}
