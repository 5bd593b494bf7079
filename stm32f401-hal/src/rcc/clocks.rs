use crate::time::Hertz;

use super::Error;

/// Frequency of the internal HSI oscillator.
pub const HSI: Hertz = Hertz::from_raw(16_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// PLL divisors and multiplier, fed from HSI.
///
/// VCO = HSI / m * n, SYSCLK = VCO / p, USB/SDIO = VCO / q.
pub struct PllConfig {
    /// USB/SDIO divisor, 4 bits.
    pub q: u8,
    /// SYSCLK divisor, one of 2, 4, 6 or 8.
    pub p: u8,
    /// VCO multiplier, 9 bits.
    pub n: u16,
    /// Input divisor, 6 bits.
    pub m: u8,
}

impl PllConfig {
    /// Build a configuration.
    #[inline(always)]
    pub const fn new(q: u8, p: u8, n: u16, m: u8) -> Self {
        Self { q, p, n, m }
    }

    /// 84 MHz SYSCLK from the 16 MHz HSI, 48 MHz on the Q output.
    #[inline(always)]
    pub const fn hsi_84mhz() -> Self {
        Self::new(7, 4, 336, 16)
    }

    /// The 2-bit PLLP code for this P, or an error.
    #[inline(always)]
    pub(crate) fn p_code(&self) -> Result<u32, Error> {
        match self.p {
            2 => Ok(0b00),
            4 => Ok(0b01),
            6 => Ok(0b10),
            8 => Ok(0b11),
            _ => Err(Error::InvalidPllP),
        }
    }
}

#[inline(always)]
pub(crate) fn p_from_code(code: u32) -> u32 {
    // cheating a bit to avoid a match
    // 0 -> 2, 1 -> 4, 2 -> 6, 3 -> 8
    2 * (code + 1)
}

#[inline(always)]
pub(crate) fn ahb_div(hpre: u32) -> u32 {
    match hpre {
        0b1000 => 2,
        0b1001 => 4,
        0b1010 => 8,
        0b1011 => 16,
        0b1100 => 64,
        0b1101 => 128,
        0b1110 => 256,
        0b1111 => 512,
        _ => 1,
    }
}

#[inline(always)]
pub(crate) fn apb_div(ppre: u32) -> u32 {
    // 0xx -> 1, 100 -> 2, 101 -> 4, 110 -> 8, 111 -> 16
    if ppre & 0b100 == 0 {
        1
    } else {
        2 << (ppre & 0b11)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Represents frozen, complete information about the clock tree.
pub struct Clocks {
    sysclk: Hertz,
    hclk: Hertz,
    pclk1: Hertz,
    pclk2: Hertz,
    ppre1: u32,
    ppre2: u32,
}

impl Clocks {
    /// Build from each bus frequency and the APB divisors.
    pub(crate) fn new(sysclk: Hertz, ahb: u32, ppre1: u32, ppre2: u32) -> Result<Self, Error> {
        if ahb == 0 || ppre1 == 0 || ppre2 == 0 {
            return Err(Error::InvalidPllConfig);
        }

        let hclk = sysclk / ahb;
        Ok(Self {
            sysclk,
            hclk,
            pclk1: hclk / ppre1,
            pclk2: hclk / ppre2,
            ppre1,
            ppre2,
        })
    }

    /// Describe a clock tree where every bus runs at `sysclk`.
    ///
    /// Useful when the configuration is known ahead of time, or for
    /// timing math away from the hardware.
    #[inline(always)]
    pub fn from_sysclk(sysclk: Hertz) -> Self {
        Self {
            sysclk,
            hclk: sysclk,
            pclk1: sysclk,
            pclk2: sysclk,
            ppre1: 1,
            ppre2: 1,
        }
    }

    /// The clocks after reset, HSI on every bus.
    #[inline(always)]
    pub fn reset() -> Self {
        Self::from_sysclk(HSI)
    }

    /// The system clock.
    #[inline(always)]
    pub fn sysclk(&self) -> Hertz {
        self.sysclk
    }

    /// The AHB clock, which also drives the core and SysTick.
    #[inline(always)]
    pub fn hclk(&self) -> Hertz {
        self.hclk
    }

    /// The APB1 clock.
    #[inline(always)]
    pub fn pclk1(&self) -> Hertz {
        self.pclk1
    }

    /// The APB2 clock, which drives USART1.
    #[inline(always)]
    pub fn pclk2(&self) -> Hertz {
        self.pclk2
    }

    /// The clock feeding TIM2 to TIM5.
    ///
    /// Timers on a divided APB run at twice the bus clock.
    #[inline(always)]
    pub fn timclk1(&self) -> Hertz {
        if self.ppre1 == 1 {
            self.pclk1
        } else {
            self.pclk1 * 2
        }
    }

    /// The clock feeding the APB2 timers.
    #[inline(always)]
    pub fn timclk2(&self) -> Hertz {
        if self.ppre2 == 1 {
            self.pclk2
        } else {
            self.pclk2 * 2
        }
    }
}

impl Default for Clocks {
    fn default() -> Self {
        Self::reset()
    }
}

/// Compute SYSCLK for a PLL fed from `input`.
pub(crate) fn pll_output(input: Hertz, m: u32, n: u32, p: u32) -> Result<Hertz, Error> {
    if m == 0 || p == 0 {
        return Err(Error::InvalidPllConfig);
    }

    // overflow safety: input / m is at most a few MHz, n is 9 bits
    let vco = (input.raw() / m) * n;
    Ok(Hertz::from_raw(vco / p))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn preset_is_84mhz() {
        let pll = PllConfig::hsi_84mhz();
        assert_eq!(pll, PllConfig::new(7, 4, 336, 16));
        assert_eq!(pll.p_code(), Ok(0b01));
        assert_eq!(pll_output(HSI, 16, 336, 4), Ok(Hertz::MHz(84)));
    }

    #[test]
    fn p_codes() {
        for (p, code) in [(2, 0), (4, 1), (6, 2), (8, 3)] {
            assert_eq!(PllConfig::new(7, p, 336, 16).p_code(), Ok(code));
            assert_eq!(p_from_code(code), p as u32);
        }
        for p in [0, 1, 3, 5, 7, 9, 255] {
            assert_eq!(
                PllConfig::new(7, p, 336, 16).p_code(),
                Err(Error::InvalidPllP)
            );
        }
    }

    #[test]
    fn bus_divisors() {
        assert_eq!(ahb_div(0b0111), 1);
        assert_eq!(ahb_div(0b1011), 16);
        assert_eq!(ahb_div(0b1100), 64);
        assert_eq!(apb_div(0b011), 1);
        assert_eq!(apb_div(0b100), 2);
        assert_eq!(apb_div(0b111), 16);
    }

    #[test]
    fn divided_apb_doubles_timers() {
        let clocks = Clocks::new(Hertz::MHz(84), 1, 2, 1).unwrap();
        assert_eq!(clocks.pclk1(), Hertz::MHz(42));
        assert_eq!(clocks.timclk1(), Hertz::MHz(84));
        assert_eq!(clocks.pclk2(), Hertz::MHz(84));
        assert_eq!(clocks.timclk2(), Hertz::MHz(84));
    }
}
