//! Reset and clock control.
//!
//! The PLL moves through off, enabled-but-unlocked, locked, and finally
//! system clock source. [Rcc::config_pll] walks that sequence in the only
//! order the hardware allows. If it fails on the P divisor the PLL is left
//! off and unlocked, which is safe; retry the whole call rather than
//! resuming it.
//!
//! The [Rcc] is shared by reference with every driver that needs a clock
//! gate, see the `enable_*` methods.

use crate::block;
use crate::flash::{self, Flash};
use crate::pac;
use crate::pac::rcc::{cfgr, cr, pllcfgr};
use crate::time::Hertz;

mod clocks;
pub use clocks::*;

mod gate;

/// Flash wait states programmed by [Rcc::config_pll].
///
/// The highest any HSI-fed configuration needs on this device at full
/// supply voltage, whatever the resulting frequency.
pub const PLL_WAIT_STATES: u8 = 3;

/// A clock configuration error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// PLL P divisor is not one of 2, 4, 6 or 8.
    InvalidPllP,
    /// The live PLL configuration divides by zero.
    InvalidPllConfig,
    /// The clock switch status names no oscillator.
    InvalidClockSource,
    /// HSE is in use but its frequency was never given.
    UnknownHse,
    /// Setting flash wait states failed.
    Flash(flash::Error),
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Clock Error {:?}", self)
    }
}

impl From<flash::Error> for Error {
    #[inline(always)]
    fn from(value: flash::Error) -> Self {
        Self::Flash(value)
    }
}

/// The reset and clock controller.
pub struct Rcc<'a> {
    regs: &'a pac::rcc::RegisterBlock,
    hse: Option<Hertz>,
}

impl core::fmt::Debug for Rcc<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Rcc")
            .field("hse", &self.hse)
            .field("locked", &self.is_locked())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Rcc<'_> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Rcc {{ hse: {}, locked: {} }}",
            self.hse,
            self.is_locked()
        );
    }
}

impl Rcc<'static> {
    /// Take over the clock controller.
    #[inline(always)]
    pub fn new(_rcc: pac::RCC) -> Self {
        // safety: owning the token is owning the block, which lives
        // forever
        Self::from_registers(unsafe { &*pac::RCC::ptr() })
    }
}

impl<'a> Rcc<'a> {
    /// Drive an arbitrary RCC register block.
    #[inline(always)]
    pub fn from_registers(regs: &'a pac::rcc::RegisterBlock) -> Self {
        Self { regs, hse: None }
    }

    /// Declare the frequency of the external oscillator, so
    /// [Rcc::clocks] can decode configurations that use it.
    #[inline(always)]
    pub fn with_hse(mut self, hse: Hertz) -> Self {
        self.hse = Some(hse);
        self
    }

    /// Start the internal oscillator and wait until it is ready.
    pub fn enable_hsi(&mut self) {
        self.regs.cr.set(cr::HSION);
        block::wait_while(|| !self.regs.cr.is_set(cr::HSIRDY));
    }

    /// Turn on the PLL. Lock follows some time later.
    #[inline(always)]
    pub fn enable_pll(&mut self) {
        self.regs.cr.set(cr::PLLON);
    }

    /// Turn off the PLL. Unlock follows some time later.
    #[inline(always)]
    pub fn disable_pll(&mut self) {
        self.regs.cr.clear(cr::PLLON);
    }

    /// Is the PLL locked?
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.regs.cr.is_set(cr::PLLRDY)
    }

    /// Select the PLL as system clock and wait until the switch is
    /// confirmed.
    ///
    /// The PLL must be locked first.
    pub fn switch_to_pll(&mut self) {
        self.regs.cfgr.write_field(cfgr::SW, cfgr::SW_PLL);
        block::wait_while(|| self.regs.cfgr.read_field(cfgr::SWS) != cfgr::SW_PLL);
        block::barrier();
    }

    /// Select HSI as system clock and wait until the switch is confirmed.
    ///
    /// HSI must be ready first.
    pub fn switch_to_hsi(&mut self) {
        self.regs.cfgr.write_field(cfgr::SW, cfgr::SW_HSI);
        block::wait_while(|| self.regs.cfgr.read_field(cfgr::SWS) != cfgr::SW_HSI);
        block::barrier();
    }

    /// Run the system clock from the PLL, fed from HSI.
    ///
    /// HSI is started, the system clock moves to HSI if it was running
    /// from the PLL, the PLL is stopped and allowed to unlock, the new
    /// divisors are written, the PLL is restarted, flash gets
    /// [PLL_WAIT_STATES] wait states, and once the PLL locks the system
    /// clock is switched over.
    ///
    /// An invalid P fails after the PLL is stopped and before the PLL
    /// configuration is touched.
    pub fn config_pll(&mut self, flash: &mut Flash, pll: PllConfig) -> Result<(), Error> {
        self.enable_hsi();

        // PLLON stays set while the PLL drives the system clock
        if self.regs.cfgr.read_field(cfgr::SWS) == cfgr::SW_PLL {
            self.switch_to_hsi();
        }

        // never rewrite PLLCFGR while the PLL still runs
        self.disable_pll();
        block::wait_while(|| self.is_locked());

        let p = pll.p_code()?;

        let reg = &self.regs.pllcfgr;
        reg.write(0);
        reg.write_field(pllcfgr::PLLQ, pll.q as u32);
        reg.write_field(pllcfgr::PLLN, pll.n as u32);
        reg.write_field(pllcfgr::PLLM, pll.m as u32);
        reg.clear(pllcfgr::PLLSRC);
        reg.write_field(pllcfgr::PLLP, p);

        self.enable_pll();
        flash.set_wait_states(PLL_WAIT_STATES)?;

        // switching before lock is undefined
        block::wait_while(|| !self.is_locked());
        self.switch_to_pll();

        #[cfg(feature = "defmt")]
        defmt::debug!("system clock running from PLL {}", pll);

        Ok(())
    }

    /// Decode the live clock tree.
    pub fn clocks(&self) -> Result<Clocks, Error> {
        let clock_cfg = self.regs.cfgr.read();

        let sysclk = match cfgr::SWS.extract(clock_cfg) {
            cfgr::SW_HSI => HSI,
            cfgr::SW_HSE => self.hse.ok_or(Error::UnknownHse)?,
            cfgr::SW_PLL => {
                let pll_cfg = self.regs.pllcfgr.read();
                let input = if pllcfgr::PLLSRC.extract(pll_cfg) == 0 {
                    HSI
                } else {
                    self.hse.ok_or(Error::UnknownHse)?
                };

                pll_output(
                    input,
                    pllcfgr::PLLM.extract(pll_cfg),
                    pllcfgr::PLLN.extract(pll_cfg),
                    p_from_code(pllcfgr::PLLP.extract(pll_cfg)),
                )?
            }
            _ => return Err(Error::InvalidClockSource),
        };

        Clocks::new(
            sysclk,
            ahb_div(cfgr::HPRE.extract(clock_cfg)),
            apb_div(cfgr::PPRE1.extract(clock_cfg)),
            apb_div(cfgr::PPRE2.extract(clock_cfg)),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;

    fn parts() -> (
        Rcc<'static>,
        &'static pac::rcc::RegisterBlock,
        Flash<'static>,
        &'static pac::flash::RegisterBlock,
    ) {
        let regs = sim::leak(pac::rcc::RegisterBlock::new());
        let flash_regs = sim::leak(pac::flash::RegisterBlock::new());
        (
            Rcc::from_registers(regs),
            regs,
            Flash::from_registers(flash_regs),
            flash_regs,
        )
    }

    // ready bits follow their enables, the switch status follows the
    // switch
    fn obedient(regs: &'static pac::rcc::RegisterBlock) {
        sim::attach(move || {
            let on = regs.cr.is_set(cr::HSION);
            regs.cr.write_field(cr::HSIRDY, on as u32);
            let on = regs.cr.is_set(cr::PLLON);
            regs.cr.write_field(cr::PLLRDY, on as u32);
            let sw = regs.cfgr.read_field(cfgr::SW);
            regs.cfgr.write_field(cfgr::SWS, sw);
        });
    }

    #[test]
    fn pll_84mhz_end_to_end() {
        let (mut rcc, regs, mut flash, flash_regs) = parts();
        // PLL locked but not the system clock, it must still be stopped
        regs.cr.write((1 << 24) | (1 << 25));
        obedient(regs);

        assert_eq!(rcc.config_pll(&mut flash, PllConfig::hsi_84mhz()), Ok(()));

        assert_eq!(regs.pllcfgr.read(), 0x0701_5410);
        assert_eq!(regs.cfgr.read_field(cfgr::SWS), cfgr::SW_PLL);
        assert!(rcc.is_locked());
        assert!(regs.cr.is_set(cr::HSIRDY));
        assert_eq!(flash_regs.acr.read(), 3);

        let clocks = rcc.clocks().unwrap();
        assert_eq!(clocks.sysclk(), Hertz::MHz(84));
        assert_eq!(clocks.pclk2(), Hertz::MHz(84));
    }

    #[test]
    fn reconfigure_while_running_from_pll() {
        let (mut rcc, regs, mut flash, _) = parts();
        regs.cr.write((1 << 24) | (1 << 25));
        regs.cfgr.write_field(cfgr::SW, cfgr::SW_PLL);
        regs.cfgr.write_field(cfgr::SWS, cfgr::SW_PLL);

        // the PLL cannot be stopped while it drives the system clock
        sim::attach(move || {
            let on = regs.cr.is_set(cr::HSION);
            regs.cr.write_field(cr::HSIRDY, on as u32);
            let sw = regs.cfgr.read_field(cfgr::SW);
            regs.cfgr.write_field(cfgr::SWS, sw);
            if sw == cfgr::SW_PLL {
                regs.cr.set(cr::PLLON);
            }
            let on = regs.cr.is_set(cr::PLLON);
            regs.cr.write_field(cr::PLLRDY, on as u32);
        });

        assert_eq!(rcc.config_pll(&mut flash, PllConfig::hsi_84mhz()), Ok(()));
        assert_eq!(regs.cfgr.read_field(cfgr::SWS), cfgr::SW_PLL);
        assert_eq!(rcc.config_pll(&mut flash, PllConfig::hsi_84mhz()), Ok(()));
        assert_eq!(regs.cfgr.read_field(cfgr::SWS), cfgr::SW_PLL);
        assert_eq!(rcc.clocks().unwrap().sysclk(), Hertz::MHz(84));
    }

    #[test]
    fn invalid_p_stops_after_preamble() {
        let (mut rcc, regs, mut flash, flash_regs) = parts();
        regs.pllcfgr.write(0x2400_3010);
        regs.cfgr.write(0);
        regs.cr.write((1 << 24) | (1 << 25));
        obedient(regs);

        let pll = PllConfig::new(7, 3, 336, 16);
        assert_eq!(rcc.config_pll(&mut flash, pll), Err(Error::InvalidPllP));

        // preamble: HSI on, PLL off and unlocked
        assert!(regs.cr.is_set(cr::HSION));
        assert!(!regs.cr.is_set(cr::PLLON));
        assert!(!rcc.is_locked());

        // nothing after it
        assert_eq!(regs.pllcfgr.read(), 0x2400_3010);
        assert_eq!(regs.cfgr.read(), 0);
        assert_eq!(flash_regs.acr.read(), 0);
    }

    #[test]
    #[should_panic(expected = "did not respond")]
    fn pll_that_never_locks_hangs() {
        let (mut rcc, regs, mut flash, _) = parts();
        sim::attach(move || {
            let on = regs.cr.is_set(cr::HSION);
            regs.cr.write_field(cr::HSIRDY, on as u32);
        });

        let _ = rcc.config_pll(&mut flash, PllConfig::hsi_84mhz());
    }

    #[test]
    fn pll_fields_are_masked() {
        let (mut rcc, regs, mut flash, _) = parts();
        obedient(regs);

        // every field one bit too wide
        let pll = PllConfig::new(0x1f, 8, 0x3ff, 0x7f);
        assert_eq!(rcc.config_pll(&mut flash, pll), Ok(()));
        assert_eq!(
            regs.pllcfgr.read(),
            (0xf << 24) | (0b11 << 16) | (0x1ff << 6) | 0x3f
        );
    }

    #[test]
    fn clocks_after_reset() {
        let (rcc, _, _, _) = parts();
        assert_eq!(rcc.clocks(), Ok(Clocks::reset()));
    }

    #[test]
    fn clocks_decode_prescalers_and_hse() {
        let (rcc, regs, _, _) = parts();
        // HSE 25 MHz / 25 * 336 / 4 = 84 MHz
        regs.pllcfgr.write((7 << 24) | (1 << 22) | (1 << 16) | (336 << 6) | 25);
        // PLL, AHB / 1, APB1 / 2, APB2 / 1
        regs.cfgr.write((0b100 << 10) | (0b10 << 2) | 0b10);

        assert_eq!(rcc.clocks(), Err(Error::UnknownHse));

        let rcc = rcc.with_hse(Hertz::MHz(25));
        let clocks = rcc.clocks().unwrap();
        assert_eq!(clocks.sysclk(), Hertz::MHz(84));
        assert_eq!(clocks.hclk(), Hertz::MHz(84));
        assert_eq!(clocks.pclk1(), Hertz::MHz(42));
        assert_eq!(clocks.timclk1(), Hertz::MHz(84));
    }

    #[test]
    fn clocks_reject_zero_divisor() {
        let (rcc, regs, _, _) = parts();
        regs.pllcfgr.write(336 << 6);
        regs.cfgr.write(0b10 << 2);

        assert_eq!(rcc.clocks(), Err(Error::InvalidPllConfig));
    }
}
