use crate::gpio::Pin;
use crate::pac;
use crate::pac::usart::{brr, cr1, cr2, cr3, sr};
use crate::rcc::{Clocks, Rcc};
use crate::time::Hertz;

use super::{baud_divisor, Config, DataBits, Divisor, Error, Parity, Rx, StopBits, Tx, WakeTrigger};

/// Sources of the USART interrupt.
///
/// Each one documents what its handler must do to drop the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// PE set. Clear by reading SR then DR, after RXNE is set.
    ParityError,
    /// TXE set. Clear by writing DR, or disable this event when there is
    /// nothing left to send.
    TxEmpty,
    /// TC set. Clear with [Usart::clear_transmission_complete], or by
    /// reading SR then writing DR.
    TransmissionComplete,
    /// RXNE or ORE set. Clear by reading DR.
    RxNotEmpty,
    /// IDLE set. Clear by reading SR then DR.
    Idle,
}

impl Event {
    #[inline(always)]
    fn enable_bit(&self) -> pac::Field {
        match self {
            Self::ParityError => cr1::PEIE,
            Self::TxEmpty => cr1::TXEIE,
            Self::TransmissionComplete => cr1::TCIE,
            Self::RxNotEmpty => cr1::RXNEIE,
            Self::Idle => cr1::IDLEIE,
        }
    }
}

/// The USART peripheral as a whole: frame format, speed, interrupts and
/// the modes shared by both directions.
pub struct Usart<'a> {
    regs: &'a pac::usart::RegisterBlock,
}

impl core::fmt::Debug for Usart<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Usart")
            .field("enabled", &self.is_enabled())
            .field("brr", &self.regs.brr)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Usart<'_> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Usart {{ enabled: {}, brr: {=u32:#x} }}",
            self.is_enabled(),
            self.regs.brr.read()
        )
    }
}

impl Usart<'static> {
    /// Take over USART1.
    #[inline(always)]
    pub fn new(_usart: pac::USART1) -> Self {
        // safety: owning the token is owning the block
        Self {
            regs: unsafe { &*pac::USART1::ptr() },
        }
    }
}

impl<'a> Usart<'a> {
    #[inline(always)]
    pub fn from_registers(regs: &'a pac::usart::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Turn on the USART clock.
    #[inline(always)]
    pub fn clock_enable(&self, rcc: &Rcc) {
        rcc.enable_usart1();
    }

    #[inline(always)]
    pub fn enable_usart(&mut self) {
        self.regs.cr1.set(cr1::UE);
    }

    #[inline(always)]
    pub fn disable_usart(&mut self) {
        self.regs.cr1.clear(cr1::UE);
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.regs.cr1.is_set(cr1::UE)
    }

    pub fn set_data_bits(&mut self, bits: DataBits) {
        let nine = matches!(bits, DataBits::Nine);
        self.regs.cr1.write_field(cr1::M, nine as u32);
    }

    pub fn set_parity(&mut self, parity: Parity) {
        match parity {
            Parity::None => self.regs.cr1.clear(cr1::PCE),
            Parity::Even => {
                self.regs.cr1.clear(cr1::PS);
                self.regs.cr1.set(cr1::PCE);
            }
            Parity::Odd => {
                self.regs.cr1.set(cr1::PS);
                self.regs.cr1.set(cr1::PCE);
            }
        }
    }

    #[inline(always)]
    pub fn set_stop_bits(&mut self, stop: StopBits) {
        self.regs.cr2.write_field(cr2::STOP, stop as u32);
    }

    pub fn set_wake_trigger(&mut self, wake: WakeTrigger) {
        let mark = matches!(wake, WakeTrigger::AddressMark);
        self.regs.cr1.write_field(cr1::WAKE, mark as u32);
    }

    /// Set the baud rate from the APB2 clock in `clocks`.
    ///
    /// An unreachable rate is rejected and BRR keeps its old value.
    pub fn set_baud_rate(&mut self, clocks: &Clocks, baud: Hertz) -> Result<Divisor, Error> {
        let divisor = baud_divisor(clocks.pclk2(), baud)?;
        self.write_divisor(divisor);
        Ok(divisor)
    }

    fn write_divisor(&mut self, divisor: Divisor) {
        self.regs
            .brr
            .write_field(brr::DIV_MANTISSA, divisor.mantissa as u32);
        self.regs
            .brr
            .write_field(brr::DIV_FRACTION, divisor.fraction as u32);

        #[cfg(feature = "defmt")]
        defmt::debug!("usart divisor {}", divisor);
    }

    /// The baud rate BRR currently gives from `clocks`.
    pub fn baud_rate(&self, clocks: &Clocks) -> Option<Hertz> {
        let divisor = Divisor {
            mantissa: self.regs.brr.read_field(brr::DIV_MANTISSA) as u16,
            fraction: self.regs.brr.read_field(brr::DIV_FRACTION) as u8,
        };
        divisor.baud(clocks.pclk2())
    }

    /// Apply a whole [Config].
    ///
    /// The baud rate is checked first, so on error nothing is written.
    pub fn configure(&mut self, clocks: &Clocks, config: &Config) -> Result<(), Error> {
        let divisor = baud_divisor(clocks.pclk2(), config.baud)?;

        self.set_data_bits(config.data_bits);
        self.set_parity(config.parity);
        self.set_stop_bits(config.stop_bits);
        self.set_wake_trigger(config.wake);
        self.write_divisor(divisor);
        Ok(())
    }

    /// Let `event` raise the USART1 interrupt.
    #[inline(always)]
    pub fn enable_interrupt(&mut self, event: Event) {
        self.regs.cr1.set(event.enable_bit());
    }

    #[inline(always)]
    pub fn disable_interrupt(&mut self, event: Event) {
        self.regs.cr1.clear(event.enable_bit());
    }

    #[inline(always)]
    pub fn is_transmission_complete(&self) -> bool {
        self.regs.sr.is_set(sr::TC)
    }

    /// Clear TC. The other flags are untouched.
    #[inline(always)]
    pub fn clear_transmission_complete(&mut self) {
        // rc_w0, ones leave the other flags alone
        self.regs.sr.write(!sr::TC.mask());
    }

    #[inline(always)]
    pub fn is_lin_break(&self) -> bool {
        self.regs.sr.is_set(sr::LBD)
    }

    #[inline(always)]
    pub fn clear_lin_break(&mut self) {
        self.regs.sr.write(!sr::LBD.mask());
    }

    #[inline(always)]
    pub fn is_cts_changed(&self) -> bool {
        self.regs.sr.is_set(sr::CTS)
    }

    #[inline(always)]
    pub fn clear_cts_changed(&mut self) {
        self.regs.sr.write(!sr::CTS.mask());
    }

    #[inline(always)]
    pub fn enable_lin(&mut self) {
        self.regs.cr2.set(cr2::LINEN);
    }

    #[inline(always)]
    pub fn disable_lin(&mut self) {
        self.regs.cr2.clear(cr2::LINEN);
    }

    #[inline(always)]
    pub fn enable_smartcard(&mut self) {
        self.regs.cr3.set(cr3::SCEN);
    }

    #[inline(always)]
    pub fn disable_smartcard(&mut self) {
        self.regs.cr3.clear(cr3::SCEN);
    }

    /// Bind the transmit direction to `pin`.
    ///
    /// The pin is held, not configured; set its alternate function
    /// first.
    #[inline(always)]
    pub fn tx(&self, pin: Pin<'a>) -> Tx<'a> {
        Tx::new(self.regs, pin)
    }

    /// Bind the receive direction to `pin`.
    #[inline(always)]
    pub fn rx(&self, pin: Pin<'a>) -> Rx<'a> {
        Rx::new(self.regs, pin)
    }
}
