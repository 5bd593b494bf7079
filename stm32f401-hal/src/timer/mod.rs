//! Busy-wait delays on the general-purpose timers and on SysTick.
//!
//! Both timers derive their tick rate from [Clocks](crate::rcc::Clocks)
//! rather than assuming a fixed core frequency.
//!
//! # Interrupts
//!
//! [SysTick::delay_ms_interrupt] leaves the counter running with its
//! interrupt enabled. The `SysTick` exception handler must call
//! [SysTick::stop], or it fires again every reload. COUNTFLAG clears
//! itself when read, so the handler has no flag to clear.

mod general;
pub use general::*;

mod hal02;
mod hal1;

mod system;
pub use system::*;

/// A timer error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Only TIM2 to TIM5 exist.
    InvalidInstance(u8),
    /// Requested duration is out of range for this timer.
    OutOfRange,
}

impl core::fmt::Display for Error {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Timer Error {:?}", self)
    }
}
