//! The user LED on PC13.
//!
//! The LED sits between 3.3V and the pin, so it lights when the pin is
//! driven low.

use crate::hal::gpio::{self, Led, Pin, Polarity, Speed};
use crate::hal::rcc::Rcc;

/// Port and pin of the user LED.
pub const PIN: (char, u8) = ('C', 13);

/// Set up PC13 as the user LED, initially off.
pub fn new(rcc: &Rcc) -> Result<Led<'static>, gpio::Error> {
    let mut pin = Pin::new(PIN.0, PIN.1)?;
    pin.clock_enable(rcc);

    // set the level before switching to output so it never flashes
    let mut led = Led::new(pin, Polarity::ActiveLow);
    led.off();

    let pin = led.pin_mut();
    pin.set_output_mode();
    pin.enable_push_pull();
    pin.set_speed(Speed::High);
    pin.no_pull_up_down();

    Ok(led)
}
