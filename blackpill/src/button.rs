//! The user button on PA0.
//!
//! The KEY switch shorts PA0 to ground, so the pin is pulled up and a
//! low level reads as pressed.

use crate::hal::gpio::{self, Button, Pin, Polarity};
use crate::hal::rcc::Rcc;

/// Port and pin of the user button.
pub const PIN: (char, u8) = ('A', 0);

/// Polarity of the user button.
pub const POLARITY: Polarity = Polarity::ActiveLow;

/// Set up PA0 as the user button: an input with the pull-up on.
pub fn new(rcc: &Rcc) -> Result<Button<'static>, gpio::Error> {
    let mut pin = Pin::new(PIN.0, PIN.1)?;
    pin.clock_enable(rcc);
    pin.set_input_mode();
    pin.set_pull_up();
    Ok(Button::new(pin, POLARITY))
}
