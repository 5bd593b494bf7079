use super::{Pin, Polarity};

/// A light on one output pin.
///
/// The pin should already be an output; [Led] only drives its level.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Led<'a> {
    pin: Pin<'a>,
    polarity: Polarity,
}

impl<'a> Led<'a> {
    /// Wrap `pin`, lit when it sits at the active level of `polarity`.
    pub fn new(pin: Pin<'a>, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    /// Free the pin for use elsewhere.
    pub fn free(self) -> Pin<'a> {
        self.pin
    }

    #[inline(always)]
    pub fn pin(&self) -> &Pin<'a> {
        &self.pin
    }

    #[inline(always)]
    pub fn pin_mut(&mut self) -> &mut Pin<'a> {
        &mut self.pin
    }

    #[inline(always)]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Turn the light on.
    pub fn on(&mut self) {
        self.set(true);
    }

    /// Turn the light off.
    pub fn off(&mut self) {
        self.set(false);
    }

    /// Set the light state.
    pub fn set(&mut self, on: bool) {
        self.pin.set_state(self.polarity.level(on));
    }

    /// Toggle the light on or off.
    pub fn toggle(&mut self) {
        self.pin.toggle();
    }

    /// Is the light on?
    pub fn is_on(&self) -> bool {
        self.polarity.is_active(self.pin.output_state())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use crate::pac;

    #[test]
    fn active_low_inverts() {
        let regs = sim::leak(pac::gpio::RegisterBlock::new());
        let pin = Pin::from_registers(regs, 'C', 13).unwrap();
        let mut led = Led::new(pin, Polarity::ActiveLow);

        led.on();
        assert_eq!(regs.odr.read(), 0);
        assert!(led.is_on());

        led.toggle();
        assert_eq!(regs.odr.read(), 1 << 13);
        assert!(!led.is_on());

        led.set(true);
        assert!(led.is_on());
    }

    #[test]
    fn active_high_follows() {
        let regs = sim::leak(pac::gpio::RegisterBlock::new());
        let pin = Pin::from_registers(regs, 'B', 2).unwrap();
        let mut led = Led::new(pin, Polarity::ActiveHigh);

        led.on();
        assert_eq!(regs.odr.read(), 1 << 2);
        led.off();
        assert_eq!(regs.odr.read(), 0);
        assert_eq!(led.free().pin(), 2);
    }
}
