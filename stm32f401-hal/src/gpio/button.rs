use super::{Pin, Polarity};

/// A push button on one input pin.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Button<'a> {
    pin: Pin<'a>,
    polarity: Polarity,
}

impl<'a> Button<'a> {
    /// Wrap `pin`, pressed when it reads the active level of `polarity`.
    ///
    /// Which level means pressed depends on how the board wires the
    /// button, so there is no default.
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

    /// Is the button held down right now?
    ///
    /// No debouncing.
    pub fn is_pressed(&self) -> bool {
        self.polarity.is_active(self.pin.read_data())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::block::sim;
    use crate::pac;

    #[test]
    fn pressed_follows_polarity() {
        let regs = sim::leak(pac::gpio::RegisterBlock::new());
        let high = Button::new(
            Pin::from_registers(regs, 'A', 0).unwrap(),
            Polarity::ActiveHigh,
        );
        let low = Button::new(
            Pin::from_registers(regs, 'A', 1).unwrap(),
            Polarity::ActiveLow,
        );

        assert!(!high.is_pressed());
        assert!(low.is_pressed());

        regs.idr.write(0b11);
        assert!(high.is_pressed());
        assert!(!low.is_pressed());
    }

    #[test]
    fn pulled_up_switch_to_ground() {
        let regs = sim::leak(pac::gpio::RegisterBlock::new());
        let mut pin = Pin::from_registers(regs, 'A', 0).unwrap();
        pin.set_input_mode();
        pin.set_pull_up();
        let key = Button::new(pin, Polarity::ActiveLow);
        assert_eq!(regs.pupdr.read(), 0b01);

        // released, the pull-up holds the line high
        regs.idr.write(0b1);
        assert!(!key.is_pressed());

        // held, the switch shorts it to ground
        regs.idr.write(0b0);
        assert!(key.is_pressed());
    }
}
